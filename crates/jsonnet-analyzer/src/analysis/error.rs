use thiserror::Error;

use crate::cache::CacheError;
use crate::syntax::{LocationRange, NodeId, ParseError};

/// A synthesized node's name could not be found in the text bounded by its
/// parent. Callers recover by using the parent's range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot locate `{name}` within {range}")]
pub struct LocateError {
    pub name: String,
    pub range: LocationRange,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unable to resolve {0}")]
    Unresolvable(&'static str),

    #[error("field `{0}` not found")]
    FieldNotFound(String),

    #[error("index expression has no field name")]
    IndexWithoutName,

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("node {0:?} is not reachable from the scope root")]
    ScopeTargetMissing(NodeId),
}

impl AnalysisError {
    /// Outcomes that mean "nothing to show" rather than a failed query.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            AnalysisError::Unresolvable(_) | AnalysisError::FieldNotFound(_) | AnalysisError::Cache(CacheError::Miss(_))
        )
    }
}
