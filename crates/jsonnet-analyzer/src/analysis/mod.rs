//! Location, binding and description analysis over parsed documents.

pub mod describe;
pub mod env;
pub mod error;
pub mod locate;
pub mod query;
pub mod references;
pub mod resolve;
pub mod scope;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

pub use env::Env;
pub use error::{AnalysisError, LocateError};
pub use resolve::{Resolved, Resolver};
pub use walker::{AnnotatedId, AnnotatedNode, AnnotatedTree, Visitor};

use crate::cache::NodeCache;
use crate::syntax::{Location, LocationRange, parse};

/// Entry points used by request handlers. Every call re-parses and re-walks
/// the document; only imported files are cached.
#[derive(Debug, Clone)]
pub struct Analysis {
    cache: Arc<NodeCache>,
    search_paths: Vec<PathBuf>,
}

impl Analysis {
    pub fn new(
        cache: Arc<NodeCache>,
        search_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            cache,
            search_paths,
        }
    }

    pub fn cache(&self) -> &Arc<NodeCache> {
        &self.cache
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn walk(
        &self,
        file: &str,
        source: &str,
    ) -> Result<AnnotatedTree, AnalysisError> {
        let ast = parse(file, source)?;
        Ok(walker::walk(Arc::from(source), Arc::new(ast)))
    }

    /// Resolve whatever sits at `location`. Expected misses (cursor on a
    /// keyword, unknown field, ...) come back as `Ok(None)`.
    pub fn resolve_at(
        &self,
        file: &str,
        source: &str,
        location: Location,
    ) -> Result<Option<Resolved>, AnalysisError> {
        let ast = parse(file, source)?;
        let (tree, selected) = query::find_at(Arc::from(source), Arc::new(ast), location)?;
        let Some(selected) = selected else {
            debug!("Nothing at {file}:{location}");
            return Ok(None);
        };

        match Resolver::new(&self.cache, &self.search_paths).resolve(&tree, selected) {
            Ok(resolved) => Ok(Some(resolved)),
            Err(err) if err.is_expected() => {
                debug!("No result at {file}:{location}: {err}");
                Ok(None)
            },
            Err(err) => Err(err),
        }
    }

    /// Ranges of every use of the binding at `location`, deduplicated and in
    /// source order.
    pub fn find_references(
        &self,
        file: &str,
        source: &str,
        location: Location,
        include_declaration: bool,
    ) -> Result<Vec<LocationRange>, AnalysisError> {
        let ast = parse(file, source)?;
        let (tree, selected) = query::find_at(Arc::from(source), Arc::new(ast), location)?;
        match selected {
            Some(selected) => references::references_at(&tree, selected, include_declaration),
            None => Ok(Vec::new()),
        }
    }
}
