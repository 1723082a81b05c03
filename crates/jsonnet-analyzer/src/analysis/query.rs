use std::sync::Arc;

use tracing::debug;

use crate::analysis::env::Env;
use crate::analysis::error::AnalysisError;
use crate::analysis::locate::{in_range, is_range_smaller};
use crate::analysis::walker::{AnnotatedId, AnnotatedTree, Visitor, walk_with};
use crate::syntax::{Ast, Location};

/// Tracks the innermost node containing a location while the walk runs.
#[derive(Debug, Clone)]
pub struct PositionQuery {
    location: Location,
    selected: Option<AnnotatedId>,
}

impl PositionQuery {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            selected: None,
        }
    }

    pub fn selected(&self) -> Option<AnnotatedId> {
        self.selected
    }
}

impl Visitor for PositionQuery {
    fn visit(
        &mut self,
        tree: &AnnotatedTree,
        id: AnnotatedId,
    ) -> Result<(), AnalysisError> {
        let node = tree.get(id);
        if !in_range(self.location, &node.range) {
            return Ok(());
        }

        match self.selected {
            None if node.parent.is_some() => {
                debug!("Selecting {} at {} (first match)", label(tree, id), node.range);
                self.selected = Some(id);
            },
            Some(best) if is_range_smaller(&node.range, &tree.get(best).range) => {
                debug!("Selecting {} at {} (nested in {})", label(tree, id), node.range, tree.get(best).range);
                self.selected = Some(id);
            },
            _ => {},
        }
        Ok(())
    }
}

fn label(
    tree: &AnnotatedTree,
    id: AnnotatedId,
) -> &'static str {
    tree.kind(id).map(|kind| kind.label()).unwrap_or("document")
}

/// Walk `ast` and return the tree together with the innermost node that
/// contains `location`, if any.
pub fn find_at(
    source: Arc<str>,
    ast: Arc<Ast>,
    location: Location,
) -> Result<(AnnotatedTree, Option<AnnotatedId>), AnalysisError> {
    let mut query = PositionQuery::new(location);
    let tree = walk_with(source, ast, Env::new(), &mut query)?;
    Ok((tree, query.selected()))
}

#[cfg(test)]
#[path = "../../tests/src/analysis/query_tests.rs"]
mod tests;
