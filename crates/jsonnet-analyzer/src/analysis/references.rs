use tracing::debug;

use crate::analysis::error::AnalysisError;
use crate::analysis::scope::environment_at;
use crate::analysis::walker::{AnnotatedId, AnnotatedTree};
use crate::syntax::{LocationRange, NodeId, NodeKind};

/// A binding: the name it introduces and the node it maps the name to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Binding {
    name: String,
    node: NodeId,
}

/// Every occurrence of the binding under `id`, in source order.
pub fn references_at(
    tree: &AnnotatedTree,
    id: AnnotatedId,
    include_declaration: bool,
) -> Result<Vec<LocationRange>, AnalysisError> {
    let Some(binding) = binding_at(tree, id)? else {
        return Ok(Vec::new());
    };
    debug!("Collecting references to {}", binding.name);

    let mut ranges: Vec<LocationRange> = tree
        .iter()
        .filter(|(_, node)| {
            let Some(node_id) = node.node else {
                return false;
            };
            matches!(tree.ast().kind(node_id), NodeKind::Var { name } if *name == binding.name)
                && node.env.get(&binding.name) == Some(binding.node)
        })
        .map(|(_, node)| node.range.clone())
        .collect();

    if include_declaration && let Some(declaration) = declaration_range(tree, &binding) {
        ranges.push(declaration);
    }

    ranges.sort_by(|a, b| (a.begin, a.end).cmp(&(b.begin, b.end)));
    ranges.dedup();
    Ok(ranges)
}

fn binding_at(
    tree: &AnnotatedTree,
    id: AnnotatedId,
) -> Result<Option<Binding>, AnalysisError> {
    let ast = tree.ast();
    let Some(node) = tree.get(id).node else {
        return Ok(None);
    };

    let bind_of = |bind: NodeId| match ast.kind(bind) {
        NodeKind::LocalBind {
            variable,
            body,
        } => match ast.kind(*variable) {
            NodeKind::Identifier {
                name,
            } => Some(Binding {
                name: name.clone(),
                node: *body,
            }),
            _ => None,
        },
        _ => None,
    };

    let binding = match ast.kind(node) {
        NodeKind::Var {
            name,
        } => environment_at(ast, ast.root(), node)?.get(name).map(|bound| Binding {
            name: name.clone(),
            node: bound,
        }),
        NodeKind::Identifier { .. } => tree.get(id).parent.and_then(|parent| tree.get(parent).node).and_then(bind_of),
        NodeKind::LocalBind { .. } => bind_of(node),
        NodeKind::Parameter {
            name,
        }
        | NodeKind::NamedParameter {
            name,
            ..
        } => Some(Binding {
            name: name.clone(),
            node,
        }),
        NodeKind::ForSpec {
            var,
            ..
        } => Some(Binding {
            name: var.clone(),
            node,
        }),
        _ => None,
    };
    Ok(binding)
}

/// Where the binding's name is written.
fn declaration_range(
    tree: &AnnotatedTree,
    binding: &Binding,
) -> Option<LocationRange> {
    let ast = tree.ast();
    match ast.kind(binding.node) {
        NodeKind::Parameter { .. } | NodeKind::NamedParameter { .. } | NodeKind::ForSpec { .. } => {
            Some(tree.range_of(binding.node))
        },
        _ => {
            let parent = tree.annotation_of(binding.node).and_then(|id| tree.get(id).parent)?;
            match tree.kind(parent)? {
                NodeKind::LocalBind {
                    variable,
                    ..
                } => Some(tree.range_of(*variable)),
                _ => None,
            }
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src/analysis/references_tests.rs"]
mod tests;
