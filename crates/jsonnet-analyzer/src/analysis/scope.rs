//! Environment at a single node without annotating the whole tree.
//!
//! Only the nodes on the path from the root to the target are replayed.

use tracing::error;

use crate::analysis::env::{Env, child_scopes};
use crate::analysis::error::AnalysisError;
use crate::syntax::{Ast, NodeId, NodeKind};

/// The environment `target` sees, identical to what the walker would attach.
pub fn environment_at(
    ast: &Ast,
    root: NodeId,
    target: NodeId,
) -> Result<Env, AnalysisError> {
    let path = path_to(ast, root, target).ok_or_else(|| {
        error!("Scope target {target:?} is not reachable from {root:?} in {}", ast.file());
        AnalysisError::ScopeTargetMissing(target)
    })?;

    let mut env = Env::new();
    for pair in path.windows(2) {
        let (node, child) = (pair[0], pair[1]);
        env = step(ast, node, child, &env);
    }
    Ok(env)
}

/// Environment `child` sees given that `node` sees `env`.
fn step(
    ast: &Ast,
    node: NodeId,
    child: NodeId,
    env: &Env,
) -> Env {
    match ast.kind(node) {
        NodeKind::Local { .. }
        | NodeKind::Function { .. }
        | NodeKind::Object { .. }
        | NodeKind::ObjectComp { .. }
        | NodeKind::ArrayComp { .. } => child_scopes(ast, node, env)
            .into_iter()
            .find_map(|(candidate, scope)| (candidate == child).then_some(scope))
            .unwrap_or_else(|| env.clone()),
        NodeKind::Apply { .. }
        | NodeKind::Array { .. }
        | NodeKind::Assert { .. }
        | NodeKind::Binary { .. }
        | NodeKind::Conditional { .. }
        | NodeKind::Dollar
        | NodeKind::Error { .. }
        | NodeKind::ForSpec { .. }
        | NodeKind::Identifier { .. }
        | NodeKind::IfSpec { .. }
        | NodeKind::Import { .. }
        | NodeKind::InSuper { .. }
        | NodeKind::Index { .. }
        | NodeKind::LiteralBoolean(_)
        | NodeKind::LiteralNull
        | NodeKind::LiteralNumber { .. }
        | NodeKind::LiteralString { .. }
        | NodeKind::LocalBind { .. }
        | NodeKind::NamedParameter { .. }
        | NodeKind::ObjectAssert { .. }
        | NodeKind::ObjectField { .. }
        | NodeKind::Parameter { .. }
        | NodeKind::Partial
        | NodeKind::SelfRef
        | NodeKind::Slice { .. }
        | NodeKind::SuperIndex { .. }
        | NodeKind::Unary { .. }
        | NodeKind::Var { .. } => env.clone(),
    }
}

/// Nodes from `root` down to `target`, both included.
fn path_to(
    ast: &Ast,
    root: NodeId,
    target: NodeId,
) -> Option<Vec<NodeId>> {
    let mut parents: Vec<Option<NodeId>> = vec![None; ast.len()];
    let mut stack = vec![root];
    let mut found = root == target;

    while let Some(node) = stack.pop() {
        if found {
            break;
        }
        for child in ast.children(node) {
            parents[child.index()] = Some(node);
            if child == target {
                found = true;
                break;
            }
            stack.push(child);
        }
    }
    if !found {
        return None;
    }

    let mut path = vec![target];
    let mut current = target;
    while current != root {
        current = parents[current.index()]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
#[path = "../../tests/src/analysis/scope_tests.rs"]
mod tests;
