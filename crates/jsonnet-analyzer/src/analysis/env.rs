//! Lexical environments.
//!
//! An [`Env`] is a persistent linked list of frames. Extending never touches
//! the receiver, so every branch of the tree owns its own view and siblings
//! never observe each other's bindings.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::syntax::{Ast, NodeId, NodeKind};

#[derive(Debug)]
struct Frame {
    bindings: Vec<(String, NodeId)>,
    parent: Option<Arc<Frame>>,
}

#[derive(Debug, Clone, Default)]
pub struct Env {
    head: Option<Arc<Frame>>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new environment with `bindings` layered over `self`.
    pub fn extend<I>(
        &self,
        bindings: I,
    ) -> Env
    where
        I: IntoIterator<Item = (String, NodeId)>,
    {
        let bindings: Vec<_> = bindings.into_iter().collect();
        if bindings.is_empty() {
            return self.clone();
        }
        Env {
            head: Some(Arc::new(Frame {
                bindings,
                parent: self.head.clone(),
            })),
        }
    }

    /// The nearest binding of `name`.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<NodeId> {
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if let Some((_, node)) = current.bindings.iter().rev().find(|(bound, _)| bound == name) {
                return Some(*node);
            }
            frame = current.parent.as_deref();
        }
        None
    }

    /// Every visible name, sorted.
    pub fn names(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            names.extend(current.bindings.iter().map(|(name, _)| name.as_str()));
            frame = current.parent.as_deref();
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

fn bind_entries<'a>(
    ast: &'a Ast,
    binds: &'a [NodeId],
) -> impl Iterator<Item = (String, NodeId)> + 'a {
    binds.iter().filter_map(move |bind| match ast.kind(*bind) {
        NodeKind::LocalBind {
            variable,
            body,
        } => match ast.kind(*variable) {
            NodeKind::Identifier {
                name,
            } => Some((name.clone(), *body)),
            _ => None,
        },
        _ => None,
    })
}

fn param_entries<'a>(
    ast: &'a Ast,
    params: &'a [NodeId],
) -> impl Iterator<Item = (String, NodeId)> + 'a {
    params.iter().filter_map(move |param| match ast.kind(*param) {
        NodeKind::Parameter {
            name,
        }
        | NodeKind::NamedParameter {
            name,
            ..
        } => Some((name.clone(), *param)),
        _ => None,
    })
}

/// Thread comprehension specs left to right. Each spec sees the variables of
/// the specs before it; the returned env sees all of them.
fn thread_specs(
    ast: &Ast,
    specs: &[NodeId],
    env: &Env,
    out: &mut Vec<(NodeId, Env)>,
) -> Env {
    let mut current = env.clone();
    for spec in specs {
        out.push((*spec, current.clone()));
        if let NodeKind::ForSpec {
            var,
            ..
        } = ast.kind(*spec)
        {
            current = current.extend([(var.clone(), *spec)]);
        }
    }
    current
}

/// The children of `id` paired with the environment each one sees, in walk
/// order. This is the single place the scoping rules live.
pub fn child_scopes(
    ast: &Ast,
    id: NodeId,
    env: &Env,
) -> Vec<(NodeId, Env)> {
    let with = |children: Vec<NodeId>, scope: &Env| -> Vec<(NodeId, Env)> {
        children.into_iter().map(|child| (child, scope.clone())).collect()
    };

    match ast.kind(id) {
        NodeKind::Local {
            binds,
            ..
        } => {
            let scope = env.extend(bind_entries(ast, binds));
            with(ast.children(id), &scope)
        },
        NodeKind::Function {
            params,
            ..
        } => {
            let scope = env.extend(param_entries(ast, params));
            with(ast.children(id), &scope)
        },
        NodeKind::Object {
            locals,
            ..
        } => {
            let scope = env.extend(bind_entries(ast, locals));
            with(ast.children(id), &scope)
        },
        NodeKind::ObjectComp {
            locals,
            fields,
            specs,
        } => {
            let mut out = Vec::new();
            let threaded = thread_specs(ast, specs, env, &mut out);
            let scope = threaded.extend(bind_entries(ast, locals));
            out.extend(locals.iter().chain(fields).map(|child| (*child, scope.clone())));
            out
        },
        NodeKind::ArrayComp {
            body,
            specs,
        } => {
            let mut out = Vec::new();
            let threaded = thread_specs(ast, specs, env, &mut out);
            out.push((*body, threaded));
            out
        },
        _ => with(ast.children(id), env),
    }
}

#[cfg(test)]
#[path = "../../tests/src/analysis/env_tests.rs"]
mod tests;
