//! Pre-order walk that annotates every node with a corrected range, a parent
//! link and the environment in effect.

use std::convert::Infallible;
use std::sync::Arc;

use tracing::debug;

use crate::analysis::env::{Env, child_scopes};
use crate::analysis::error::AnalysisError;
use crate::analysis::locate::Locator;
use crate::syntax::{Ast, FileName, Location, LocationRange, NodeId, NodeKind};
use crate::text_pos::LineIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotatedId(u32);

impl AnnotatedId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct AnnotatedNode {
    /// `None` only for the synthetic document root.
    pub node: Option<NodeId>,
    pub range: LocationRange,
    pub parent: Option<AnnotatedId>,
    pub env: Env,
}

/// The result of a walk: one annotation per tree node, in pre-order, plus
/// the synthetic root spanning the whole document at index 0.
#[derive(Debug, Clone)]
pub struct AnnotatedTree {
    file: FileName,
    source: Arc<str>,
    ast: Arc<Ast>,
    nodes: Vec<AnnotatedNode>,
    by_node: Vec<Option<AnnotatedId>>,
}

impl AnnotatedTree {
    pub fn file(&self) -> &FileName {
        &self.file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn root(&self) -> AnnotatedId {
        AnnotatedId(0)
    }

    pub fn get(
        &self,
        id: AnnotatedId,
    ) -> &AnnotatedNode {
        &self.nodes[id.index()]
    }

    pub fn kind(
        &self,
        id: AnnotatedId,
    ) -> Option<&NodeKind> {
        self.get(id).node.map(|node| self.ast.kind(node))
    }

    /// The annotation created for tree node `node`.
    pub fn annotation_of(
        &self,
        node: NodeId,
    ) -> Option<AnnotatedId> {
        self.by_node.get(node.index()).copied().flatten()
    }

    /// Corrected range of tree node `node`, falling back to its raw range.
    pub fn range_of(
        &self,
        node: NodeId,
    ) -> LocationRange {
        match self.annotation_of(node) {
            Some(id) => self.get(id).range.clone(),
            None => self.ast.node(node).loc.clone(),
        }
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(
        &self,
        id: AnnotatedId,
    ) -> impl Iterator<Item = AnnotatedId> + '_ {
        std::iter::successors(self.get(id).parent, move |current| self.get(*current).parent)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnnotatedId, &AnnotatedNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (AnnotatedId(i as u32), node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The raw text covered by `range`, if it lies inside this document.
    pub fn text(
        &self,
        range: &LocationRange,
    ) -> Option<&str> {
        let index = LineIndex::new(&self.source);
        let start = index.offset(&self.source, range.begin)?;
        let end = index.offset(&self.source, range.end)?;
        self.source.get(start..end)
    }
}

/// Called once per annotated node, right after it is created and before
/// its children are visited.
pub trait Visitor {
    fn visit(
        &mut self,
        tree: &AnnotatedTree,
        id: AnnotatedId,
    ) -> Result<(), AnalysisError>;
}

/// Annotate `ast` with no visitor.
pub fn walk(
    source: Arc<str>,
    ast: Arc<Ast>,
) -> AnnotatedTree {
    match annotate(source, ast, Env::new(), |_, _| Ok::<(), Infallible>(())) {
        Ok(tree) => tree,
        Err(never) => match never {},
    }
}

/// Annotate `ast`, calling `visitor` for each node in pre-order. A visitor
/// error aborts the walk.
pub fn walk_with<V: Visitor + ?Sized>(
    source: Arc<str>,
    ast: Arc<Ast>,
    env: Env,
    visitor: &mut V,
) -> Result<AnnotatedTree, AnalysisError> {
    annotate(source, ast, env, |tree, id| visitor.visit(tree, id))
}

fn annotate<E>(
    source: Arc<str>,
    ast: Arc<Ast>,
    env: Env,
    mut visit: impl FnMut(&AnnotatedTree, AnnotatedId) -> Result<(), E>,
) -> Result<AnnotatedTree, E> {
    let file = ast.file().clone();
    let index = LineIndex::new(&source);
    let document_end = index.location(&source, source.len());
    debug!("Walking {file} ({} nodes)", ast.len());

    let mut tree = AnnotatedTree {
        file: file.clone(),
        source: source.clone(),
        ast: ast.clone(),
        nodes: Vec::with_capacity(ast.len() + 1),
        by_node: vec![None; ast.len()],
    };
    tree.nodes.push(AnnotatedNode {
        node: None,
        range: LocationRange::new(file.clone(), Location::new(1, 1), document_end),
        parent: None,
        env: env.clone(),
    });

    let locator = Locator::new(&ast, &source, &index);
    let mut stack = vec![(ast.root(), tree.root(), env)];

    while let Some((node, parent, env)) = stack.pop() {
        let parent_annotation = tree.get(parent);
        let parent_range = parent_annotation.range.clone();
        let range = match locator.reconstruct(node, parent_annotation.node, &parent_range) {
            Ok(range) if range.is_valid() => range,
            Ok(_) => parent_range,
            Err(err) => {
                debug!("{err}; using parent range");
                parent_range
            },
        };

        let id = AnnotatedId(tree.nodes.len() as u32);
        tree.nodes.push(AnnotatedNode {
            node: Some(node),
            range,
            parent: Some(parent),
            env: env.clone(),
        });
        tree.by_node[node.index()] = Some(id);
        visit(&tree, id)?;

        let children = child_scopes(&ast, node, &env);
        stack.extend(children.into_iter().rev().map(|(child, child_env)| (child, id, child_env)));
    }

    Ok(tree)
}

#[cfg(test)]
#[path = "../../tests/src/analysis/walker_tests.rs"]
mod tests;
