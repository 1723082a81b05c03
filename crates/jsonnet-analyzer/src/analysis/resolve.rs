//! Symbol resolution: from an annotated node to a definition location and a
//! description.

use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::analysis::describe::{bind_output, field_name, object_description, token_name, token_value};
use crate::analysis::error::AnalysisError;
use crate::analysis::walker::{AnnotatedId, AnnotatedTree};
use crate::cache::{CacheError, NodeCache};
use crate::syntax::{BinaryOp, ImportKind, IndexKey, LocationRange, NodeId, NodeKind};

/// Upper bound on alias/import hops while following an index chain.
const MAX_HOPS: usize = 64;

/// The outcome of resolving a node. An empty result (unset location and no
/// description) means "nothing to report here".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    pub location: LocationRange,
    /// Source text of the node the query landed on.
    pub token: String,
    pub description: String,
}

impl Resolved {
    pub fn is_empty(&self) -> bool {
        !self.location.is_valid() && self.description.is_empty()
    }
}

/// Where an index chain starts.
enum ChainRoot {
    Var(String),
    SelfRef,
    Dollar,
}

pub struct Resolver<'a> {
    cache: &'a NodeCache,
    search_paths: &'a [PathBuf],
}

impl<'a> Resolver<'a> {
    pub fn new(
        cache: &'a NodeCache,
        search_paths: &'a [PathBuf],
    ) -> Self {
        Self {
            cache,
            search_paths,
        }
    }

    pub fn resolve(
        &self,
        tree: &AnnotatedTree,
        id: AnnotatedId,
    ) -> Result<Resolved, AnalysisError> {
        let Some(node) = tree.get(id).node else {
            return Err(AnalysisError::Unresolvable("document"));
        };
        let kind = tree.ast().kind(node);
        debug!("Resolving {} at {}", kind.label(), tree.get(id).range);

        let mut resolved = match kind {
            NodeKind::Var {
                name,
            } => self.handle_var(tree, id, name)?,
            NodeKind::Index { .. } => self.handle_index(tree, id, node)?,
            NodeKind::Identifier { .. } => handle_default(tree, id),
            NodeKind::Import {
                kind,
                file,
            } => self.handle_import(tree, id, *kind, file)?,
            NodeKind::LocalBind { .. } => return Ok(Resolved::default()),
            NodeKind::Function { .. } => handle_function(tree, id, node)?,
            NodeKind::Parameter {
                name,
            }
            | NodeKind::NamedParameter {
                name,
                ..
            } => Resolved {
                location: tree.get(id).range.clone(),
                description: format!("(param) {name}"),
                ..Resolved::default()
            },
            NodeKind::ObjectField {
                expr,
                ..
            } => Resolved {
                location: tree.get(id).range.clone(),
                description: describe_field(tree, node, *expr),
                ..Resolved::default()
            },
            NodeKind::Apply { .. }
            | NodeKind::Array { .. }
            | NodeKind::ArrayComp { .. }
            | NodeKind::Assert { .. }
            | NodeKind::Binary { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Dollar
            | NodeKind::Error { .. }
            | NodeKind::ForSpec { .. }
            | NodeKind::IfSpec { .. }
            | NodeKind::InSuper { .. }
            | NodeKind::LiteralBoolean(_)
            | NodeKind::LiteralNull
            | NodeKind::LiteralNumber { .. }
            | NodeKind::LiteralString { .. }
            | NodeKind::Local { .. }
            | NodeKind::Object { .. }
            | NodeKind::ObjectAssert { .. }
            | NodeKind::ObjectComp { .. }
            | NodeKind::Partial
            | NodeKind::SelfRef
            | NodeKind::Slice { .. }
            | NodeKind::SuperIndex { .. }
            | NodeKind::Unary { .. } => {
                debug!("No resolution for {}", kind.label());
                return Err(AnalysisError::Unresolvable(kind.label()));
            },
        };

        resolved.token = tree.text(&tree.get(id).range).unwrap_or_default().to_string();
        Ok(resolved)
    }

    /// Search roots for imports made from `tree`: its own directory first.
    fn search_paths_for(
        &self,
        tree: &AnnotatedTree,
    ) -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(self.search_paths.len() + 1);
        if let Some(dir) = Path::new(&**tree.file()).parent() {
            paths.push(dir.to_path_buf());
        }
        paths.extend(self.search_paths.iter().cloned());
        paths
    }

    fn handle_var(
        &self,
        tree: &AnnotatedTree,
        id: AnnotatedId,
        name: &str,
    ) -> Result<Resolved, AnalysisError> {
        let bound = tree.get(id).env.get(name).ok_or(AnalysisError::Unresolvable("Var"))?;
        debug!("{name} points to a {}", tree.ast().kind(bound).label());
        Ok(Resolved {
            location: tree.range_of(bound),
            description: self.describe_binding(tree, bound)?,
            ..Resolved::default()
        })
    }

    /// Describe what a bound expression ultimately refers to.
    fn describe_binding(
        &self,
        tree: &AnnotatedTree,
        bound: NodeId,
    ) -> Result<String, AnalysisError> {
        let ast = tree.ast();
        match ast.kind(bound) {
            NodeKind::Import {
                kind: ImportKind::Code,
                file,
            } => self.import_description(tree, file),
            NodeKind::Object { .. } => Ok(object_description(ast, bound)),
            _ => {
                let parent = tree.annotation_of(bound).and_then(|id| tree.get(id).parent).and_then(|id| tree.get(id).node);
                match parent {
                    Some(bind) if matches!(ast.kind(bind), NodeKind::LocalBind { .. }) => Ok(bind_output(ast, bind)),
                    _ => Ok(token_name(ast, bound)),
                }
            },
        }
    }

    /// Describe the root of an imported file, following any further
    /// imports it evaluates to, or a placeholder when it cannot be loaded.
    fn import_description(
        &self,
        tree: &AnnotatedTree,
        file: &str,
    ) -> Result<String, AnalysisError> {
        match self.cache.load(file, &self.search_paths_for(tree)) {
            Ok(cached) => {
                let imported = &cached.tree;
                self.descend(imported, imported.ast().root(), &[], 1).map(|resolved| resolved.description)
            },
            Err(CacheError::Miss(_)) => Ok(not_loaded(ImportKind::Code, file)),
            Err(err) => Err(err.into()),
        }
    }

    fn handle_import(
        &self,
        tree: &AnnotatedTree,
        id: AnnotatedId,
        kind: ImportKind,
        file: &str,
    ) -> Result<Resolved, AnalysisError> {
        let here = tree.get(id).range.clone();
        if kind != ImportKind::Code {
            return Ok(Resolved {
                location: here,
                description: format!("({}) {file}", kind.keyword()),
                ..Resolved::default()
            });
        }

        match self.cache.load(file, &self.search_paths_for(tree)) {
            Ok(cached) => Ok(Resolved {
                location: cached.tree.get(cached.tree.root()).range.clone(),
                description: format!("(import) {file}"),
                ..Resolved::default()
            }),
            Err(CacheError::Miss(_)) => Ok(Resolved {
                location: here,
                description: not_loaded(kind, file),
                ..Resolved::default()
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn handle_index(
        &self,
        tree: &AnnotatedTree,
        id: AnnotatedId,
        node: NodeId,
    ) -> Result<Resolved, AnalysisError> {
        let (root, names) = index_chain(tree, node)?;
        debug!("Index chain of {} name(s)", names.len());
        let start = match root {
            ChainRoot::Var(name) => tree.get(id).env.get(&name).ok_or(AnalysisError::Unresolvable("Var"))?,
            ChainRoot::SelfRef => enclosing_object(tree, id, false).ok_or(AnalysisError::Unresolvable("Self"))?,
            ChainRoot::Dollar => enclosing_object(tree, id, true).ok_or(AnalysisError::Unresolvable("Dollar"))?,
        };
        self.descend(tree, start, &names, 0)
    }

    /// Follow `names` field by field starting at `node`, hopping through
    /// locals, aliases, nested index chains, object merges and imports.
    fn descend(
        &self,
        tree: &AnnotatedTree,
        node: NodeId,
        names: &[String],
        hops: usize,
    ) -> Result<Resolved, AnalysisError> {
        if hops > MAX_HOPS {
            error!("Gave up following {} after {MAX_HOPS} hops", tree.file());
            return Err(AnalysisError::Unresolvable("Index"));
        }
        let ast = tree.ast();

        match ast.kind(node) {
            NodeKind::Object {
                fields,
                ..
            } => {
                let Some((first, rest)) = names.split_first() else {
                    return Ok(Resolved {
                        location: tree.range_of(node),
                        description: object_description(ast, node),
                        ..Resolved::default()
                    });
                };
                let field = fields
                    .iter()
                    .copied()
                    .find(|field| matches!(ast.kind(*field), NodeKind::ObjectField { name, .. } if name.as_static() == Some(first.as_str())))
                    .ok_or_else(|| AnalysisError::FieldNotFound(first.clone()))?;
                let NodeKind::ObjectField {
                    expr,
                    ..
                } = ast.kind(field)
                else {
                    return Err(AnalysisError::FieldNotFound(first.clone()));
                };
                if rest.is_empty() {
                    return Ok(Resolved {
                        location: tree.range_of(field),
                        description: self.describe_value(tree, field, *expr)?,
                        ..Resolved::default()
                    });
                }
                self.descend(tree, *expr, rest, hops + 1)
            },
            NodeKind::Local {
                body,
                ..
            } => self.descend(tree, *body, names, hops + 1),
            NodeKind::Var {
                name,
            } => {
                let env = &tree.get(tree.annotation_of(node).ok_or(AnalysisError::Unresolvable("Var"))?).env;
                let bound = env.get(name).ok_or(AnalysisError::Unresolvable("Var"))?;
                self.descend(tree, bound, names, hops + 1)
            },
            NodeKind::Index { .. } => {
                let (root, mut prefix) = index_chain(tree, node)?;
                let annotation = tree.annotation_of(node).ok_or(AnalysisError::Unresolvable("Index"))?;
                let start = match root {
                    ChainRoot::Var(name) => tree.get(annotation).env.get(&name),
                    ChainRoot::SelfRef => enclosing_object(tree, annotation, false),
                    ChainRoot::Dollar => enclosing_object(tree, annotation, true),
                }
                .ok_or(AnalysisError::Unresolvable("Index"))?;
                prefix.extend(names.iter().cloned());
                self.descend(tree, start, &prefix, hops + 1)
            },
            NodeKind::Binary {
                op: BinaryOp::Plus,
                left,
                right,
            } => match self.descend(tree, *right, names, hops + 1) {
                Err(AnalysisError::FieldNotFound(_)) if !names.is_empty() => self.descend(tree, *left, names, hops + 1),
                other => other,
            },
            NodeKind::Import {
                kind: ImportKind::Code,
                file,
            } => match self.cache.load(file, &self.search_paths_for(tree)) {
                Ok(cached) => {
                    let imported = &cached.tree;
                    self.descend(imported, imported.ast().root(), names, hops + 1)
                },
                Err(CacheError::Miss(_)) => {
                    debug!("Import {file} not loaded; describing placeholder");
                    Ok(Resolved {
                        location: tree.range_of(node),
                        description: not_loaded(ImportKind::Code, file),
                        ..Resolved::default()
                    })
                },
                Err(err) => Err(err.into()),
            },
            other => match names.first() {
                None => Ok(Resolved {
                    location: tree.range_of(node),
                    description: token_name(ast, node),
                    ..Resolved::default()
                }),
                Some(_) => Err(AnalysisError::Unresolvable(other.label())),
            },
        }
    }

    /// Description of the value a field resolves to.
    fn describe_value(
        &self,
        tree: &AnnotatedTree,
        field: NodeId,
        expr: NodeId,
    ) -> Result<String, AnalysisError> {
        let ast = tree.ast();
        match ast.kind(expr) {
            NodeKind::Import {
                kind: ImportKind::Code,
                file,
            } => self.import_description(tree, file),
            _ => Ok(describe_field(tree, field, expr)),
        }
    }
}

fn not_loaded(
    kind: ImportKind,
    file: &str,
) -> String {
    format!("({}) {file} (not yet loaded)", kind.keyword())
}

/// Names of an index chain in source order, plus what the chain hangs off.
fn index_chain(
    tree: &AnnotatedTree,
    node: NodeId,
) -> Result<(ChainRoot, Vec<String>), AnalysisError> {
    let ast = tree.ast();
    let mut names = Vec::new();
    let mut current = node;
    let root = loop {
        match ast.kind(current) {
            NodeKind::Index {
                target,
                key,
            } => {
                let name = match key {
                    IndexKey::Field(name) => name.clone(),
                    IndexKey::Expr(expr) => match ast.kind(*expr) {
                        NodeKind::LiteralString {
                            value,
                        } => value.clone(),
                        NodeKind::Partial => return Err(AnalysisError::Unresolvable("Partial")),
                        _ => return Err(AnalysisError::IndexWithoutName),
                    },
                };
                names.push(name);
                current = *target;
            },
            NodeKind::Var {
                name,
            } => break ChainRoot::Var(name.clone()),
            NodeKind::SelfRef => break ChainRoot::SelfRef,
            NodeKind::Dollar => break ChainRoot::Dollar,
            other => return Err(AnalysisError::Unresolvable(other.label())),
        }
    };
    names.reverse();
    Ok((root, names))
}

/// The nearest (or, with `outermost`, the outermost) object literal above `id`.
fn enclosing_object(
    tree: &AnnotatedTree,
    id: AnnotatedId,
    outermost: bool,
) -> Option<NodeId> {
    let mut objects = tree
        .ancestors(id)
        .filter_map(|ancestor| tree.get(ancestor).node)
        .filter(|node| matches!(tree.ast().kind(*node), NodeKind::Object { .. }));
    if outermost { objects.last() } else { objects.next() }
}

fn handle_default(
    tree: &AnnotatedTree,
    id: AnnotatedId,
) -> Resolved {
    let ast = tree.ast();
    let annotation = tree.get(id);
    let parent = annotation.parent.and_then(|parent| tree.get(parent).node);
    let description = match parent {
        Some(bind) if matches!(ast.kind(bind), NodeKind::LocalBind { .. }) => bind_output(ast, bind),
        _ => annotation.node.map(|node| token_name(ast, node)).unwrap_or_default(),
    };
    Resolved {
        location: annotation.range.clone(),
        description,
        ..Resolved::default()
    }
}

/// Functions are only described when they are the value of a named field.
fn handle_function(
    tree: &AnnotatedTree,
    id: AnnotatedId,
    function: NodeId,
) -> Result<Resolved, AnalysisError> {
    let field = tree.get(id).parent.and_then(|parent| tree.get(parent).node);
    let name = field.and_then(|field| match tree.ast().kind(field) {
        NodeKind::ObjectField {
            name,
            ..
        } => name.as_static(),
        _ => None,
    });
    let Some(name) = name else {
        debug!("Function outside a field at {}", tree.get(id).range);
        return Err(AnalysisError::Unresolvable("Function"));
    };
    Ok(Resolved {
        location: tree.get(id).range.clone(),
        description: function_signature(tree, name, function),
        ..Resolved::default()
    })
}

/// `(function) name(a, b, c=3)`: required parameters first, then optional
/// ones with their default's literal value.
pub fn function_signature(
    tree: &AnnotatedTree,
    name: &str,
    function: NodeId,
) -> String {
    let ast = tree.ast();
    let NodeKind::Function {
        params,
        ..
    } = ast.kind(function)
    else {
        return format!("(function) {name}");
    };

    let required = params.iter().filter_map(|param| match ast.kind(*param) {
        NodeKind::Parameter {
            name,
        } => Some(name.clone()),
        _ => None,
    });
    let optional = params.iter().filter_map(|param| match ast.kind(*param) {
        NodeKind::NamedParameter {
            name,
            default,
        } => {
            let value = token_value(ast, *default)
                .or_else(|| tree.text(&tree.range_of(*default)).map(str::to_string))
                .unwrap_or_default();
            Some(format!("{name}={value}"))
        },
        _ => None,
    });

    let signature: Vec<String> = required.chain(optional).collect();
    format!("(function) {name}({})", signature.join(", "))
}

fn describe_field(
    tree: &AnnotatedTree,
    field: NodeId,
    expr: NodeId,
) -> String {
    let ast = tree.ast();
    let NodeKind::ObjectField {
        name,
        ..
    } = ast.kind(field)
    else {
        return token_name(ast, field);
    };
    match ast.kind(expr) {
        NodeKind::Function { .. } => function_signature(tree, &field_name(ast, name), expr),
        NodeKind::Object { .. } => object_description(ast, expr),
        _ => format!("(field) {}", field_name(ast, name)),
    }
}

#[cfg(test)]
#[path = "../../tests/src/analysis/resolve_tests.rs"]
mod tests;
