//! Human-readable labels for nodes.

use crate::syntax::{Ast, FieldName, IndexKey, NodeId, NodeKind};

/// The literal value of a number or string node.
pub fn token_value(
    ast: &Ast,
    id: NodeId,
) -> Option<String> {
    match ast.kind(id) {
        NodeKind::LiteralNumber {
            original,
        } => Some(original.clone()),
        NodeKind::LiteralString {
            value,
        } => Some(value.clone()),
        _ => None,
    }
}

pub fn field_name(
    ast: &Ast,
    name: &FieldName,
) -> String {
    match name {
        FieldName::Id(name) | FieldName::String(name) => name.clone(),
        FieldName::Computed(expr) => token_value(ast, *expr).unwrap_or_else(|| "[computed]".to_string()),
    }
}

/// Generic per-kind label, e.g. `(number)` or `(var) x`.
pub fn token_name(
    ast: &Ast,
    id: NodeId,
) -> String {
    let value_of = |node: NodeId| token_value(ast, node).unwrap_or_else(|| ast.kind(node).label().to_lowercase());
    match ast.kind(id) {
        NodeKind::Apply { .. } => "(apply)".to_string(),
        NodeKind::Array { .. } => "(array)".to_string(),
        NodeKind::ArrayComp { .. } => "(arraycomp)".to_string(),
        NodeKind::Assert { .. } => "(assert)".to_string(),
        NodeKind::Binary {
            op,
            ..
        } => format!("(binary) {}", op.symbol()),
        NodeKind::Conditional { .. } => "(conditional)".to_string(),
        NodeKind::Dollar => "($)".to_string(),
        NodeKind::Error { .. } => "(error)".to_string(),
        NodeKind::ForSpec {
            var,
            ..
        } => format!("(forspec) {var}"),
        NodeKind::Function { .. } => "(function)".to_string(),
        NodeKind::Identifier {
            name,
        } => format!("(identifier) {name}"),
        NodeKind::IfSpec { .. } => "(ifspec)".to_string(),
        NodeKind::Import {
            kind,
            file,
        } => format!("({}) {file}", kind.keyword()),
        NodeKind::InSuper { .. } => "(in super)".to_string(),
        NodeKind::Index {
            key: IndexKey::Field(name),
            ..
        } => format!("(index) {name}"),
        NodeKind::Index {
            key: IndexKey::Expr(expr),
            ..
        } => format!("(array index) [{}]", value_of(*expr)),
        NodeKind::LiteralBoolean(_) => "(bool)".to_string(),
        NodeKind::LiteralNull => "(null)".to_string(),
        NodeKind::LiteralNumber { .. } => "(number)".to_string(),
        NodeKind::LiteralString { .. } => "(string)".to_string(),
        NodeKind::Local { .. } => "(local)".to_string(),
        NodeKind::LocalBind {
            variable,
            ..
        } => match ast.kind(*variable) {
            NodeKind::Identifier {
                name,
            } => format!("(local bind) {name}"),
            _ => "(local bind)".to_string(),
        },
        NodeKind::NamedParameter {
            name,
            default,
        } => format!("(optional parameter) {name}={}", value_of(*default)),
        NodeKind::Object { .. } | NodeKind::ObjectComp { .. } => "(object)".to_string(),
        NodeKind::ObjectAssert { .. } => "(object assert)".to_string(),
        NodeKind::ObjectField {
            name,
            ..
        } => format!("(field) {}", field_name(ast, name)),
        NodeKind::Parameter {
            name,
        } => format!("(required parameter) {name}"),
        NodeKind::Partial => "(partial)".to_string(),
        NodeKind::SelfRef => "(self)".to_string(),
        NodeKind::Slice { .. } => "(slice)".to_string(),
        NodeKind::SuperIndex {
            key: IndexKey::Field(name),
        } => format!("(super index) {name}"),
        NodeKind::SuperIndex {
            key: IndexKey::Expr(expr),
        } => format!("(super index) [{}]", value_of(*expr)),
        NodeKind::Unary { .. } => "(unary)".to_string(),
        NodeKind::Var {
            name,
        } => format!("(var) {name}"),
    }
}

/// Field listing of an object literal with visibility markers:
///
/// ```text
/// (object) {
///   (field) a:,
///   (field) b::,
/// }
/// ```
pub fn object_description(
    ast: &Ast,
    object: NodeId,
) -> String {
    let fields: &[NodeId] = match ast.kind(object) {
        NodeKind::Object {
            fields,
            ..
        }
        | NodeKind::ObjectComp {
            fields,
            ..
        } => fields,
        _ => &[],
    };

    let mut out = String::from("(object) {");
    for (i, field) in fields.iter().enumerate() {
        if i == 0 {
            out.push('\n');
        }
        if let NodeKind::ObjectField {
            name,
            visibility,
            ..
        } = ast.kind(*field)
        {
            out.push_str(&format!("  (field) {}{},\n", field_name(ast, name), visibility.marker()));
        }
    }
    out.push('}');
    out
}

/// Description of a `local` binding keyed on what it binds.
pub fn bind_output(
    ast: &Ast,
    bind: NodeId,
) -> String {
    let NodeKind::LocalBind {
        variable,
        body,
    } = ast.kind(bind)
    else {
        return token_name(ast, bind);
    };
    let name = match ast.kind(*variable) {
        NodeKind::Identifier {
            name,
        } => name.as_str(),
        _ => "",
    };

    match ast.kind(*body) {
        NodeKind::LiteralString { .. } => format!("(string) {name}"),
        NodeKind::Function { .. } => format!("(function) {name}"),
        NodeKind::Object { .. } => object_description(ast, *body),
        other => format!("(unknown) {name}: {}", other.label()),
    }
}
