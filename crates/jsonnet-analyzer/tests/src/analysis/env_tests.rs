use super::*;
use crate::syntax::parse;

fn node_id(n: usize) -> NodeId {
    let ast = parse("ids.jsonnet", "[1, 2, 3]").expect("parse");
    ast.ids().nth(n).expect("id")
}

#[test]
fn extend_does_not_mutate_receiver() {
    let base = Env::new().extend([("a".to_string(), node_id(0))]);
    let child = base.extend([("b".to_string(), node_id(1))]);

    assert_eq!(base.get("b"), None);
    assert_eq!(child.get("a"), Some(node_id(0)));
    assert_eq!(child.get("b"), Some(node_id(1)));
}

#[test]
fn nearest_binding_shadows_outer() {
    let outer = Env::new().extend([("x".to_string(), node_id(0))]);
    let inner = outer.extend([("x".to_string(), node_id(2))]);

    assert_eq!(inner.get("x"), Some(node_id(2)));
    assert_eq!(outer.get("x"), Some(node_id(0)));
    assert_eq!(inner.names().into_iter().collect::<Vec<_>>(), vec!["x"]);
}

#[test]
fn empty_extension_shares_the_frame() {
    let env = Env::new();
    assert!(env.extend(Vec::new()).is_empty());
}

fn scopes_of(
    ast: &Ast,
    id: NodeId,
) -> Vec<(NodeKind, Vec<String>)> {
    child_scopes(ast, id, &Env::new())
        .into_iter()
        .map(|(child, env)| (ast.kind(child).clone(), env.names().into_iter().map(str::to_string).collect()))
        .collect()
}

#[test]
fn local_binds_are_visible_in_binds_and_body() {
    let ast = parse("t.jsonnet", "local a = 1, b = a; b").expect("parse");
    let scopes = scopes_of(&ast, ast.root());

    assert_eq!(scopes.len(), 3);
    for (_, names) in &scopes {
        assert_eq!(names, &vec!["a".to_string(), "b".to_string()]);
    }
}

#[test]
fn function_params_scope_the_body() {
    let ast = parse("t.jsonnet", "function(x, y=1) x").expect("parse");
    let scopes = scopes_of(&ast, ast.root());

    let (body_kind, body_names) = scopes.last().expect("body");
    assert!(matches!(body_kind, NodeKind::Var { .. }));
    assert_eq!(body_names, &vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn comprehension_specs_are_threaded() {
    let ast = parse("t.jsonnet", "[x + y for x in a for y in b]").expect("parse");
    let scopes = scopes_of(&ast, ast.root());

    assert_eq!(scopes[0].1, Vec::<String>::new());
    assert_eq!(scopes[1].1, vec!["x".to_string()]);
    assert_eq!(scopes[2].1, vec!["x".to_string(), "y".to_string()]);
}

#[test]
fn object_locals_scope_fields() {
    let ast = parse("t.jsonnet", "{ local h = 1, a: h }").expect("parse");
    let scopes = scopes_of(&ast, ast.root());

    assert!(scopes.iter().all(|(_, names)| names == &vec!["h".to_string()]));
}
