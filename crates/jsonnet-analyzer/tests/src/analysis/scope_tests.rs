use std::sync::Arc;

use super::*;
use crate::analysis::walker::walk;
use crate::syntax::parse;

fn names(env: &Env) -> Vec<String> {
    env.names().into_iter().map(str::to_string).collect()
}

#[test]
fn matches_walker_environment_everywhere() {
    let source = "local a = 1, f(x, y=a) = x; { local h = a, b: [v + h for v in [f(1)]], c: function(z) z + a }";
    let ast = Arc::new(parse("t.jsonnet", source).expect("parse"));
    let tree = walk(Arc::from(source), ast.clone());

    for id in ast.ids() {
        let expected = &tree.get(tree.annotation_of(id).expect("annotated")).env;
        let actual = environment_at(&ast, ast.root(), id).expect("env");
        assert_eq!(names(&actual), names(expected), "env mismatch at {}", ast.kind(id).label());
        for name in expected.names() {
            assert_eq!(actual.get(name), expected.get(name));
        }
    }
}

#[test]
fn local_binding_is_visible_in_body_only() {
    let source = "[local a = 1; a, 2]";
    let ast = parse("t.jsonnet", source).expect("parse");
    let NodeKind::Array {
        elements,
    } = ast.kind(ast.root())
    else {
        panic!("expected array");
    };
    let NodeKind::Local {
        body,
        ..
    } = ast.kind(elements[0])
    else {
        panic!("expected local");
    };

    assert_eq!(names(&environment_at(&ast, ast.root(), *body).expect("env")), vec!["a".to_string()]);
    assert!(environment_at(&ast, ast.root(), elements[1]).expect("env").is_empty());
}

#[test]
fn root_sees_empty_environment() {
    let ast = parse("t.jsonnet", "local a = 1; a").expect("parse");
    assert!(environment_at(&ast, ast.root(), ast.root()).expect("env").is_empty());
}

#[test]
fn unreachable_target_fails_loudly() {
    let ast = parse("t.jsonnet", "local a = [1, 2]; a").expect("parse");
    let NodeKind::Local {
        binds,
        ..
    } = ast.kind(ast.root())
    else {
        panic!("expected local");
    };
    // The bind is not below the body.
    let NodeKind::Local {
        body,
        ..
    } = ast.kind(ast.root())
    else {
        unreachable!();
    };
    let err = environment_at(&ast, *body, binds[0]).expect_err("unreachable");
    assert!(matches!(err, AnalysisError::ScopeTargetMissing(_)));
}
