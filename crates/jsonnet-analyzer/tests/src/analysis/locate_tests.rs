use std::sync::Arc;

use super::*;
use crate::syntax::parse;

fn range(
    begin: (u32, u32),
    end: (u32, u32),
) -> LocationRange {
    LocationRange::new(Arc::from("t.jsonnet"), Location::new(begin.0, begin.1), Location::new(end.0, end.1))
}

fn short(range: &LocationRange) -> String {
    format!("{}-{}", range.begin, range.end)
}

/// Locate the first node matching `pick` whose parent is found by `parent`.
fn locate(
    source: &str,
    pick: impl Fn(&NodeKind) -> bool,
) -> Result<LocationRange, LocateError> {
    let ast = parse("t.jsonnet", source).expect("parse");
    let index = LineIndex::new(source);
    let locator = Locator::new(&ast, source, &index);
    let (parent, child) = ast
        .ids()
        .flat_map(|parent| ast.children(parent).into_iter().map(move |child| (parent, child)))
        .find(|(_, child)| pick(ast.kind(*child)))
        .expect("node");
    let parent_range = ast.node(parent).loc.clone();
    locator.reconstruct(child, Some(parent), &parent_range)
}

#[test]
fn in_range_single_line() {
    let r = range((1, 5), (1, 10));
    assert!(in_range(Location::new(1, 5), &r));
    assert!(in_range(Location::new(1, 10), &r));
    assert!(!in_range(Location::new(1, 4), &r));
    assert!(!in_range(Location::new(1, 11), &r));
    assert!(!in_range(Location::new(2, 6), &r));
}

#[test]
fn in_range_multi_line() {
    let r = range((2, 8), (4, 3));
    // begin line, after begin column
    assert!(in_range(Location::new(2, 40), &r));
    assert!(!in_range(Location::new(2, 7), &r));
    // interior line, any column
    assert!(in_range(Location::new(3, 1), &r));
    assert!(in_range(Location::new(3, 200), &r));
    // end line, before end column
    assert!(in_range(Location::new(4, 1), &r));
    assert!(!in_range(Location::new(4, 4), &r));
    assert!(!in_range(Location::new(1, 9), &r));
    assert!(!in_range(Location::new(5, 1), &r));
}

#[test]
fn smaller_is_nesting() {
    let outer = range((1, 1), (5, 2));
    let inner = range((2, 3), (2, 9));
    assert!(is_range_smaller(&inner, &outer));
    assert!(!is_range_smaller(&outer, &inner));
    assert!(is_range_smaller(&outer, &outer.clone()));

    let overlapping = range((1, 5), (6, 1));
    assert!(!is_range_smaller(&overlapping, &outer));
    assert!(!is_range_smaller(&outer, &overlapping));
}

#[test]
fn smaller_is_antisymmetric_up_to_equality() {
    let ranges = [range((1, 1), (1, 4)), range((1, 1), (2, 1)), range((1, 2), (1, 4)), range((1, 1), (1, 4))];
    for a in &ranges {
        for b in &ranges {
            if is_range_smaller(a, b) && is_range_smaller(b, a) {
                assert_eq!(a, b);
            }
        }
    }
}

#[test]
fn native_ranges_pass_through() {
    let found = locate("local x = 'hi'; x", |kind| matches!(kind, NodeKind::LiteralString { .. })).expect("range");
    assert_eq!(short(&found), "1:11-1:15");
}

#[test]
fn object_field_is_found_at_its_name() {
    let found = locate("{ b: a, a: 1 }", |kind| {
        matches!(kind, NodeKind::ObjectField { name: FieldName::Id(name), .. } if name == "a")
    })
    .expect("range");
    assert_eq!(short(&found), "1:9-1:10");
}

#[test]
fn nested_field_with_same_name_is_skipped() {
    let source = "{\n  x: { a: 1 },\n  a: 2,\n}";
    let ast = parse("t.jsonnet", source).expect("parse");
    let index = LineIndex::new(source);
    let locator = Locator::new(&ast, source, &index);
    let root = ast.root();
    let NodeKind::Object {
        fields,
        ..
    } = ast.kind(root)
    else {
        panic!("expected object");
    };
    let found = locator.reconstruct(fields[1], Some(root), &ast.node(root).loc).expect("range");
    assert_eq!(short(&found), "3:3-3:4");
}

#[test]
fn quoted_field_covers_quotes() {
    let found = locate(r#"{ "a b":: 1 }"#, |kind| matches!(kind, NodeKind::ObjectField { .. })).expect("range");
    assert_eq!(short(&found), "1:3-1:8");
}

#[test]
fn quoted_field_names_compare_by_value() {
    let found = locate(r#"{ "a\nb": 1 }"#, |kind| matches!(kind, NodeKind::ObjectField { .. })).expect("range");
    assert_eq!(short(&found), "1:3-1:9");

    let found = locate("{ @'it''s': 1 }", |kind| {
        matches!(kind, NodeKind::ObjectField { name: FieldName::String(name), .. } if name == "it's")
    })
    .expect("range");
    assert_eq!(short(&found), "1:3-1:11");
}

#[test]
fn field_name_inside_string_is_ignored() {
    let found = locate("{ s: 'a: 1', a: 2 }", |kind| {
        matches!(kind, NodeKind::ObjectField { name: FieldName::Id(name), .. } if name == "a")
    })
    .expect("range");
    assert_eq!(short(&found), "1:14-1:15");
}

#[test]
fn parameters_are_found_in_the_parameter_list() {
    let found = locate("function(a, bb=g(a)) bb", |kind| matches!(kind, NodeKind::NamedParameter { .. }))
        .expect("range");
    assert_eq!(short(&found), "1:13-1:15");

    let found = locate("{ f(x): x }", |kind| matches!(kind, NodeKind::Parameter { .. })).expect("range");
    assert_eq!(short(&found), "1:5-1:6");
}

#[test]
fn local_bind_is_found_after_local_or_comma() {
    let found = locate("local a = 1, b = a; b", |kind| {
        matches!(kind, NodeKind::LocalBind { .. })
    })
    .expect("range");
    assert_eq!(short(&found), "1:7-1:8");

    let source = "local a = 1, b = a; b";
    let ast = parse("t.jsonnet", source).expect("parse");
    let index = LineIndex::new(source);
    let locator = Locator::new(&ast, source, &index);
    let NodeKind::Local {
        binds,
        ..
    } = ast.kind(ast.root())
    else {
        panic!("expected local");
    };
    let found = locator.reconstruct(binds[1], Some(ast.root()), &ast.node(ast.root()).loc).expect("range");
    assert_eq!(short(&found), "1:14-1:15");
}

#[test]
fn identifier_is_found_within_its_bind() {
    let source = "local abc = 1; abc";
    let ast = parse("t.jsonnet", source).expect("parse");
    let index = LineIndex::new(source);
    let locator = Locator::new(&ast, source, &index);
    let NodeKind::Local {
        binds,
        ..
    } = ast.kind(ast.root())
    else {
        panic!("expected local");
    };
    let NodeKind::LocalBind {
        variable,
        ..
    } = ast.kind(binds[0])
    else {
        panic!("expected bind");
    };
    let bind_range = locator.reconstruct(binds[0], Some(ast.root()), &ast.node(ast.root()).loc).expect("bind");
    let found = locator.reconstruct(*variable, Some(binds[0]), &bind_range).expect("identifier");
    assert_eq!(short(&found), "1:7-1:10");
}

#[test]
fn missing_name_is_a_locate_error() {
    let source = "{ a: 1 }";
    let ast = parse("t.jsonnet", source).expect("parse");
    let index = LineIndex::new(source);
    let locator = Locator::new(&ast, source, &index);
    let NodeKind::Object {
        fields,
        ..
    } = ast.kind(ast.root())
    else {
        panic!("expected object");
    };
    let err = locator.reconstruct(fields[0], Some(ast.root()), &range((1, 4), (1, 9))).expect_err("should fail");
    assert_eq!(err.name, "a");
}
