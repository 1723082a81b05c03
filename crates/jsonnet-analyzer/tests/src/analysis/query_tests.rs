use super::*;
use crate::syntax::{NodeKind, parse};

fn select(
    source: &str,
    line: u32,
    column: u32,
) -> (AnnotatedTree, Option<AnnotatedId>) {
    let ast = parse("t.jsonnet", source).expect("parse");
    find_at(Arc::from(source), Arc::new(ast), Location::new(line, column)).expect("query")
}

fn selected_label(
    source: &str,
    line: u32,
    column: u32,
) -> Option<String> {
    let (tree, selected) = select(source, line, column);
    selected.map(|id| crate::analysis::describe::token_name(tree.ast(), tree.get(id).node.expect("real node")))
}

#[test]
fn selects_variable_reference() {
    assert_eq!(selected_label("local x = 1; x", 1, 14).as_deref(), Some("(var) x"));
}

#[test]
fn selects_innermost_field() {
    assert_eq!(selected_label("{ a: { b: 1 } }", 1, 8).as_deref(), Some("(field) b"));
    assert_eq!(selected_label("{ a: { b: 1 } }", 1, 3).as_deref(), Some("(field) a"));
}

#[test]
fn selects_value_beside_field_name() {
    assert_eq!(selected_label("{ a: 'v' }", 1, 7).as_deref(), Some("(string)"));
}

#[test]
fn identifier_wins_over_its_bind() {
    assert_eq!(selected_label("local abc = 1; abc", 1, 8).as_deref(), Some("(identifier) abc"));
}

#[test]
fn nothing_selected_outside_every_token() {
    assert_eq!(selected_label("1   ", 1, 4), None);
}

#[test]
fn selection_is_the_innermost_containing_node() {
    let source = "local o = {\n  a: [1, { b: o.a }],\n  f(x, y=2):: x + y,\n};\no.f(1)";
    let lines: Vec<&str> = source.split('\n').collect();
    for (line_idx, text) in lines.iter().enumerate() {
        for column in 1..=(text.chars().count() as u32 + 1) {
            let location = Location::new(line_idx as u32 + 1, column);
            let (tree, selected) = select(source, location.line, location.column);
            let Some(selected) = selected else {
                continue;
            };
            let best = &tree.get(selected).range;
            assert!(in_range(location, best), "{location} not in {best}");
            for (id, node) in tree.iter() {
                if id == selected || node.parent.is_none() || !in_range(location, &node.range) {
                    continue;
                }
                assert!(
                    !(is_range_smaller(&node.range, best) && node.range != *best),
                    "{location}: {} is tighter than {best}",
                    node.range
                );
            }
        }
    }
}

#[test]
fn selected_node_kinds_cover_parameters() {
    let (tree, selected) = select("function(a, b=1) a", 1, 13);
    let kind = selected.and_then(|id| tree.kind(id)).cloned();
    assert!(matches!(kind, Some(NodeKind::NamedParameter { .. })));
}
