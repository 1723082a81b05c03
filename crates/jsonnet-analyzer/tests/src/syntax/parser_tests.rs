use expect_test::{Expect, expect};

use super::*;

fn render(source: &str) -> String {
    let ast = Parser::new("test.jsonnet".into(), source).parse().expect("parse");
    let mut out = String::new();
    render_node(&ast, ast.root(), 0, &mut out);
    out
}

fn render_node(
    ast: &Ast,
    id: NodeId,
    depth: usize,
    out: &mut String,
) {
    let node = ast.node(id);
    let detail = match &node.kind {
        NodeKind::Var {
            name,
        }
        | NodeKind::Identifier {
            name,
        }
        | NodeKind::Parameter {
            name,
        }
        | NodeKind::NamedParameter {
            name,
            ..
        } => format!(" {name}"),
        NodeKind::LiteralNumber {
            original,
        } => format!(" {original}"),
        NodeKind::LiteralString {
            value,
        } => format!(" {value:?}"),
        NodeKind::Binary {
            op,
            ..
        } => format!(" {}", op.symbol()),
        NodeKind::ObjectField {
            name,
            visibility,
            ..
        } => format!(" {}{}", name.as_static().unwrap_or("[]"), visibility.marker()),
        NodeKind::Index {
            key: IndexKey::Field(name),
            ..
        } => format!(" .{name}"),
        NodeKind::Import {
            file,
            ..
        } => format!(" {file}"),
        _ => String::new(),
    };
    out.push_str(&format!(
        "{}{}{}@{}-{}\n",
        "  ".repeat(depth),
        node.kind.label(),
        detail,
        node.loc.begin,
        node.loc.end
    ));
    for child in ast.children(id) {
        render_node(ast, child, depth + 1, out);
    }
}

fn check(
    source: &str,
    expect: Expect,
) {
    expect.assert_eq(&render(source));
}

fn parse_err(source: &str) -> ParseError {
    Parser::new("test.jsonnet".into(), source).parse().expect_err("parse should fail")
}

fn root_kind(source: &str) -> NodeKind {
    let ast = Parser::new("test.jsonnet".into(), source).parse().expect("parse");
    ast.kind(ast.root()).clone()
}

#[test]
fn local_bind_is_desugared_with_unset_ranges() {
    check(
        "local x = 1; x",
        expect![[r#"
            Local@1:1-1:15
              LocalBind@0:0-0:0
                Identifier x@0:0-0:0
                LiteralNumber 1@1:11-1:12
              Var x@1:14-1:15
        "#]],
    );
}

#[test]
fn method_fields_become_functions() {
    check(
        r#"{ f(a, b=2): a, "s":: 1 }"#,
        expect![[r#"
            Object@1:1-1:26
              ObjectField f:@0:0-0:0
                Function@1:3-1:15
                  Parameter a@0:0-0:0
                  NamedParameter b@0:0-0:0
                    LiteralNumber 2@1:10-1:11
                  Var a@1:14-1:15
              ObjectField s::@0:0-0:0
                LiteralNumber 1@1:23-1:24
        "#]],
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    check(
        "1 + 2 * 3",
        expect![[r#"
            Binary +@1:1-1:10
              LiteralNumber 1@1:1-1:2
              Binary *@1:5-1:10
                LiteralNumber 2@1:5-1:6
                LiteralNumber 3@1:9-1:10
        "#]],
    );
}

#[test]
fn object_after_expression_is_implicit_plus() {
    check(
        "base { a: 1 }",
        expect![[r#"
            Binary +@1:1-1:14
              Var base@1:1-1:5
              Object@1:6-1:14
                ObjectField a:@0:0-0:0
                  LiteralNumber 1@1:11-1:12
        "#]],
    );
}

#[test]
fn index_chain_spans_from_target() {
    check(
        "a.b.c",
        expect![[r#"
            Index .c@1:1-1:6
              Index .b@1:1-1:4
                Var a@1:1-1:2
        "#]],
    );
}

#[test]
fn multi_line_locations() {
    check(
        "{\n  a: 1,\n}",
        expect![[r#"
            Object@1:1-3:2
              ObjectField a:@0:0-0:0
                LiteralNumber 1@2:6-2:7
        "#]],
    );
}

#[test]
fn missing_local_body_at_eof_is_partial() {
    check(
        "local a = 1;",
        expect![[r#"
            Local@1:1-1:13
              LocalBind@0:0-0:0
                Identifier a@0:0-0:0
                LiteralNumber 1@1:11-1:12
              Partial@1:13-1:13
        "#]],
    );
}

#[test]
fn trailing_dot_at_eof_is_partial_index() {
    let kind = root_kind("a.");
    assert!(matches!(
        kind,
        NodeKind::Index {
            key: IndexKey::Expr(_),
            ..
        }
    ));
}

#[test]
fn dangling_operator_at_eof_is_partial() {
    let ast = Parser::new("test.jsonnet".into(), "1 +").parse().expect("parse");
    let NodeKind::Binary {
        right,
        ..
    } = ast.kind(ast.root())
    else {
        panic!("expected binary");
    };
    assert_eq!(ast.kind(*right), &NodeKind::Partial);
}

#[test]
fn mid_file_errors_are_reported() {
    let err = parse_err("local = 1; 2");
    assert_eq!(err.location, Location::new(1, 7));
    assert_eq!(err.message, "expected variable name, found `=`");
    assert_eq!(err.to_string(), "test.jsonnet:1:7: expected variable name, found `=`");
}

#[test]
fn unexpected_trailing_token_is_an_error() {
    let err = parse_err("1 )");
    assert_eq!(err.location, Location::new(1, 3));
}

#[test]
fn string_literals_are_unescaped() {
    assert_eq!(
        root_kind(r#"'a\nbA'"#),
        NodeKind::LiteralString {
            value: "a\nbA".to_string(),
        }
    );
    assert_eq!(
        root_kind(r#"@"x""y""#),
        NodeKind::LiteralString {
            value: "x\"y".to_string(),
        }
    );
}

#[test]
fn text_block_strips_indentation() {
    assert_eq!(
        root_kind("|||\n  hello\n    world\n|||"),
        NodeKind::LiteralString {
            value: "hello\n  world\n".to_string(),
        }
    );
    assert_eq!(
        root_kind("|||-\n  chomped\n|||"),
        NodeKind::LiteralString {
            value: "chomped".to_string(),
        }
    );
}

#[test]
fn comprehensions() {
    check(
        "[x for x in xs if x]",
        expect![[r#"
            ArrayComp@1:1-1:21
              ForSpec@1:4-1:15
                Var xs@1:13-1:15
              IfSpec@1:16-1:20
                Var x@1:19-1:20
              Var x@1:2-1:3
        "#]],
    );
    assert!(matches!(root_kind("{ [k]: 1 for k in ks }"), NodeKind::ObjectComp { .. }));
}

#[test]
fn in_super_and_super_index() {
    assert!(matches!(root_kind("'a' in super"), NodeKind::InSuper { .. }));
    assert!(matches!(
        root_kind("super.a"),
        NodeKind::SuperIndex {
            key: IndexKey::Field(_),
        }
    ));
}

#[test]
fn imports_keep_their_kind() {
    assert_eq!(
        root_kind("importstr 'a.txt'"),
        NodeKind::Import {
            kind: ImportKind::String,
            file: "a.txt".to_string(),
        }
    );
    assert!(parse_err("import x").message.starts_with("expected string literal after import"));
}

#[test]
fn apply_with_named_args_and_tailstrict() {
    let NodeKind::Apply {
        positional,
        named,
        tailstrict,
        ..
    } = root_kind("f(1, b=2) tailstrict")
    else {
        panic!("expected apply");
    };
    assert_eq!(positional.len(), 1);
    assert_eq!(named.len(), 1);
    assert_eq!(named[0].name, "b");
    assert!(tailstrict);
}

#[test]
fn slices() {
    let NodeKind::Slice {
        begin,
        end,
        step,
        ..
    } = root_kind("a[1:2:3]")
    else {
        panic!("expected slice");
    };
    assert!(begin.is_some() && end.is_some() && step.is_some());

    let NodeKind::Slice {
        begin,
        end,
        step,
        ..
    } = root_kind("a[::2]")
    else {
        panic!("expected slice");
    };
    assert!(begin.is_none() && end.is_none() && step.is_some());
}
