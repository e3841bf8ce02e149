use expect_test::{Expect, expect};
use quill_errors::CancellationToken;
use quill_syntax::SyntaxKind::{self, *};
use quill_syntax::walk::{Strategy, traverse};
use quill_syntax::{LiteralKind, NodeStore, NumericKind, XorNode};

use crate::parser::{ParseOutcome, ParseResult};
use crate::settings::{EntryPoint, ParseSettings};
use crate::{debug, parse_text};

#[track_caller]
fn check(text: &str, expect: Expect) {
    let (snapshot, result) = parse_text(text, &ParseSettings::default());

    let ParseOutcome::Tree(_) = result.outcome else {
        panic!("expected a tree for {text:?}, got {:?}", result.outcome);
    };

    let root = result.store.root().unwrap();
    assert_tiling(&result.store, root);
    expect.assert_eq(&debug::tree_to_string(&result.store, &snapshot, root));
}

#[track_caller]
fn parse_tree(text: &str) -> ParseResult {
    let (_, result) = parse_text(text, &ParseSettings::default());
    assert!(matches!(result.outcome, ParseOutcome::Tree(_)), "{:?}", result.outcome);
    result
}

fn bfs_kinds(result: &ParseResult) -> Vec<SyntaxKind> {
    let mut kinds = Vec::new();
    traverse(
        &result.store,
        result.store.root().unwrap(),
        Strategy::BreadthFirst,
        &mut kinds,
        &mut |kinds, node| kinds.push(result.store.kind_of(node)),
        None,
    );
    kinds
}

/// Every closed node's children tile its range exactly: ordered,
/// contiguous, no gaps, no overlaps.
fn assert_tiling(store: &NodeStore, root: XorNode) {
    traverse(
        store,
        root,
        Strategy::DepthFirst,
        &mut (),
        &mut |(), node| {
            let XorNode::Closed(id) = node else { return };
            let data = store.closed_node(id).unwrap();

            if data.children.is_empty() {
                return;
            }

            let mut cursor = data.range.start;
            for &child in &data.children {
                let child_range = store.closed_node(child).unwrap().range;
                assert_eq!(child_range.start, cursor, "gap or overlap under {:?}", data.kind);
                cursor = child_range.end;
            }
            assert_eq!(cursor, data.range.end, "children do not exhaust {:?}", data.kind);
        },
        None,
    );
}

#[test]
fn arithmetic_expression() {
    check(
        "1 + 1",
        expect![[r#"
            ARITHMETIC_EXPR@0..3
              LITERAL_EXPR@0..1 "1"
              CONSTANT@1..2 "+"
              LITERAL_EXPR@2..3 "1"
        "#]],
    );
}

#[test]
fn multiplication_binds_tighter() {
    check(
        "1 + 2 * 3",
        expect![[r#"
            ARITHMETIC_EXPR@0..5
              LITERAL_EXPR@0..1 "1"
              CONSTANT@1..2 "+"
              ARITHMETIC_EXPR@2..5
                LITERAL_EXPR@2..3 "2"
                CONSTANT@3..4 "*"
                LITERAL_EXPR@4..5 "3"
        "#]],
    );
}

#[test]
fn each_expression() {
    check(
        "each 1",
        expect![[r#"
            EACH_EXPR@0..2
              CONSTANT@0..1 "each"
              LITERAL_EXPR@1..2 "1"
        "#]],
    );
}

#[test]
fn if_expression() {
    check(
        "if x then x else x",
        expect![[r#"
            IF_EXPR@0..6
              CONSTANT@0..1 "if"
              IDENT_EXPR@1..2 "x"
              CONSTANT@2..3 "then"
              IDENT_EXPR@3..4 "x"
              CONSTANT@4..5 "else"
              IDENT_EXPR@5..6 "x"
        "#]],
    );
}

#[test]
fn let_expression() {
    check(
        "let x = 1 in x",
        expect![[r#"
            LET_EXPR@0..6
              CONSTANT@0..1 "let"
              KEY_VALUE@1..4
                IDENT_EXPR@1..2 "x"
                CONSTANT@2..3 "="
                LITERAL_EXPR@3..4 "1"
              CONSTANT@4..5 "in"
              IDENT_EXPR@5..6 "x"
        "#]],
    );
}

#[test]
fn section_document() {
    check(
        "section; x = 1; y = 2;",
        expect![[r#"
            SECTION@0..10
              CONSTANT@0..1 "section"
              CONSTANT@1..2 ";"
              SECTION_MEMBER@2..6
                IDENT_EXPR@2..3 "x"
                CONSTANT@3..4 "="
                LITERAL_EXPR@4..5 "1"
                CONSTANT@5..6 ";"
              SECTION_MEMBER@6..10
                IDENT_EXPR@6..7 "y"
                CONSTANT@7..8 "="
                LITERAL_EXPR@8..9 "2"
                CONSTANT@9..10 ";"
        "#]],
    );
}

#[test]
fn invocation() {
    check(
        "f(x, 1)",
        expect![[r#"
            INVOKE_EXPR@0..6
              IDENT_EXPR@0..1 "f"
              CONSTANT@1..2 "("
              IDENT_EXPR@2..3 "x"
              CONSTANT@3..4 ","
              LITERAL_EXPR@4..5 "1"
              CONSTANT@5..6 ")"
        "#]],
    );
}

#[test]
fn unary_chain() {
    check(
        "- not x",
        expect![[r#"
            UNARY_EXPR@0..3
              CONSTANT@0..1 "-"
              UNARY_EXPR@1..3
                CONSTANT@1..2 "not"
                IDENT_EXPR@2..3 "x"
        "#]],
    );
}

#[test]
fn paren_wins_without_arrow() {
    check(
        "(x)",
        expect![[r#"
            PAREN_EXPR@0..3
              CONSTANT@0..1 "("
              IDENT_EXPR@1..2 "x"
              CONSTANT@2..3 ")"
        "#]],
    );
}

#[test]
fn function_wins_by_longest_match() {
    check(
        "(x) => x",
        expect![[r#"
            FUNCTION_EXPR@0..5
              PARAM_LIST@0..3
                CONSTANT@0..1 "("
                PARAMETER@1..2
                  IDENT_EXPR@1..2 "x"
                CONSTANT@2..3 ")"
              CONSTANT@3..4 "=>"
              IDENT_EXPR@4..5 "x"
        "#]],
    );
}

#[test]
fn parameter_metadata() {
    check(
        "(x, optional y as nullable number) => x",
        expect![[r#"
            FUNCTION_EXPR@0..11
              PARAM_LIST@0..9
                CONSTANT@0..1 "("
                PARAMETER@1..2
                  IDENT_EXPR@1..2 "x"
                CONSTANT@2..3 ","
                PARAMETER@3..8
                  CONSTANT@3..4 "optional"
                  IDENT_EXPR@4..5 "y"
                  TYPE_ANNOTATION@5..8
                    CONSTANT@5..6 "as"
                    NULLABLE_TYPE@6..8
                      CONSTANT@6..7 "nullable"
                      PRIMITIVE_TYPE@7..8 "number"
                CONSTANT@8..9 ")"
              CONSTANT@9..10 "=>"
              IDENT_EXPR@10..11 "x"
        "#]],
    );
}

#[test]
fn missing_separator_degrades_one_diagnostic_only() {
    let (snapshot, result) = parse_text("[a = 1 b = 2]", &ParseSettings::default());

    assert!(matches!(result.outcome, ParseOutcome::Tree(_)));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message(), "expected ','");

    let root = result.store.root().unwrap();
    assert_tiling(&result.store, root);
    expect![[r#"
        RECORD_EXPR@0..8
          CONSTANT@0..1 "["
          KEY_VALUE@1..4
            IDENT_EXPR@1..2 "a"
            CONSTANT@2..3 "="
            LITERAL_EXPR@3..4 "1"
          KEY_VALUE@4..7
            IDENT_EXPR@4..5 "b"
            CONSTANT@5..6 "="
            LITERAL_EXPR@6..7 "2"
          CONSTANT@7..8 "]"
    "#]]
    .assert_eq(&debug::tree_to_string(&result.store, &snapshot, root));
}

#[test]
fn malformed_member_is_isolated() {
    let (snapshot, result) = parse_text("section; x = ; y = 2;", &ParseSettings::default());

    assert!(matches!(result.outcome, ParseOutcome::Tree(_)));
    assert_eq!(result.diagnostics.len(), 1);

    let root = result.store.root().unwrap();
    assert_tiling(&result.store, root);
    expect![[r#"
        SECTION@0..9
          CONSTANT@0..1 "section"
          CONSTANT@1..2 ";"
          ERROR@2..4 "x ="
          ERROR@4..5 ";"
          SECTION_MEMBER@5..9
            IDENT_EXPR@5..6 "y"
            CONSTANT@6..7 "="
            LITERAL_EXPR@7..8 "2"
            CONSTANT@8..9 ";"
    "#]]
    .assert_eq(&debug::tree_to_string(&result.store, &snapshot, root));
}

#[test]
fn repeated_parses_are_identical() {
    let text = "let f = (x) => x + 1 in f(2) * 3";

    let (snapshot, first) = parse_text(text, &ParseSettings::default());
    let (_, second) = parse_text(text, &ParseSettings::default());

    let first_tree =
        debug::tree_to_string(&first.store, &snapshot, first.store.root().unwrap());
    let second_tree =
        debug::tree_to_string(&second.store, &snapshot, second.store.root().unwrap());

    assert_eq!(first_tree, second_tree);
}

#[test]
fn breadth_first_kind_shapes() {
    let result = parse_tree("1 + 1");
    assert_eq!(bfs_kinds(&result), vec![ARITHMETIC_EXPR, LITERAL_EXPR, CONSTANT, LITERAL_EXPR]);

    let result = parse_tree("each 1");
    assert_eq!(bfs_kinds(&result), vec![EACH_EXPR, CONSTANT, LITERAL_EXPR]);

    let result = parse_tree("{1, x}");
    assert_eq!(
        bfs_kinds(&result),
        vec![LIST_EXPR, CONSTANT, LITERAL_EXPR, CONSTANT, IDENT_EXPR, CONSTANT],
    );
}

#[test]
fn literal_classification() {
    for (text, expected) in [
        ("1", LiteralKind::Numeric(NumericKind::Decimal)),
        ("0x1f", LiteralKind::Numeric(NumericKind::Hex)),
        ("1.5e3", LiteralKind::Numeric(NumericKind::Float)),
        ("true", LiteralKind::Logical),
        ("null", LiteralKind::Null),
        (r#""hi""#, LiteralKind::Text),
    ] {
        let result = parse_tree(text);
        let XorNode::Closed(root) = result.store.root().unwrap() else { unreachable!() };
        let node = result.store.closed_node(root).unwrap();

        assert_eq!(node.kind, LITERAL_EXPR, "input: {text:?}");
        assert_eq!(node.literal, Some(expected), "input: {text:?}");
    }
}

#[test]
fn assertion_expressions() {
    let result = parse_tree("1 as nullable number");
    assert_eq!(
        bfs_kinds(&result),
        vec![AS_EXPR, LITERAL_EXPR, CONSTANT, NULLABLE_TYPE, CONSTANT, PRIMITIVE_TYPE],
    );

    let result = parse_tree("x is text");
    assert_eq!(bfs_kinds(&result), vec![IS_EXPR, IDENT_EXPR, CONSTANT, PRIMITIVE_TYPE]);
}

#[test]
fn hard_failure_carries_furthest_position() {
    let (_, result) = parse_text("1 +", &ParseSettings::default());

    let ParseOutcome::Failure(failure) = &result.outcome else {
        panic!("expected a failure, got {:?}", result.outcome);
    };

    // The arithmetic attempt got past both tokens before failing, so the
    // surfaced failure points past the operator, not at token zero.
    assert_eq!(failure.token, 2);
    assert!(failure.expected.contains(&IDENT));
    assert!(failure.expected.contains(&LEFT_PAREN));
}

#[test]
fn unterminated_nesting_is_a_hard_failure() {
    let (_, result) = parse_text("[a = (1", &ParseSettings::default());
    assert!(matches!(result.outcome, ParseOutcome::Failure(_)));
}

#[test]
fn entry_point_override() {
    let settings =
        ParseSettings { entry_point: Some(EntryPoint::Expression), ..ParseSettings::default() };
    let (_, result) = parse_text("section; x = 1;", &settings);
    assert!(matches!(result.outcome, ParseOutcome::Failure(_)));

    let settings =
        ParseSettings { entry_point: Some(EntryPoint::Section), ..ParseSettings::default() };
    let (_, result) = parse_text("section; x = 1;", &settings);
    assert!(matches!(result.outcome, ParseOutcome::Tree(_)));
}

#[test]
fn cancellation_is_not_a_parse_failure() {
    let token = CancellationToken::new();
    token.cancel();

    let settings =
        ParseSettings { cancellation: Some(token), ..ParseSettings::default() };
    let (_, result) = parse_text("1 + 1", &settings);

    assert!(matches!(result.outcome, ParseOutcome::Cancelled));
    assert!(result.diagnostics.is_empty());
}
