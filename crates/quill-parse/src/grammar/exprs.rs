use quill_syntax::SyntaxKind::{self, *};
use quill_syntax::{Arity, LiteralKind, NodeId, NumericKind, SyntaxSet};

use super::{delimited, types};
use crate::parser::{ParseStep, Parser};

pub(crate) const EXPR_FIRST: SyntaxSet = SyntaxSet::new([
    TRUE_KW,
    FALSE_KW,
    INT_NUMBER,
    HEX_NUMBER,
    FLOAT_NUMBER,
    TEXT,
    NULL_KW,
    IDENT,
    LEFT_PAREN,
    LEFT_BRACE,
    LEFT_BRACKET,
    EACH_KW,
    IF_KW,
    LET_KW,
    PLUS,
    MINUS,
    NOT_KW,
]);

const OR_OPS: SyntaxSet = SyntaxSet::new([OR_KW]);
const AND_OPS: SyntaxSet = SyntaxSet::new([AND_KW]);
const EQUALITY_OPS: SyntaxSet = SyntaxSet::new([EQ, NOT_EQ]);
const RELATIONAL_OPS: SyntaxSet = SyntaxSet::new([LT, GT, LT_EQ, GT_EQ]);
const ADDITIVE_OPS: SyntaxSet = SyntaxSet::new([PLUS, MINUS, AMPERSAND]);
const MULTIPLICATIVE_OPS: SyntaxSet = SyntaxSet::new([STAR, SLASH]);

pub(crate) fn expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    or_expr(p)
}

fn or_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    binary_chain(p, &OR_OPS, LOGICAL_EXPR, and_expr)
}

fn and_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    binary_chain(p, &AND_OPS, LOGICAL_EXPR, is_expr)
}

fn is_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    assertion_chain(p, IS_KW, IS_EXPR, equality_expr)
}

fn equality_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    binary_chain(p, &EQUALITY_OPS, EQUALITY_EXPR, relational_expr)
}

fn relational_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    binary_chain(p, &RELATIONAL_OPS, RELATIONAL_EXPR, additive_expr)
}

fn additive_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    binary_chain(p, &ADDITIVE_OPS, ARITHMETIC_EXPR, multiplicative_expr)
}

fn multiplicative_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    binary_chain(p, &MULTIPLICATIVE_OPS, ARITHMETIC_EXPR, as_expr)
}

fn as_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    assertion_chain(p, AS_KW, AS_EXPR, unary_expr)
}

/// Left-nested `lhs op rhs` chains: the parsed operand is wrapped by a
/// preceding marker each time another operator of this level shows up.
fn binary_chain(
    p: &mut Parser<'_>,
    operators: &SyntaxSet,
    kind: SyntaxKind,
    operand: fn(&mut Parser<'_>) -> ParseStep<NodeId>,
) -> ParseStep<NodeId> {
    let mut lhs = operand(p)?;

    while operators.contains(p.peek_kind()) {
        let m = p.precede(lhs, kind, Arity::Fixed(3))?;
        let body: ParseStep<()> = (|| {
            p.leaf(CONSTANT, None)?;
            operand(p)?;
            Ok(())
        })();
        lhs = m.finish(p, body)?;
    }

    Ok(lhs)
}

/// `lhs as type` / `lhs is type` chains.
fn assertion_chain(
    p: &mut Parser<'_>,
    keyword: SyntaxKind,
    kind: SyntaxKind,
    operand: fn(&mut Parser<'_>) -> ParseStep<NodeId>,
) -> ParseStep<NodeId> {
    let mut lhs = operand(p)?;

    while p.at(keyword) {
        let m = p.precede(lhs, kind, Arity::Fixed(3))?;
        let body: ParseStep<()> = (|| {
            p.leaf(CONSTANT, None)?;
            types::nullable_primitive_type(p)?;
            Ok(())
        })();
        lhs = m.finish(p, body)?;
    }

    Ok(lhs)
}

fn unary_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    match p.peek_kind() {
        PLUS | MINUS | NOT_KW => {
            let m = p.open(UNARY_EXPR, Arity::Fixed(2))?;
            let body: ParseStep<()> = (|| {
                p.leaf(CONSTANT, None)?;
                unary_expr(p)?;
                Ok(())
            })();
            m.finish(p, body)
        }
        _ => invoke_expr(p),
    }
}

fn invoke_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let mut lhs = primary_expr(p)?;

    while p.at(LEFT_PAREN) {
        let m = p.precede(lhs, INVOKE_EXPR, Arity::Variable)?;
        let body = delimited(
            p,
            LEFT_PAREN,
            RIGHT_PAREN,
            COMMA,
            "unexpected ',' in arguments",
            &EXPR_FIRST,
            expr,
        );
        lhs = m.finish(p, body)?;
    }

    Ok(lhs)
}

fn primary_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    match p.peek_kind() {
        TRUE_KW | FALSE_KW => p.leaf(LITERAL_EXPR, Some(LiteralKind::Logical)),
        INT_NUMBER => p.leaf(LITERAL_EXPR, Some(LiteralKind::Numeric(NumericKind::Decimal))),
        HEX_NUMBER => p.leaf(LITERAL_EXPR, Some(LiteralKind::Numeric(NumericKind::Hex))),
        FLOAT_NUMBER => p.leaf(LITERAL_EXPR, Some(LiteralKind::Numeric(NumericKind::Float))),
        TEXT => p.leaf(LITERAL_EXPR, Some(LiteralKind::Text)),
        NULL_KW => p.leaf(LITERAL_EXPR, Some(LiteralKind::Null)),
        IDENT => p.leaf(IDENT_EXPR, None),
        // A '(' opens either a parenthesized expression or a function's
        // parameter list; both are tried and the longer parse wins.
        LEFT_PAREN => p.longest_of(&[function_expr, paren_expr]),
        LEFT_BRACE => list_expr(p),
        LEFT_BRACKET => record_expr(p),
        EACH_KW => each_expr(p),
        IF_KW => if_expr(p),
        LET_KW => let_expr(p),
        _ => Err(p.fail(EXPR_FIRST)),
    }
}

fn paren_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(PAREN_EXPR, Arity::Fixed(3))?;
    let body: ParseStep<()> = (|| {
        p.expect_const(LEFT_PAREN)?;
        expr(p)?;
        p.expect_const(RIGHT_PAREN)?;
        Ok(())
    })();
    m.finish(p, body)
}

fn function_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(FUNCTION_EXPR, Arity::Fixed(3))?;
    let body: ParseStep<()> = (|| {
        param_list(p)?;
        p.expect_const(FAT_ARROW)?;
        expr(p)?;
        Ok(())
    })();
    m.finish(p, body)
}

const PARAM_FIRST: SyntaxSet = SyntaxSet::new([OPTIONAL_KW, IDENT]);

fn param_list(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(PARAM_LIST, Arity::Variable)?;
    let body = delimited(
        p,
        LEFT_PAREN,
        RIGHT_PAREN,
        COMMA,
        "unexpected ',' in parameters",
        &PARAM_FIRST,
        parameter,
    );
    m.finish(p, body)
}

fn parameter(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(PARAMETER, Arity::Variable)?;
    let body: ParseStep<()> = (|| {
        p.eat_const(OPTIONAL_KW)?;

        if !p.at(IDENT) {
            return Err(p.fail(SyntaxSet::new([IDENT])));
        }
        p.leaf(IDENT_EXPR, None)?;

        if p.at(AS_KW) {
            types::type_annotation(p)?;
        }
        Ok(())
    })();
    m.finish(p, body)
}

fn list_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(LIST_EXPR, Arity::Variable)?;
    let body = delimited(
        p,
        LEFT_BRACE,
        RIGHT_BRACE,
        COMMA,
        "unexpected ',' in list",
        &EXPR_FIRST,
        expr,
    );
    m.finish(p, body)
}

const KEY_VALUE_FIRST: SyntaxSet = SyntaxSet::new([IDENT]);

fn record_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(RECORD_EXPR, Arity::Variable)?;
    let body = delimited(
        p,
        LEFT_BRACKET,
        RIGHT_BRACKET,
        COMMA,
        "unexpected ',' in record",
        &KEY_VALUE_FIRST,
        key_value,
    );
    m.finish(p, body)
}

/// One `name = expression` pair; shared by record fields and let bindings.
pub(crate) fn key_value(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(KEY_VALUE, Arity::Fixed(3))?;
    let body: ParseStep<()> = (|| {
        if !p.at(IDENT) {
            return Err(p.fail(KEY_VALUE_FIRST));
        }
        p.leaf(IDENT_EXPR, None)?;
        p.expect_const(EQ)?;
        expr(p)?;
        Ok(())
    })();
    m.finish(p, body)
}

fn each_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(EACH_EXPR, Arity::Fixed(2))?;
    let body: ParseStep<()> = (|| {
        p.expect_const(EACH_KW)?;
        expr(p)?;
        Ok(())
    })();
    m.finish(p, body)
}

fn if_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(IF_EXPR, Arity::Fixed(6))?;
    let body: ParseStep<()> = (|| {
        p.expect_const(IF_KW)?;
        expr(p)?;
        p.expect_const(THEN_KW)?;
        expr(p)?;
        p.expect_const(ELSE_KW)?;
        expr(p)?;
        Ok(())
    })();
    m.finish(p, body)
}

const LET_SYNC: SyntaxSet = SyntaxSet::new([COMMA, IN_KW]);

fn let_expr(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(LET_EXPR, Arity::Variable)?;
    let body: ParseStep<()> = (|| {
        p.expect_const(LET_KW)?;

        loop {
            let start = p.pos();
            let step = key_value(p);
            p.recover_item(start, step, &LET_SYNC)?;

            if !p.eat_const(COMMA)? {
                break;
            }
        }

        p.expect_const(IN_KW)?;
        expr(p)?;
        Ok(())
    })();
    m.finish(p, body)
}
