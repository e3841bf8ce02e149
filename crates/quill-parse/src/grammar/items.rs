use quill_syntax::SyntaxKind::*;
use quill_syntax::{Arity, NodeId, SyntaxSet};

use super::exprs;
use crate::parser::{ParseStep, Parser};

/// A document is either a single expression or a section; both candidates
/// must consume the whole token stream, and the longer parse wins.
pub(crate) fn document(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    p.longest_of(&[expression_document, section_document])
}

fn expression_document(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let root = exprs::expr(p)?;
    p.expect_eof()?;
    Ok(root)
}

fn section_document(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let root = section(p)?;
    p.expect_eof()?;
    Ok(root)
}

const MEMBER_SYNC: SyntaxSet = SyntaxSet::new([SEMICOLON]);

pub(crate) fn section(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(SECTION, Arity::Variable)?;
    let body: ParseStep<()> = (|| {
        p.expect_const(SECTION_KW)?;
        if p.at(IDENT) {
            p.leaf(IDENT_EXPR, None)?;
        }
        p.expect_const(SEMICOLON)?;

        while !p.at(EOF) {
            let start = p.pos();
            let step = section_member(p);
            let recovered = step.is_err();
            p.recover_item(start, step, &MEMBER_SYNC)?;

            // Swallow the synchronization terminator too, so the next
            // member starts fresh.
            if recovered && p.at(SEMICOLON) {
                p.leaf(ERROR, None)?;
            }
        }
        Ok(())
    })();
    m.finish(p, body)
}

/// `shared? name = expression ;`
fn section_member(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    let m = p.open(SECTION_MEMBER, Arity::Variable)?;
    let body: ParseStep<()> = (|| {
        p.eat_const(SHARED_KW)?;

        if !p.at(IDENT) {
            return Err(p.fail(SyntaxSet::new([SHARED_KW, IDENT])));
        }
        p.leaf(IDENT_EXPR, None)?;
        p.expect_const(EQ)?;
        exprs::expr(p)?;
        p.expect_const(SEMICOLON)?;
        Ok(())
    })();
    m.finish(p, body)
}
