use quill_syntax::SyntaxKind::{self, *};
use quill_syntax::{NodeId, SyntaxSet};

use crate::parser::{ParseStep, Parser};
use crate::settings::EntryPoint;

pub(crate) mod exprs;
pub(crate) mod items;
mod types;

pub(crate) fn entry(p: &mut Parser<'_>, entry_point: EntryPoint) -> ParseStep<NodeId> {
    p.check_cancelled()?;

    match entry_point {
        EntryPoint::Document => items::document(p),
        EntryPoint::Expression => {
            let root = exprs::expr(p)?;
            p.expect_eof()?;
            Ok(root)
        }
        EntryPoint::Section => {
            let root = items::section(p)?;
            p.expect_eof()?;
            Ok(root)
        }
    }
}

/// Bracketed, separator-delimited list body with local recovery: a failed
/// item is wrapped in an `ERROR` node up to the next synchronization token,
/// a doubled separator is consumed as its own error, and a missing
/// separator before a plausible item start is diagnosed without breaking
/// out.
pub(crate) fn delimited(
    p: &mut Parser<'_>,
    bra: SyntaxKind,
    ket: SyntaxKind,
    delim: SyntaxKind,
    unexpected_delim_message: &'static str,
    first_set: &SyntaxSet,
    mut item: impl FnMut(&mut Parser<'_>) -> ParseStep<NodeId>,
) -> ParseStep<()> {
    p.expect_const(bra)?;
    let sync = SyntaxSet::new([delim, ket]);

    while !p.at(ket) && !p.at(EOF) {
        if p.at(delim) {
            p.unexpected(unexpected_delim_message);
            p.leaf(ERROR, None)?;
            continue;
        }

        let start = p.pos();
        let step = item(p);
        p.recover_item(start, step, &sync)?;

        if !p.eat_const(delim)? {
            if first_set.contains(p.peek_kind()) {
                p.missing(delim);
            } else {
                break;
            }
        }
    }

    p.expect_const(ket)?;
    Ok(())
}
