use quill_syntax::SyntaxKind::*;
use quill_syntax::{Arity, NodeId, PrimitiveTypeKind, SyntaxSet};

use crate::parser::{ParseStep, Parser};

/// `as nullable-primitive-type`, attached to a parameter.
pub(crate) fn type_annotation(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    debug_assert!(p.at(AS_KW));

    let m = p.open(TYPE_ANNOTATION, Arity::Fixed(2))?;
    let body: ParseStep<()> = (|| {
        p.expect_const(AS_KW)?;
        nullable_primitive_type(p)?;
        Ok(())
    })();
    m.finish(p, body)
}

pub(crate) fn nullable_primitive_type(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    if !p.at(NULLABLE_KW) {
        return primitive_type(p);
    }

    let m = p.open(NULLABLE_TYPE, Arity::Fixed(2))?;
    let body: ParseStep<()> = (|| {
        p.expect_const(NULLABLE_KW)?;
        primitive_type(p)?;
        Ok(())
    })();
    m.finish(p, body)
}

/// Primitive type names are contextual identifiers, plus `null`.
pub(crate) fn primitive_type(p: &mut Parser<'_>) -> ParseStep<NodeId> {
    match p.peek_kind() {
        IDENT if PrimitiveTypeKind::from_text(p.token_text()).is_some() => {
            p.leaf(PRIMITIVE_TYPE, None)
        }
        NULL_KW => p.leaf(PRIMITIVE_TYPE, None),
        _ => Err(p.fail(SyntaxSet::new([IDENT, NULL_KW]))),
    }
}
