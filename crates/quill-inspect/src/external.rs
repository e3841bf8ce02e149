use quill_syntax::PrimitiveTypeKind;

/// Host-facing type vocabulary for external resolution answers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveTypeKind),
    Function,
}

/// A resolution request for a name with no local binding. `arg_count` is
/// populated when the name sits in invocation-callee position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeRequest<'a> {
    pub name: &'a str,
    pub arg_count: Option<usize>,
}

/// Host-supplied resolver, passed as configuration rather than inherited:
/// standard-library knowledge stays out of the core.
pub type ExternalTypeResolver = Box<dyn Fn(&TypeRequest<'_>) -> Option<TypeKind>>;
