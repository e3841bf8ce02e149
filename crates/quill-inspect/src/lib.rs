//! Scope and inspection engine: position-aware semantic queries against a
//! parse result, for completion, hover, and signature help.
//!
//! Every query recomputes its scope from the ancestor chain; nothing is
//! persisted between queries and the underlying tree is never touched, so
//! inspection is idempotent and safe to retry or repeat.

mod external;
mod position;
mod scope;
mod settings;

pub use external::{ExternalTypeResolver, TypeKind, TypeRequest};
use quill_errors::Cancelled;
use quill_parse::ParseResult;
use quill_span::IntoName as _;
use quill_syntax::SyntaxKind::*;
use quill_syntax::{NodeStore, XorNode};
use quill_tokenizer::TokenSnapshot;
pub use scope::{ScopeItem, ScopeMap};
use scope::ScopeBuilder;
pub use settings::InspectionSettings;
use text_size::TextSize;

pub struct Inspection<'db> {
    /// Root-first chain of nodes enclosing the queried position.
    pub ancestry: Vec<XorNode>,
    pub scope: ScopeMap<'db>,
    /// The externally resolved type of the identifier under the cursor,
    /// when the resolver had an answer for it.
    pub resolved_type: Option<TypeKind>,
}

/// Computes what is visible at `offset`. An out-of-range position yields an
/// empty scope rather than an error; only cancellation aborts.
pub fn inspect<'db>(
    db: &'db dyn salsa::Database,
    result: &ParseResult,
    snapshot: &TokenSnapshot,
    offset: TextSize,
    settings: &InspectionSettings,
) -> Result<Inspection<'db>, Cancelled> {
    let Some(token) = snapshot.token_at_offset(offset) else {
        return Ok(Inspection { ancestry: Vec::new(), scope: ScopeMap::default(), resolved_type: None });
    };

    let ancestry = position::ancestry(&result.store, token);
    let mut scope = ScopeBuilder::new(db, &result.store, snapshot).build(&ancestry, settings)?;

    let mut resolved_type = None;
    if let Some(name) = referenced_name(&result.store, snapshot, &ancestry) {
        let key = name.into_name(db);

        if !scope.contains_key(&key) {
            let request =
                TypeRequest { name, arg_count: invocation_arg_count(&result.store, &ancestry) };

            match (settings.resolver)(&request) {
                Some(ty) => resolved_type = Some(ty),
                // Unresolved names are expected, not an error: host and
                // standard-library references land here.
                None => {
                    if let Some(&reference) = ancestry.last() {
                        scope.insert(key, ScopeItem::Undefined { reference, is_recursive: false });
                    }
                }
            }
        }
    }

    Ok(Inspection { ancestry, scope, resolved_type })
}

/// The identifier the position refers to, unless it is a binder (a key,
/// parameter, or section name) rather than a reference.
fn referenced_name<'a>(
    store: &NodeStore,
    snapshot: &'a TokenSnapshot,
    ancestry: &[XorNode],
) -> Option<&'a str> {
    let &deepest = ancestry.last()?;
    if store.kind_of(deepest) != IDENT_EXPR || !deepest.is_closed() {
        return None;
    }

    if let Some(&parent) = ancestry.len().checked_sub(2).and_then(|i| ancestry.get(i)) {
        match store.kind_of(parent) {
            KEY_VALUE | SECTION_MEMBER | PARAMETER => {
                let key = store
                    .children_of(parent)
                    .iter()
                    .copied()
                    .find(|&child| store.xor(child).is_some_and(|c| store.kind_of(c) == IDENT_EXPR));
                if key == Some(deepest.id()) {
                    return None;
                }
            }
            SECTION => return None,
            _ => {}
        }
    }

    let range = store.token_range_of(deepest)?;
    Some(snapshot.token_text(range.start))
}

/// Argument count hint for a name in invocation-callee position.
fn invocation_arg_count(store: &NodeStore, ancestry: &[XorNode]) -> Option<usize> {
    let deepest = ancestry.last()?;
    let parent = ancestry.get(ancestry.len().checked_sub(2)?)?;

    if store.kind_of(*parent) != INVOKE_EXPR {
        return None;
    }

    let children = store.children_of(*parent);
    if children.first() != Some(&deepest.id()) {
        return None;
    }

    let count = children[1..]
        .iter()
        .filter(|&&child| {
            store
                .xor(child)
                .is_some_and(|c| !matches!(store.kind_of(c), CONSTANT | ERROR))
        })
        .count();
    Some(count)
}
