use indexmap::IndexMap;
use quill_errors::Cancelled;
use quill_span::{IntoName as _, Name};
use quill_syntax::SyntaxKind::*;
use quill_syntax::{NodeId, NodeStore, PrimitiveTypeKind, XorNode};
use quill_tokenizer::TokenSnapshot;
use salsa::Database;

use crate::settings::InspectionSettings;

/// Name to its single most-specific visible binding; later insertions win,
/// which is exactly the shadowing rule for a root-to-target fold.
pub type ScopeMap<'db> = IndexMap<Name<'db>, ScopeItem>;

/// One visible binding. Every variant carries a back-reference into the
/// tree and a flag marking bindings visible to their own defining
/// expression (let/section recursion).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScopeItem {
    /// The implicit iteration row `_` of an each-expression.
    Each { each_expr: XorNode, is_recursive: bool },
    /// A let binding. The value is absent while the binding is still open
    /// mid-edit.
    KeyValue { key: NodeId, value: Option<XorNode>, is_recursive: bool },
    Parameter {
        name: NodeId,
        is_optional: bool,
        is_nullable: bool,
        ty: Option<PrimitiveTypeKind>,
        is_recursive: bool,
    },
    SectionMember { key: NodeId, value: Option<XorNode>, is_recursive: bool },
    /// A name reference with no binding anywhere; tooling still gets the
    /// referencing node to report a location.
    Undefined { reference: XorNode, is_recursive: bool },
}

impl ScopeItem {
    pub fn node(&self) -> NodeId {
        match *self {
            Self::Each { each_expr, .. } => each_expr.id(),
            Self::KeyValue { key, .. } => key,
            Self::Parameter { name, .. } => name,
            Self::SectionMember { key, .. } => key,
            Self::Undefined { reference, .. } => reference.id(),
        }
    }

    pub fn is_recursive(&self) -> bool {
        match *self {
            Self::Each { is_recursive, .. }
            | Self::KeyValue { is_recursive, .. }
            | Self::Parameter { is_recursive, .. }
            | Self::SectionMember { is_recursive, .. }
            | Self::Undefined { is_recursive, .. } => is_recursive,
        }
    }
}

pub(crate) struct ScopeBuilder<'db, 'a> {
    db: &'db dyn Database,
    store: &'a NodeStore,
    snapshot: &'a TokenSnapshot,
    scope: ScopeMap<'db>,
}

impl<'db, 'a> ScopeBuilder<'db, 'a> {
    pub(crate) fn new(
        db: &'db dyn Database,
        store: &'a NodeStore,
        snapshot: &'a TokenSnapshot,
    ) -> Self {
        Self { db, store, snapshot, scope: ScopeMap::default() }
    }

    /// Root-to-target fold over the ancestor chain. Deeper bindings
    /// overwrite shallower same-named ones. Record expressions contribute
    /// nothing: their members permit neither mutual nor forward reference.
    pub(crate) fn build(
        mut self,
        chain: &[XorNode],
        settings: &InspectionSettings,
    ) -> Result<ScopeMap<'db>, Cancelled> {
        for (index, &node) in chain.iter().enumerate() {
            if let Some(token) = &settings.cancellation {
                token.check()?;
            }

            let next = chain.get(index + 1).copied();
            match self.store.kind_of(node) {
                EACH_EXPR => self.each(node, next),
                LET_EXPR => self.bindings(node, next, false),
                SECTION => self.bindings(node, next, true),
                FUNCTION_EXPR => self.parameters(node, next),
                _ => {}
            }
        }

        Ok(self.scope)
    }

    fn each(&mut self, node: XorNode, next: Option<XorNode>) {
        // The row is visible inside the body, not on the `each` keyword.
        if next.is_some_and(|child| self.store.kind_of(child) != CONSTANT) {
            let name = "_".into_name(self.db);
            self.scope.insert(name, ScopeItem::Each { each_expr: node, is_recursive: false });
        }
    }

    /// Let bindings and section members alike: every member is visible
    /// everywhere in the construct (mutual and forward reference), and the
    /// member whose subtree holds the target is marked recursive.
    fn bindings(&mut self, node: XorNode, next: Option<XorNode>, section: bool) {
        let member_kind = if section { SECTION_MEMBER } else { KEY_VALUE };

        for &child in self.store.children_of(node) {
            let Some(member) = self.store.xor(child) else { continue };
            if self.store.kind_of(member) != member_kind {
                continue;
            }

            let Some((key, value)) = self.key_value_of(member) else { continue };
            let Some(name) = self.name_of(key) else { continue };

            let is_recursive = next == Some(member);
            let item = if section {
                ScopeItem::SectionMember { key, value, is_recursive }
            } else {
                ScopeItem::KeyValue { key, value, is_recursive }
            };
            self.scope.insert(name, item);
        }
    }

    fn parameters(&mut self, node: XorNode, next: Option<XorNode>) {
        let children = self.store.children_of(node);

        // Parameters come into scope in the body only.
        let body = children.get(2).copied().and_then(|id| self.store.xor(id));
        if body.is_none() || next != body {
            return;
        }

        let Some(param_list) = children.first().and_then(|&id| self.store.xor(id)) else {
            return;
        };

        for &child in self.store.children_of(param_list) {
            let Some(param) = self.store.xor(child) else { continue };
            if self.store.kind_of(param) != PARAMETER {
                continue;
            }

            self.parameter(param);
        }
    }

    fn parameter(&mut self, param: XorNode) {
        let children = self.store.children_of(param);

        let mut is_optional = false;
        let mut name = None;
        let mut annotation = None;

        for &child in children {
            let Some(child) = self.store.xor(child) else { continue };
            match self.store.kind_of(child) {
                CONSTANT if name.is_none() => is_optional = true,
                IDENT_EXPR if name.is_none() => name = Some(child.id()),
                TYPE_ANNOTATION => annotation = Some(child),
                _ => {}
            }
        }

        let Some(name) = name else { return };
        let Some(key) = self.name_of(name) else { return };

        let (is_nullable, ty) = annotation.map_or((false, None), |node| self.annotation(node));

        self.scope.insert(
            key,
            ScopeItem::Parameter { name, is_optional, is_nullable, ty, is_recursive: false },
        );
    }

    /// `as type` or `as nullable type`.
    fn annotation(&self, node: XorNode) -> (bool, Option<PrimitiveTypeKind>) {
        let Some(ty) = self.store.children_of(node).get(1).and_then(|&id| self.store.xor(id))
        else {
            return (false, None);
        };

        match self.store.kind_of(ty) {
            NULLABLE_TYPE => {
                let primitive = self
                    .store
                    .children_of(ty)
                    .get(1)
                    .and_then(|&id| self.store.xor(id))
                    .and_then(|node| self.primitive_of(node));
                (true, primitive)
            }
            PRIMITIVE_TYPE => (false, self.primitive_of(ty)),
            _ => (false, None),
        }
    }

    fn primitive_of(&self, node: XorNode) -> Option<PrimitiveTypeKind> {
        let range = self.store.token_range_of(node)?;
        PrimitiveTypeKind::from_text(self.snapshot.token_text(range.start))
    }

    /// Key and optional value of a key-value pair or section member; the
    /// key is the first identifier child, the value sits two slots later
    /// (past the equals constant) and may not be attached yet.
    fn key_value_of(&self, member: XorNode) -> Option<(NodeId, Option<XorNode>)> {
        let children = self.store.children_of(member);

        let key_index = children
            .iter()
            .position(|&child| self.store.xor(child).is_some_and(|c| self.store.kind_of(c) == IDENT_EXPR))?;
        let key = children[key_index];

        let value = children.get(key_index + 2).and_then(|&id| self.store.xor(id));
        Some((key, value))
    }

    fn name_of(&self, node: NodeId) -> Option<Name<'db>> {
        let range = self.store.closed_node(node)?.range;
        Some(self.snapshot.token_text(range.start).into_name(self.db))
    }
}
