use rustc_hash::FxHashMap;

use crate::node::{Arity, ClosedNode, LiteralKind, NodeId, OpenNode, StoreError, TokenRange, XorNode};
use crate::syntax_kind::SyntaxKind;

/// Owner of the closed and open trees. The grammar engine is its only
/// writer; everything else reads through the `XorNode` accessors.
#[derive(Debug, Default)]
pub struct NodeStore {
    closed: FxHashMap<NodeId, ClosedNode>,
    open: FxHashMap<NodeId, OpenNode>,
    parents: FxHashMap<NodeId, NodeId>,
    next_id: u32,
    root: Option<NodeId>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh open node. The id counter never decreases, even
    /// across backtracking, which is what keeps ids stable for the parse.
    pub fn open_node(&mut self, kind: SyntaxKind, arity: Arity) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;

        self.open.insert(id, OpenNode { kind, children: Vec::new(), arity, accepting: true });
        id
    }

    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StoreError> {
        let node = self.open.get_mut(&parent).ok_or(StoreError::Structural)?;

        if !node.accepting || !node.arity.accepts(node.children.len()) {
            return Err(StoreError::Structural);
        }

        node.children.push(child);
        self.parents.insert(child, parent);
        Ok(())
    }

    /// Moves `child` under a freshly opened wrapper node. `child` must be
    /// the trailing child of its current parent (or parentless), so the
    /// wrapper can take over its position without disturbing sibling order.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<(), StoreError> {
        if let Some(&old_parent) = self.parents.get(&child) {
            let node = self.open.get_mut(&old_parent).ok_or(StoreError::Structural)?;

            if node.children.last() != Some(&child) {
                return Err(StoreError::Structural);
            }

            node.children.pop();
            self.parents.remove(&child);
        }

        self.attach_child(new_parent, child)
    }

    /// Promotes an open node whose production is satisfied into the closed
    /// tree. On error the node stays open, so the caller can still abandon.
    pub fn close_node(
        &mut self,
        id: NodeId,
        range: TokenRange,
        literal: Option<LiteralKind>,
    ) -> Result<(), StoreError> {
        let node = self.open.remove(&id).ok_or(StoreError::Structural)?;

        if !node.arity.satisfied_by(node.children.len()) {
            self.open.insert(id, node);
            return Err(StoreError::Arity);
        }

        if !node.children.iter().all(|child| self.closed.contains_key(child)) {
            self.open.insert(id, node);
            return Err(StoreError::Structural);
        }

        self.closed
            .insert(id, ClosedNode { kind: node.kind, range, children: node.children, literal });
        Ok(())
    }

    /// Removes an open node during backtracking, transitively abandoning
    /// attached open descendants and unlinking closed ones. Closed
    /// descendants keep their ids but are no longer reachable from any
    /// parent.
    pub fn abandon_node(&mut self, id: NodeId) {
        let Some(node) = self.open.remove(&id) else { return };

        if let Some(parent) = self.parents.remove(&id)
            && let Some(parent) = self.open.get_mut(&parent)
        {
            parent.children.retain(|&child| child != id);
        }

        for child in node.children {
            if self.open.contains_key(&child) {
                self.abandon_node(child);
            } else {
                self.parents.remove(&child);
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Marks an open node as no longer accepting children while leaving it
    /// addressable, used when cancellation freezes a partial parse.
    pub fn seal_node(&mut self, id: NodeId) {
        if let Some(node) = self.open.get_mut(&id) {
            node.accepting = false;
        }
    }

    /// Drops children attached to `parent` beyond `len`, abandoning open
    /// ones. Cursor-restore support for backtracking: a failed attempt may
    /// have attached closed children to a surviving parent.
    pub fn truncate_children(&mut self, parent: NodeId, len: usize) {
        let Some(node) = self.open.get_mut(&parent) else { return };

        let removed = node.children.drain(len..).collect::<Vec<_>>();
        for child in removed {
            self.parents.remove(&child);
            if self.open.contains_key(&child) {
                self.abandon_node(child);
            }
        }
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<XorNode> {
        self.root.and_then(|id| self.xor(id))
    }

    pub fn xor(&self, id: NodeId) -> Option<XorNode> {
        if self.closed.contains_key(&id) {
            Some(XorNode::Closed(id))
        } else if self.open.contains_key(&id) {
            Some(XorNode::Open(id))
        } else {
            None
        }
    }

    pub fn kind_of(&self, node: XorNode) -> SyntaxKind {
        match node {
            XorNode::Closed(id) => self.closed[&id].kind,
            XorNode::Open(id) => self.open[&id].kind,
        }
    }

    /// A closed node reports its committed range. An open node reports the
    /// partial range covered by its attached children, or `None` — the
    /// "don't know yet" answer — when nothing is attached.
    pub fn token_range_of(&self, node: XorNode) -> Option<TokenRange> {
        match node {
            XorNode::Closed(id) => Some(self.closed[&id].range),
            XorNode::Open(id) => self.open[&id]
                .children
                .iter()
                .filter_map(|&child| self.token_range_of(self.xor(child)?))
                .reduce(TokenRange::cover),
        }
    }

    pub fn children_of(&self, node: XorNode) -> &[NodeId] {
        match node {
            XorNode::Closed(id) => &self.closed[&id].children,
            XorNode::Open(id) => &self.open[&id].children,
        }
    }

    pub fn is_closed(&self, id: NodeId) -> bool {
        self.closed.contains_key(&id)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn closed_node(&self, id: NodeId) -> Option<&ClosedNode> {
        self.closed.get(&id)
    }

    pub fn open_node_data(&self, id: NodeId) -> Option<&OpenNode> {
        self.open.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    fn leaf(store: &mut NodeStore, kind: SyntaxKind, token: u32) -> NodeId {
        let id = store.open_node(kind, Arity::Fixed(0));
        store.close_node(id, TokenRange::new(token, token + 1), None).unwrap();
        id
    }

    #[test]
    fn close_promotes_and_keeps_children() {
        let mut store = NodeStore::new();

        let parent = store.open_node(ARITHMETIC_EXPR, Arity::Fixed(3));
        for token in 0..3 {
            let child = leaf(&mut store, if token == 1 { CONSTANT } else { LITERAL_EXPR }, token);
            store.attach_child(parent, child).unwrap();
        }

        store.close_node(parent, TokenRange::new(0, 3), None).unwrap();

        let node = store.closed_node(parent).unwrap();
        assert_eq!(node.kind, ARITHMETIC_EXPR);
        assert_eq!(node.children.len(), 3);
        assert_eq!(store.xor(parent), Some(XorNode::Closed(parent)));
    }

    #[test]
    fn ids_are_unique_and_stable_across_abandonment() {
        let mut store = NodeStore::new();

        let first = store.open_node(IF_EXPR, Arity::Fixed(6));
        store.abandon_node(first);
        let second = store.open_node(IF_EXPR, Arity::Fixed(6));

        assert_ne!(first, second);
        assert!(second.index() > first.index());
        assert_eq!(store.xor(first), None);
    }

    #[test]
    fn attach_to_closed_parent_is_structural() {
        let mut store = NodeStore::new();

        let parent = leaf(&mut store, LITERAL_EXPR, 0);
        let child = leaf(&mut store, LITERAL_EXPR, 1);

        assert_eq!(store.attach_child(parent, child), Err(StoreError::Structural));
    }

    #[test]
    fn attach_past_declared_arity_is_structural() {
        let mut store = NodeStore::new();

        let parent = store.open_node(UNARY_EXPR, Arity::Fixed(2));
        for token in 0..2 {
            let child = leaf(&mut store, CONSTANT, token);
            store.attach_child(parent, child).unwrap();
        }

        let extra = leaf(&mut store, CONSTANT, 2);
        assert_eq!(store.attach_child(parent, extra), Err(StoreError::Structural));
    }

    #[test]
    fn close_underfilled_is_arity_error_and_node_stays_open() {
        let mut store = NodeStore::new();

        let parent = store.open_node(IF_EXPR, Arity::Fixed(6));
        let child = leaf(&mut store, CONSTANT, 0);
        store.attach_child(parent, child).unwrap();

        assert_eq!(store.close_node(parent, TokenRange::new(0, 1), None), Err(StoreError::Arity));
        assert_eq!(store.xor(parent), Some(XorNode::Open(parent)));
    }

    #[test]
    fn abandon_unlinks_from_parent_and_cascades() {
        let mut store = NodeStore::new();

        let outer = store.open_node(LET_EXPR, Arity::Variable);
        let inner = store.open_node(KEY_VALUE, Arity::Fixed(3));
        store.attach_child(outer, inner).unwrap();

        let ident = leaf(&mut store, IDENT_EXPR, 1);
        store.attach_child(inner, ident).unwrap();

        store.abandon_node(inner);

        assert!(store.children_of(XorNode::Open(outer)).is_empty());
        assert_eq!(store.xor(inner), None);
        // Closed descendants linger under their own id, unlinked.
        assert_eq!(store.xor(ident), Some(XorNode::Closed(ident)));
        assert_eq!(store.parent_of(ident), None);
    }

    #[test]
    fn sealed_node_rejects_children() {
        let mut store = NodeStore::new();

        let open = store.open_node(LET_EXPR, Arity::Variable);
        store.seal_node(open);

        let child = leaf(&mut store, CONSTANT, 0);
        assert_eq!(store.attach_child(open, child), Err(StoreError::Structural));
        assert_eq!(store.xor(open), Some(XorNode::Open(open)));
    }

    #[test]
    fn open_range_is_derived_from_children() {
        let mut store = NodeStore::new();

        let open = store.open_node(LET_EXPR, Arity::Variable);
        assert_eq!(store.token_range_of(XorNode::Open(open)), None);

        let first = leaf(&mut store, CONSTANT, 0);
        let second = leaf(&mut store, IDENT_EXPR, 3);
        store.attach_child(open, first).unwrap();
        store.attach_child(open, second).unwrap();

        assert_eq!(store.token_range_of(XorNode::Open(open)), Some(TokenRange::new(0, 4)));
    }

    #[test]
    fn reparent_moves_trailing_child() {
        let mut store = NodeStore::new();

        let outer = store.open_node(PAREN_EXPR, Arity::Fixed(3));
        let lhs = leaf(&mut store, LITERAL_EXPR, 1);
        store.attach_child(outer, lhs).unwrap();

        let wrapper = store.open_node(ARITHMETIC_EXPR, Arity::Fixed(3));
        store.reparent(lhs, wrapper).unwrap();

        assert!(store.children_of(XorNode::Open(outer)).is_empty());
        assert_eq!(store.children_of(XorNode::Open(wrapper)), &[lhs]);
        assert_eq!(store.parent_of(lhs), Some(wrapper));
    }
}
