use std::collections::VecDeque;

use crate::node::XorNode;
use crate::store::NodeStore;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    BreadthFirst,
    DepthFirst,
}

/// Applies `visit` to every node reachable from `root`, folding into
/// `state`. Depth-first visits a node before its children in pre-order;
/// breadth-first goes level by level. Open nodes expose whatever children
/// are attached at call time. When `early_exit` reports true after a visit,
/// traversal stops and the state is returned as accumulated so far.
pub fn traverse<S>(
    store: &NodeStore,
    root: XorNode,
    strategy: Strategy,
    state: &mut S,
    visit: &mut dyn FnMut(&mut S, XorNode),
    early_exit: Option<&dyn Fn(&S) -> bool>,
) {
    let mut pending = VecDeque::from([root]);

    while let Some(node) = match strategy {
        Strategy::BreadthFirst => pending.pop_front(),
        Strategy::DepthFirst => pending.pop_back(),
    } {
        visit(state, node);

        if early_exit.is_some_and(|exit| exit(state)) {
            return;
        }

        let children = store.children_of(node);
        match strategy {
            Strategy::BreadthFirst => {
                pending.extend(children.iter().filter_map(|&child| store.xor(child)));
            }
            // Push reversed so the leftmost child pops first.
            Strategy::DepthFirst => {
                pending.extend(children.iter().rev().filter_map(|&child| store.xor(child)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::{self, *};
    use crate::node::{Arity, NodeId, TokenRange};

    fn leaf(store: &mut NodeStore, kind: SyntaxKind, token: u32) -> NodeId {
        let id = store.open_node(kind, Arity::Fixed(0));
        store.close_node(id, TokenRange::new(token, token + 1), None).unwrap();
        id
    }

    /// if_expr(cond, then(a, b), else_) with then as an inner node.
    fn fixture() -> (NodeStore, XorNode) {
        let mut store = NodeStore::new();

        let root = store.open_node(IF_EXPR, Arity::Fixed(3));
        let cond = leaf(&mut store, IDENT_EXPR, 0);
        store.attach_child(root, cond).unwrap();

        let inner = store.open_node(ARITHMETIC_EXPR, Arity::Fixed(2));
        let a = leaf(&mut store, LITERAL_EXPR, 1);
        let b = leaf(&mut store, LITERAL_EXPR, 2);
        store.attach_child(inner, a).unwrap();
        store.attach_child(inner, b).unwrap();
        store.close_node(inner, TokenRange::new(1, 3), None).unwrap();
        store.attach_child(root, inner).unwrap();

        let else_ = leaf(&mut store, IDENT_EXPR, 3);
        store.attach_child(root, else_).unwrap();
        store.close_node(root, TokenRange::new(0, 4), None).unwrap();

        (store, XorNode::Closed(root))
    }

    fn kinds(store: &NodeStore, root: XorNode, strategy: Strategy) -> Vec<SyntaxKind> {
        let mut state = Vec::new();
        traverse(
            store,
            root,
            strategy,
            &mut state,
            &mut |state, node| state.push(store.kind_of(node)),
            None,
        );
        state
    }

    #[test]
    fn depth_first_is_pre_order() {
        let (store, root) = fixture();

        assert_eq!(
            kinds(&store, root, Strategy::DepthFirst),
            vec![IF_EXPR, IDENT_EXPR, ARITHMETIC_EXPR, LITERAL_EXPR, LITERAL_EXPR, IDENT_EXPR],
        );
    }

    #[test]
    fn breadth_first_is_level_order() {
        let (store, root) = fixture();

        assert_eq!(
            kinds(&store, root, Strategy::BreadthFirst),
            vec![IF_EXPR, IDENT_EXPR, ARITHMETIC_EXPR, IDENT_EXPR, LITERAL_EXPR, LITERAL_EXPR],
        );
    }

    #[test]
    fn early_exit_stops_immediately() {
        let (store, root) = fixture();

        let mut state = Vec::new();
        traverse(
            &store,
            root,
            Strategy::DepthFirst,
            &mut state,
            &mut |state, node| state.push(store.kind_of(node)),
            Some(&|state: &Vec<SyntaxKind>| state.len() == 2),
        );

        assert_eq!(state, vec![IF_EXPR, IDENT_EXPR]);
    }

    #[test]
    fn open_nodes_expose_attached_children_only() {
        let mut store = NodeStore::new();

        let open = store.open_node(LET_EXPR, Arity::Variable);
        let first = leaf(&mut store, CONSTANT, 0);
        store.attach_child(open, first).unwrap();

        assert_eq!(
            kinds(&store, XorNode::Open(open), Strategy::DepthFirst),
            vec![LET_EXPR, CONSTANT],
        );
    }
}
