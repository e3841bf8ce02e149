use quill_syntax::{NodeStore, XorNode};

/// Ancestor chain from the root down to the deepest node whose token range
/// contains `token`. Closed nodes answer by strict containment; an open
/// node also claims trailing positions past its attached children, which is
/// where the cursor sits while the user is still typing the construct.
pub(crate) fn ancestry(store: &NodeStore, token: u32) -> Vec<XorNode> {
    let mut chain = Vec::new();

    let Some(root) = store.root() else { return chain };
    if !claims(store, root, token) {
        return chain;
    }

    let mut current = root;
    loop {
        chain.push(current);

        // Only the trailing child can be open, so a left-to-right scan
        // cannot be stolen from a closed sibling by an open one.
        let next = store
            .children_of(current)
            .iter()
            .filter_map(|&child| store.xor(child))
            .find(|&child| claims(store, child, token));

        match next {
            Some(child) => current = child,
            None => break,
        }
    }

    chain
}

fn claims(store: &NodeStore, node: XorNode, token: u32) -> bool {
    match store.token_range_of(node) {
        Some(range) => range.contains(token) || (!node.is_closed() && token >= range.start),
        // An empty open node is exactly where parsing stopped.
        None => !node.is_closed(),
    }
}
