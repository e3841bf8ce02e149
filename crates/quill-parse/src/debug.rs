use std::fmt::Write as _;

use quill_syntax::{NodeStore, XorNode};
use quill_tokenizer::TokenSnapshot;

/// Indented dump of a (possibly partial) tree. Childless closed nodes show
/// their source text; open nodes are marked as such.
pub fn tree_to_string(store: &NodeStore, snapshot: &TokenSnapshot, root: XorNode) -> String {
    let mut out = String::new();
    push_node(store, snapshot, root, 0, &mut out);
    out
}

fn push_node(
    store: &NodeStore,
    snapshot: &TokenSnapshot,
    node: XorNode,
    depth: usize,
    out: &mut String,
) {
    for _ in 0..depth {
        out.push_str("  ");
    }

    let kind = store.kind_of(node);
    match store.token_range_of(node) {
        Some(range) => _ = write!(out, "{kind:?}@{}..{}", range.start, range.end),
        None => _ = write!(out, "{kind:?}@?"),
    }

    if !node.is_closed() {
        out.push_str(" (open)");
    }

    let children = store.children_of(node);
    if node.is_closed()
        && children.is_empty()
        && let Some(range) = store.token_range_of(node)
        && !range.is_empty()
    {
        let text = &snapshot.text()[snapshot.text_range(range)];
        _ = write!(out, " {text:?}");
    }

    out.push('\n');

    for &child in children {
        if let Some(child) = store.xor(child) {
            push_node(store, snapshot, child, depth + 1, out);
        }
    }
}
