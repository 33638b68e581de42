//! Tree-manipulation helpers over scraper's ego-tree.
//!
//! ego-tree node ids are per-tree, so subtrees parsed from fragments are
//! deep-copied into the target document rather than moved.

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};
use scraper::node::Node;
use scraper::Html;

/// Deep-copy `src` (from another tree) into `tree` as a detached subtree and
/// return the new root's id.
pub(crate) fn adopt_subtree(tree: &mut Tree<Node>, src: NodeRef<'_, Node>) -> NodeId {
    let mut orphan = tree.orphan(src.value().clone());
    copy_children(&mut orphan, src);
    orphan.id()
}

/// Parse `fragment` and copy its first element into `tree` as a detached
/// subtree. Returns `None` when the fragment parses to no element at all.
pub(crate) fn adopt_fragment(tree: &mut Tree<Node>, fragment: &str) -> Option<NodeId> {
    let parsed = Html::parse_fragment(fragment);
    let root = parsed.root_element();
    let src = root.children().find(|child| child.value().is_element())?;
    Some(adopt_subtree(tree, src))
}

fn copy_children(dst: &mut NodeMut<'_, Node>, src: NodeRef<'_, Node>) {
    for child in src.children() {
        let mut new_child = dst.append(child.value().clone());
        copy_children(&mut new_child, child);
    }
}
