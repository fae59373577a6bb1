//! Removal and the rejig pass restoring shape minimality afterwards.

use alloy_trie::Nibbles;

use super::nodes::{BranchNode, ExtensionNode, LeafNode, Node};

impl Node {
    /// Removes `path` from the subtree, consuming the node. `None` means the
    /// subtree vanished entirely.
    pub(crate) fn remove(self: Box<Self>, path: &Nibbles) -> Option<Box<Node>> {
        match *self {
            Node::Leaf(leaf) => {
                if leaf.path == *path {
                    None
                } else {
                    Some(Box::new(Node::Leaf(leaf)))
                }
            }
            Node::Extension(ext) => {
                if ext.path.common_prefix_length(path) != ext.path.len() {
                    return Some(Box::new(Node::Extension(ext)));
                }
                let remainder = path.slice(ext.path.len()..);
                match ext.child.remove(&remainder) {
                    Some(child) => Some(join_extension(ext.path, child)),
                    None => None,
                }
            }
            Node::Branch(mut branch) => {
                if path.is_empty() {
                    if branch.value.take().is_none() {
                        return Some(Box::new(Node::Branch(branch)));
                    }
                } else {
                    let idx = path.get_unchecked(0) as usize;
                    match branch.children.take(idx) {
                        None => return Some(Box::new(Node::Branch(branch))),
                        Some(child) => {
                            if let Some(child) = child.remove(&path.slice(1..)) {
                                branch.children.set(idx, child);
                            }
                        }
                    }
                }
                rejig(branch)
            }
        }
    }
}

/// Re-attaches a rebuilt child under an extension prefix, concatenating
/// partial keys when the child is itself a leaf or extension so that no
/// extension ever precedes an absorbable node.
fn join_extension(prefix: Nibbles, child: Box<Node>) -> Box<Node> {
    match *child {
        Node::Leaf(leaf) => Box::new(Node::Leaf(LeafNode {
            path: prefix.join(&leaf.path),
            value: leaf.value,
        })),
        Node::Extension(ext) => Box::new(Node::Extension(ExtensionNode {
            path: prefix.join(&ext.path),
            child: ext.child,
        })),
        branch @ Node::Branch(_) => Box::new(Node::Extension(ExtensionNode {
            path: prefix,
            child: Box::new(branch),
        })),
    }
}

/// Collapses a branch that a removal left below the minimality threshold:
/// no children at all turns into a leaf holding the branch value, a single
/// child with no value merges the slot index into the child's partial key.
fn rejig(mut branch: BranchNode) -> Option<Box<Node>> {
    if branch.children.is_empty() {
        return branch.value.map(|value| {
            Box::new(Node::Leaf(LeafNode {
                path: Nibbles::default(),
                value,
            }))
        });
    }
    if branch.value.is_none() {
        if let Some((idx, child)) = branch.children.take_sole_child() {
            let mut prefix = Nibbles::default();
            prefix.push(idx as u8);
            return Some(join_extension(prefix, child));
        }
    }
    Some(Box::new(Node::Branch(branch)))
}
