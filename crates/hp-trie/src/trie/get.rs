//! Lookup by nibble path for each node shape.

use alloy_primitives::Bytes;
use alloy_trie::Nibbles;

use super::nodes::{BranchNode, ExtensionNode, LeafNode, Node};

impl LeafNode {
    fn get(&self, path: &Nibbles) -> Option<&Bytes> {
        (self.path == *path).then_some(&self.value)
    }
}

impl ExtensionNode {
    fn get(&self, path: &Nibbles) -> Option<&Bytes> {
        if self.path.common_prefix_length(path) == self.path.len() {
            self.child.get(&path.slice(self.path.len()..))
        } else {
            None
        }
    }
}

impl BranchNode {
    fn get(&self, path: &Nibbles) -> Option<&Bytes> {
        if path.is_empty() {
            self.value.as_ref()
        } else {
            self.children
                .get(path.get_unchecked(0) as usize)
                .and_then(|child| child.get(&path.slice(1..)))
        }
    }
}

impl Node {
    pub(crate) fn get(&self, path: &Nibbles) -> Option<&Bytes> {
        match self {
            Node::Leaf(leaf) => leaf.get(path),
            Node::Extension(ext) => ext.get(path),
            Node::Branch(branch) => branch.get(path),
        }
    }
}
