//! Insertion for each node shape. Nodes are consumed and replaced: every
//! method returns the node that must take the old one's place, so parents
//! never reach into a child to fix it up.

use alloy_primitives::Bytes;
use alloy_trie::Nibbles;

use super::nodes::{BranchNode, ExtensionNode, LeafNode, Node};

impl Node {
    pub(crate) fn leaf(path: Nibbles, value: Bytes) -> Box<Node> {
        Box::new(Node::Leaf(LeafNode { path, value }))
    }

    /// Inserts into an optional slot, creating a fresh leaf when empty.
    pub(crate) fn insert_into(
        node: Option<Box<Node>>,
        path: Nibbles,
        value: Bytes,
    ) -> Box<Node> {
        match node {
            Some(node) => node.insert(path, value),
            None => Node::leaf(path, value),
        }
    }

    pub(crate) fn insert(self: Box<Self>, path: Nibbles, value: Bytes) -> Box<Node> {
        match *self {
            Node::Leaf(leaf) => {
                if leaf.path == path {
                    Node::leaf(path, value)
                } else {
                    new_branch(leaf.path, leaf.value, path, value)
                }
            }
            Node::Extension(ext) => ext.insert(path, value),
            Node::Branch(mut branch) => {
                if path.is_empty() {
                    branch.value = Some(value);
                } else {
                    let idx = path.get_unchecked(0) as usize;
                    let child =
                        Node::insert_into(branch.children.take(idx), path.slice(1..), value);
                    branch.children.set(idx, child);
                }
                Box::new(Node::Branch(branch))
            }
        }
    }
}

impl ExtensionNode {
    fn insert(self, path: Nibbles, value: Bytes) -> Box<Node> {
        let shared = self.path.common_prefix_length(&path);
        if shared == self.path.len() {
            // the whole partial key matches; the rest is the child's problem
            let child = self.child.insert(path.slice(shared..), value);
            return Box::new(Node::Extension(ExtensionNode {
                path: self.path,
                child,
            }));
        }

        // diverges inside the partial key: branch at the split point, with
        // the trimmed remainder of this extension on one side
        let prefix = self.path.slice(..shared);
        let idx = self.path.get_unchecked(shared) as usize;
        let rest = self.path.slice(shared + 1..);
        let trimmed = if rest.is_empty() {
            self.child
        } else {
            Box::new(Node::Extension(ExtensionNode {
                path: rest,
                child: self.child,
            }))
        };

        let mut branch = BranchNode::default();
        branch.children.set(idx, trimmed);
        let branch = Box::new(Node::Branch(branch)).insert(path.slice(shared..), value);

        if shared == 0 {
            branch
        } else {
            Box::new(Node::Extension(ExtensionNode {
                path: prefix,
                child: branch,
            }))
        }
    }
}

/// Builds the minimal subtree holding two distinct (path, value) pairs: a
/// branch at their divergence point, wrapped in an extension when they share
/// a prefix.
fn new_branch(k1: Nibbles, v1: Bytes, k2: Nibbles, v2: Bytes) -> Box<Node> {
    let shared = k1.common_prefix_length(&k2);
    let prefix = k1.slice(..shared);

    let mut branch = BranchNode::default();
    for (path, value) in [(k1, v1), (k2, v2)] {
        if path.len() == shared {
            branch.value = Some(value);
        } else {
            let idx = path.get_unchecked(shared) as usize;
            branch
                .children
                .set(idx, Node::leaf(path.slice(shared + 1..), value));
        }
    }

    let branch = Box::new(Node::Branch(branch));
    if shared == 0 {
        branch
    } else {
        Box::new(Node::Extension(ExtensionNode {
            path: prefix,
            child: branch,
        }))
    }
}
