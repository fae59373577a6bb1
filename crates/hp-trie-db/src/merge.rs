//! Insertion over serialized nodes.
//!
//! Each level re-serializes the node it visited with the affected child
//! rewritten; replacements stream back into their parent embedded or by
//! digest, and the digests they supersede are released on the way down.

use alloy_trie::Nibbles;
use hp_trie::{hexprefix, TrieError};
use recbin::{Item, Stream};

use crate::store::NodeStore;
use crate::trie::{leaf_encoding, TrieDB};

impl<S: NodeStore> TrieDB<S> {
    /// Returns the encoding of the node that replaces `node` once `path`
    /// maps to `value` beneath it.
    pub(crate) fn merge(
        &mut self,
        node: Item<'_>,
        path: Nibbles,
        value: &[u8],
    ) -> Result<Vec<u8>, TrieError> {
        if node.is_null() || node.is_empty() {
            return Ok(leaf_encoding(&path, value));
        }
        if !node.is_list() {
            return Err(TrieError::InvalidNode("expected a node list"));
        }
        match node.item_count()? {
            2 => self.merge_pair(node, path, value),
            17 => self.merge_branch(node, path, value),
            _ => Err(TrieError::InvalidNode("unexpected list arity")),
        }
    }

    fn merge_pair(
        &mut self,
        node: Item<'_>,
        path: Nibbles,
        value: &[u8],
    ) -> Result<Vec<u8>, TrieError> {
        let (partial, terminated) = hexprefix::decode(node.at(0)?.as_bytes())?;

        if terminated {
            if partial == path {
                return Ok(leaf_encoding(&path, value));
            }
            let displaced = node.at(1)?.as_bytes().to_vec();
            return Ok(self.split_leaves(partial, &displaced, path, value));
        }

        let shared = partial.common_prefix_length(&path);
        if shared == partial.len() {
            // the whole partial key matches; merging continues in the child,
            // which is rewritten and therefore unpinned here
            let child = self.take_child(node.at(1)?)?;
            let replacement = self.merge(Item::new(&child), path.slice(shared..), value)?;
            let mut stream = Stream::new();
            stream
                .append_list(2)
                .append_bytes(&hexprefix::encode(&partial, false));
            self.stream_child(&replacement, &mut stream);
            return Ok(stream.out());
        }

        // diverges inside the partial key: branch at the split point. The
        // existing child keeps its reference untouched, trimmed under the
        // remainder of the partial key when one is left.
        let idx = partial.get_unchecked(shared);
        let rest = partial.slice(shared + 1..);
        let child_raw = node.at(1)?.raw()?;

        let mut branch = Stream::new();
        branch.append_list(17);
        for slot in 0..16 {
            if slot == idx {
                if rest.is_empty() {
                    branch.append_raw(child_raw);
                } else {
                    let mut pair = Stream::new();
                    pair.append_list(2)
                        .append_bytes(&hexprefix::encode(&rest, false))
                        .append_raw(child_raw);
                    let pair = pair.out();
                    self.stream_child(&pair, &mut branch);
                }
            } else if path.len() > shared && slot == path.get_unchecked(shared) {
                let leaf = leaf_encoding(&path.slice(shared + 1..), value);
                self.stream_child(&leaf, &mut branch);
            } else {
                branch.append_bytes(&[]);
            }
        }
        if path.len() == shared {
            branch.append_bytes(value);
        } else {
            branch.append_bytes(&[]);
        }
        let branch = branch.out();

        if shared == 0 {
            Ok(branch)
        } else {
            let mut stream = Stream::new();
            stream
                .append_list(2)
                .append_bytes(&hexprefix::encode(&partial.slice(..shared), false));
            self.stream_child(&branch, &mut stream);
            Ok(stream.out())
        }
    }

    fn merge_branch(
        &mut self,
        node: Item<'_>,
        path: Nibbles,
        value: &[u8],
    ) -> Result<Vec<u8>, TrieError> {
        let mut stream = Stream::new();
        stream.append_list(17);

        if path.is_empty() {
            for slot in node.iter().take(16) {
                stream.append_raw(slot?.raw()?);
            }
            stream.append_bytes(value);
            return Ok(stream.out());
        }

        let target = path.get_unchecked(0) as usize;
        for (index, slot) in node.iter().enumerate() {
            let slot = slot?;
            if index != target {
                stream.append_raw(slot.raw()?);
            } else if slot.is_empty() {
                let leaf = leaf_encoding(&path.slice(1..), value);
                self.stream_child(&leaf, &mut stream);
            } else {
                let child = self.take_child(slot)?;
                let replacement = self.merge(Item::new(&child), path.slice(1..), value)?;
                self.stream_child(&replacement, &mut stream);
            }
        }
        Ok(stream.out())
    }

    /// Builds the minimal subtree holding two distinct terminated pairs: a
    /// branch where they diverge, under an extension when they share a
    /// prefix.
    fn split_leaves(&mut self, k1: Nibbles, v1: &[u8], k2: Nibbles, v2: &[u8]) -> Vec<u8> {
        let shared = k1.common_prefix_length(&k2);

        let mut branch = Stream::new();
        branch.append_list(17);
        for slot in 0..16 {
            if k1.len() > shared && slot == k1.get_unchecked(shared) {
                let leaf = leaf_encoding(&k1.slice(shared + 1..), v1);
                self.stream_child(&leaf, &mut branch);
            } else if k2.len() > shared && slot == k2.get_unchecked(shared) {
                let leaf = leaf_encoding(&k2.slice(shared + 1..), v2);
                self.stream_child(&leaf, &mut branch);
            } else {
                branch.append_bytes(&[]);
            }
        }
        if k1.len() == shared {
            branch.append_bytes(v1);
        } else if k2.len() == shared {
            branch.append_bytes(v2);
        } else {
            branch.append_bytes(&[]);
        }
        let branch = branch.out();

        if shared == 0 {
            branch
        } else {
            let mut stream = Stream::new();
            stream
                .append_list(2)
                .append_bytes(&hexprefix::encode(&k1.slice(..shared), false));
            self.stream_child(&branch, &mut stream);
            stream.out()
        }
    }
}
