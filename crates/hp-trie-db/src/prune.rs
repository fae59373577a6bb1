//! Removal over serialized nodes.
//!
//! The way back up applies the minimality rewrites: a branch that loses its
//! second-to-last occupant collapses into its remaining form, and partial
//! keys concatenate across dissolved levels, so the rewritten tree is the
//! same canonical shape a fresh build of the surviving entries produces.

use alloy_trie::Nibbles;
use hp_trie::{hexprefix, TrieError};
use recbin::{Item, Stream};

use crate::store::NodeStore;
use crate::trie::{leaf_encoding, TrieDB};

/// Outcome of removing a path from one subtree.
#[derive(Debug)]
pub(crate) enum Pruned {
    /// The key was absent; nothing was rewritten and no pins were touched.
    Unchanged,
    /// The subtree vanished entirely.
    Removed,
    /// The subtree was rewritten to this encoding.
    Replaced(Vec<u8>),
}

impl<S: NodeStore> TrieDB<S> {
    pub(crate) fn prune(&mut self, node: Item<'_>, path: Nibbles) -> Result<Pruned, TrieError> {
        if node.is_null() || node.is_empty() {
            return Ok(Pruned::Unchanged);
        }
        if !node.is_list() {
            return Err(TrieError::InvalidNode("expected a node list"));
        }
        match node.item_count()? {
            2 => self.prune_pair(node, path),
            17 => self.prune_branch(node, path),
            _ => Err(TrieError::InvalidNode("unexpected list arity")),
        }
    }

    fn prune_pair(&mut self, node: Item<'_>, path: Nibbles) -> Result<Pruned, TrieError> {
        let (partial, terminated) = hexprefix::decode(node.at(0)?.as_bytes())?;
        if terminated {
            return Ok(if partial == path {
                Pruned::Removed
            } else {
                Pruned::Unchanged
            });
        }
        if partial.common_prefix_length(&path) != partial.len() {
            return Ok(Pruned::Unchanged);
        }

        let child_ref = node.at(1)?;
        let child = self.resolve(child_ref)?;
        match self.prune(Item::new(&child), path.slice(partial.len()..))? {
            Pruned::Unchanged => Ok(Pruned::Unchanged),
            Pruned::Removed => {
                self.release(child_ref)?;
                Ok(Pruned::Removed)
            }
            Pruned::Replaced(encoding) => {
                self.release(child_ref)?;
                Ok(Pruned::Replaced(self.graft(partial, encoding)?))
            }
        }
    }

    fn prune_branch(&mut self, node: Item<'_>, path: Nibbles) -> Result<Pruned, TrieError> {
        let slots: Vec<Item<'_>> = node.iter().collect::<Result<_, _>>()?;

        if path.is_empty() {
            if slots[16].is_empty() {
                return Ok(Pruned::Unchanged);
            }
            return self.rejig(&slots, None);
        }

        let target = path.get_unchecked(0) as usize;
        let slot = slots[target];
        if slot.is_empty() {
            return Ok(Pruned::Unchanged);
        }
        let child = self.resolve(slot)?;
        match self.prune(Item::new(&child), path.slice(1..))? {
            Pruned::Unchanged => Ok(Pruned::Unchanged),
            Pruned::Removed => {
                self.release(slot)?;
                self.rejig(&slots, Some(target))
            }
            Pruned::Replaced(encoding) => {
                self.release(slot)?;
                // occupancy is unchanged; swap the rewritten child in place
                let mut stream = Stream::new();
                stream.append_list(17);
                for (index, slot) in slots.iter().enumerate() {
                    if index == target {
                        self.stream_child(&encoding, &mut stream);
                    } else {
                        stream.append_raw(slot.raw()?);
                    }
                }
                Ok(Pruned::Replaced(stream.out()))
            }
        }
    }

    /// Rebuilds a branch after slot `removed` lost its child (`None`: after
    /// the stored value was dropped), collapsing it when it falls below the
    /// minimality threshold.
    fn rejig(&mut self, slots: &[Item<'_>], removed: Option<usize>) -> Result<Pruned, TrieError> {
        let keep_value = removed.is_some() && !slots[16].is_empty();
        let populated: Vec<usize> = (0..16)
            .filter(|index| Some(*index) != removed && !slots[*index].is_empty())
            .collect();

        match (populated.as_slice(), keep_value) {
            ([], false) => Ok(Pruned::Removed),
            ([], true) => {
                // only the stored value is left: a leaf at the empty path
                Ok(Pruned::Replaced(leaf_encoding(
                    &Nibbles::default(),
                    slots[16].as_bytes(),
                )))
            }
            ([lone], false) => {
                // a single child is left: its slot nibble becomes the first
                // nibble of whatever partial key the child carries
                let mut prefix = Nibbles::default();
                prefix.push(*lone as u8);
                let child_ref = slots[*lone];
                let child = self.resolve(child_ref)?;
                match Item::new(&child).item_count()? {
                    2 => {
                        // the child is absorbed into the merged node
                        self.release(child_ref)?;
                        Ok(Pruned::Replaced(self.graft(prefix, child)?))
                    }
                    17 => {
                        // a branch child stays put behind its reference
                        let mut stream = Stream::new();
                        stream
                            .append_list(2)
                            .append_bytes(&hexprefix::encode(&prefix, false));
                        stream.append_raw(child_ref.raw()?);
                        Ok(Pruned::Replaced(stream.out()))
                    }
                    _ => Err(TrieError::InvalidNode("unexpected list arity")),
                }
            }
            _ => {
                // still a healthy branch; rebuild with the removal applied
                let mut stream = Stream::new();
                stream.append_list(17);
                for (index, slot) in slots.iter().take(16).enumerate() {
                    if Some(index) == removed {
                        stream.append_bytes(&[]);
                    } else {
                        stream.append_raw(slot.raw()?);
                    }
                }
                if removed.is_none() {
                    stream.append_bytes(&[]);
                } else {
                    stream.append_raw(slots[16].raw()?);
                }
                Ok(Pruned::Replaced(stream.out()))
            }
        }
    }

    /// Re-attaches a rewritten child under a non-terminated partial key,
    /// concatenating partial keys when the child is itself a two-item node.
    fn graft(&mut self, prefix: Nibbles, child: Vec<u8>) -> Result<Vec<u8>, TrieError> {
        let item = Item::new(&child);
        if item.item_count()? == 2 {
            let (tail, terminated) = hexprefix::decode(item.at(0)?.as_bytes())?;
            let mut stream = Stream::new();
            stream
                .append_list(2)
                .append_bytes(&hexprefix::encode(&prefix.join(&tail), terminated))
                .append_raw(item.at(1)?.raw()?);
            return Ok(stream.out());
        }
        let mut stream = Stream::new();
        stream
            .append_list(2)
            .append_bytes(&hexprefix::encode(&prefix, false));
        self.stream_child(&child, &mut stream);
        Ok(stream.out())
    }
}
