//! One-shot root computation over a sorted mapping.
//!
//! Serializes the canonical tree recursively over a pre-sorted entry range
//! without materializing nodes, for callers that derive a digest from a
//! batch they will never mutate. Agrees bit for bit with [`crate::Trie`]
//! over the same entries. Byte-wise key order and nibble-path order
//! coincide, so a `BTreeMap` iterates entries exactly as the tree groups
//! them.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, B256};
use alloy_trie::Nibbles;
use recbin::Stream;

use crate::hexprefix;

/// Root digest of the mapping; equals [`crate::Trie::root_digest`] after
/// inserting the same entries.
///
/// Entries with an empty key or an empty value denote absence and are
/// skipped.
///
/// # Panics
///
/// Panics if a key is longer than 32 bytes.
pub fn trie_root(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> B256 {
    keccak256(trie_root_encoding(entries))
}

/// Serialized root node of the mapping; the encoded empty string when no
/// entries remain.
pub fn trie_root_encoding(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<u8> {
    let hexed: Vec<(Nibbles, &[u8])> = entries
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (Nibbles::unpack(key), value.as_slice()))
        .collect();
    if hexed.is_empty() {
        return vec![recbin::EMPTY_STRING];
    }
    let mut stream = Stream::new();
    node(&hexed, 0, &mut stream);
    stream.out()
}

/// Serializes the node covering `entries`, all of which share their first
/// `depth` nibbles.
fn node(entries: &[(Nibbles, &[u8])], depth: usize, stream: &mut Stream) {
    if let [(path, value)] = entries {
        stream
            .append_list(2)
            .append_bytes(&hexprefix::encode(&path.slice(depth..), true))
            .append_bytes(value);
        return;
    }

    // nibbles shared beyond `depth` by every entry in the range
    let first = &entries[0].0;
    let mut shared = first.len();
    for (path, _) in &entries[1..] {
        shared = shared.min(first.common_prefix_length(path));
    }

    if shared > depth {
        stream
            .append_list(2)
            .append_bytes(&hexprefix::encode(&first.slice(depth..shared), false));
        subtree(entries, shared, stream);
        return;
    }

    // the entries diverge right here: one 17-element branch. A key that
    // ends at this depth sorts first and lands in the value slot.
    stream.append_list(17);
    let mut rest = entries;
    let stored_here = if rest[0].0.len() == depth {
        let value = rest[0].1;
        rest = &rest[1..];
        Some(value)
    } else {
        None
    };
    for nibble in 0usize..16 {
        let span = rest
            .iter()
            .take_while(|(path, _)| path.get_unchecked(depth) as usize == nibble)
            .count();
        let (group, tail) = rest.split_at(span);
        rest = tail;
        if group.is_empty() {
            stream.append_bytes(&[]);
        } else {
            subtree(group, depth + 1, stream);
        }
    }
    stream.append_bytes(stored_here.unwrap_or(&[]));
}

/// Streams the node covering `entries` into its parent: embedded raw while
/// under 32 bytes, by digest from there on.
fn subtree(entries: &[(Nibbles, &[u8])], depth: usize, parent: &mut Stream) {
    let mut stream = Stream::new();
    node(entries, depth, &mut stream);
    let encoded = stream.out();
    if encoded.len() < 32 {
        parent.append_raw(&encoded);
    } else {
        parent.append_bytes(keccak256(&encoded).as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Trie, EMPTY_ROOT};
    use alloy_primitives::hex;

    fn map(entries: &[(&[u8], &[u8])]) -> BTreeMap<Vec<u8>, Vec<u8>> {
        entries
            .iter()
            .map(|(key, value)| (key.to_vec(), value.to_vec()))
            .collect()
    }

    fn incremental_root(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> Trie {
        let mut trie = Trie::new();
        for (key, value) in entries {
            trie.insert(key, value).unwrap();
        }
        trie
    }

    #[test]
    fn empty_mapping() {
        let entries = BTreeMap::new();
        assert_eq!(trie_root_encoding(&entries), hex!("40"));
        assert_eq!(trie_root(&entries), *EMPTY_ROOT);
    }

    #[test]
    fn agrees_with_the_incremental_trie() {
        let entries = map(&[
            (b"do", b"verb"),
            (b"dog", b"puppy"),
            (b"doge", b"coin"),
            (b"horse", b"stallion"),
        ]);
        let trie = incremental_root(&entries);
        assert_eq!(trie_root_encoding(&entries), trie.root_encoding());
        assert_eq!(trie_root(&entries), trie.root_digest());
    }

    #[test]
    fn empty_values_are_absent() {
        let with_tombstone = map(&[(b"dog", b"puppy"), (b"cat", b"")]);
        let without = map(&[(b"dog", b"puppy")]);
        assert_eq!(trie_root(&with_tombstone), trie_root(&without));
    }

    #[test]
    fn agrees_over_generated_workloads() {
        let mut entries = BTreeMap::new();
        let mut seed = 0x9e37_79b9_7f4a_7c15u64;
        for _ in 0..128 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let key = seed.to_be_bytes()[..1 + (seed % 6) as usize].to_vec();
            let value = seed.to_le_bytes()[..1 + (seed % 5) as usize].to_vec();
            entries.insert(key, value);

            let trie = incremental_root(&entries);
            assert_eq!(trie_root(&entries), trie.root_digest());
        }
    }
}
