//! The node-store contract and a reference-counted in-memory store.

use alloy_primitives::{keccak256, map::B256Map, Bytes, B256};

/// Backing store for serialized nodes, addressed by digest.
pub trait NodeStore {
    /// The encoding pinned under `digest`, if any.
    fn get(&self, digest: &B256) -> Option<Bytes>;

    /// Pins `encoding` under its digest and returns the digest. Idempotent:
    /// storing the same bytes again adds a pin, not a copy.
    fn put(&mut self, encoding: &[u8]) -> B256;

    /// Best-effort release of one pin on `digest`.
    fn kill(&mut self, digest: &B256);
}

/// Reference-counted in-memory node store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: B256Map<(Bytes, u32)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct pinned nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl NodeStore for MemoryStore {
    fn get(&self, digest: &B256) -> Option<Bytes> {
        self.nodes.get(digest).map(|(encoding, _)| encoding.clone())
    }

    fn put(&mut self, encoding: &[u8]) -> B256 {
        let digest = keccak256(encoding);
        self.nodes
            .entry(digest)
            .and_modify(|(_, pins)| *pins += 1)
            .or_insert_with(|| (Bytes::copy_from_slice(encoding), 1));
        digest
    }

    fn kill(&mut self, digest: &B256) {
        if let Some((_, pins)) = self.nodes.get_mut(digest) {
            *pins -= 1;
            if *pins == 0 {
                self.nodes.remove(digest);
            }
        }
    }
}
