//! Public operations of the in-memory trie.

use alloy_primitives::{keccak256, Bytes, B256};
use alloy_trie::Nibbles;

use super::{nodes::Node, Trie};
use crate::{TrieError, EMPTY_ROOT};

impl Trie {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the value stored under `key`, or the empty byte string when
    /// the key is absent.
    pub fn at(&self, key: &[u8]) -> Result<Bytes, TrieError> {
        let path = key_path(key)?;
        Ok(self
            .root
            .as_deref()
            .and_then(|root| root.get(&path))
            .cloned()
            .unwrap_or_default())
    }

    /// Inserts `value` under `key`, replacing any previous value. An empty
    /// value removes the key instead.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        if value.is_empty() {
            return self.remove(key);
        }
        let path = key_path(key)?;
        let value = Bytes::copy_from_slice(value);
        self.root = Some(Node::insert_into(self.root.take(), path, value));
        Ok(())
    }

    /// Removes `key`; a no-op when it is absent.
    pub fn remove(&mut self, key: &[u8]) -> Result<(), TrieError> {
        let path = key_path(key)?;
        if let Some(root) = self.root.take() {
            self.root = root.remove(&path);
        }
        Ok(())
    }

    /// Serialized root node; the encoded empty string for an empty trie.
    pub fn root_encoding(&self) -> Vec<u8> {
        match &self.root {
            Some(root) => root.encode(),
            None => vec![recbin::EMPTY_STRING],
        }
    }

    /// The 256-bit digest identifying the whole mapping.
    pub fn root_digest(&self) -> B256 {
        match &self.root {
            Some(root) => keccak256(root.encode()),
            None => *EMPTY_ROOT,
        }
    }
}

fn key_path(key: &[u8]) -> Result<Nibbles, TrieError> {
    // the packed path representation caps keys at 64 nibbles
    if key.is_empty() || key.len() > 32 {
        Err(TrieError::InvalidKey)
    } else {
        Ok(Nibbles::unpack(key))
    }
}
