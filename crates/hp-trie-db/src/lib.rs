//! Persistent hex-prefix trie over an abstract node store.
//!
//! Same external behavior as [`hp_trie::Trie`], including bit-identical
//! root digests for the same mapping, but nodes live serialized in a
//! [`NodeStore`], referenced by digest and materialized lazily. Mutations
//! rewrite the path from the root to the affected node, republish digests
//! bottom-up and unpin the digests they replace.

mod merge;
mod prune;
mod store;
mod trie;

pub use hp_trie::TrieError;
pub use store::{MemoryStore, NodeStore};
pub use trie::TrieDB;
