//! Hex-prefix radix trie over byte-string keys.
//!
//! Maintains a canonical tree shape for any mapping of non-empty keys to
//! non-empty values, serializes every node through [`recbin`], and derives a
//! single 256-bit digest identifying the whole mapping. Two parties holding
//! the same entries produce bit-identical serializations regardless of the
//! order of inserts and removals.

mod error;
pub mod hexprefix;
mod ordered_root;
mod trie;

use std::sync::LazyLock;

use alloy_primitives::{keccak256, B256};

pub use alloy_trie::Nibbles;
pub use error::TrieError;
pub use ordered_root::{trie_root, trie_root_encoding};
pub use trie::Trie;

/// Digest of the canonical empty trie: the hash of the encoded empty string.
pub static EMPTY_ROOT: LazyLock<B256> = LazyLock::new(|| keccak256([recbin::EMPTY_STRING]));
