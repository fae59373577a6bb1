use alloy_primitives::B256;
use recbin::MalformedEncoding;
use thiserror::Error;

/// Failures surfaced by trie operations, shared by the in-memory and the
/// store-backed variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// Keys must be non-empty byte strings of at most 64 nibbles.
    #[error("invalid key")]
    InvalidKey,

    /// A node encoding did not parse.
    #[error(transparent)]
    Malformed(#[from] MalformedEncoding),

    /// A node parsed but violates the structural rules of the tree.
    #[error("invalid node structure: {0}")]
    InvalidNode(&'static str),

    /// A digest referenced from the tree is missing from the node store.
    #[error("node not found in store: {0}")]
    MissingNode(B256),
}
