//! The trie handle: root reference management and lookups.

use alloy_primitives::{keccak256, Bytes, B256};
use alloy_trie::Nibbles;
use hp_trie::{hexprefix, TrieError};
use recbin::{Item, Stream};

use crate::prune::Pruned;
use crate::store::NodeStore;

/// Persistent trie over a [`NodeStore`].
///
/// Holds a single root reference (the root's inline encoding while it stays
/// under 32 bytes, its digest otherwise) and walks serialized nodes through
/// the [`recbin`] cursor on demand. Every mutation rewrites the nodes on the
/// path to the affected key, publishes replacements bottom-up and releases
/// the store pins of the encodings it supersedes.
#[derive(Debug, Clone)]
pub struct TrieDB<S> {
    store: S,
    root: NodeRef,
}

/// A node reference: embedded encoding under 32 bytes, digest otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeRef {
    Embedded(Bytes),
    Hash(B256),
}

impl<S: NodeStore> TrieDB<S> {
    /// Opens an empty trie over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            root: NodeRef::Embedded(Bytes::from_static(&[recbin::EMPTY_STRING])),
        }
    }

    /// Opens a trie at a previously published root digest.
    pub fn open(store: S, root: B256) -> Self {
        Self {
            store,
            root: NodeRef::Hash(root),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Serialized root node; fails when a digest root is missing from the
    /// store.
    pub fn root_encoding(&self) -> Result<Vec<u8>, TrieError> {
        match &self.root {
            NodeRef::Embedded(encoding) => Ok(encoding.to_vec()),
            NodeRef::Hash(digest) => Ok(self
                .store
                .get(digest)
                .ok_or(TrieError::MissingNode(*digest))?
                .to_vec()),
        }
    }

    /// The 256-bit digest identifying the mapping.
    pub fn root_digest(&self) -> B256 {
        match &self.root {
            NodeRef::Embedded(encoding) => keccak256(encoding),
            NodeRef::Hash(digest) => *digest,
        }
    }

    /// Returns the value stored under `key`, or the empty byte string when
    /// the key is absent.
    pub fn at(&self, key: &[u8]) -> Result<Bytes, TrieError> {
        let path = key_path(key)?;
        let encoding = self.root_encoding()?;
        self.lookup(Item::new(&encoding), path)
    }

    /// Inserts `value` under `key`, replacing any previous value. An empty
    /// value removes the key instead.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        if value.is_empty() {
            return self.remove(key);
        }
        let path = key_path(key)?;
        let old = self.root_encoding()?;
        let new = self.merge(Item::new(&old), path, value)?;
        self.replace_root(new);
        Ok(())
    }

    /// Removes `key`; a no-op when it is absent.
    pub fn remove(&mut self, key: &[u8]) -> Result<(), TrieError> {
        let path = key_path(key)?;
        let old = self.root_encoding()?;
        match self.prune(Item::new(&old), path)? {
            Pruned::Unchanged => {}
            Pruned::Removed => self.replace_root(vec![recbin::EMPTY_STRING]),
            Pruned::Replaced(encoding) => self.replace_root(encoding),
        }
        Ok(())
    }

    fn lookup(&self, node: Item<'_>, path: Nibbles) -> Result<Bytes, TrieError> {
        if node.is_null() || node.is_empty() {
            return Ok(Bytes::new());
        }
        if !node.is_list() {
            return Err(TrieError::InvalidNode("expected a node list"));
        }
        match node.item_count()? {
            2 => {
                let (partial, terminated) = hexprefix::decode(node.at(0)?.as_bytes())?;
                if terminated {
                    if partial == path {
                        Ok(Bytes::copy_from_slice(node.at(1)?.as_bytes()))
                    } else {
                        Ok(Bytes::new())
                    }
                } else if partial.common_prefix_length(&path) == partial.len() {
                    let child = self.resolve(node.at(1)?)?;
                    self.lookup(Item::new(&child), path.slice(partial.len()..))
                } else {
                    Ok(Bytes::new())
                }
            }
            17 => {
                if path.is_empty() {
                    return Ok(Bytes::copy_from_slice(node.at(16)?.as_bytes()));
                }
                let slot = node.at(path.get_unchecked(0) as usize)?;
                if slot.is_empty() {
                    return Ok(Bytes::new());
                }
                let child = self.resolve(slot)?;
                self.lookup(Item::new(&child), path.slice(1..))
            }
            _ => Err(TrieError::InvalidNode("unexpected list arity")),
        }
    }

    /// Materializes a child reference: an embedded list is its own encoding,
    /// a 32-byte string is fetched from the store.
    pub(crate) fn resolve(&self, reference: Item<'_>) -> Result<Vec<u8>, TrieError> {
        if reference.is_list() {
            return Ok(reference.raw()?.to_vec());
        }
        let digest = ref_digest(&reference)?;
        Ok(self
            .store
            .get(&digest)
            .ok_or(TrieError::MissingNode(digest))?
            .to_vec())
    }

    /// Releases the store pin behind a digest reference that is being
    /// rewritten or absorbed. Embedded references hold no pin.
    pub(crate) fn release(&mut self, reference: Item<'_>) -> Result<(), TrieError> {
        if !reference.is_list() {
            self.store.kill(&ref_digest(&reference)?);
        }
        Ok(())
    }

    /// Materializes a child for rewriting and drops its pin in one step.
    pub(crate) fn take_child(&mut self, reference: Item<'_>) -> Result<Vec<u8>, TrieError> {
        let encoding = self.resolve(reference)?;
        self.release(reference)?;
        Ok(encoding)
    }

    /// Streams a rewritten child into its parent: embedded raw while under
    /// 32 bytes, published to the store and referenced by digest from there.
    pub(crate) fn stream_child(&mut self, encoding: &[u8], parent: &mut Stream) {
        if encoding.len() < 32 {
            parent.append_raw(encoding);
        } else {
            let digest = self.store.put(encoding);
            parent.append_bytes(digest.as_slice());
        }
    }

    fn replace_root(&mut self, encoding: Vec<u8>) {
        if let NodeRef::Hash(old) = &self.root {
            self.store.kill(old);
        }
        self.root = if encoding.len() < 32 {
            NodeRef::Embedded(encoding.into())
        } else {
            NodeRef::Hash(self.store.put(&encoding))
        };
    }
}

/// A child reference must be either an embedded node or a 32-byte digest.
fn ref_digest(reference: &Item<'_>) -> Result<B256, TrieError> {
    let bytes = reference.as_bytes();
    if reference.is_string() && bytes.len() == 32 {
        Ok(B256::from_slice(bytes))
    } else {
        Err(TrieError::InvalidNode("invalid child reference"))
    }
}

/// Serialization of a leaf: the terminated partial key and its value.
pub(crate) fn leaf_encoding(path: &Nibbles, value: &[u8]) -> Vec<u8> {
    let mut stream = Stream::new();
    stream
        .append_list(2)
        .append_bytes(&hexprefix::encode(path, true))
        .append_bytes(value);
    stream.out()
}

fn key_path(key: &[u8]) -> Result<Nibbles, TrieError> {
    // the packed path representation caps keys at 64 nibbles
    if key.is_empty() || key.len() > 32 {
        Err(TrieError::InvalidKey)
    } else {
        Ok(Nibbles::unpack(key))
    }
}
