#![no_main]

use arbitrary::Arbitrary;
use hp_trie::Trie;
use hp_trie_db::{MemoryStore, TrieDB};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
}

fn usable(key: &[u8]) -> bool {
    !key.is_empty() && key.len() <= 32
}

fuzz_target!(|ops: Vec<Op>| {
    let mut in_memory = Trie::new();
    let mut persistent = TrieDB::new(MemoryStore::new());

    for op in &ops {
        match op {
            Op::Insert { key, value } => {
                if !usable(key) {
                    continue;
                }
                // an empty value doubles as a removal in both variants
                in_memory.insert(key, value).unwrap();
                persistent.insert(key, value).unwrap();
            }
            Op::Remove { key } => {
                if !usable(key) {
                    continue;
                }
                in_memory.remove(key).unwrap();
                persistent.remove(key).unwrap();
            }
        }
    }

    assert_eq!(in_memory.root_digest(), persistent.root_digest());
    assert_eq!(
        in_memory.root_encoding(),
        persistent.root_encoding().unwrap()
    );
    if in_memory.is_empty() {
        assert!(persistent.store().is_empty(), "leaked node pins");
    }
});
