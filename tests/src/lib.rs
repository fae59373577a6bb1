#![allow(missing_docs)]

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use alloy_primitives::{hex, keccak256};
    use hp_trie::{hexprefix, trie_root, Nibbles, Trie, EMPTY_ROOT};
    use hp_trie_db::{MemoryStore, TrieDB};
    use recbin::{Item, MalformedEncoding, Stream};

    const DICTIONARY: &[(&[u8], &[u8])] = &[
        (b"do", b"verb"),
        (b"dog", b"puppy"),
        (b"doge", b"coin"),
        (b"horse", b"stallion"),
    ];

    fn both_variants(entries: &[(&[u8], &[u8])]) -> (Trie, TrieDB<MemoryStore>) {
        let mut in_memory = Trie::new();
        let mut persistent = TrieDB::new(MemoryStore::new());
        for (key, value) in entries {
            in_memory.insert(key, value).unwrap();
            persistent.insert(key, value).unwrap();
        }
        (in_memory, persistent)
    }

    #[test]
    fn codec_reference_vectors() {
        let mut s = Stream::new();
        s.append_int(15);
        assert_eq!(s.out(), hex!("0f"));

        let mut s = Stream::new();
        s.append_int(1024);
        assert_eq!(s.out(), hex!("190400"));

        let mut s = Stream::new();
        s.append_bytes(b"dog");
        assert_eq!(s.out(), hex!("43646f67"));

        let mut s = Stream::new();
        s.append_list(2).append_bytes(b"cat").append_bytes(b"dog");
        assert_eq!(s.out(), hex!("884363617443646f67"));

        let mut s = Stream::new();
        s.append_list(0);
        assert_eq!(s.out(), hex!("80"));

        let mut s = Stream::new();
        s.append_bytes(b"");
        assert_eq!(s.out(), hex!("40"));
    }

    #[test]
    fn codec_rejects_reserved_bytes() {
        let buf = hex!("c0");
        let item = Item::new(&buf);
        assert_eq!(item.size(), Err(MalformedEncoding::Reserved(0xc0)));
        assert_eq!(item.validate(), Err(MalformedEncoding::Reserved(0xc0)));
    }

    #[test]
    fn codec_reads_a_string_holding_a_nul_byte() {
        let buf = hex!("4100");
        let item = Item::new(&buf);
        assert!(item.is_string());
        assert_eq!(item.as_bytes(), &hex!("00"));
        assert_eq!(item.size().unwrap(), 2);
    }

    #[test]
    fn codec_round_trips_nested_values() {
        // [ 0, 1024, "dog", [ "cat", "" ], [] ]
        let mut s = Stream::new();
        s.append_list(5)
            .append_int(0)
            .append_int(1024)
            .append_bytes(b"dog")
            .append_list(2)
            .append_bytes(b"cat")
            .append_bytes(b"")
            .append_list(0);
        let out = s.out();

        let item = Item::new(&out);
        item.validate().unwrap();
        assert_eq!(item.size().unwrap(), out.len());
        assert_eq!(item.item_count().unwrap(), 5);
        assert_eq!(item.at(0).unwrap().to_u64(), 0);
        assert_eq!(item.at(1).unwrap().to_u64(), 1024);
        assert_eq!(item.at(2).unwrap().as_bytes(), b"dog");
        let inner = item.at(3).unwrap();
        assert_eq!(inner.at(0).unwrap().as_bytes(), b"cat");
        assert!(inner.at(1).unwrap().is_empty());
        assert!(item.at(4).unwrap().is_empty());
    }

    #[test]
    fn dictionary_scenario_on_both_variants() {
        let (in_memory, persistent) = both_variants(DICTIONARY);

        assert_eq!(in_memory.at(b"do").unwrap().as_ref(), b"verb");
        assert_eq!(in_memory.at(b"dog").unwrap().as_ref(), b"puppy");
        assert_eq!(in_memory.at(b"doge").unwrap().as_ref(), b"coin");
        assert_eq!(in_memory.at(b"horse").unwrap().as_ref(), b"stallion");
        assert!(in_memory.at(b"cat").unwrap().is_empty());

        assert_eq!(persistent.at(b"do").unwrap().as_ref(), b"verb");
        assert_eq!(persistent.at(b"dog").unwrap().as_ref(), b"puppy");
        assert_eq!(persistent.at(b"doge").unwrap().as_ref(), b"coin");
        assert_eq!(persistent.at(b"horse").unwrap().as_ref(), b"stallion");
        assert!(persistent.at(b"cat").unwrap().is_empty());

        assert_eq!(in_memory.root_digest(), persistent.root_digest());
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let (forward, _) = both_variants(DICTIONARY);
        let reversed_entries: Vec<_> = DICTIONARY.iter().rev().copied().collect();
        let (reversed, reversed_persistent) = both_variants(&reversed_entries);
        assert_eq!(forward.root_digest(), reversed.root_digest());
        assert_eq!(forward.root_digest(), reversed_persistent.root_digest());
    }

    #[test]
    fn inserting_an_empty_value_is_removal() {
        let entries: &[(&[u8], &[u8])] = &[(b"key", b"value")];
        let (mut in_memory, mut persistent) = both_variants(entries);
        in_memory.insert(b"key", b"").unwrap();
        persistent.insert(b"key", b"").unwrap();

        assert_eq!(in_memory.root_digest(), *EMPTY_ROOT);
        assert_eq!(persistent.root_digest(), *EMPTY_ROOT);
        assert!(in_memory.at(b"key").unwrap().is_empty());
        assert!(persistent.at(b"key").unwrap().is_empty());
    }

    #[test]
    fn the_empty_digest_is_the_hash_of_the_encoded_empty_string() {
        assert_eq!(*EMPTY_ROOT, keccak256(hex!("40")));
        assert_eq!(Trie::new().root_digest(), keccak256(hex!("40")));
        assert_eq!(
            TrieDB::new(MemoryStore::new()).root_digest(),
            keccak256(hex!("40"))
        );
    }

    #[test]
    fn insert_then_remove_is_the_identity() {
        let (mut in_memory, mut persistent) = both_variants(DICTIONARY);
        let in_memory_before = in_memory.root_digest();
        let persistent_before = persistent.root_digest();

        in_memory.insert(b"dodge", b"car").unwrap();
        persistent.insert(b"dodge", b"car").unwrap();
        in_memory.remove(b"dodge").unwrap();
        persistent.remove(b"dodge").unwrap();

        assert_eq!(in_memory.root_digest(), in_memory_before);
        assert_eq!(persistent.root_digest(), persistent_before);
    }

    #[test]
    fn hex_prefix_encoding_is_a_bijection() {
        let mut paths: Vec<Vec<u8>> = vec![vec![], vec![0], vec![15], vec![7, 0, 7]];
        for len in 1..=12usize {
            paths.push((0..len).map(|i| ((i * 5 + len) % 16) as u8).collect());
        }
        for path in paths {
            let path = Nibbles::from_nibbles(&path);
            for terminated in [false, true] {
                let encoded = hexprefix::encode(&path, terminated);
                assert_eq!(hexprefix::decode(&encoded).unwrap(), (path, terminated));
            }
        }
    }

    #[test]
    fn three_implementations_agree_under_churn() {
        let mut in_memory = Trie::new();
        let mut persistent = TrieDB::new(MemoryStore::new());
        let mut model = BTreeMap::<Vec<u8>, Vec<u8>>::new();
        let mut seed = 0x1f83_d9ab_fb41_bd6bu64;

        for step in 0u64..500 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let key = seed.to_be_bytes()[..1 + (seed % 5) as usize].to_vec();

            if step % 3 == 2 {
                in_memory.remove(&key).unwrap();
                persistent.remove(&key).unwrap();
                model.remove(&key);
            } else {
                let len = 1 + (seed % 40) as usize;
                let value = vec![(seed >> 16) as u8; len];
                in_memory.insert(&key, &value).unwrap();
                persistent.insert(&key, &value).unwrap();
                model.insert(key, value);
            }

            if step % 20 == 19 {
                let digest = trie_root(&model);
                assert_eq!(in_memory.root_digest(), digest);
                assert_eq!(persistent.root_digest(), digest);
            }
        }

        for (key, value) in &model {
            assert_eq!(in_memory.at(key).unwrap().as_ref(), value.as_slice());
            assert_eq!(persistent.at(key).unwrap().as_ref(), value.as_slice());
        }
    }

    #[test]
    fn draining_the_persistent_trie_releases_every_pin() {
        let (_, mut persistent) = both_variants(DICTIONARY);
        // values past the threshold force hashed nodes into the store
        persistent.insert(b"dormouse", &[0x5a; 40]).unwrap();
        persistent.insert(b"dominion", &[0xa5; 40]).unwrap();

        for (key, _) in DICTIONARY {
            persistent.remove(key).unwrap();
        }
        persistent.remove(b"dormouse").unwrap();
        persistent.remove(b"dominion").unwrap();

        assert_eq!(persistent.root_digest(), *EMPTY_ROOT);
        assert!(persistent.store().is_empty());
    }
}
