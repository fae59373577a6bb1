#![allow(unused_crate_dependencies)]
//! Deterministic workload generation shared by the benches.

/// Shape of a generated key/value workload.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadConfig {
    /// Number of entries to generate.
    pub entries: usize,
    /// Keys are 1..=this many bytes long.
    pub max_key_len: usize,
    /// Values are 1..=this many bytes long; spans the embed/hash threshold
    /// when at least 32.
    pub max_value_len: usize,
}

impl WorkloadConfig {
    pub const SMALL: Self = Self {
        entries: 100,
        max_key_len: 8,
        max_value_len: 16,
    };

    pub const MIXED: Self = Self {
        entries: 1_000,
        max_key_len: 16,
        max_value_len: 48,
    };
}

/// Generates `config.entries` key/value pairs from `seed`. Keys may repeat,
/// which mirrors real update traffic (later writes overwrite earlier ones).
pub fn generate_entries(seed: u64, config: WorkloadConfig) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut state = seed | 1;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state
    };

    (0..config.entries)
        .map(|_| {
            let r = next();
            let key_len = 1 + (r as usize) % config.max_key_len;
            let value_len = 1 + (r >> 32) as usize % config.max_value_len;
            let key: Vec<u8> = (0..key_len)
                .map(|i| (next() >> (8 * (i % 8))) as u8)
                .collect();
            let value: Vec<u8> = (0..value_len).map(|i| (r >> (i % 56)) as u8).collect();
            (key, value)
        })
        .collect()
}
