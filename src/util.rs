//! Utilities
//!
//! Key validation, directory sizing, and test-data generation.

use std::fs;
use std::path::Path;

use rand::Rng;

use crate::error::Result;

const VALUE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// A key is valid if it holds at least one byte
pub fn is_valid_key(key: &[u8]) -> bool {
    !key.is_empty()
}

/// Total size of the regular files directly inside `dir`
pub fn dir_disk_size(dir: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(dir)? {
        let metadata = entry?.metadata()?;
        if metadata.is_file() {
            total += metadata.len();
        }
    }
    Ok(total)
}

/// Deterministic key for test/bench data: "caskdb-key-000000042"
pub fn test_key(i: usize) -> Vec<u8> {
    format!("caskdb-key-{:09}", i).into_bytes()
}

/// Random alphanumeric value of length `n`, drawn from the caller's generator
pub fn random_value<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<u8> {
    (0..n)
        .map(|_| VALUE_ALPHABET[rng.gen_range(0..VALUE_ALPHABET.len())])
        .collect()
}
