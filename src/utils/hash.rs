//! Content hashing utilities.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// Compute a content hash for arbitrary bytes
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Seeded hash, used where independent hash functions are needed.
pub fn seeded_hash(data: &[u8], seed: u64) -> u64 {
    xxh3_64_with_seed(data, seed)
}

/// Hex SHA-256 of a pattern, the stable key for stored signatures.
pub fn pattern_digest(pattern: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pattern.as_bytes());
    format!("{:x}", hasher.finalize())
}
