//! Shared utilities.

mod hash;

pub use hash::{content_hash, pattern_digest, seeded_hash};
