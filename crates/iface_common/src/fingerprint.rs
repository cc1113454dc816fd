//! Content fingerprints for cache invalidation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(size, hash)` pair identifying the exact byte content of a file.
///
/// Two files are considered unchanged iff both fields match. The hash is a
/// 64-bit XXH3 digest; collisions are accepted as negligible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Length of the content in bytes.
    pub size: u64,
    /// XXH3-64 digest of the content.
    pub hash: u64,
}

impl Fingerprint {
    /// Computes the fingerprint of a byte buffer.
    pub fn of(data: &[u8]) -> Self {
        Self {
            size: data.len() as u64,
            hash: xxhash_rust::xxh3::xxh3_64(data),
        }
    }

    /// Returns `true` if `data` has exactly this fingerprint.
    pub fn matches(&self, data: &[u8]) -> bool {
        // Size first: it is free and rejects most edits.
        self.size == data.len() as u64 && self.hash == xxhash_rust::xxh3::xxh3_64(data)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:016x}", self.size, self.hash)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}, {:08x}..)", self.size, self.hash >> 32)
    }
}
