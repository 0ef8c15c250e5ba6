//! XXH3-128 hasher.
//!
//! XXH3 is considerably faster than MurmurHash3 on long keys. Filters built
//! with it are not interchangeable with Murmur3-indexed filters, so the hasher
//! must be chosen before the first `add` and kept for the filter's lifetime
//! (persisted artifacts do not record which hasher produced them).
//!
//! This module wraps the `xxhash-rust` crate.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "xxhash")]
//! # {
//! use countbloom::hash::{BloomHasher, XxHasher};
//!
//! let hasher = XxHasher::new();
//! let (h1, h2) = hasher.hash_pair(b"hello world");
//! assert_ne!(h1, h2);
//! # }
//! ```

use super::hasher::{split_u128, BloomHasher};
use xxhash_rust::xxh3::xxh3_128_with_seed;

/// XXH3-128 hasher implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Create a hasher with seed 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Create a hasher with an explicit seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed in use.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl BloomHasher for XxHasher {
    #[inline]
    fn hash_pair(&self, bytes: &[u8]) -> (u64, u64) {
        split_u128(xxh3_128_with_seed(bytes, self.seed))
    }

    #[inline]
    fn name(&self) -> &'static str {
        "XXH3_128"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Murmur3Hasher;

    #[test]
    fn test_xxhash_deterministic() {
        let hasher = XxHasher::new();
        assert_eq!(hasher.hash_pair(b"test"), hasher.hash_pair(b"test"));
    }

    #[test]
    fn test_xxhash_seeds() {
        let a = XxHasher::with_seed(0).hash_pair(b"test");
        let b = XxHasher::with_seed(7).hash_pair(b"test");
        assert_ne!(a, b);
        assert_eq!(XxHasher::new().hash_pair(b"test"), a);
    }

    #[test]
    fn test_xxhash_differs_from_murmur() {
        assert_ne!(
            XxHasher::new().hash_pair(b"same key"),
            Murmur3Hasher::new().hash_pair(b"same key")
        );
    }

    #[test]
    fn test_seed_zero_matches_unseeded_xxh3() {
        let expected = split_u128(xxhash_rust::xxh3::xxh3_128(b"abc"));
        assert_eq!(XxHasher::new().hash_pair(b"abc"), expected);
    }

    #[test]
    fn test_name() {
        assert_eq!(XxHasher::new().name(), "XXH3_128");
    }
}
