//! Hash function trait and the default MurmurHash3 hasher.
//!
//! A counting filter needs exactly one thing from its hash function: two
//! 64-bit values derived from a single 128-bit digest of the key. Index
//! generation from those two values lives in [`strategies`](super::strategies).
//!
//! # Separation of Concerns
//!
//! - **`BloomHasher`**: turns key bytes into `(h1, h2)`
//! - **`DoubleHashing`**: turns `(h1, h2)` into k counter positions
//! - **`CountingBloomFilter`**: composes hasher + strategy + counters
//!
//! # Stability
//!
//! Persisted filters are only meaningful if the same key maps to the same
//! counters after a restart, so every hasher here is seeded with a constant
//! and never with per-process randomness.
//!
//! # Examples
//!
//! ```
//! use countbloom::hash::{BloomHasher, Murmur3Hasher};
//!
//! let hasher = Murmur3Hasher::new();
//! let (h1, h2) = hasher.hash_pair(b"hello world");
//! assert_eq!((h1, h2), hasher.hash_pair(b"hello world"));
//! ```

#![allow(clippy::module_name_repetitions)]

use murmur3::murmur3_x64_128;

/// Source of the two base hash values used for double hashing.
///
/// Implementations must be deterministic across process runs and must split
/// a single 128-bit digest (or two independent 64-bit digests) into `(h1, h2)`.
///
/// # Thread Safety
///
/// Hashers are `Send + Sync` so filters holding them can be shared.
pub trait BloomHasher: Send + Sync {
    /// Hash `bytes` to two 64-bit values, low half of the digest first.
    fn hash_pair(&self, bytes: &[u8]) -> (u64, u64);

    /// Human-readable name for debugging.
    fn name(&self) -> &'static str;
}

/// Split a 128-bit digest into `(low, high)` 64-bit halves.
#[inline]
#[must_use]
pub fn split_u128(digest: u128) -> (u64, u64) {
    (digest as u64, (digest >> 64) as u64)
}

/// MurmurHash3 x64_128 hasher.
///
/// With the default seed of 0 this produces the same `(h1, h2)` pair as the
/// widespread `mmh3.hash64` binding, so filters populated by other tooling
/// index identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Murmur3Hasher {
    seed: u32,
}

impl Murmur3Hasher {
    /// Create a hasher with seed 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Create a hasher with an explicit seed.
    ///
    /// Filters built with different seeds are not interchangeable.
    #[must_use]
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Seed in use.
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for Murmur3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BloomHasher for Murmur3Hasher {
    #[inline]
    fn hash_pair(&self, bytes: &[u8]) -> (u64, u64) {
        let mut reader = bytes;
        // Reading from an in-memory slice has no failure path.
        let digest = murmur3_x64_128(&mut reader, self.seed)
            .unwrap_or_else(|err| unreachable!("reading a byte slice failed: {err}"));
        split_u128(digest)
    }

    #[inline]
    fn name(&self) -> &'static str {
        "Murmur3_x64_128"
    }
}
