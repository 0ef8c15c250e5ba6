//! Counter index generation (Kirsch & Mitzenmacher double hashing).
//!
//! For k positions derived from two base hashes h₁ and h₂:
//!
//! ```text
//! gᵢ(x) = (h₁(x) + i·h₂(x)) mod m        for i in 0..k
//! ```
//!
//! Double hashing gives asymptotically the same false positive rate as k
//! independent hash functions at the cost of a single 128-bit digest.
//!
//! # Signedness
//!
//! `h₁` and `h₂` are read as signed 64-bit integers and the sum is reduced
//! with a Euclidean (always non-negative) remainder in 128-bit arithmetic.
//! Nothing overflows for any realistic k, and the positions agree with
//! filters produced by tooling that exposes the murmur3 halves as signed
//! values.
//!
//! Positions may repeat when m is small relative to k; they are not
//! deduplicated.
//!
//! # References
//!
//! - Kirsch, A., & Mitzenmacher, M. (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

/// Standard double hashing: `gᵢ = (h₁ + i·h₂) mod m`.
///
/// # Examples
///
/// ```
/// use countbloom::hash::DoubleHashing;
///
/// let indices = DoubleHashing.generate_indices(0x1234_5678_9abc_def0, 0xfedc_ba98_7654_3210, 7, 1000);
/// assert_eq!(indices.len(), 7);
/// assert!(indices.iter().all(|&idx| idx < 1000));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleHashing;

impl DoubleHashing {
    /// Lazily yield `k` positions in `[0, m)`.
    ///
    /// # Panics
    ///
    /// Panics if `m == 0`. Filters never have an empty counter array.
    #[inline]
    #[must_use]
    pub fn probes(&self, h1: u64, h2: u64, k: usize, m: usize) -> Probes {
        assert!(m > 0, "counter array length must be > 0");
        Probes {
            h1: i128::from(h1 as i64),
            h2: i128::from(h2 as i64),
            m: m as i128,
            next: 0,
            k,
        }
    }

    /// Collect `k` positions in `[0, m)`.
    #[inline]
    #[must_use]
    pub fn generate_indices(&self, h1: u64, h2: u64, k: usize, m: usize) -> Vec<usize> {
        self.probes(h1, h2, k, m).collect()
    }

    /// Human-readable name for debugging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        "DoubleHashing"
    }
}

/// Iterator over the counter positions of one key.
#[derive(Debug, Clone)]
pub struct Probes {
    h1: i128,
    h2: i128,
    m: i128,
    next: usize,
    k: usize,
}

impl Iterator for Probes {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next >= self.k {
            return None;
        }
        let i = self.next as i128;
        self.next += 1;
        Some((self.h1 + i * self.h2).rem_euclid(self.m) as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.k - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Probes {}
