//! Core counting filter trait.
//!
//! [`CountingFilter`] is the byte-oriented contract shared by every counter
//! store in the crate. It is deliberately single-writer: mutation takes
//! `&mut self`, so the borrow checker enforces exclusive ownership for the
//! duration of an `add`/`remove`. Callers that need to mutate from several
//! threads wrap the filter themselves, or use
//! [`SharedCountingFilter`](crate::sync::SharedCountingFilter).
//!
//! # Guarantees
//!
//! 1. **No false negatives**: after `add_bytes(k, n)`, `contains_bytes(k)` is
//!    true until removals of matching total magnitude.
//! 2. **No underflow**: no counter ever goes below zero.
//! 3. **Bounded counters**: counters saturate at 255 instead of wrapping.

use crate::error::Result;

/// Contract of a counting Bloom filter over byte keys.
///
/// # Examples
///
/// ```
/// use countbloom::core::CountingFilter;
/// use countbloom::CountingBloomFilter;
///
/// fn touch<F: CountingFilter>(filter: &mut F, key: &[u8]) -> bool {
///     filter.add_bytes(key, 1);
///     filter.contains_bytes(key)
/// }
///
/// let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
/// assert!(touch(&mut filter, b"session:42"));
/// ```
pub trait CountingFilter: Send + Sync {
    /// Add `n` to every counter probed by `key`, saturating at 255.
    fn add_bytes(&mut self, key: &[u8], n: u8);

    /// Subtract `n` from every counter probed by `key`, all or nothing.
    ///
    /// Returns `false` and leaves the filter untouched when any probed counter
    /// is smaller than the amount it would lose.
    fn remove_bytes(&mut self, key: &[u8], n: u8) -> bool;

    /// Whether every counter probed by `key` is nonzero.
    fn contains_bytes(&self, key: &[u8]) -> bool;

    /// Subtract `n` from every counter holding at least `n`.
    ///
    /// Returns the number of counters that were decremented.
    fn remove_all(&mut self, n: u8) -> usize;

    /// Estimate the number of distinct keys currently represented.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::SaturatedEstimate`](crate::CountBloomError::SaturatedEstimate)
    /// when every counter is nonzero.
    fn estimate_count(&self) -> Result<f64>;

    /// Number of counters (m).
    fn array_length(&self) -> usize;

    /// Number of counters probed per key (k).
    fn hash_count(&self) -> usize;

    /// Number of nonzero counters.
    fn count_nonzero(&self) -> usize;

    /// Whether all counters are zero.
    fn is_empty(&self) -> bool {
        self.count_nonzero() == 0
    }

    /// Add each key once.
    fn add_all<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        for key in keys {
            self.add_bytes(key, 1);
        }
    }

    /// Whether every key is (probably) present.
    fn contains_all<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a [u8]>,
        Self: Sized,
    {
        keys.into_iter().all(|key| self.contains_bytes(key))
    }
}
