//! Counting Bloom filter with deletion support.
//!
//! A counting Bloom filter replaces each bit of a standard Bloom filter with a
//! small counter, so keys can be removed again without rebuilding the filter.
//! First proposed by Fan et al. in 2000.
//!
//! # Operations
//!
//! - Add: increment the k counters probed by the key
//! - Remove: decrement them, all or nothing
//! - Query: all k counters nonzero
//! - Estimate: distinct keys from the fraction of nonzero counters
//!
//! # Trade-offs
//!
//! | Aspect          | Standard Bloom     | Counting Bloom              |
//! |-----------------|--------------------|-----------------------------|
//! | Insert          | O(k)               | O(k)                        |
//! | Query           | O(k)               | O(k)                        |
//! | Delete          | Not supported      | O(k)                        |
//! | Space           | 1 bit per position | 8 bits per position         |
//! | False negatives | Never              | Only after unmatched removes |
//!
//! # Counter Saturation
//!
//! Counters are `u8` and saturate at 255 instead of wrapping. A saturated
//! counter under-reports how many keys share it, so later removals can clear
//! it early; every clipped increment is recorded in
//! [`saturation_events`](CountingBloomFilter::saturation_events).
//!
//! # Cardinality Estimation
//!
//! With X nonzero counters out of m and k probes per key:
//!
//! ```text
//! n* = -m × ln(1 - X/m) / k
//! ```
//!
//! (Swamidass & Baldi, 2007). Undefined when X = m.
//!
//! # Examples
//!
//! ```
//! use countbloom::CountingBloomFilter;
//!
//! let mut filter = CountingBloomFilter::new(10_000, 0.01).unwrap();
//!
//! filter.insert("hello");
//! filter.insert("world");
//! assert!(filter.contains("hello"));
//!
//! assert!(filter.delete("hello"));
//! assert!(!filter.contains("hello"));
//! assert!(filter.contains("world"));
//! ```
//!
//! # References
//!
//! - Fan, L., Cao, P., Almeida, J., & Broder, A. Z. (2000). "Summary cache: a scalable
//!   wide-area web cache sharing protocol". IEEE/ACM Transactions on Networking.
//! - Swamidass, S. J., & Baldi, P. (2007). "Mathematical correction for fingerprint
//!   similarity measures to improve chemical retrieval".

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::core::filter::CountingFilter;
use crate::core::key::key_bytes;
use crate::core::params::{expected_fp_rate, FilterConfig, Sizing};
use crate::error::{CountBloomError, Result};
use crate::hash::strategies::DoubleHashing;
use crate::hash::{BloomHasher, Murmur3Hasher};
use crate::serde_support::persist;
use std::any::Any;
use std::path::Path;
use tracing::{debug, trace};

/// Largest value a counter can hold.
pub const MAX_COUNTER: u8 = u8::MAX;

/// Counting Bloom filter over byte keys with 8-bit saturating counters.
///
/// # Type Parameters
///
/// * `H` - Hash function (defaults to [`Murmur3Hasher`])
///
/// # Memory Layout
///
/// ```text
/// CountingBloomFilter {
///     config: FilterConfig,      // capacity, error rate, identifier
///     sizing: Sizing,            // m counters, k probes
///     counters: Vec<u8>,         // m counters
///     nonzero: usize,            // counters > 0, kept in step with `counters`
///     saturation_events: u64,    // increments clipped at 255
///     hasher: H,
/// }
/// ```
///
/// # Thread Safety
///
/// Mutation takes `&mut self`; there is no internal locking. The filter is
/// `Send + Sync`, so shared references can be read from several threads.
#[derive(Debug, Clone)]
pub struct CountingBloomFilter<H = Murmur3Hasher>
where
    H: BloomHasher,
{
    config: FilterConfig,
    sizing: Sizing,
    counters: Vec<u8>,
    nonzero: usize,
    saturation_events: u64,
    hasher: H,
}

impl CountingBloomFilter<Murmur3Hasher> {
    /// Create an empty filter sized for `capacity` keys at `error_rate`.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`] if `capacity == 0` or
    /// `error_rate` is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use countbloom::CountingBloomFilter;
    ///
    /// let filter = CountingBloomFilter::new(1000, 0.005).unwrap();
    /// assert_eq!(filter.array_length(), 11028);
    /// assert_eq!(filter.hash_count(), 8);
    /// ```
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        Self::from_config(FilterConfig::new(capacity).with_error_rate(error_rate))
    }

    /// Create an empty filter from an explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`CountingBloomFilter::new`].
    pub fn from_config(config: FilterConfig) -> Result<Self> {
        Self::with_hasher(config, Murmur3Hasher::new())
    }

    /// Restore a filter persisted with [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// See [`persist::load`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        persist::load(dir.as_ref(), Murmur3Hasher::new())
    }
}

impl<H: BloomHasher> CountingBloomFilter<H> {
    /// Create an empty filter with a custom hasher.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`] if the configuration is
    /// invalid or the counter array cannot be allocated.
    pub fn with_hasher(config: FilterConfig, hasher: H) -> Result<Self> {
        let sizing = config.sizing()?;

        let mut counters = Vec::new();
        counters.try_reserve_exact(sizing.array_length).map_err(|_| {
            CountBloomError::invalid_configuration(format!(
                "cannot allocate {} counters",
                sizing.array_length
            ))
        })?;
        counters.resize(sizing.array_length, 0);

        Ok(Self {
            config,
            sizing,
            counters,
            nonzero: 0,
            saturation_events: 0,
            hasher,
        })
    }

    /// Rebuild a filter from a configuration and a counter array.
    ///
    /// Sizing is recomputed from `config`; the array must match it exactly.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`] if the configuration is
    /// invalid or `counters.len()` differs from the computed array length.
    pub fn from_counters(config: FilterConfig, hasher: H, counters: Vec<u8>) -> Result<Self> {
        let sizing = config.sizing()?;
        if counters.len() != sizing.array_length {
            return Err(CountBloomError::invalid_configuration(format!(
                "counter array has {} entries, configuration needs {}",
                counters.len(),
                sizing.array_length
            )));
        }

        Ok(Self {
            config,
            sizing,
            nonzero: counters.iter().filter(|&&c| c > 0).count(),
            counters,
            saturation_events: 0,
            hasher,
        })
    }

    /// Restore a persisted filter that was populated with `hasher`.
    ///
    /// # Errors
    ///
    /// See [`persist::load`].
    pub fn load_with_hasher(dir: impl AsRef<Path>, hasher: H) -> Result<Self> {
        persist::load(dir.as_ref(), hasher)
    }

    /// Write the counter array and metadata under `dir`, replacing any
    /// previous artifacts atomically.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::Io`] if the directory or either artifact cannot be written.
    ///
    /// # Examples
    ///
    /// ```
    /// use countbloom::CountingBloomFilter;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let mut filter = CountingBloomFilter::new(100, 0.01).unwrap();
    /// filter.insert("persisted");
    /// filter.save(dir.path()).unwrap();
    ///
    /// let restored = CountingBloomFilter::load(dir.path()).unwrap();
    /// assert!(restored.contains("persisted"));
    /// ```
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        persist::save(self, dir.as_ref())
    }

    /// Counter positions probed by `key`, in probe order.
    ///
    /// Positions can repeat when the array is small relative to the number of
    /// probes.
    #[must_use]
    pub fn indexes_for(&self, key: impl AsRef<[u8]>) -> Vec<usize> {
        let key = key.as_ref();
        let (h1, h2) = self.hasher.hash_pair(key);
        let indices = DoubleHashing.generate_indices(
            h1,
            h2,
            self.sizing.hash_count,
            self.sizing.array_length,
        );
        trace!(key_len = key.len(), ?indices, "generated counter indices");
        indices
    }

    /// Add `n` to every counter probed by `key`, saturating at 255.
    ///
    /// # Examples
    ///
    /// ```
    /// use countbloom::CountingBloomFilter;
    ///
    /// let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
    /// filter.add("page:/index.html", 3);
    /// assert!(filter.remove("page:/index.html", 2));
    /// assert!(filter.contains("page:/index.html"));
    /// ```
    pub fn add(&mut self, key: impl AsRef<[u8]>, n: u8) {
        if n == 0 {
            return;
        }
        for index in self.indexes_for(key) {
            self.increment(index, n);
        }
    }

    /// Add `key` once.
    #[inline]
    pub fn insert(&mut self, key: impl AsRef<[u8]>) {
        self.add(key, 1);
    }

    /// Subtract `n` from every counter probed by `key`.
    ///
    /// All or nothing: if any probed counter holds less than it would lose,
    /// nothing changes and `false` is returned. A position probed twice must
    /// hold at least `2n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use countbloom::CountingBloomFilter;
    ///
    /// let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
    /// filter.add("a", 1);
    /// assert!(!filter.remove("a", 2));
    /// assert!(filter.contains("a"));
    /// assert!(filter.remove("a", 1));
    /// assert!(!filter.contains("a"));
    /// ```
    pub fn remove(&mut self, key: impl AsRef<[u8]>, n: u8) -> bool {
        if n == 0 {
            return true;
        }

        let mut indices = self.indexes_for(key);
        indices.sort_unstable();

        let mut start = 0;
        while start < indices.len() {
            let index = indices[start];
            let run = indices[start..].iter().take_while(|&&i| i == index).count();
            if usize::from(self.counters[index]) < run * usize::from(n) {
                debug!(index, n, "removal rejected, counter would underflow");
                return false;
            }
            start += run;
        }

        for index in indices {
            self.decrement(index, n);
        }
        true
    }

    /// Remove `key` once.
    #[inline]
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> bool {
        self.remove(key, 1)
    }

    /// Subtract `n` from every counter holding at least `n`.
    ///
    /// Counters below `n` are left alone. Returns how many counters were
    /// decremented; `n == 0` changes nothing and returns 0.
    pub fn remove_all(&mut self, n: u8) -> usize {
        if n == 0 {
            return 0;
        }

        let mut decremented = 0;
        for counter in &mut self.counters {
            if *counter >= n {
                *counter -= n;
                decremented += 1;
                if *counter == 0 {
                    self.nonzero -= 1;
                }
            }
        }
        decremented
    }

    /// Whether every counter probed by `key` is nonzero.
    ///
    /// `false` is definitive; `true` may be a false positive.
    #[must_use]
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        let (h1, h2) = self.hasher.hash_pair(key.as_ref());
        DoubleHashing
            .probes(h1, h2, self.sizing.hash_count, self.sizing.array_length)
            .all(|index| self.counters[index] > 0)
    }

    /// Estimate the number of distinct keys currently represented.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::SaturatedEstimate`] when every counter is nonzero.
    ///
    /// # Examples
    ///
    /// ```
    /// use countbloom::CountingBloomFilter;
    ///
    /// let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
    /// assert_eq!(filter.estimate_count().unwrap(), 0.0);
    ///
    /// for i in 0..100 {
    ///     filter.insert(format!("key-{i}"));
    /// }
    /// let estimate = filter.estimate_count().unwrap();
    /// assert!((80.0..120.0).contains(&estimate));
    /// ```
    pub fn estimate_count(&self) -> Result<f64> {
        let m = self.sizing.array_length;
        if self.nonzero == 0 {
            return Ok(0.0);
        }
        if self.nonzero >= m {
            return Err(CountBloomError::saturated_estimate(m));
        }

        let m = m as f64;
        let fill = self.nonzero as f64 / m;
        Ok(-m * (1.0 - fill).ln() / self.sizing.hash_count as f64)
    }

    /// Subtract `n` from a single counter, clamping at zero.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::IndexOutOfBounds`] if `index >= array_length`.
    pub fn decrement_counter(&mut self, index: usize, n: u8) -> Result<()> {
        let length = self.counters.len();
        let counter = self
            .counters
            .get_mut(index)
            .ok_or_else(|| CountBloomError::index_out_of_bounds(index, length))?;

        if *counter > 0 {
            *counter = counter.saturating_sub(n);
            if *counter == 0 {
                self.nonzero -= 1;
            }
        }
        Ok(())
    }

    /// Dynamically typed [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidKeyType`] unless `key` is text or bytes.
    pub fn try_add(&mut self, key: &dyn Any, n: u8) -> Result<()> {
        let bytes = key_bytes(key)?;
        self.add(bytes, n);
        Ok(())
    }

    /// Dynamically typed [`remove`](Self::remove).
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidKeyType`] unless `key` is text or bytes.
    pub fn try_remove(&mut self, key: &dyn Any, n: u8) -> Result<bool> {
        let bytes = key_bytes(key)?;
        Ok(self.remove(bytes, n))
    }

    /// Dynamically typed [`contains`](Self::contains).
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidKeyType`] unless `key` is text or bytes.
    pub fn try_contains(&self, key: &dyn Any) -> Result<bool> {
        Ok(self.contains(key_bytes(key)?))
    }

    /// Add each key once.
    pub fn insert_batch<K: AsRef<[u8]>>(&mut self, keys: &[K]) {
        for key in keys {
            self.insert(key);
        }
    }

    /// Remove each key once.
    ///
    /// Returns how many removals succeeded.
    pub fn delete_batch<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> usize {
        keys.iter().filter(|key| self.delete(key)).count()
    }

    /// Query each key.
    #[must_use]
    pub fn contains_batch<K: AsRef<[u8]>>(&self, keys: &[K]) -> Vec<bool> {
        keys.iter().map(|key| self.contains(key)).collect()
    }

    /// Reset every counter and the saturation statistics.
    pub fn clear(&mut self) {
        self.counters.fill(0);
        self.nonzero = 0;
        self.saturation_events = 0;
    }

    /// Expected number of distinct keys the filter was sized for.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Target false positive rate at capacity.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        self.config.error_rate
    }

    /// Caller-supplied identifier, if any.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.config.identifier.as_deref()
    }

    /// Replace the identifier persisted with the filter.
    pub fn set_identifier(&mut self, identifier: Option<String>) {
        self.config.identifier = identifier;
    }

    /// Construction parameters, as persisted in the metadata artifact.
    #[must_use]
    pub fn metadata(&self) -> &FilterConfig {
        &self.config
    }

    /// Number of counters (m).
    #[must_use]
    #[inline]
    pub fn array_length(&self) -> usize {
        self.sizing.array_length
    }

    /// Number of counters probed per key (k).
    #[must_use]
    #[inline]
    pub fn hash_count(&self) -> usize {
        self.sizing.hash_count
    }

    /// Shape derived from the configuration.
    #[must_use]
    pub fn sizing(&self) -> Sizing {
        self.sizing
    }

    /// Raw counter values.
    #[must_use]
    pub fn counters(&self) -> &[u8] {
        &self.counters
    }

    /// Hasher in use.
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Number of nonzero counters.
    #[must_use]
    #[inline]
    pub fn count_nonzero(&self) -> usize {
        self.nonzero
    }

    /// Whether all counters are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nonzero == 0
    }

    /// Fraction of nonzero counters.
    #[must_use]
    pub fn fill_rate(&self) -> f64 {
        self.nonzero as f64 / self.sizing.array_length as f64
    }

    /// Estimate the current false positive rate from the estimated key count.
    ///
    /// Returns 1.0 once every counter is nonzero.
    #[must_use]
    pub fn estimate_fpr(&self) -> f64 {
        match self.estimate_count() {
            Ok(items) => expected_fp_rate(
                self.sizing.array_length,
                items.round() as usize,
                self.sizing.hash_count,
            ),
            Err(_) => 1.0,
        }
    }

    /// Largest counter value currently in the filter.
    #[must_use]
    pub fn max_counter_value(&self) -> u8 {
        self.counters.iter().copied().max().unwrap_or(0)
    }

    /// Number of counters stuck at 255.
    #[must_use]
    pub fn saturated_counter_count(&self) -> usize {
        self.counters.iter().filter(|&&c| c == MAX_COUNTER).count()
    }

    /// Number of increments clipped at 255 since construction or the last
    /// [`clear`](Self::clear). Not persisted.
    #[must_use]
    pub fn saturation_events(&self) -> u64 {
        self.saturation_events
    }

    #[inline]
    fn increment(&mut self, index: usize, n: u8) {
        let counter = &mut self.counters[index];
        if *counter == 0 {
            self.nonzero += 1;
        }
        match counter.checked_add(n) {
            Some(value) => *counter = value,
            None => {
                *counter = MAX_COUNTER;
                self.saturation_events += 1;
                debug!(index, n, "counter saturated at {}", MAX_COUNTER);
            }
        }
    }

    #[inline]
    fn decrement(&mut self, index: usize, n: u8) {
        let counter = &mut self.counters[index];
        *counter -= n;
        if *counter == 0 {
            self.nonzero -= 1;
        }
    }
}

impl<H: BloomHasher> CountingFilter for CountingBloomFilter<H> {
    fn add_bytes(&mut self, key: &[u8], n: u8) {
        self.add(key, n);
    }

    fn remove_bytes(&mut self, key: &[u8], n: u8) -> bool {
        self.remove(key, n)
    }

    fn contains_bytes(&self, key: &[u8]) -> bool {
        self.contains(key)
    }

    fn remove_all(&mut self, n: u8) -> usize {
        CountingBloomFilter::remove_all(self, n)
    }

    fn estimate_count(&self) -> Result<f64> {
        CountingBloomFilter::estimate_count(self)
    }

    fn array_length(&self) -> usize {
        self.sizing.array_length
    }

    fn hash_count(&self) -> usize {
        self.sizing.hash_count
    }

    fn count_nonzero(&self) -> usize {
        self.nonzero
    }
}
