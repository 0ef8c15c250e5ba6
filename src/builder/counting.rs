//! Builder for counting Bloom filters.
//!
//! # Type-State Pattern
//!
//! ```text
//! Initial → WithCapacity → Complete → CountingBloomFilter
//!     ↓          ↓             ↓
//!  .capacity()  .error_rate()  .build()
//!                ↓
//!             .build()   (default error rate 0.005)
//! ```
//!
//! `identifier` and `hasher` may be set in any state.
//!
//! # Examples
//!
//! ## Minimal Configuration
//!
//! ```
//! use countbloom::builder::CountingBloomFilterBuilder;
//!
//! let filter = CountingBloomFilterBuilder::new()
//!     .capacity(1000)
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.error_rate(), 0.005);
//! assert_eq!(filter.array_length(), 11028);
//! ```
//!
//! ## Full Configuration
//!
//! ```
//! use countbloom::builder::CountingBloomFilterBuilder;
//! use countbloom::hash::Murmur3Hasher;
//!
//! let filter = CountingBloomFilterBuilder::new()
//!     .capacity(10_000)
//!     .error_rate(0.01)
//!     .identifier("sessions")
//!     .hasher(Murmur3Hasher::with_seed(7))
//!     .build()
//!     .unwrap();
//! assert_eq!(filter.identifier(), Some("sessions"));
//! ```

#![allow(clippy::cast_precision_loss)]

use crate::core::params::{FilterConfig, DEFAULT_ERROR_RATE};
use crate::error::Result;
use crate::filters::counting::CountingBloomFilter;
use crate::hash::{BloomHasher, DefaultHasher};
use std::marker::PhantomData;

/// Type-state marker: Initial state.
pub struct Initial;

/// Type-state marker: Capacity is set.
pub struct WithCapacity;

/// Type-state marker: All parameters set.
pub struct Complete;

/// Builder for counting Bloom filters with type-state guarantees.
///
/// # Type Parameters
///
/// - `State`: Current builder state
/// - `H`: Hash function type
///
/// # Memory
///
/// One byte per counter; see [`CountingFilterMetadata::memory_bytes`].
pub struct CountingBloomFilterBuilder<State, H = DefaultHasher> {
    capacity: usize,
    error_rate: f64,
    identifier: Option<String>,
    hasher: H,
    _state: PhantomData<State>,
}

impl CountingBloomFilterBuilder<Initial, DefaultHasher> {
    /// Create a new counting filter builder.
    ///
    /// Defaults:
    /// - `error_rate`: 0.005
    /// - `hasher`: [`Murmur3Hasher`](crate::hash::Murmur3Hasher) with seed 0
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: 0,
            error_rate: DEFAULT_ERROR_RATE,
            identifier: None,
            hasher: DefaultHasher::new(),
            _state: PhantomData,
        }
    }
}

impl Default for CountingBloomFilterBuilder<Initial, DefaultHasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<State, H> CountingBloomFilterBuilder<State, H> {
    fn transition<Next>(self) -> CountingBloomFilterBuilder<Next, H> {
        CountingBloomFilterBuilder {
            capacity: self.capacity,
            error_rate: self.error_rate,
            identifier: self.identifier,
            hasher: self.hasher,
            _state: PhantomData,
        }
    }

    /// Attach an identifier persisted with the filter (optional).
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Use a custom hasher (optional).
    ///
    /// A filter must be restored with the hasher that populated it.
    #[must_use]
    pub fn hasher<H2: BloomHasher>(self, hasher: H2) -> CountingBloomFilterBuilder<State, H2> {
        CountingBloomFilterBuilder {
            capacity: self.capacity,
            error_rate: self.error_rate,
            identifier: self.identifier,
            hasher,
            _state: PhantomData,
        }
    }
}

impl<H> CountingBloomFilterBuilder<Initial, H> {
    /// Set the expected number of distinct keys.
    ///
    /// Required parameter. Transitions to `WithCapacity` state.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> CountingBloomFilterBuilder<WithCapacity, H> {
        self.capacity = capacity;
        self.transition()
    }
}

impl<H> CountingBloomFilterBuilder<WithCapacity, H> {
    /// Set the target false positive rate at capacity.
    ///
    /// Transitions to `Complete` state.
    #[must_use]
    pub fn error_rate(mut self, error_rate: f64) -> CountingBloomFilterBuilder<Complete, H> {
        self.error_rate = error_rate;
        self.transition()
    }
}

impl<H: BloomHasher> CountingBloomFilterBuilder<WithCapacity, H> {
    /// Build with the default error rate.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`](crate::CountBloomError::InvalidConfiguration)
    /// if `capacity == 0`.
    pub fn build(self) -> Result<CountingBloomFilter<H>> {
        self.transition::<Complete>().build()
    }
}

impl<H: BloomHasher> CountingBloomFilterBuilder<Complete, H> {
    fn config(&self) -> FilterConfig {
        FilterConfig {
            capacity: self.capacity,
            error_rate: self.error_rate,
            identifier: self.identifier.clone(),
        }
    }

    /// Build the counting Bloom filter.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`](crate::CountBloomError::InvalidConfiguration)
    /// if `capacity == 0` or the error rate is not in (0, 1).
    ///
    /// # Examples
    ///
    /// ```
    /// use countbloom::builder::CountingBloomFilterBuilder;
    ///
    /// let mut filter = CountingBloomFilterBuilder::new()
    ///     .capacity(10_000)
    ///     .error_rate(0.01)
    ///     .build()
    ///     .unwrap();
    ///
    /// filter.insert("hello");
    /// assert!(filter.contains("hello"));
    /// filter.delete("hello");
    /// assert!(!filter.contains("hello"));
    /// ```
    pub fn build(self) -> Result<CountingBloomFilter<H>> {
        let config = self.config();
        CountingBloomFilter::with_hasher(config, self.hasher)
    }

    /// Build the filter and return it with derived metadata.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with_metadata(self) -> Result<(CountingBloomFilter<H>, CountingFilterMetadata)> {
        let filter = self.build()?;
        let metadata = CountingFilterMetadata {
            capacity: filter.capacity(),
            error_rate: filter.error_rate(),
            array_length: filter.array_length(),
            hash_count: filter.hash_count(),
            hasher: filter.hasher().name(),
        };
        Ok((filter, metadata))
    }
}

/// Metadata about a constructed counting filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingFilterMetadata {
    /// Expected number of distinct keys
    pub capacity: usize,
    /// Target false positive rate
    pub error_rate: f64,
    /// Number of counters
    pub array_length: usize,
    /// Counters probed per key
    pub hash_count: usize,
    /// Name of the hash function
    pub hasher: &'static str,
}

impl CountingFilterMetadata {
    /// Memory taken by the counters, in bytes.
    #[must_use]
    pub fn memory_bytes(&self) -> usize {
        self.array_length
    }

    /// Memory taken by the counters, in kilobytes.
    #[must_use]
    pub fn memory_kb(&self) -> f64 {
        self.memory_bytes() as f64 / 1024.0
    }

    /// Counter bits spent per expected key.
    #[must_use]
    pub fn bits_per_key(&self) -> f64 {
        (self.array_length * 8) as f64 / self.capacity as f64
    }
}
