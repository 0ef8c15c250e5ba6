//! countbloom: a counting Bloom filter with deletion, cardinality estimation
//! and on-disk persistence.
//!
//! A counting Bloom filter answers "have I probably seen this key?" like an
//! ordinary Bloom filter, but keeps a small counter per position instead of a
//! single bit. That makes it possible to:
//! - **Remove** keys again (all or nothing, never underflowing a counter)
//! - **Estimate** how many distinct keys are currently represented
//! - **Persist** the counters and reload them in a later process
//!
//! It can produce false positives, never false negatives for keys that were
//! added and not removed.
//!
//! # Quick Start
//!
//! ```
//! use countbloom::CountingBloomFilter;
//!
//! // Sized for 1,000 keys at a 0.2% false positive rate.
//! let mut filter = CountingBloomFilter::new(1000, 0.002).unwrap();
//! assert_eq!(filter.array_length(), 12935);
//! assert_eq!(filter.hash_count(), 9);
//!
//! filter.insert("hello");
//! filter.add("world", 3);
//!
//! assert!(filter.contains("hello"));
//! assert!(filter.remove("world", 2));
//! assert!(filter.contains("world"));
//! assert!(!filter.remove("world", 5));
//! ```
//!
//! # Persistence
//!
//! ```
//! use countbloom::CountingBloomFilter;
//!
//! let dir = tempfile::tempdir().unwrap();
//!
//! let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
//! filter.insert("session:42");
//! filter.save(dir.path()).unwrap();
//!
//! let restored = CountingBloomFilter::load(dir.path()).unwrap();
//! assert!(restored.contains("session:42"));
//! ```
//!
//! # Concurrency
//!
//! Mutation takes `&mut self`. For shared access from several threads use
//! [`sync::SharedCountingFilter`], which guards a filter with a
//! `parking_lot::Mutex`.
//!
//! # Logging
//!
//! The crate emits `tracing` events (saves, loads, rejected removals,
//! counter saturation) and never installs a subscriber itself.
//!
//! # Module Organization
//!
//! ```text
//! countbloom/
//! ├── core/           - FilterConfig, sizing, CountingFilter trait
//! ├── hash/           - BloomHasher implementations, double hashing
//! ├── filters/        - CountingBloomFilter
//! ├── builder/        - type-state builder
//! ├── serde_support/  - serde snapshots, .npy codec, directory persistence
//! └── sync/           - SharedCountingFilter
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::bool_assert_comparison)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

/// Core types and traits
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations
pub mod filters;

/// Hash functions and index generation
pub mod hash;

/// Type-safe builder
pub mod builder;

/// Serialization and persistence
pub mod serde_support;

/// Shared access across threads
pub mod sync;

// Re-export commonly used types at crate root
pub use error::{CountBloomError, Result};

pub use core::filter::CountingFilter;
pub use core::params::{compute_sizing, FilterConfig, Sizing, DEFAULT_ERROR_RATE};

pub use filters::{CountingBloomFilter, MAX_COUNTER};

pub use builder::CountingBloomFilterBuilder;

pub use sync::SharedCountingFilter;

pub use hash::BloomHasher;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use countbloom::prelude::*;
///
/// let mut filter = CountingBloomFilterBuilder::new()
///     .capacity(1000)
///     .build()
///     .unwrap();
/// filter.insert("hello");
/// assert!(filter.contains("hello"));
/// ```
pub mod prelude {
    pub use crate::builder::CountingBloomFilterBuilder;
    pub use crate::core::filter::CountingFilter;
    pub use crate::core::params::{FilterConfig, Sizing};
    pub use crate::error::{CountBloomError, Result};
    pub use crate::filters::CountingBloomFilter;
    pub use crate::hash::{BloomHasher, DefaultHasher, Murmur3Hasher};
    pub use crate::sync::SharedCountingFilter;

    #[cfg(feature = "xxhash")]
    pub use crate::hash::XxHasher;

    pub use crate::serde_support::CountingFilterSerdeSupport;
}
