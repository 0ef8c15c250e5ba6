//! Filter implementations.
//!
//! - [`CountingBloomFilter`] - 8-bit counters, supports deletion and
//!   cardinality estimation, persists to disk
//!
//! # Examples
//!
//! ```
//! use countbloom::filters::CountingBloomFilter;
//!
//! let mut filter = CountingBloomFilter::new(10_000, 0.01).unwrap();
//! filter.insert("temporary");
//! assert!(filter.contains("temporary"));
//! filter.delete("temporary");
//! assert!(!filter.contains("temporary"));
//! ```

pub mod counting;

pub use counting::{CountingBloomFilter, MAX_COUNTER};
