//! Builder for counting Bloom filter construction.
//!
//! The builder uses the type-state pattern: `build` only becomes available
//! once a capacity has been supplied, so forgetting it is a compile error
//! rather than a runtime one. Out-of-range values are still reported at
//! runtime by `build`.
//!
//! # Examples
//!
//! ```
//! use countbloom::builder::CountingBloomFilterBuilder;
//!
//! let mut filter = CountingBloomFilterBuilder::new()
//!     .capacity(10_000)
//!     .error_rate(0.01)
//!     .build()
//!     .unwrap();
//!
//! filter.insert("item");
//! assert!(filter.contains("item"));
//! ```
//!
//! Forgetting the capacity does not compile:
//!
//! ```compile_fail
//! use countbloom::builder::CountingBloomFilterBuilder;
//!
//! let filter = CountingBloomFilterBuilder::new().build();
//! ```

pub mod counting;

pub use counting::{CountingBloomFilterBuilder, CountingFilterMetadata};
