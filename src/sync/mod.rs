//! Thread-safe access to a counting Bloom filter.
//!
//! [`CountingBloomFilter`](crate::CountingBloomFilter) itself is single-writer:
//! every mutation takes `&mut self`. [`SharedCountingFilter`] wraps one in a
//! `parking_lot::Mutex` so it can sit behind an `Arc` and be used from many
//! threads with `&self` methods.
//!
//! Each call holds the lock for one whole operation, so an `add` or `remove`
//! is never observed half-applied and the all-or-nothing removal check runs
//! against a stable view of the counters.
//!
//! # Examples
//!
//! ```
//! use countbloom::sync::SharedCountingFilter;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let filter = Arc::new(SharedCountingFilter::new(10_000, 0.01).unwrap());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let filter = Arc::clone(&filter);
//!         thread::spawn(move || {
//!             for i in 0..100 {
//!                 filter.insert(format!("{t}:{i}"));
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert!(filter.contains("3:99"));
//! ```

pub mod shared;

pub use shared::SharedCountingFilter;
