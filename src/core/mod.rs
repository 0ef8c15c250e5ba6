//! Core types, traits, and utilities.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── filter.rs    - CountingFilter trait
//! ├── key.rs       - runtime key validation for `dyn Any` callers
//! ├── params.rs    - FilterConfig and sizing
//! └── mod.rs       - This file (public API)
//! ```
//!
//! # Examples
//!
//! ```
//! use countbloom::core::{compute_sizing, FilterConfig};
//!
//! let config = FilterConfig::new(10_000).with_error_rate(0.01);
//! let sizing = compute_sizing(config.capacity, config.error_rate).unwrap();
//! assert_eq!(sizing, config.sizing().unwrap());
//! ```

pub mod filter;
pub mod key;
pub mod params;

pub use filter::CountingFilter;
pub use key::key_bytes;
pub use params::{compute_sizing, expected_fp_rate, FilterConfig, Sizing, DEFAULT_ERROR_RATE};
