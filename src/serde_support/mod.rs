//! Serialization and persistence for counting Bloom filters.
//!
//! Two independent ways to get a filter out of process memory:
//!
//! ## Directory persistence
//!
//! [`persist`] writes a filter as two artifacts, a NumPy `.npy` counter array
//! and a JSON metadata document. The layout is readable by other tooling and
//! is what [`CountingBloomFilter::save`](crate::CountingBloomFilter::save) and
//! [`CountingBloomFilter::load`](crate::CountingBloomFilter::load) use.
//!
//! ```
//! use countbloom::CountingBloomFilter;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
//! filter.insert("hello");
//! filter.save(dir.path()).unwrap();
//!
//! assert!(dir.path().join("bloom.npy").exists());
//! assert!(dir.path().join("meta.json").exists());
//! ```
//!
//! ## Serde snapshots
//!
//! [`CountingBloomFilter`](crate::CountingBloomFilter) implements `Serialize`
//! and `Deserialize`, so it can be embedded in any serde format. Helpers for
//! bincode and JSON live on [`CountingFilterSerdeSupport`].
//!
//! ```
//! use countbloom::CountingBloomFilter;
//! use countbloom::serde_support::CountingFilterSerdeSupport;
//!
//! let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
//! filter.insert("hello");
//!
//! let bytes = CountingFilterSerdeSupport::to_bytes(&filter).unwrap();
//! let restored: CountingBloomFilter = CountingFilterSerdeSupport::from_bytes(&bytes).unwrap();
//! assert!(restored.contains("hello"));
//! ```
//!
//! # Versioning and Compatibility
//!
//! Snapshots carry [`SERIALIZATION_VERSION`]; a mismatch is rejected on
//! deserialization. The directory format has no version field and follows the
//! `.npy` specification for the array.
//!
//! Neither format records the hasher. Restoring with a different hasher than
//! the one that populated the filter silently breaks membership queries.

pub mod counting;
pub mod npy;
pub mod persist;

pub use counting::CountingFilterSerdeSupport;
pub use npy::NpyError;
pub use persist::{ARRAY_FILE, METADATA_FILE};

/// Serialization version for snapshots.
///
/// Increment this when making breaking changes to the snapshot format.
pub const SERIALIZATION_VERSION: u16 = 1;
