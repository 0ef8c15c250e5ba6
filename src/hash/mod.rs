//! Hash functions and index generation.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs      - BloomHasher trait and Murmur3Hasher (default)
//! ├── strategies.rs  - DoubleHashing index generation
//! ├── xxhash.rs      - XXH3-128 hasher (feature = "xxhash")
//! └── mod.rs         - This file (public API)
//! ```
//!
//! # Choosing a Hash Function
//!
//! | Hash Function     | Speed     | Use Case                                  |
//! |-------------------|-----------|-------------------------------------------|
//! | [`Murmur3Hasher`] | Fast      | Default, interoperable with mmh3 tooling  |
//! | `XxHasher`        | Very fast | Long keys, filters owned by this crate    |
//!
//! # Examples
//!
//! ```
//! use countbloom::hash::{BloomHasher, DoubleHashing, Murmur3Hasher};
//!
//! let (h1, h2) = Murmur3Hasher::new().hash_pair(b"test");
//! let indices = DoubleHashing.generate_indices(h1, h2, 7, 1000);
//! assert_eq!(indices.len(), 7);
//! ```

pub mod hasher;
pub mod strategies;

#[cfg(feature = "xxhash")]
pub mod xxhash;

pub use hasher::{BloomHasher, Murmur3Hasher};
pub use strategies::{DoubleHashing, Probes};

#[cfg(feature = "xxhash")]
pub use xxhash::XxHasher;

/// Hasher used when none is specified.
pub type DefaultHasher = Murmur3Hasher;

/// Counter positions for `key` in a filter of `array_length` counters.
///
/// This is the free-standing form of the index generator; filters call it
/// through [`CountingBloomFilter::indexes_for`](crate::CountingBloomFilter::indexes_for).
///
/// # Examples
///
/// ```
/// use countbloom::hash::{indexes_for, Murmur3Hasher};
///
/// let indices = indexes_for(&Murmur3Hasher::new(), b"key", 100, 4);
/// assert_eq!(indices.len(), 4);
/// assert!(indices.iter().all(|&i| i < 100));
/// ```
#[must_use]
pub fn indexes_for<H: BloomHasher + ?Sized>(
    hasher: &H,
    key: &[u8],
    array_length: usize,
    hash_count: usize,
) -> Vec<usize> {
    let (h1, h2) = hasher.hash_pair(key);
    DoubleHashing.generate_indices(h1, h2, hash_count, array_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_for_is_pure() {
        let hasher = Murmur3Hasher::new();
        let a = indexes_for(&hasher, b"alpha", 11_028, 8);
        let b = indexes_for(&hasher, b"alpha", 11_028, 8);
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
        assert!(a.iter().all(|&i| i < 11_028));
    }

    #[test]
    fn test_indexes_depend_on_key() {
        let hasher = DefaultHasher::default();
        assert_ne!(
            indexes_for(&hasher, b"alpha", 11_028, 8),
            indexes_for(&hasher, b"beta", 11_028, 8)
        );
    }

    #[test]
    fn test_dyn_hasher() {
        let hasher: Box<dyn BloomHasher> = Box::new(Murmur3Hasher::new());
        let indices = indexes_for(hasher.as_ref(), b"dyn", 64, 3);
        assert_eq!(indices, indexes_for(&Murmur3Hasher::new(), b"dyn", 64, 3));
    }

    #[cfg(feature = "xxhash")]
    #[test]
    fn test_all_hashers_in_range() {
        let hashers: [&dyn BloomHasher; 2] = [&Murmur3Hasher::new(), &XxHasher::new()];
        for hasher in hashers {
            for key in ["", "a", "a much longer key that spans several blocks of input"] {
                let indices = indexes_for(hasher, key.as_bytes(), 97, 9);
                assert!(indices.iter().all(|&i| i < 97), "{}", hasher.name());
            }
        }
    }
}
