//! Mutex-guarded counting Bloom filter.

use crate::core::params::FilterConfig;
use crate::error::Result;
use crate::filters::counting::CountingBloomFilter;
use crate::hash::{BloomHasher, Murmur3Hasher};
use parking_lot::{Mutex, MutexGuard};
use std::path::Path;

/// A [`CountingBloomFilter`] usable through `&self` from several threads.
///
/// Every method acquires the lock for the duration of a single operation.
/// Use [`lock`](Self::lock) to run several operations under one acquisition.
#[derive(Debug)]
pub struct SharedCountingFilter<H = Murmur3Hasher>
where
    H: BloomHasher,
{
    inner: Mutex<CountingBloomFilter<H>>,
}

impl SharedCountingFilter<Murmur3Hasher> {
    /// Create an empty shared filter with the default hasher.
    ///
    /// # Errors
    ///
    /// Same as [`CountingBloomFilter::new`].
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        CountingBloomFilter::new(capacity, error_rate).map(Self::from_filter)
    }

    /// Create an empty shared filter from a configuration.
    ///
    /// # Errors
    ///
    /// Same as [`CountingBloomFilter::from_config`].
    pub fn from_config(config: FilterConfig) -> Result<Self> {
        CountingBloomFilter::from_config(config).map(Self::from_filter)
    }

    /// Load a persisted filter with the default hasher.
    ///
    /// # Errors
    ///
    /// Same as [`CountingBloomFilter::load`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        CountingBloomFilter::load(dir).map(Self::from_filter)
    }
}

impl<H: BloomHasher> SharedCountingFilter<H> {
    /// Wrap an existing filter.
    #[must_use]
    pub fn from_filter(filter: CountingBloomFilter<H>) -> Self {
        Self {
            inner: Mutex::new(filter),
        }
    }

    /// Add `n` occurrences of `key`.
    pub fn add(&self, key: impl AsRef<[u8]>, n: u8) {
        self.inner.lock().add(key, n);
    }

    /// Add one occurrence of `key`.
    pub fn insert(&self, key: impl AsRef<[u8]>) {
        self.add(key, 1);
    }

    /// Remove `n` occurrences of `key`, all or nothing.
    pub fn remove(&self, key: impl AsRef<[u8]>, n: u8) -> bool {
        self.inner.lock().remove(key, n)
    }

    /// Remove one occurrence of `key`.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> bool {
        self.remove(key, 1)
    }

    /// Decrement every counter holding at least `n`.
    pub fn remove_all(&self, n: u8) -> usize {
        self.inner.lock().remove_all(n)
    }

    /// Whether `key` is probably present.
    pub fn contains(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.lock().contains(key)
    }

    /// Estimate the number of distinct keys.
    ///
    /// # Errors
    ///
    /// Same as [`CountingBloomFilter::estimate_count`].
    pub fn estimate_count(&self) -> Result<f64> {
        self.inner.lock().estimate_count()
    }

    /// Number of nonzero counters.
    pub fn count_nonzero(&self) -> usize {
        self.inner.lock().count_nonzero()
    }

    /// Reset every counter to zero.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Persist a consistent snapshot of the filter under `dir`.
    ///
    /// The lock is held while both artifacts are written.
    ///
    /// # Errors
    ///
    /// Same as [`CountingBloomFilter::save`].
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        self.inner.lock().save(dir)
    }

    /// Acquire the lock for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, CountingBloomFilter<H>> {
        self.inner.lock()
    }

    /// Unwrap the inner filter.
    #[must_use]
    pub fn into_inner(self) -> CountingBloomFilter<H> {
        self.inner.into_inner()
    }
}

impl<H: BloomHasher> From<CountingBloomFilter<H>> for SharedCountingFilter<H> {
    fn from(filter: CountingBloomFilter<H>) -> Self {
        Self::from_filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_inserts_are_all_visible() {
        let filter = Arc::new(SharedCountingFilter::new(10_000, 0.01).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    for i in 0..250 {
                        filter.insert(format!("t{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..8 {
            for i in 0..250 {
                assert!(filter.contains(format!("t{t}-{i}")));
            }
        }
    }

    #[test]
    fn test_concurrent_add_then_remove_drains() {
        let filter = Arc::new(SharedCountingFilter::new(1000, 0.01).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    for _ in 0..50 {
                        filter.insert("hot");
                    }
                    for _ in 0..50 {
                        assert!(filter.delete("hot"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(!filter.contains("hot"));
        assert_eq!(filter.count_nonzero(), 0);
    }

    #[test]
    fn test_lock_groups_operations() {
        let filter = SharedCountingFilter::new(100, 0.01).unwrap();
        {
            let mut guard = filter.lock();
            guard.add("a", 3);
            assert!(guard.remove("a", 2));
        }
        assert!(filter.contains("a"));

        let mut distinct = filter.lock().indexes_for("a");
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(filter.remove_all(1), distinct.len());
        assert!(filter.into_inner().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let filter = SharedCountingFilter::new(100, 0.01).unwrap();
        filter.insert("persisted");
        filter.save(dir.path()).unwrap();

        let restored = SharedCountingFilter::load(dir.path()).unwrap();
        assert!(restored.contains("persisted"));
        restored.clear();
        assert_eq!(restored.estimate_count().unwrap(), 0.0);
    }
}
