//! Serde snapshots of counting Bloom filters.
//!
//! Implements `Serialize`/`Deserialize` for [`CountingBloomFilter`], preserving
//! counter values so removals keep working after a round trip.
//!
//! # Format
//!
//! The serialized form carries:
//! - Format version
//! - Construction parameters (capacity, error rate, identifier)
//! - Counter data, one byte per counter
//!
//! Sizing is recomputed on deserialization and must agree with the number of
//! counters. The hasher is not part of the snapshot; the receiving side must
//! use the same one.
//!
//! # Examples
//!
//! ```
//! use countbloom::CountingBloomFilter;
//!
//! let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
//! filter.insert("hello");
//! filter.insert("hello");
//! filter.insert("world");
//!
//! let bytes = bincode::serialize(&filter).unwrap();
//! let mut restored: CountingBloomFilter = bincode::deserialize(&bytes).unwrap();
//!
//! restored.delete("hello");
//! assert!(restored.contains("hello"));
//! restored.delete("hello");
//! assert!(!restored.contains("hello"));
//! ```

use super::SERIALIZATION_VERSION;
use crate::core::params::FilterConfig;
use crate::error::{CountBloomError, Result};
use crate::filters::counting::CountingBloomFilter;
use crate::hash::BloomHasher;
use serde::{Deserialize, Serialize};

/// Serializable representation of a counting Bloom filter.
///
/// Plain fields rather than an embedded [`FilterConfig`] so that
/// non-self-describing formats such as bincode can decode it.
#[derive(Debug, Serialize, Deserialize)]
struct CountingBloomFilterSerde {
    /// Format version
    version: u16,
    /// Expected number of keys
    capacity: usize,
    /// Target false positive rate
    error: f64,
    /// Caller-supplied identifier
    id: Option<String>,
    /// One byte per counter
    counters: Vec<u8>,
}

impl CountingBloomFilterSerde {
    fn from_filter<H: BloomHasher>(filter: &CountingBloomFilter<H>) -> Self {
        let config = filter.metadata();
        Self {
            version: SERIALIZATION_VERSION,
            capacity: config.capacity,
            error: config.error_rate,
            id: config.identifier.clone(),
            counters: filter.counters().to_vec(),
        }
    }

    fn into_filter<H: BloomHasher + Default>(self) -> Result<CountingBloomFilter<H>> {
        if self.version != SERIALIZATION_VERSION {
            return Err(CountBloomError::serialization(format!(
                "incompatible serialization version: expected {}, got {}",
                SERIALIZATION_VERSION, self.version
            )));
        }

        let config = FilterConfig {
            capacity: self.capacity,
            error_rate: self.error,
            identifier: self.id,
        };
        CountingBloomFilter::from_counters(config, H::default(), self.counters)
    }
}

impl<H: BloomHasher> Serialize for CountingBloomFilter<H> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        CountingBloomFilterSerde::from_filter(self).serialize(serializer)
    }
}

impl<'de, H: BloomHasher + Default> Deserialize<'de> for CountingBloomFilter<H> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        CountingBloomFilterSerde::deserialize(deserializer)?
            .into_filter()
            .map_err(serde::de::Error::custom)
    }
}

/// Helper type for counting filter serde support.
pub struct CountingFilterSerdeSupport;

impl CountingFilterSerdeSupport {
    /// Estimate the bincode snapshot size in bytes.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`] for an invalid configuration.
    pub fn estimate_size(config: &FilterConfig) -> Result<usize> {
        let sizing = config.sizing()?;
        // version + capacity + error + counter length prefix
        let fixed = 2 + 8 + 8 + 8;
        // Option tag, then length prefix and bytes.
        let id = config.identifier.as_ref().map_or(1, |id| 1 + 8 + id.len());
        Ok(fixed + id + sizing.array_length)
    }

    /// Serialize to bytes using bincode.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::Serialization`] if encoding fails.
    pub fn to_bytes<H: BloomHasher>(filter: &CountingBloomFilter<H>) -> Result<Vec<u8>> {
        bincode::serialize(filter).map_err(|e| CountBloomError::serialization(e.to_string()))
    }

    /// Deserialize from bytes using bincode.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::Serialization`] if the bytes are not a valid snapshot.
    pub fn from_bytes<H: BloomHasher + Default>(bytes: &[u8]) -> Result<CountingBloomFilter<H>> {
        bincode::deserialize(bytes).map_err(|e| CountBloomError::serialization(e.to_string()))
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::Serialization`] if encoding fails.
    pub fn to_json<H: BloomHasher>(filter: &CountingBloomFilter<H>) -> Result<String> {
        serde_json::to_string(filter).map_err(|e| CountBloomError::serialization(e.to_string()))
    }

    /// Deserialize from a JSON string.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::Serialization`] if the text is not a valid snapshot.
    pub fn from_json<H: BloomHasher + Default>(json: &str) -> Result<CountingBloomFilter<H>> {
        serde_json::from_str(json).map_err(|e| CountBloomError::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::DefaultHasher;

    #[test]
    fn test_serialize_deserialize_bincode() {
        let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
        filter.insert("hello");
        filter.insert("hello");
        filter.insert("world");

        let bytes = bincode::serialize(&filter).unwrap();
        assert!(!bytes.is_empty());

        let mut restored: CountingBloomFilter<DefaultHasher> =
            bincode::deserialize(&bytes).unwrap();
        assert!(restored.contains("hello"));
        assert!(restored.contains("world"));

        assert!(restored.delete("hello"));
        assert!(restored.contains("hello"));
        assert!(restored.delete("hello"));
        assert!(!restored.contains("hello"));
    }

    #[test]
    fn test_serialize_deserialize_json() {
        let mut filter = CountingBloomFilter::from_config(
            FilterConfig::new(100).with_error_rate(0.01).with_identifier("json"),
        )
        .unwrap();
        filter.insert("test");

        let json = serde_json::to_string(&filter).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["capacity"], 100);
        assert_eq!(value["id"], "json");

        let restored: CountingBloomFilter = serde_json::from_str(&json).unwrap();
        assert!(restored.contains("test"));
        assert_eq!(restored.identifier(), Some("json"));
    }

    #[test]
    fn test_helper_methods() {
        let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
        filter.insert("hello");

        let bytes = CountingFilterSerdeSupport::to_bytes(&filter).unwrap();
        let restored: CountingBloomFilter =
            CountingFilterSerdeSupport::from_bytes(&bytes).unwrap();
        assert_eq!(restored.counters(), filter.counters());

        let json = CountingFilterSerdeSupport::to_json(&filter).unwrap();
        let restored: CountingBloomFilter = CountingFilterSerdeSupport::from_json(&json).unwrap();
        assert_eq!(restored.counters(), filter.counters());
    }

    #[test]
    fn test_estimate_size_matches_bincode() {
        let config = FilterConfig::new(1000).with_error_rate(0.01).with_identifier("abc");
        let filter = CountingBloomFilter::from_config(config.clone()).unwrap();
        let bytes = CountingFilterSerdeSupport::to_bytes(&filter).unwrap();
        assert_eq!(CountingFilterSerdeSupport::estimate_size(&config).unwrap(), bytes.len());

        assert!(CountingFilterSerdeSupport::estimate_size(&FilterConfig::new(0)).is_err());
    }

    #[test]
    fn test_multiple_insertions_preserved() {
        let mut filter = CountingBloomFilter::new(100, 0.01).unwrap();
        filter.add("test", 5);

        let bytes = bincode::serialize(&filter).unwrap();
        let mut restored: CountingBloomFilter = bincode::deserialize(&bytes).unwrap();

        for _ in 0..5 {
            assert!(restored.contains("test"));
            assert!(restored.delete("test"));
        }
        assert!(!restored.contains("test"));
    }

    #[test]
    fn test_empty_filter() {
        let filter = CountingBloomFilter::new(1000, 0.01).unwrap();
        let bytes = bincode::serialize(&filter).unwrap();
        let restored: CountingBloomFilter = bincode::deserialize(&bytes).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.estimate_count().unwrap(), 0.0);
    }

    #[test]
    fn test_version_mismatch() {
        let repr = CountingBloomFilterSerde {
            version: 99,
            capacity: 1000,
            error: 0.01,
            id: None,
            counters: vec![0; 9586],
        };
        let err = repr.into_filter::<DefaultHasher>().unwrap_err();
        assert!(matches!(err, CountBloomError::Serialization { .. }));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_oversized_capacity_is_rejected_without_allocating() {
        let mut filter = CountingBloomFilter::new(100, 0.005).unwrap();
        for i in 0..10 {
            filter.insert(&format!("key-{i}"));
        }

        let json = CountingFilterSerdeSupport::to_json(&filter)
            .unwrap()
            .replace("\"capacity\":100", "\"capacity\":1000000000000000");
        let err = CountingFilterSerdeSupport::from_json::<DefaultHasher>(&json).unwrap_err();
        assert!(matches!(err, CountBloomError::Serialization { .. }));

        let bytes = bincode::serialize(&CountingBloomFilterSerde {
            version: SERIALIZATION_VERSION,
            capacity: 1_000_000_000_000_000,
            error: 0.005,
            id: None,
            counters: filter.counters().to_vec(),
        })
        .unwrap();
        let err = CountingFilterSerdeSupport::from_bytes::<DefaultHasher>(&bytes).unwrap_err();
        assert!(matches!(err, CountBloomError::Serialization { .. }));
    }

    #[test]
    fn test_counter_data_size_mismatch() {
        let repr = CountingBloomFilterSerde {
            version: SERIALIZATION_VERSION,
            capacity: 1000,
            error: 0.01,
            id: None,
            counters: vec![0; 100],
        };
        assert!(repr.into_filter::<DefaultHasher>().is_err());

        let bytes = bincode::serialize(&CountingBloomFilterSerde {
            version: SERIALIZATION_VERSION,
            capacity: 1000,
            error: 0.01,
            id: None,
            counters: vec![0; 100],
        })
        .unwrap();
        let err = CountingFilterSerdeSupport::from_bytes::<DefaultHasher>(&bytes).unwrap_err();
        assert!(matches!(err, CountBloomError::Serialization { .. }));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let json = r#"{"version":1,"capacity":0,"error":0.01,"id":null,"counters":[]}"#;
        assert!(CountingFilterSerdeSupport::from_json::<DefaultHasher>(json).is_err());
    }

    #[test]
    fn test_deletion_after_deserialization() {
        let mut filter = CountingBloomFilter::new(1000, 0.01).unwrap();
        for i in 0..100 {
            filter.insert(i.to_string());
        }

        let bytes = bincode::serialize(&filter).unwrap();
        let mut restored: CountingBloomFilter = bincode::deserialize(&bytes).unwrap();

        for i in 0..50 {
            assert!(restored.delete(i.to_string()));
        }
        for i in 50..100 {
            assert!(restored.contains(i.to_string()));
        }
        assert_eq!(restored.count_nonzero(), {
            restored.counters().iter().filter(|&&c| c > 0).count()
        });
    }
}
