//! Sizing for counting Bloom filters.
//!
//! Given:
//! - `n`: expected number of distinct keys (capacity)
//! - `ε`: target false positive rate at full capacity
//!
//! The filter is sized with the standard optimal-parameter equations, biased
//! upward by one so neither value can be zero:
//!
//! ```text
//! m = floor(-n × ln(ε) / (ln 2)²) + 1     counters
//! k = floor((m / n) × ln 2) + 1           hash positions per key
//! ```
//!
//! Sizing runs once, at construction. A loaded filter recomputes it from its
//! persisted [`FilterConfig`], never from the length of the persisted array.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Kirsch & Mitzenmacher (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{CountBloomError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::LN_2;

/// (ln 2)² ≈ 0.4804530139182014
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Error rate used by [`FilterConfig::new`].
pub const DEFAULT_ERROR_RATE: f64 = 0.005;

/// Derived shape of a filter: how many counters and how many probes per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sizing {
    /// Number of counters (m). Always >= 1.
    pub array_length: usize,
    /// Number of counter positions probed per key (k). Always >= 1.
    pub hash_count: usize,
}

/// Explicit construction parameters for a counting Bloom filter.
///
/// This is also the metadata record persisted next to the counter array, so
/// the serialized field names (`capacity`, `error`, `id`) are part of the
/// on-disk format.
///
/// # Examples
///
/// ```
/// use countbloom::core::params::FilterConfig;
///
/// let config = FilterConfig::new(1000).with_error_rate(0.01).with_identifier("sessions");
/// let sizing = config.sizing().unwrap();
/// assert!(sizing.array_length > 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Expected number of distinct keys.
    pub capacity: usize,

    /// Target false positive probability at full capacity.
    #[serde(rename = "error")]
    pub error_rate: f64,

    /// Caller-supplied tag. Persisted, never used by the algorithm.
    #[serde(rename = "id", default, deserialize_with = "deserialize_identifier")]
    pub identifier: Option<String>,
}

impl FilterConfig {
    /// Configuration for `capacity` keys at the default error rate (0.5%).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            error_rate: DEFAULT_ERROR_RATE,
            identifier: None,
        }
    }

    /// Replace the target error rate.
    #[must_use]
    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }

    /// Attach a caller-supplied identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Check capacity and error rate without computing the sizing.
    ///
    /// # Errors
    ///
    /// [`CountBloomError::InvalidConfiguration`] if `capacity == 0` or
    /// `error_rate` is not strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        validate_inputs(self.capacity, self.error_rate)
    }

    /// Compute the filter shape for this configuration.
    ///
    /// # Errors
    ///
    /// See [`compute_sizing`].
    pub fn sizing(&self) -> Result<Sizing> {
        compute_sizing(self.capacity, self.error_rate)
    }
}

/// Accepts a string, a number or null. Filters written by other tooling
/// sometimes carry numeric ids.
fn deserialize_identifier<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "id must be a string, a number or null, got {other}"
        ))),
    }
}

fn validate_inputs(capacity: usize, error_rate: f64) -> Result<()> {
    if capacity == 0 {
        return Err(CountBloomError::invalid_configuration(
            "capacity must be greater than 0",
        ));
    }

    // NaN fails both comparisons, so it is rejected here as well.
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(CountBloomError::invalid_configuration(format!(
            "error rate {} is out of bounds, must be in range (0, 1)",
            error_rate
        )));
    }

    Ok(())
}

/// Derive `(array_length, hash_count)` from capacity and error rate.
///
/// Implements `m = floor(-n × ln(ε) / (ln 2)²) + 1` and
/// `k = floor((m / n) × ln 2) + 1`.
///
/// # Errors
///
/// [`CountBloomError::InvalidConfiguration`] if `capacity == 0`, if
/// `error_rate` is not in (0, 1), or if the array would not fit in memory
/// addressing.
///
/// # Examples
///
/// ```
/// use countbloom::core::params::compute_sizing;
///
/// let sizing = compute_sizing(1000, 0.002).unwrap();
/// assert_eq!(sizing.array_length, 12935);
/// assert_eq!(sizing.hash_count, 9);
/// ```
pub fn compute_sizing(capacity: usize, error_rate: f64) -> Result<Sizing> {
    validate_inputs(capacity, error_rate)?;

    let n = capacity as f64;
    let m = (-n * error_rate.ln() / LN2_SQUARED).floor();

    // The `+ 1` below must not overflow either.
    if m >= (usize::MAX / 2) as f64 {
        return Err(CountBloomError::invalid_configuration(format!(
            "capacity {} at error rate {} needs {:.0} counters, which exceeds addressable memory",
            capacity, error_rate, m
        )));
    }

    let array_length = m as usize + 1;
    let hash_count = ((array_length as f64 / n) * LN_2).floor() as usize + 1;

    Ok(Sizing {
        array_length,
        hash_count,
    })
}

/// Expected false positive rate after `items` distinct insertions.
///
/// Implements `p = (1 - e^(-kn/m))^k`. Returns 0 for an empty filter or a
/// degenerate shape.
///
/// # Examples
///
/// ```
/// use countbloom::core::params::{compute_sizing, expected_fp_rate};
///
/// let sizing = compute_sizing(1000, 0.01).unwrap();
/// let fp = expected_fp_rate(sizing.array_length, 1000, sizing.hash_count);
/// assert!(fp < 0.02);
/// ```
#[must_use]
pub fn expected_fp_rate(array_length: usize, items: usize, hash_count: usize) -> f64 {
    if array_length == 0 || hash_count == 0 || items == 0 {
        return 0.0;
    }

    let m = array_length as f64;
    let n = items as f64;
    let k = hash_count as f64;

    let prob_counter_nonzero = 1.0 - (-(k * n) / m).exp();
    prob_counter_nonzero.powf(k).clamp(0.0, 1.0)
}
