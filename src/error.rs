//! Error types for counting Bloom filter operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`], whose error
//! type is [`CountBloomError`]. Errors are surfaced synchronously to the
//! immediate caller; nothing is retried or swallowed internally.
//!
//! # Error Propagation
//!
//! ```
//! use countbloom::{Result, CountBloomError};
//! use countbloom::core::params::compute_sizing;
//!
//! fn sizing_for(capacity: usize, error_rate: f64) -> Result<(usize, usize)> {
//!     let sizing = compute_sizing(capacity, error_rate)?;
//!     Ok((sizing.array_length, sizing.hash_count))
//! }
//! # assert!(sizing_for(1000, 0.01).is_ok());
//! # assert!(sizing_for(0, 0.01).is_err());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Result type alias for countbloom operations.
pub type Result<T> = std::result::Result<T, CountBloomError>;

/// Errors that can occur while building, mutating or persisting a filter.
///
/// I/O failures carry their [`io::ErrorKind`] and message instead of the
/// [`io::Error`] itself, so the enum stays `Clone + PartialEq`.
#[derive(Debug, Clone, PartialEq)]
pub enum CountBloomError {
    /// Capacity is zero or the error rate is outside (0, 1).
    ///
    /// Fatal to construction.
    InvalidConfiguration {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// A dynamically typed key was neither text nor bytes.
    ///
    /// Fatal to that call only.
    InvalidKeyType {
        /// Name of the rejected type, as far as it is known.
        type_name: String,
    },

    /// Cardinality estimate requested while every counter is nonzero.
    ///
    /// The filter stays usable for add/remove/contains.
    SaturatedEstimate {
        /// Number of counters in the saturated filter.
        array_length: usize,
    },

    /// A required artifact does not exist.
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The metadata artifact exists but cannot be parsed or holds invalid values.
    CorruptMetadata {
        /// Path of the metadata artifact.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// The counter array artifact is malformed or has the wrong length.
    CorruptData {
        /// Path of the array artifact.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// A counter index outside `[0, array_length)`.
    IndexOutOfBounds {
        /// The invalid index.
        index: usize,
        /// Number of counters in the filter.
        length: usize,
    },

    /// Any other I/O failure while reading or writing artifacts.
    Io {
        /// Path being accessed when the failure happened.
        path: PathBuf,
        /// Kind of the underlying I/O error.
        kind: io::ErrorKind,
        /// Message of the underlying I/O error.
        message: String,
    },

    /// In-memory snapshot encoding or decoding failed.
    Serialization {
        /// Description of what failed.
        message: String,
    },
}

impl fmt::Display for CountBloomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { message } => {
                write!(f, "Invalid filter configuration: {}.", message)
            }
            Self::InvalidKeyType { type_name } => {
                write!(
                    f,
                    "Invalid key type {}. Keys must be text or byte sequences.",
                    type_name
                )
            }
            Self::SaturatedEstimate { array_length } => {
                write!(
                    f,
                    "Cannot estimate cardinality: all {} counters are nonzero.",
                    array_length
                )
            }
            Self::NotFound { path } => {
                write!(f, "Artifact not found: {}.", path.display())
            }
            Self::CorruptMetadata { path, message } => {
                write!(f, "Corrupt metadata in {}: {}.", path.display(), message)
            }
            Self::CorruptData { path, message } => {
                write!(f, "Corrupt counter data in {}: {}.", path.display(), message)
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(
                    f,
                    "Index {} out of bounds for counter array of length {}.",
                    index, length
                )
            }
            Self::Io {
                path,
                kind,
                message,
            } => {
                write!(f, "I/O error ({:?}) on {}: {}.", kind, path.display(), message)
            }
            Self::Serialization { message } => {
                write!(f, "Serialization error: {}.", message)
            }
        }
    }
}

impl std::error::Error for CountBloomError {}

impl CountBloomError {
    /// Create an `InvalidConfiguration` error.
    ///
    /// # Examples
    /// ```
    /// use countbloom::CountBloomError;
    ///
    /// let err = CountBloomError::invalid_configuration("capacity must be greater than 0");
    /// assert!(err.to_string().contains("capacity"));
    /// ```
    #[must_use]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an `InvalidKeyType` error.
    #[must_use]
    pub fn invalid_key_type(type_name: impl Into<String>) -> Self {
        Self::InvalidKeyType {
            type_name: type_name.into(),
        }
    }

    /// Create a `SaturatedEstimate` error.
    #[must_use]
    pub fn saturated_estimate(array_length: usize) -> Self {
        Self::SaturatedEstimate { array_length }
    }

    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a `CorruptMetadata` error.
    #[must_use]
    pub fn corrupt_metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptMetadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a `CorruptData` error.
    #[must_use]
    pub fn corrupt_data(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptData {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an `IndexOutOfBounds` error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    /// Create a `Serialization` error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Classify an I/O error raised while touching `path`.
    ///
    /// `ErrorKind::NotFound` becomes [`CountBloomError::NotFound`]; every other
    /// kind is kept as [`CountBloomError::Io`].
    #[must_use]
    pub fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::not_found(path),
            kind => Self::Io {
                path: path.to_path_buf(),
                kind,
                message: err.to_string(),
            },
        }
    }

    /// Whether this error means an artifact was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
