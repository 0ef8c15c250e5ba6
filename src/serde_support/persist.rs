//! On-disk persistence for counting Bloom filters.
//!
//! A persisted filter is a directory holding two artifacts:
//!
//! ```text
//! <dir>/
//! ├── bloom.npy   - counter array, NumPy v1.0 `|u1`, 1-D (see `npy`)
//! └── meta.json   - {"capacity": int, "error": float, "id": string|null}
//! ```
//!
//! Sizing is never stored. Loading recomputes it from the metadata and
//! requires the array length to match.
//!
//! Each artifact is written to a temporary file in the same directory, synced
//! and renamed over the target, so a reader never observes a half-written
//! artifact. The pair is not replaced as a unit: a crash between the two
//! renames leaves a new array next to old metadata.

use super::npy;
use crate::core::params::FilterConfig;
use crate::error::{CountBloomError, Result};
use crate::filters::CountingBloomFilter;
use crate::hash::BloomHasher;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// File name of the counter array artifact.
pub const ARRAY_FILE: &str = "bloom.npy";

/// File name of the metadata artifact.
pub const METADATA_FILE: &str = "meta.json";

/// Write `filter` under `dir`, creating the directory if needed.
///
/// # Errors
///
/// [`CountBloomError::Io`] if the directory or an artifact cannot be written.
pub fn save<H: BloomHasher>(filter: &CountingBloomFilter<H>, dir: &Path) -> Result<()> {
    info!(path = %dir.display(), "saving counting bloom filter");

    if !dir.exists() {
        info!(path = %dir.display(), "bloom path doesn't exist, creating");
    }
    fs::create_dir_all(dir).map_err(|e| CountBloomError::from_io(dir, &e))?;

    write_atomic(&dir.join(ARRAY_FILE), |writer| {
        npy::write_u8_array(writer, filter.counters())
    })?;

    let metadata = serde_json::to_vec(filter.metadata())
        .map_err(|e| CountBloomError::serialization(e.to_string()))?;
    write_atomic(&dir.join(METADATA_FILE), |writer| writer.write_all(&metadata))?;

    Ok(())
}

/// Restore a filter from `dir`, indexing keys with `hasher`.
///
/// A missing array artifact next to valid metadata yields an empty filter.
///
/// # Errors
///
/// - [`CountBloomError::NotFound`] if the metadata artifact is missing
/// - [`CountBloomError::CorruptMetadata`] if it is not valid JSON or holds an
///   invalid capacity or error rate, or if the array artifact is missing and
///   the empty array it implies cannot be allocated
/// - [`CountBloomError::CorruptData`] if the array artifact is not a 1-D `u1`
///   `.npy` array of the length the metadata implies
/// - [`CountBloomError::Io`] for any other read failure
pub fn load<H: BloomHasher>(dir: &Path, hasher: H) -> Result<CountingBloomFilter<H>> {
    info!(path = %dir.display(), "loading counting bloom filter");

    let config = read_metadata(dir)?;
    let array_path = dir.join(ARRAY_FILE);

    let bytes = match fs::read(&array_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                path = %array_path.display(),
                "counter array missing, starting from an empty filter"
            );
            return CountingBloomFilter::with_hasher(config, hasher).map_err(|e| {
                CountBloomError::corrupt_metadata(dir.join(METADATA_FILE), e.to_string())
            });
        }
        Err(e) => return Err(CountBloomError::from_io(&array_path, &e)),
    };

    let counters =
        npy::decode(&bytes).map_err(|e| CountBloomError::corrupt_data(&array_path, e.to_string()))?;

    let expected = config.sizing()?.array_length;
    if counters.len() != expected {
        return Err(CountBloomError::corrupt_data(
            &array_path,
            format!(
                "array holds {} counters but the metadata implies {}",
                counters.len(),
                expected
            ),
        ));
    }

    CountingBloomFilter::from_counters(config, hasher, counters)
}

/// Read and validate the metadata artifact under `dir`.
///
/// # Errors
///
/// See [`load`].
pub fn read_metadata(dir: &Path) -> Result<FilterConfig> {
    let path = dir.join(METADATA_FILE);
    let bytes = fs::read(&path).map_err(|e| CountBloomError::from_io(&path, &e))?;

    let config: FilterConfig = serde_json::from_slice(&bytes)
        .map_err(|e| CountBloomError::corrupt_metadata(&path, e.to_string()))?;
    config
        .sizing()
        .map_err(|e| CountBloomError::corrupt_metadata(&path, e.to_string()))?;

    Ok(config)
}

/// Replace `path` with the bytes produced by `write`, via a synced temporary
/// file in the same directory.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| CountBloomError::from_io(dir, &e))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer).map_err(|e| CountBloomError::from_io(path, &e))?;
        writer.flush().map_err(|e| CountBloomError::from_io(path, &e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| CountBloomError::from_io(path, &e))?;

    temp.persist(path)
        .map_err(|e| CountBloomError::from_io(path, &e.error))?;
    Ok(())
}
