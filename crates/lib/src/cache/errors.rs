//! Error types for local cache implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or writing the local cache.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing file failed.
    #[error("Cache file I/O error at {}", path.display())]
    FileIo {
        /// The cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backing file could not be encoded or decoded.
    #[error("Cache file serialization failed")]
    Serialization {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// A cached value exists but does not parse as the expected mapping.
    #[error("Cached value under '{key}' is corrupt")]
    Corrupt {
        /// The cache key holding the bad value
        key: String,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The cache file was written by an incompatible version.
    #[error("Unsupported cache file version {found}; expected {expected}")]
    UnsupportedVersion {
        /// The version this build writes
        expected: u8,
        /// The version found on disk
        found: u8,
    },
}

impl CacheError {
    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, CacheError::FileIo { .. })
    }

    /// Check if this error indicates unreadable cached data.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CacheError::Corrupt { .. }
                | CacheError::Serialization { .. }
                | CacheError::UnsupportedVersion { .. }
        )
    }
}

impl From<CacheError> for crate::Error {
    fn from(err: CacheError) -> Self {
        crate::Error::Cache(err)
    }
}
