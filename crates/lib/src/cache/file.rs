//! Cache persisted to a JSON file.
//!
//! The whole key-value map is loaded when the cache is opened and rewritten on
//! every mutation. Values are small blobs (a handful of mappings), so a full
//! rewrite keeps the file consistent without a journal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CacheError, LocalCache};
use crate::Result;

/// The current cache file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const CACHE_FILE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// On-disk layout of a [`FileCache`].
#[derive(Serialize, Deserialize, Default)]
struct CacheFile {
    #[serde(rename = "_v", default, skip_serializing_if = "is_v0")]
    version: u8,
    #[serde(default)]
    entries: HashMap<String, String>,
}

/// A [`LocalCache`] that survives restarts by mirroring itself to a JSON file.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileCache {
    /// Opens the cache stored at `path`.
    ///
    /// A missing file yields an empty cache; the file is created on the first
    /// write. Unreadable or foreign-version files are reported as errors rather
    /// than silently discarded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let file: CacheFile = serde_json::from_str(&json)
                    .map_err(|source| CacheError::Serialization { source })?;
                if file.version != CACHE_FILE_VERSION {
                    return Err(CacheError::UnsupportedVersion {
                        expected: CACHE_FILE_VERSION,
                        found: file.version,
                    }
                    .into());
                }
                debug!(path = %path.display(), keys = file.entries.len(), "Loaded cache file");
                file
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No cache file yet, starting empty");
                CacheFile::default()
            }
            Err(source) => return Err(CacheError::FileIo { path, source }.into()),
        };

        Ok(Self {
            path,
            entries: RwLock::new(file.entries),
        })
    }

    /// The file this cache persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let file = CacheFile {
            version: CACHE_FILE_VERSION,
            entries: entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|source| CacheError::Serialization { source })?;
        std::fs::write(&self.path, json).map_err(|source| CacheError::FileIo {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Hold the write lock across the file write so the file never lags
        // behind a concurrent setter.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
