//! In-process remote stores.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::{KeyedRecords, directory::Directory, documents::DocumentMap};

const DIRECTORY_BIN: &str = "directory";
const DOCUMENTS_BIN: &str = "documents";

/// A remote store that keeps serialized bins in memory.
///
/// Records are stored as JSON text, so everything that passes through it goes
/// through the same encoding as a real network store. The availability switch
/// and the artificial latency let tests reproduce outages and slow links.
#[derive(Debug)]
pub struct MemoryRemote {
    bins: RwLock<HashMap<&'static str, String>>,
    available: AtomicBool,
    latency_ms: AtomicU64,
    calls: AtomicUsize,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self {
            bins: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MemoryRemote {
    /// Creates an empty, reachable store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the store on or off. While off every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Whether calls currently succeed.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Delay every call by `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of calls received so far, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw JSON stored for the directory, if it was ever written.
    pub fn raw_directory(&self) -> Option<String> {
        self.raw(DIRECTORY_BIN)
    }

    /// Raw JSON stored for the documents, if they were ever written.
    pub fn raw_documents(&self) -> Option<String> {
        self.raw(DOCUMENTS_BIN)
    }

    fn raw(&self, bin: &'static str) -> Option<String> {
        let bins = self.bins.read().unwrap_or_else(PoisonError::into_inner);
        bins.get(bin).cloned()
    }

    async fn enter(&self) -> RemoteResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if !self.is_available() {
            return Err(RemoteError::Unavailable {
                reason: "memory remote is switched off".to_string(),
            });
        }
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, bin: &'static str) -> RemoteResult<KeyedRecords<T>> {
        self.enter().await?;
        match self.raw(bin) {
            None => Ok(KeyedRecords::new()),
            Some(json) => serde_json::from_str(&json).map_err(|e| RemoteError::Decode {
                url: format!("memory://{bin}"),
                reason: e.to_string(),
            }),
        }
    }

    async fn write<T: Serialize + Sync>(
        &self,
        bin: &'static str,
        records: &KeyedRecords<T>,
    ) -> RemoteResult<()> {
        self.enter().await?;
        let json = serde_json::to_string(records).map_err(|e| RemoteError::Decode {
            url: format!("memory://{bin}"),
            reason: e.to_string(),
        })?;
        let mut bins = self.bins.write().unwrap_or_else(PoisonError::into_inner);
        bins.insert(bin, json);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn get_directory(&self) -> RemoteResult<Directory> {
        self.read(DIRECTORY_BIN).await
    }

    async fn put_directory(&self, directory: &Directory) -> RemoteResult<()> {
        self.write(DIRECTORY_BIN, directory).await
    }

    async fn get_documents(&self) -> RemoteResult<DocumentMap> {
        self.read(DOCUMENTS_BIN).await
    }

    async fn put_documents(&self, documents: &DocumentMap) -> RemoteResult<()> {
        self.write(DOCUMENTS_BIN, documents).await
    }
}

/// A remote store that is never reachable.
///
/// Pairing it with a cache gives a purely local client: every read is served
/// from the cache and every write lands only there.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemote;

impl OfflineRemote {
    fn refuse<T>() -> RemoteResult<T> {
        Err(RemoteError::Unavailable {
            reason: "offline mode".to_string(),
        })
    }
}

#[async_trait]
impl RemoteStore for OfflineRemote {
    async fn get_directory(&self) -> RemoteResult<Directory> {
        Self::refuse()
    }

    async fn put_directory(&self, _directory: &Directory) -> RemoteResult<()> {
        Self::refuse()
    }

    async fn get_documents(&self) -> RemoteResult<DocumentMap> {
        Self::refuse()
    }

    async fn put_documents(&self, _documents: &DocumentMap) -> RemoteResult<()> {
        Self::refuse()
    }
}
