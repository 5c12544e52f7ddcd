//! One logical mapping held in both the remote store and the local cache.
//!
//! A [`Mirror`] owns the fetch-or-fallback and write-both logic that every
//! directory and document operation shares:
//!
//! - [`Mirror::load`] asks the remote first. Any transport failure, timeout
//!   included, falls back to the cache and is logged, never returned.
//! - [`Mirror::store`] writes the remote on a best-effort basis and then the
//!   cache, whatever the remote said.
//! - [`Mirror::update`] runs load, a caller-supplied mutation and store while
//!   holding the mirror's lock, so two writers in the same process cannot
//!   interleave between fetch and persist. Writers in separate processes still
//!   race, and the last persist wins in full.
//! - [`Mirror::load_merged`] and [`Mirror::update_merged`] also keep records
//!   that only the cache holds, such as ones written while the remote was
//!   down. For a key present on both sides the remote copy wins.

use std::collections::btree_map::Entry;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    KeyedRecords, Result,
    cache::{CacheError, LocalCache},
    constants::{DEFAULT_REMOTE_TIMEOUT, RECOMMENDED_RETRY_ATTEMPTS, RECOMMENDED_RETRY_DELAY},
    remote::{RemoteError, RemoteResult, RemoteStore},
};

/// Where a loaded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The remote store answered.
    Remote,
    /// The remote failed and the local cache answered.
    Cache,
}

/// A value together with the side that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Fetched<T> {
    /// Transform the value, keeping the origin.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            origin: self.origin,
        }
    }

    /// Whether the remote store served this value.
    pub fn is_remote(&self) -> bool {
        self.origin == Origin::Remote
    }
}

/// Result of a read-modify-write cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated<R> {
    /// What the mutation returned.
    pub value: R,
    /// Whether the remote store accepted the new mapping.
    pub remote_persisted: bool,
}

/// Fixed-delay retry of remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retry.
    pub const fn none() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Three attempts one second apart.
    pub const fn recommended() -> Self {
        Self {
            attempts: RECOMMENDED_RETRY_ATTEMPTS,
            delay: RECOMMENDED_RETRY_DELAY,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Tuning knobs for remote calls made by a [`Mirror`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Upper bound on each remote attempt. Exceeding it counts as a transport failure.
    pub remote_timeout: Duration,
    /// Retry policy for remote calls.
    pub retry: RetryPolicy,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl MirrorOptions {
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// A record type stored as one mapping in the remote store and the cache.
#[async_trait]
pub trait Mirrored: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Cache key holding the serialized mapping.
    const CACHE_KEY: &'static str;

    /// Short name used in log messages.
    const LABEL: &'static str;

    /// Fetch the complete mapping from the remote store.
    async fn pull(remote: &dyn RemoteStore) -> RemoteResult<KeyedRecords<Self>>;

    /// Replace the complete mapping in the remote store.
    async fn push(remote: &dyn RemoteStore, records: &KeyedRecords<Self>) -> RemoteResult<()>;
}

/// Remote-first, cache-backed view of one mapping.
pub struct Mirror<T> {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    options: MirrorOptions,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Mirror<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("cache", &self.cache)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: Mirrored> Mirror<T> {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        options: MirrorOptions,
    ) -> Self {
        Self {
            remote,
            cache,
            options,
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn options(&self) -> &MirrorOptions {
        &self.options
    }

    /// Load the mapping, preferring the remote store.
    ///
    /// A remote answer is returned as-is and does not refresh the cache. When
    /// the remote fails the cached copy is returned, or an empty mapping if
    /// the cache has none. Only cache errors are surfaced.
    pub async fn load(&self) -> Result<Fetched<KeyedRecords<T>>> {
        let remote = self.remote.as_ref();
        match self.call_remote(|| T::pull(remote)).await {
            Ok(records) => {
                debug!(mapping = T::LABEL, records = records.len(), "Loaded from remote");
                Ok(Fetched {
                    value: records,
                    origin: Origin::Remote,
                })
            }
            Err(e) => {
                warn!(mapping = T::LABEL, error = %e, "Remote load failed, using local cache");
                Ok(Fetched {
                    value: self.load_cached()?,
                    origin: Origin::Cache,
                })
            }
        }
    }

    /// Load the mapping like [`load`](Self::load), adding cached records the
    /// remote copy lacks.
    ///
    /// The origin stays [`Origin::Remote`] when the remote answered.
    pub async fn load_merged(&self) -> Result<Fetched<KeyedRecords<T>>> {
        let mut fetched = self.load().await?;
        if fetched.is_remote() {
            let mut added = 0;
            for (key, record) in self.load_cached()?.into_inner() {
                if let Entry::Vacant(slot) = fetched.value.entry(key) {
                    slot.insert(record);
                    added += 1;
                }
            }
            if added > 0 {
                debug!(mapping = T::LABEL, added, "Merged cache-only records");
            }
        }
        Ok(fetched)
    }

    /// Read the cached copy only.
    pub fn load_cached(&self) -> Result<KeyedRecords<T>> {
        match self.cache.get(T::CACHE_KEY)? {
            None => Ok(KeyedRecords::new()),
            Some(json) => serde_json::from_str(&json).map_err(|source| {
                CacheError::Corrupt {
                    key: T::CACHE_KEY.to_string(),
                    source,
                }
                .into()
            }),
        }
    }

    /// Persist the mapping to the remote (best-effort) and the cache (always).
    ///
    /// Returns whether the remote accepted the write. A failed cache write is
    /// an error even when the remote succeeded.
    pub async fn store(&self, records: &KeyedRecords<T>) -> Result<bool> {
        let remote = self.remote.as_ref();
        let remote_persisted = match self.call_remote(|| T::push(remote, records)).await {
            Ok(()) => {
                debug!(mapping = T::LABEL, records = records.len(), "Stored to remote");
                true
            }
            Err(e) => {
                warn!(mapping = T::LABEL, error = %e, "Remote store failed, keeping local copy only");
                false
            }
        };

        let json = serde_json::to_string(records)
            .map_err(|source| CacheError::Serialization { source })?;
        self.cache.set(T::CACHE_KEY, &json)?;
        Ok(remote_persisted)
    }

    /// Run a locked load-mutate-store cycle.
    ///
    /// If `mutate` fails nothing is stored and its error is returned.
    pub async fn update<R, F>(&self, mutate: F) -> Result<Updated<R>>
    where
        F: FnOnce(&mut KeyedRecords<T>) -> Result<R> + Send,
        R: Send,
    {
        self.locked_update(false, mutate).await
    }

    /// Like [`update`](Self::update), starting from [`load_merged`](Self::load_merged).
    ///
    /// The store that follows writes the cache-only records back to the remote.
    pub async fn update_merged<R, F>(&self, mutate: F) -> Result<Updated<R>>
    where
        F: FnOnce(&mut KeyedRecords<T>) -> Result<R> + Send,
        R: Send,
    {
        self.locked_update(true, mutate).await
    }

    async fn locked_update<R, F>(&self, merged: bool, mutate: F) -> Result<Updated<R>>
    where
        F: FnOnce(&mut KeyedRecords<T>) -> Result<R> + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = if merged {
            self.load_merged().await?.value
        } else {
            self.load().await?.value
        };
        let value = mutate(&mut records)?;
        let remote_persisted = self.store(&records).await?;
        Ok(Updated {
            value,
            remote_persisted,
        })
    }

    /// Drop the cached copy.
    pub fn forget_cached(&self) -> Result<()> {
        self.cache.remove(T::CACHE_KEY)
    }

    async fn call_remote<R, F, Fut>(&self, mut call: F) -> RemoteResult<R>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = RemoteResult<R>>,
    {
        let attempts = self.options.retry.attempts.max(1);
        let timeout = self.options.remote_timeout;
        let mut attempt = 1;
        loop {
            let outcome = match tokio::time::timeout(timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if attempt < attempts && e.is_transport_failure() => {
                    debug!(mapping = T::LABEL, attempt, error = %e, "Remote call failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.options.retry.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
