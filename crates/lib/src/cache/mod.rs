//! Local cache implementations
//!
//! The local cache is the guaranteed half of every write: whatever happens on
//! the network, the latest mapping lands here, and reads fall back to it when
//! the remote store cannot answer.
//!
//! The trait is synchronous and string-typed, like browser
//! local storage, so any process-local key-value store can back it.

mod errors;
mod file;
mod memory;

pub use errors::CacheError;
pub use file::FileCache;
pub use memory::MemoryCache;

use crate::Result;

/// Synchronous string key-value store used as the fallback copy of every mapping.
///
/// Implementations must be `Send` and `Sync` so one cache can be shared by the
/// directory and the document store. No transactional guarantees are required
/// beyond "last set wins" for a single key.
pub trait LocalCache: Send + Sync + std::fmt::Debug {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
