//! Remote store abstractions.
//!
//! A remote store holds the account directory and the document mapping
//! somewhere on the network. The rest of the library never assumes it is
//! reachable: every failure reported here is absorbed by the
//! [`Mirror`](crate::mirror::Mirror) and answered from the local cache.
//!
//! Implementations:
//! * [`HttpRemoteStore`]: a JSON bin service over HTTP.
//! * [`MemoryRemote`]: in-process store with an availability switch, for tests and demos.
//! * [`OfflineRemote`]: always unavailable; turns the service into a cache-only client.

use async_trait::async_trait;

use crate::{directory::Directory, documents::DocumentMap};

mod errors;
pub mod http;
mod memory;
pub mod server;

pub use errors::{RemoteError, RemoteResult, ServerError};
pub use http::{HttpRemoteStore, HttpRemoteStoreBuilder, RemoteAuth};
pub use memory::{MemoryRemote, OfflineRemote};
pub use server::{BinServer, RunningBinServer};

/// Network-accessible store for the two mappings.
///
/// Each call is a single round trip that either returns the complete mapping
/// or replaces it wholesale; there is no partial update. Implementations must
/// be `Send` and `Sync` so one store can serve the directory and the document
/// store concurrently.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the complete account directory.
    async fn get_directory(&self) -> RemoteResult<Directory>;

    /// Replaces the complete account directory.
    async fn put_directory(&self, directory: &Directory) -> RemoteResult<()>;

    /// Fetches the complete user-document mapping.
    async fn get_documents(&self) -> RemoteResult<DocumentMap>;

    /// Replaces the complete user-document mapping.
    async fn put_documents(&self, documents: &DocumentMap) -> RemoteResult<()>;
}
