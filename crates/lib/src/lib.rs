//!
//! notesync: user directory and per-user document sync for a note-taking client.
//!
//! The library keeps two logical mappings, accounts keyed by email and user
//! documents keyed by user id, mirrored between a remote JSON store and a local
//! cache.
//!
//! ## Core Concepts
//!
//! * **Remote stores (`remote::RemoteStore`)**: the network-accessible JSON store. Every
//!   read tries it first; every write goes to it on a best-effort basis.
//! * **Local caches (`cache::LocalCache`)**: a synchronous key-value store that always
//!   receives writes and serves reads whenever the remote cannot.
//! * **Mirrors (`mirror::Mirror`)**: one mapping held in both places, with the
//!   fetch-or-fallback and write-both logic shared by every operation.
//! * **Directory (`directory::UserDirectory`)**: registration, credential checks and
//!   per-account API keys.
//! * **Documents (`documents::UserDataStore`)**: read-merge-write of projects and
//!   flashcards with an ownership filter and last-writer-wins semantics.
//! * **Service (`service::SyncService`)**: wires everything to the same remote, cache,
//!   clock, hasher and token codec, and issues session tokens.

pub mod cache;
pub mod clock;
pub mod constants;
pub mod directory;
pub mod documents;
pub mod mirror;
pub mod records;
pub mod remote;
pub mod service;
pub mod token;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use records::KeyedRecords;
pub use service::{SyncService, SyncServiceBuilder};

/// Result type used throughout the notesync library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the notesync library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from the account directory
    #[error(transparent)]
    Directory(directory::DirectoryError),

    /// Structured errors from the document store
    #[error(transparent)]
    Document(documents::DocumentError),

    /// Structured errors from remote store implementations
    #[error(transparent)]
    Remote(remote::RemoteError),

    /// Structured errors from the emulated JSON bin server
    #[error(transparent)]
    Server(remote::ServerError),

    /// Structured errors from local cache implementations
    #[error(transparent)]
    Cache(cache::CacheError),

    /// Structured errors from session token handling
    #[error(transparent)]
    Token(token::TokenError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Directory(_) => "directory",
            Error::Document(_) => "documents",
            Error::Remote(_) => "remote",
            Error::Server(_) => "server",
            Error::Cache(_) => "cache",
            Error::Token(_) => "token",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Directory(err) => err.is_not_found(),
            Error::Document(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Directory(err) => err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is a rejected login.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Directory(err) => err.is_login_rejected(),
            _ => false,
        }
    }

    /// Check if this error came from talking to the remote store.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Remote(err) => err.is_transport_failure(),
            _ => false,
        }
    }

    /// Check if this error came from the local cache.
    pub fn is_cache_error(&self) -> bool {
        matches!(self, Error::Cache(_))
    }
}
