//! Error types for remote stores and the emulated bin server.

use thiserror::Error;

/// Result type returned by [`RemoteStore`](super::RemoteStore) implementations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur while talking to a remote store.
///
/// Everything except [`RemoteError::InvalidConfig`] means the remote is, for
/// this call, unavailable. Those failures are recovered from the local cache
/// and never reach callers of the directory or the document store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("Failed to reach {url}: {reason}")]
    Network { url: String, reason: String },

    /// The remote answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body was not a valid record.
    #[error("Failed to decode record from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The call did not complete within the configured bound.
    #[error("Remote call timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The store is switched off or has no network at all.
    #[error("Remote store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store could not be constructed from the given settings.
    #[error("Invalid remote configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl RemoteError {
    /// Check if this error means the remote could not serve the call.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, RemoteError::InvalidConfig { .. })
    }

    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout { .. })
    }

    /// The HTTP status, if the remote answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<RemoteError> for crate::Error {
    fn from(err: RemoteError) -> Self {
        crate::Error::Remote(err)
    }
}

/// Errors raised by [`BinServer`](super::BinServer).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServerError {
    /// The listener could not be bound.
    #[error("Failed to bind server to {address}: {reason}")]
    Bind { address: String, reason: String },

    /// The server task ended abnormally.
    #[error("Server task failed: {reason}")]
    Task { reason: String },
}

impl From<ServerError> for crate::Error {
    fn from(err: ServerError) -> Self {
        crate::Error::Server(err)
    }
}
