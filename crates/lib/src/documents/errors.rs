//! Error types for the document store
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("User data not found: {user_id}")]
    DocumentNotFound { user_id: String },
}

impl DocumentError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::DocumentNotFound { .. })
    }
}

impl From<DocumentError> for crate::Error {
    fn from(err: DocumentError) -> Self {
        crate::Error::Document(err)
    }
}
