//! Error types for the account directory
use thiserror::Error;

/// Why a login was rejected.
///
/// Kept for logs and tests only. Both causes render the same message so a
/// caller cannot probe which emails are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// No account has this email.
    UnknownAccount,
    /// The account exists but the password does not match.
    WrongPassword,
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("An account with email {email} already exists")]
    DuplicateAccount { email: String },

    #[error("Account not found: {lookup}")]
    AccountNotFound { lookup: String },

    #[error("Invalid email or password")]
    LoginRejected { cause: LoginFailure },

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },
}

impl DirectoryError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::AccountNotFound { .. })
    }

    /// Check if this error indicates the account already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DirectoryError::DuplicateAccount { .. })
    }

    /// Check if this is a rejected login, whatever the cause.
    pub fn is_login_rejected(&self) -> bool {
        matches!(self, DirectoryError::LoginRejected { .. })
    }

    /// Check if the login was rejected because of a wrong password.
    pub fn is_invalid_credentials(&self) -> bool {
        self.login_failure() == Some(LoginFailure::WrongPassword)
    }

    /// The internal cause of a rejected login.
    pub fn login_failure(&self) -> Option<LoginFailure> {
        match self {
            DirectoryError::LoginRejected { cause } => Some(*cause),
            _ => None,
        }
    }
}

impl From<DirectoryError> for crate::Error {
    fn from(err: DirectoryError) -> Self {
        crate::Error::Directory(err)
    }
}
