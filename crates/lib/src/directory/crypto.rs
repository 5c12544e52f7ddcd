//! Password hashing for the account directory
//!
//! Passwords are hashed with Argon2id and stored as PHC strings, so the salt
//! and parameters travel with the hash and verification needs nothing else.

use argon2::{
    Argon2, Params,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use super::errors::DirectoryError;
use crate::Result;

/// Turns raw passwords into digests and checks them later.
pub trait CredentialHasher: Send + Sync + std::fmt::Debug {
    /// Hash a raw password. Two calls with the same input give different digests.
    fn hash(&self, raw: &str) -> Result<String>;

    /// Check a raw password against a digest produced by [`hash`](Self::hash).
    ///
    /// A mismatch is `Ok(false)`. A digest that cannot be parsed is also a
    /// mismatch, not an error.
    fn verify(&self, raw: &str, digest: &str) -> Result<bool>;
}

/// Argon2id hasher.
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Option<Params>,
}

impl Argon2Hasher {
    /// Hasher with the library's default cost parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit cost parameters.
    ///
    /// Digests record their own parameters, so verification works across
    /// hashers configured differently.
    pub fn with_params(params: Params) -> Self {
        Self {
            params: Some(params),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        match &self.params {
            Some(params) => Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                params.clone(),
            ),
            None => Argon2::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, raw: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let digest = self
            .argon2()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| DirectoryError::HashingFailed {
                reason: e.to_string(),
            })?;
        Ok(digest.to_string())
    }

    fn verify(&self, raw: &str, digest: &str) -> Result<bool> {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return Ok(false);
        };
        Ok(self.argon2().verify_password(raw.as_bytes(), &parsed).is_ok())
    }
}
