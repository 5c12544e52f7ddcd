//! Account directory
//!
//! Maps email to [`Account`]. The directory is one mapping mirrored between
//! the remote store and the local cache; every operation loads the whole
//! mapping, and every mutation writes it back in full. Loads include accounts
//! only the cache knows, so an account registered while the remote was down
//! keeps its email after the remote returns.
//!
//! Lookups by account id scan the mapping linearly. That is fine for the
//! account counts a JSON bin can hold; a real store would want an id index.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    Clock, KeyedRecords, Result,
    cache::LocalCache,
    constants::{ACCOUNT_ID_PREFIX, DIRECTORY_CACHE_KEY, MIN_API_KEY_LENGTH},
    mirror::{Mirror, MirrorOptions, Mirrored},
    remote::{RemoteResult, RemoteStore},
};

mod crypto;
mod errors;
mod types;

pub use crypto::{Argon2Hasher, CredentialHasher};
pub use errors::{DirectoryError, LoginFailure};
pub use types::{Account, AccountSummary, ResetAck, Session};

/// The account directory as stored: email to account.
pub type Directory = KeyedRecords<Account>;

const RESET_MESSAGE: &str = "Password reset link sent to your email";

#[async_trait]
impl Mirrored for Account {
    const CACHE_KEY: &'static str = DIRECTORY_CACHE_KEY;
    const LABEL: &'static str = "directory";

    async fn pull(remote: &dyn RemoteStore) -> RemoteResult<Directory> {
        remote.get_directory().await
    }

    async fn push(remote: &dyn RemoteStore, records: &Directory) -> RemoteResult<()> {
        remote.put_directory(records).await
    }
}

/// Registration, credential checks and per-account API keys.
#[derive(Debug)]
pub struct UserDirectory {
    mirror: Mirror<Account>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
}

impl UserDirectory {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        hasher: Arc<dyn CredentialHasher>,
        clock: Arc<dyn Clock>,
        options: MirrorOptions,
    ) -> Self {
        Self {
            mirror: Mirror::new(remote, cache, options),
            hasher,
            clock,
        }
    }

    /// Create an account.
    ///
    /// Fails with [`DirectoryError::DuplicateAccount`] if the email is held by
    /// either the remote or the cached directory.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        // Hash outside the mirror lock, it is the slow part.
        let password_hash = self.hasher.hash(password)?;
        let account = Account {
            id: format!("{ACCOUNT_ID_PREFIX}{}", Uuid::new_v4().simple()),
            email: email.to_string(),
            display_name: name.to_string(),
            password_hash,
            api_key: None,
            created_at: self.clock.now_utc(),
        };

        let updated = self
            .mirror
            .update_merged(|directory| {
                if directory.contains_key(email) {
                    return Err(DirectoryError::DuplicateAccount {
                        email: email.to_string(),
                    }
                    .into());
                }
                directory.insert(email.to_string(), account.clone());
                Ok(())
            })
            .await?;

        info!(
            user_id = %account.id,
            remote_persisted = updated.remote_persisted,
            "Registered account"
        );
        Ok(account)
    }

    /// Check an email and password pair.
    ///
    /// An unknown email and a wrong password both fail with
    /// [`DirectoryError::LoginRejected`]; only the attached
    /// [`LoginFailure`] tells them apart.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let mut directory = self.mirror.load_merged().await?.value;
        let Some(account) = directory.remove(email) else {
            debug!("Login rejected: unknown account");
            return Err(DirectoryError::LoginRejected {
                cause: LoginFailure::UnknownAccount,
            }
            .into());
        };

        if !self.hasher.verify(password, &account.password_hash)? {
            debug!(user_id = %account.id, "Login rejected: wrong password");
            return Err(DirectoryError::LoginRejected {
                cause: LoginFailure::WrongPassword,
            }
            .into());
        }

        debug!(user_id = %account.id, "Login accepted");
        Ok(account)
    }

    /// Look up an account by id.
    pub async fn account(&self, user_id: &str) -> Result<Account> {
        let directory = self.mirror.load_merged().await?.value;
        directory
            .find(|account| account.id == user_id)
            .map(|(_, account)| account.clone())
            .ok_or_else(|| not_found(user_id))
    }

    /// Store an external-service API key on the account.
    pub async fn set_api_key(&self, user_id: &str, key: &str) -> Result<()> {
        self.update_account(user_id, |account| {
            account.api_key = Some(key.to_string());
        })
        .await
    }

    /// The stored API key, if any.
    pub async fn get_api_key(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.account(user_id).await?.api_key)
    }

    /// Remove the stored API key.
    pub async fn clear_api_key(&self, user_id: &str) -> Result<()> {
        self.update_account(user_id, |account| {
            account.api_key = None;
        })
        .await
    }

    /// Whether the account has an API key long enough to be real.
    pub async fn has_usable_api_key(&self, user_id: &str) -> Result<bool> {
        Ok(self
            .get_api_key(user_id)
            .await?
            .is_some_and(|key| key.len() > MIN_API_KEY_LENGTH))
    }

    /// Acknowledge a password reset request.
    ///
    /// Nothing is sent. The call only confirms the email is registered.
    pub async fn request_password_reset(&self, email: &str) -> Result<ResetAck> {
        let directory = self.mirror.load_merged().await?.value;
        if !directory.contains_key(email) {
            return Err(not_found(email));
        }
        info!("Password reset requested");
        Ok(ResetAck {
            email: email.to_string(),
            message: RESET_MESSAGE.to_string(),
        })
    }

    /// Every account, without secrets.
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        let directory = self.mirror.load_merged().await?.value;
        Ok(directory.values().map(Account::summary).collect())
    }

    pub(crate) fn mirror(&self) -> &Mirror<Account> {
        &self.mirror
    }

    async fn update_account<F>(&self, user_id: &str, change: F) -> Result<()>
    where
        F: FnOnce(&mut Account) + Send,
    {
        let updated = self
            .mirror
            .update_merged(|directory| {
                let (_, account) = directory
                    .find_mut(|account| account.id == user_id)
                    .ok_or_else(|| not_found(user_id))?;
                change(account);
                Ok(())
            })
            .await?;
        debug!(
            %user_id,
            remote_persisted = updated.remote_persisted,
            "Updated account"
        );
        Ok(())
    }
}

fn not_found(lookup: &str) -> crate::Error {
    DirectoryError::AccountNotFound {
        lookup: lookup.to_string(),
    }
    .into()
}
