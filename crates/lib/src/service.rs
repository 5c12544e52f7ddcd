//! The sync service facade
//!
//! [`SyncService`] wires the directory and the document store to one remote
//! store, one local cache, one clock, one password hasher and one token codec.
//! It is the value callers hold instead of any process-wide state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use notesync::{SyncService, cache::MemoryCache, remote::MemoryRemote};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> notesync::Result<()> {
//! let service = SyncService::builder(Arc::new(MemoryRemote::new()), Arc::new(MemoryCache::new()))
//!     .build()?;
//!
//! let session = service.register("Ada", "ada@example.com", "p@ss").await?;
//! let document = service.read_document(&session.account.id).await?;
//! assert!(document.projects.is_empty());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    Clock, Result, SystemClock,
    cache::LocalCache,
    constants::{DIRECTORY_CACHE_KEY, DOCUMENTS_CACHE_KEY},
    directory::{AccountSummary, Argon2Hasher, CredentialHasher, ResetAck, Session, UserDirectory},
    documents::{IncomingDocument, UserDataStore, UserDocument, WriteAck},
    mirror::{Fetched, MirrorOptions},
    remote::RemoteStore,
    token::{SessionClaims, SignedTokenCodec, TokenCodec},
};

/// Registration, login and document sync over a shared remote and cache.
#[derive(Debug)]
pub struct SyncService {
    directory: UserDirectory,
    documents: UserDataStore,
    tokens: Arc<dyn TokenCodec>,
    cache: Arc<dyn LocalCache>,
    clock: Arc<dyn Clock>,
}

impl SyncService {
    /// Start configuring a service over `remote` and `cache`.
    pub fn builder(remote: Arc<dyn RemoteStore>, cache: Arc<dyn LocalCache>) -> SyncServiceBuilder {
        SyncServiceBuilder {
            remote,
            cache,
            hasher: None,
            tokens: None,
            clock: None,
            options: MirrorOptions::default(),
        }
    }

    /// Create an account and its empty document, and open a session.
    ///
    /// The directory is persisted before the document. Both go to the remote
    /// on a best-effort basis and to the cache unconditionally. If storing the
    /// document fails the account still exists: registering again reports a
    /// duplicate, [`read_document`](Self::read_document) returns an empty
    /// document, and the first write creates it.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        let account = self.directory.register(name, email, password).await?;
        self.documents.create_empty(&account.id).await?;
        self.open_session(account.summary())
    }

    /// Check credentials and open a session.
    ///
    /// Unknown emails and wrong passwords fail with the same message.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let account = self.directory.authenticate(email, password).await?;
        info!(user_id = %account.id, "User logged in");
        self.open_session(account.summary())
    }

    /// The claims of a token issued by this service, if it is valid.
    pub fn verify_session(&self, token: &str) -> Option<SessionClaims> {
        let claims = self.tokens.decode(token);
        if claims.is_none() {
            debug!("Rejected session token");
        }
        claims
    }

    /// The user's document.
    ///
    /// A registered account whose empty document was never persisted reads
    /// as an empty document. Ids unknown to the directory fail with
    /// `DocumentNotFound`.
    pub async fn read_document(&self, user_id: &str) -> Result<UserDocument> {
        match self.documents.read(user_id).await {
            Err(missing) if missing.is_not_found() => match self.directory.account(user_id).await {
                Ok(account) => {
                    debug!(%user_id, "Account has no stored document, reading as empty");
                    Ok(UserDocument::empty(account.id, self.clock.now_utc()))
                }
                Err(lookup) if lookup.is_not_found() => Err(missing),
                Err(lookup) => Err(lookup),
            },
            other => other,
        }
    }

    /// Like [`read_document`](Self::read_document), also reporting which side served it.
    pub async fn fetch_document(&self, user_id: &str) -> Result<Fetched<UserDocument>> {
        self.documents.fetch(user_id).await
    }

    pub async fn write_document(&self, user_id: &str, incoming: IncomingDocument) -> Result<WriteAck> {
        self.documents.write(user_id, incoming).await
    }

    pub async fn set_api_key(&self, user_id: &str, key: &str) -> Result<()> {
        self.directory.set_api_key(user_id, key).await
    }

    pub async fn get_api_key(&self, user_id: &str) -> Result<Option<String>> {
        self.directory.get_api_key(user_id).await
    }

    pub async fn clear_api_key(&self, user_id: &str) -> Result<()> {
        self.directory.clear_api_key(user_id).await
    }

    pub async fn has_usable_api_key(&self, user_id: &str) -> Result<bool> {
        self.directory.has_usable_api_key(user_id).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<ResetAck> {
        self.directory.request_password_reset(email).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>> {
        self.directory.list_accounts().await
    }

    /// Drop both cached mappings. The remote store is left alone.
    pub fn clear_local_cache(&self) -> Result<()> {
        self.directory.mirror().forget_cached()?;
        self.documents.mirror().forget_cached()?;
        info!(
            keys = ?[DIRECTORY_CACHE_KEY, DOCUMENTS_CACHE_KEY],
            "Cleared local cache"
        );
        Ok(())
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn documents(&self) -> &UserDataStore {
        &self.documents
    }

    pub fn cache(&self) -> &Arc<dyn LocalCache> {
        &self.cache
    }

    fn open_session(&self, account: AccountSummary) -> Result<Session> {
        let claims = SessionClaims::new(account.id.clone(), self.clock.now_millis());
        let token = self.tokens.encode(&claims)?;
        Ok(Session { token, account })
    }
}

/// Builder for [`SyncService`].
///
/// Unset collaborators default to Argon2id hashing, a freshly generated token
/// key, the system clock and [`MirrorOptions::default`].
pub struct SyncServiceBuilder {
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn LocalCache>,
    hasher: Option<Arc<dyn CredentialHasher>>,
    tokens: Option<Arc<dyn TokenCodec>>,
    clock: Option<Arc<dyn Clock>>,
    options: MirrorOptions,
}

impl SyncServiceBuilder {
    pub fn hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    pub fn tokens(mut self, tokens: Arc<dyn TokenCodec>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn options(mut self, options: MirrorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<SyncService> {
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(Argon2Hasher::new()));
        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(SignedTokenCodec::generate()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(SyncService {
            directory: UserDirectory::new(
                self.remote.clone(),
                self.cache.clone(),
                hasher,
                clock.clone(),
                self.options,
            ),
            documents: UserDataStore::new(self.remote, self.cache.clone(), clock.clone(), self.options),
            tokens,
            cache: self.cache,
            clock,
        })
    }
}
