//! Per-user documents
//!
//! Maps account id to [`UserDocument`]. Writes are read-merge-write cycles over
//! the whole mapping with last-writer-wins at document granularity: a write
//! replaces the user's projects (after the ownership filter) and, when given,
//! the flashcards. Nothing is merged record by record and there is no version
//! check. Documents only the cache holds stay visible while the remote
//! answers; for ids on both sides the remote copy wins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    Clock, KeyedRecords, Result,
    cache::LocalCache,
    constants::DOCUMENTS_CACHE_KEY,
    mirror::{Fetched, Mirror, MirrorOptions, Mirrored},
    remote::{RemoteResult, RemoteStore},
};

mod errors;
mod types;

pub use errors::DocumentError;
pub use types::{Flashcard, IncomingDocument, Project, UserDocument, WriteAck};

/// The document mapping as stored: account id to document.
pub type DocumentMap = KeyedRecords<UserDocument>;

#[async_trait]
impl Mirrored for UserDocument {
    const CACHE_KEY: &'static str = DOCUMENTS_CACHE_KEY;
    const LABEL: &'static str = "documents";

    async fn pull(remote: &dyn RemoteStore) -> RemoteResult<DocumentMap> {
        remote.get_documents().await
    }

    async fn push(remote: &dyn RemoteStore, records: &DocumentMap) -> RemoteResult<()> {
        remote.put_documents(records).await
    }
}

/// Reads and writes each user's projects and flashcards.
#[derive(Debug)]
pub struct UserDataStore {
    mirror: Mirror<UserDocument>,
    clock: Arc<dyn Clock>,
}

impl UserDataStore {
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn LocalCache>,
        clock: Arc<dyn Clock>,
        options: MirrorOptions,
    ) -> Self {
        Self {
            mirror: Mirror::new(remote, cache, options),
            clock,
        }
    }

    /// The user's document together with the side that served it.
    pub async fn fetch(&self, user_id: &str) -> Result<Fetched<UserDocument>> {
        let fetched = self.mirror.load_merged().await?;
        let origin = fetched.origin;
        let mut documents = fetched.value;
        let mut document = documents
            .remove(user_id)
            .ok_or_else(|| DocumentError::DocumentNotFound {
                user_id: user_id.to_string(),
            })?;
        if document.owner.is_empty() {
            document.owner = user_id.to_string();
        }
        debug!(%user_id, ?origin, "Fetched document");
        Ok(Fetched {
            value: document,
            origin,
        })
    }

    /// The user's document.
    pub async fn read(&self, user_id: &str) -> Result<UserDocument> {
        Ok(self.fetch(user_id).await?.value)
    }

    /// Merge `incoming` into the user's document and persist it.
    ///
    /// Projects not tagged with `user_id` are dropped without error. A user
    /// with no stored document starts from an empty one.
    pub async fn write(&self, user_id: &str, incoming: IncomingDocument) -> Result<WriteAck> {
        let now = self.clock.now_utc();
        let IncomingDocument {
            projects,
            flashcards,
        } = incoming;
        let offered = projects.len();

        let updated = self
            .mirror
            .update_merged(|documents| {
                let document = documents
                    .entry(user_id.to_string())
                    .or_insert_with(|| UserDocument::empty(user_id, now));
                document.owner = user_id.to_string();
                document.projects = projects
                    .into_iter()
                    .filter(|project| project.is_owned_by(user_id))
                    .collect();
                if let Some(flashcards) = flashcards {
                    document.flashcards = flashcards;
                }
                document.last_synced_at = now;
                Ok((document.projects.len(), document.flashcards.len()))
            })
            .await?;

        let (kept, flashcards) = updated.value;
        if kept < offered {
            debug!(%user_id, dropped = offered - kept, "Dropped projects owned by other users");
        }
        info!(
            %user_id,
            remote_persisted = updated.remote_persisted,
            "Saved user document"
        );
        Ok(WriteAck {
            synced_at: now,
            remote_persisted: updated.remote_persisted,
            projects: kept,
            flashcards,
        })
    }

    /// Store an empty document for a newly registered account.
    pub(crate) async fn create_empty(&self, user_id: &str) -> Result<bool> {
        let now = self.clock.now_utc();
        let updated = self
            .mirror
            .update_merged(|documents| {
                documents.insert(user_id.to_string(), UserDocument::empty(user_id, now));
                Ok(())
            })
            .await?;
        Ok(updated.remote_persisted)
    }

    pub(crate) fn mirror(&self) -> &Mirror<UserDocument> {
        &self.mirror
    }
}
