//! Document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A project entry.
///
/// Only the owner tag is interpreted; every other field is kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Id of the account that owns the project
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// The rest of the project, untouched
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Project {
    /// A project tagged with `owner` and no other fields.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            fields: Map::new(),
        }
    }

    /// Add or replace a field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Whether the project is tagged with `user_id`. Untagged projects belong to nobody.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner.as_deref() == Some(user_id)
    }
}

/// A flashcard, kept as the client sent it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flashcard(pub Value);

/// Everything stored for one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    /// The owning account id. Older blobs omit it; readers fill it from the key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub flashcards: Vec<Flashcard>,

    /// Time of the last write
    #[serde(rename = "lastSync", default)]
    pub last_synced_at: DateTime<Utc>,
}

impl UserDocument {
    /// A document with no projects and no flashcards.
    pub fn empty(owner: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            owner: owner.into(),
            projects: Vec::new(),
            flashcards: Vec::new(),
            last_synced_at: now,
        }
    }
}

/// Payload of a document write.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomingDocument {
    /// Replaces the stored projects after the ownership filter. Absent means none.
    #[serde(default)]
    pub projects: Vec<Project>,

    /// Replaces the stored flashcards when present. Absent keeps them.
    #[serde(default)]
    pub flashcards: Option<Vec<Flashcard>>,
}

/// Outcome of a document write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteAck {
    pub synced_at: DateTime<Utc>,
    /// False when only the local cache received the write
    pub remote_persisted: bool,
    /// Projects kept after filtering
    pub projects: usize,
    pub flashcards: usize,
}
