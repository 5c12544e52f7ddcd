//! Core data types for the account directory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account stored in the directory, keyed by email.
///
/// The id is assigned once at registration and never changes. The password
/// is only ever held as a salted hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque account identifier, also the key of the user's document
    pub id: String,

    /// Login identifier, unique across the directory
    pub email: String,

    /// Display name
    #[serde(rename = "name")]
    pub display_name: String,

    /// Password hash in PHC string format
    pub password_hash: String,

    /// External-service API key, set and cleared independently of credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The outward-facing view of this account.
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id.clone(),
            name: self.display_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public view of an account. Never carries the hash or the API key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Returned by a successful registration or login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token
    pub token: String,
    /// The account the token was issued for
    #[serde(rename = "user")]
    pub account: AccountSummary,
}

/// Acknowledgement of a password reset request.
///
/// No message is sent anywhere; the acknowledgement is all there is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAck {
    pub email: String,
    pub message: String,
}
