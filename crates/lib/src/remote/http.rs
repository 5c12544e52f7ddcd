//! HTTP remote store speaking the JSON bin protocol.
//!
//! Each mapping lives in its own bin:
//! - `GET  {base}/b/{bin}/latest` returns `{"record": <pairs>, ...}`
//! - `PUT  {base}/b/{bin}` replaces the record with the JSON body
//!
//! Requests carry either the service's static key header or a bearer token.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;
use zeroize::Zeroizing;

use super::{RemoteError, RemoteResult, RemoteStore};
use crate::{
    KeyedRecords,
    constants::{DEFAULT_REMOTE_URL, MASTER_KEY_HEADER},
    directory::Directory,
    documents::DocumentMap,
};

/// Credentials attached to every request.
#[derive(Clone, Default)]
pub enum RemoteAuth {
    /// Send no credentials.
    #[default]
    None,
    /// Static access key sent in the `X-Master-Key` header.
    MasterKey(Zeroizing<String>),
    /// Token sent as `Authorization: Bearer <token>`.
    Bearer(Zeroizing<String>),
}

impl RemoteAuth {
    /// Static key authentication.
    pub fn master_key(key: impl Into<String>) -> Self {
        RemoteAuth::MasterKey(Zeroizing::new(key.into()))
    }

    /// Bearer token authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        RemoteAuth::Bearer(Zeroizing::new(token.into()))
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            RemoteAuth::None => request,
            RemoteAuth::MasterKey(key) => request.header(MASTER_KEY_HEADER, key.as_str()),
            RemoteAuth::Bearer(token) => request.bearer_auth(token.as_str()),
        }
    }
}

impl fmt::Debug for RemoteAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            RemoteAuth::None => "None",
            RemoteAuth::MasterKey(_) => "MasterKey(***)",
            RemoteAuth::Bearer(_) => "Bearer(***)",
        };
        f.write_str(kind)
    }
}

/// Envelope the bin service wraps records in.
#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct BinEnvelope<T> {
    #[serde(default)]
    record: KeyedRecords<T>,
}

/// [`RemoteStore`] backed by a JSON bin service.
#[derive(Debug)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    directory_bin: String,
    documents_bin: String,
    auth: RemoteAuth,
}

impl HttpRemoteStore {
    /// Start configuring a store.
    pub fn builder() -> HttpRemoteStoreBuilder {
        HttpRemoteStoreBuilder::default()
    }

    /// The normalized base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn latest_url(&self, bin: &str) -> String {
        format!("{}/b/{bin}/latest", self.base_url)
    }

    fn bin_url(&self, bin: &str) -> String {
        format!("{}/b/{bin}", self.base_url)
    }

    async fn read_bin<T: DeserializeOwned>(&self, bin: &str) -> RemoteResult<KeyedRecords<T>> {
        let url = self.latest_url(bin);
        debug!(%url, "Fetching bin");

        let response = self
            .auth
            .apply(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RemoteError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let envelope: BinEnvelope<T> = response.json().await.map_err(|e| RemoteError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(envelope.record)
    }

    async fn write_bin<T: Serialize + Sync>(
        &self,
        bin: &str,
        records: &KeyedRecords<T>,
    ) -> RemoteResult<()> {
        let url = self.bin_url(bin);
        debug!(%url, records = records.len(), "Replacing bin");

        let response = self
            .auth
            .apply(self.client.put(&url))
            .json(records)
            .send()
            .await
            .map_err(|e| RemoteError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RemoteError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn get_directory(&self) -> RemoteResult<Directory> {
        self.read_bin(&self.directory_bin).await
    }

    async fn put_directory(&self, directory: &Directory) -> RemoteResult<()> {
        self.write_bin(&self.directory_bin, directory).await
    }

    async fn get_documents(&self) -> RemoteResult<DocumentMap> {
        self.read_bin(&self.documents_bin).await
    }

    async fn put_documents(&self, documents: &DocumentMap) -> RemoteResult<()> {
        self.write_bin(&self.documents_bin, documents).await
    }
}

/// Builder for [`HttpRemoteStore`].
///
/// Both bin ids are required; the base URL defaults to the public JSON bin
/// service.
#[derive(Debug)]
pub struct HttpRemoteStoreBuilder {
    base_url: String,
    directory_bin: Option<String>,
    documents_bin: Option<String>,
    auth: RemoteAuth,
    request_timeout: Option<Duration>,
}

impl Default for HttpRemoteStoreBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_URL.to_string(),
            directory_bin: None,
            documents_bin: None,
            auth: RemoteAuth::None,
            request_timeout: None,
        }
    }
}

impl HttpRemoteStoreBuilder {
    /// Base URL of the bin service, e.g. `https://api.jsonbin.io/v3`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Bin holding the account directory.
    pub fn directory_bin(mut self, bin: impl Into<String>) -> Self {
        self.directory_bin = Some(bin.into());
        self
    }

    /// Bin holding the document mapping.
    pub fn documents_bin(mut self, bin: impl Into<String>) -> Self {
        self.documents_bin = Some(bin.into());
        self
    }

    /// Credentials sent with every request.
    pub fn auth(mut self, auth: RemoteAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Transport-level timeout applied by the HTTP client itself.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validate the settings and build the store.
    pub fn build(self) -> RemoteResult<HttpRemoteStore> {
        let parsed = Url::parse(&self.base_url).map_err(|e| RemoteError::InvalidConfig {
            reason: format!("invalid base URL '{}': {e}", self.base_url),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidConfig {
                reason: format!("unsupported URL scheme '{}'", parsed.scheme()),
            });
        }

        let directory_bin = non_empty(self.directory_bin, "directory bin")?;
        let documents_bin = non_empty(self.documents_bin, "documents bin")?;

        let mut client = Client::builder();
        if let Some(timeout) = self.request_timeout {
            client = client.timeout(timeout);
        }
        let client = client.build().map_err(|e| RemoteError::InvalidConfig {
            reason: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(HttpRemoteStore {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            directory_bin,
            documents_bin,
            auth: self.auth,
        })
    }
}

fn non_empty(value: Option<String>, what: &str) -> RemoteResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RemoteError::InvalidConfig {
            reason: format!("{what} is required"),
        }),
    }
}
