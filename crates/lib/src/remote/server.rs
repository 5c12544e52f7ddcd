//! Minimal JSON bin server.
//!
//! Emulates the slice of the JSON bin API that [`HttpRemoteStore`](super::HttpRemoteStore)
//! uses, so the HTTP path can be exercised end-to-end without the public
//! service and so a team can self-host a shared store:
//!
//! - `GET /b/{bin}` and `GET /b/{bin}/latest` return `{"record": ..., "metadata": {...}}`
//! - `PUT /b/{bin}` stores the JSON body, creating the bin if needed
//! - `GET /health` returns `{"status": "healthy"}`
//!
//! When an access key is configured, bin routes require it either in the
//! `X-Master-Key` header or as a bearer token.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::sync::{RwLock, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use super::ServerError;
use crate::{Result, constants::MASTER_KEY_HEADER};

#[derive(Clone, Default)]
struct BinState {
    bins: Arc<RwLock<HashMap<String, Value>>>,
    access_key: Option<Arc<Zeroizing<String>>>,
}

impl BinState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(key) = &self.access_key else {
            return true;
        };
        let master = headers
            .get(MASTER_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        master == Some(key.as_str()) || bearer == Some(key.as_str())
    }
}

/// Configures and starts an emulated JSON bin service.
#[derive(Default)]
pub struct BinServer {
    state: BinState,
}

impl BinServer {
    /// A server that accepts unauthenticated requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` on every bin request.
    pub fn with_access_key(mut self, key: impl Into<String>) -> Self {
        self.state.access_key = Some(Arc::new(Zeroizing::new(key.into())));
        self
    }

    /// The axum router serving the bin API.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/b/{bin}", get(read_bin).put(write_bin))
            .route("/b/{bin}/latest", get(read_bin))
            .with_state(self.state.clone())
    }

    /// Bind `addr` and serve in a background task.
    ///
    /// Use port 0 to let the OS pick a port; the bound address is available
    /// from the returned handle.
    pub async fn start(self, addr: &str) -> Result<RunningBinServer> {
        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| ServerError::Bind {
                    address: addr.to_string(),
                    reason: e.to_string(),
                })?;
        let local_addr = listener.local_addr().map_err(|e| ServerError::Bind {
            address: addr.to_string(),
            reason: e.to_string(),
        })?;

        let router = self.router();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                error!(error = %e, "Bin server stopped with an error");
            }
        });

        info!(address = %local_addr, "Bin server listening");
        Ok(RunningBinServer {
            address: local_addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }
}

/// Handle to a started [`BinServer`].
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also
/// stops the server, since the shutdown channel closes.
pub struct RunningBinServer {
    address: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RunningBinServer {
    /// The bound socket address.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Base URL for [`HttpRemoteStore`](super::HttpRemoteStore) pointing at this server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Stop accepting requests and wait for in-flight ones to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.task).await.map_err(|e| ServerError::Task {
            reason: e.to_string(),
        })?;
        info!(address = %self.address, "Bin server stopped");
        Ok(())
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn read_bin(
    State(state): State<BinState>,
    Path(bin): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let bins = state.bins.read().await;
    match bins.get(&bin) {
        Some(record) => {
            debug!(%bin, "Serving bin");
            Json(json!({ "record": record, "metadata": { "id": bin } })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Bin not found" })),
        )
            .into_response(),
    }
}

async fn write_bin(
    State(state): State<BinState>,
    Path(bin): Path<String>,
    headers: HeaderMap,
    Json(record): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    debug!(%bin, "Replacing bin");
    state.bins.write().await.insert(bin.clone(), record.clone());
    Json(json!({ "record": record, "metadata": { "id": bin } })).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid or missing access key" })),
    )
        .into_response()
}
