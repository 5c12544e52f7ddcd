//! HttpRemoteStore against a locally started BinServer

use std::sync::Arc;
use std::time::Duration;

use notesync::{
    KeyedRecords,
    cache::MemoryCache,
    documents::{Flashcard, IncomingDocument, UserDocument},
    mirror::{MirrorOptions, Origin},
    remote::{BinServer, HttpRemoteStore, RemoteAuth, RemoteStore, RunningBinServer},
};
use serde_json::json;

use crate::helpers::*;

const ACCESS_KEY: &str = "integration-test-key";

async fn start_server() -> RunningBinServer {
    BinServer::new()
        .with_access_key(ACCESS_KEY)
        .start("127.0.0.1:0")
        .await
        .expect("Failed to start bin server")
}

fn store(server: &RunningBinServer, auth: RemoteAuth) -> HttpRemoteStore {
    HttpRemoteStore::builder()
        .base_url(server.base_url())
        .directory_bin("users")
        .documents_bin("data")
        .auth(auth)
        .request_timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP store")
}

fn service_over(remote: HttpRemoteStore) -> notesync::SyncService {
    build_service(
        Arc::new(remote),
        Arc::new(MemoryCache::new()),
        Arc::new(notesync::FixedClock::default()),
        MirrorOptions::default(),
    )
}

#[tokio::test]
async fn test_unwritten_bin_is_an_error() {
    let server = start_server().await;
    let remote = store(&server, RemoteAuth::master_key(ACCESS_KEY));

    let err = remote.get_directory().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_documents_round_trip_over_http() {
    let server = start_server().await;
    let remote = store(&server, RemoteAuth::master_key(ACCESS_KEY));

    let mut documents = KeyedRecords::new();
    let mut doc = UserDocument::empty(
        "user_1",
        chrono::DateTime::from_timestamp_millis(START_MILLIS as i64).unwrap(),
    );
    doc.flashcards.push(Flashcard(json!({"front": "Q", "back": "A"})));
    documents.insert("user_1".to_string(), doc);

    remote.put_documents(&documents).await.unwrap();
    assert_eq!(remote.get_documents().await.unwrap(), documents);
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let server = start_server().await;
    let remote = store(&server, RemoteAuth::bearer(ACCESS_KEY));

    remote.put_directory(&KeyedRecords::new()).await.unwrap();
    assert!(remote.get_directory().await.unwrap().is_empty());
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let server = start_server().await;
    let remote = store(&server, RemoteAuth::master_key("not-the-key"));

    let err = remote.put_directory(&KeyedRecords::new()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_service_end_to_end_over_http() {
    let server = start_server().await;
    let service = service_over(store(&server, RemoteAuth::master_key(ACCESS_KEY)));

    let id = register_ada(&service).await;
    service
        .write_document(
            &id,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(vec![Flashcard(json!({"front": "Q"}))]),
            },
        )
        .await
        .unwrap();

    // A second client with an empty cache sees everything through the server.
    let other = service_over(store(&server, RemoteAuth::master_key(ACCESS_KEY)));
    let session = other.login("ada@example.com", "p@ss").await.unwrap();
    assert_eq!(session.account.id, id);
    let fetched = other.fetch_document(&id).await.unwrap();
    assert_eq!(fetched.origin, Origin::Remote);
    assert_eq!(fetched.value.flashcards.len(), 1);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_wrong_key_falls_back_to_cache() {
    let server = start_server().await;
    let service = service_over(store(&server, RemoteAuth::master_key("wrong")));

    let id = register_ada(&service).await;
    let fetched = service.fetch_document(&id).await.unwrap();
    assert_eq!(fetched.origin, Origin::Cache);
    assert!(service.login("ada@example.com", "p@ss").await.is_ok());

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stopped_server_falls_back_to_cache() {
    let server = start_server().await;
    let service = service_over(store(&server, RemoteAuth::master_key(ACCESS_KEY)));
    let id = register_ada(&service).await;

    server.shutdown().await.unwrap();

    let fetched = service.fetch_document(&id).await.unwrap();
    assert_eq!(fetched.origin, Origin::Cache);
    let ack = service
        .write_document(&id, IncomingDocument::default())
        .await
        .unwrap();
    assert!(!ack.remote_persisted);
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = start_server().await;
    let body: serde_json::Value = reqwest::get(format!("{}/health", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    server.shutdown().await.unwrap();
}
