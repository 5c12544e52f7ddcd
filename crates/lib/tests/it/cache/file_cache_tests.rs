//! FileCache persistence across reopen and as a service backend

use std::sync::Arc;

use notesync::{
    FixedClock,
    cache::{FileCache, LocalCache},
    constants::{DIRECTORY_CACHE_KEY, DOCUMENTS_CACHE_KEY},
    documents::{Flashcard, IncomingDocument},
    mirror::MirrorOptions,
    remote::OfflineRemote,
};
use serde_json::json;

use crate::helpers::*;

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    {
        let cache = FileCache::open(&path).unwrap();
        cache.set("a", "1").unwrap();
        cache.set("b", "2").unwrap();
        cache.remove("a").unwrap();
    }

    let cache = FileCache::open(&path).unwrap();
    assert_eq!(cache.get("a").unwrap(), None);
    assert_eq!(cache.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCache::open(dir.path().join("nested/missing/cache.json")).unwrap();

    let err = cache.set("a", "1").unwrap_err();
    assert!(err.is_cache_error());
}

#[test]
fn test_garbage_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    std::fs::write(&path, "definitely not json").unwrap();

    assert!(FileCache::open(&path).unwrap_err().is_cache_error());
}

#[tokio::test]
async fn test_offline_client_keeps_data_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let open = || {
        build_service(
            Arc::new(OfflineRemote),
            Arc::new(FileCache::open(&path).unwrap()),
            Arc::new(FixedClock::default()),
            MirrorOptions::default(),
        )
    };

    let id = {
        let service = open();
        let id = register_ada(&service).await;
        service
            .write_document(
                &id,
                IncomingDocument {
                    projects: Vec::new(),
                    flashcards: Some(vec![Flashcard(json!({"front": "persisted"}))]),
                },
            )
            .await
            .unwrap();
        id
    };

    let service = open();
    let session = service.login("ada@example.com", "p@ss").await.unwrap();
    assert_eq!(session.account.id, id);
    let doc = service.read_document(&id).await.unwrap();
    assert_eq!(doc.flashcards, vec![Flashcard(json!({"front": "persisted"}))]);

    let cache = FileCache::open(&path).unwrap();
    assert!(cache.get(DIRECTORY_CACHE_KEY).unwrap().is_some());
    assert!(cache.get(DOCUMENTS_CACHE_KEY).unwrap().is_some());
}
