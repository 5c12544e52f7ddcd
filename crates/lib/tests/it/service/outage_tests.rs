//! Behaviour while the remote store is unreachable

use notesync::documents::{Flashcard, IncomingDocument, Project};
use serde_json::json;

use crate::helpers::*;

#[tokio::test]
async fn test_everything_works_against_cache_only() {
    let ctx = TestContext::offline();

    let registered = ctx
        .service
        .register("Ada", "ada@example.com", "p@ss")
        .await
        .unwrap();
    let id = registered.account.id;

    let session = ctx.service.login("ada@example.com", "p@ss").await.unwrap();
    assert_eq!(session.account.id, id);

    let ack = ctx
        .service
        .write_document(
            &id,
            IncomingDocument {
                projects: vec![Project::new(id.clone())],
                flashcards: Some(vec![Flashcard(json!({"front": "offline"}))]),
            },
        )
        .await
        .unwrap();
    assert!(!ack.remote_persisted);

    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.projects.len(), 1);
    assert_eq!(doc.flashcards, vec![Flashcard(json!({"front": "offline"}))]);

    assert!(ctx.remote.raw_directory().is_none());
    assert!(ctx.remote.raw_documents().is_none());
}

#[tokio::test]
async fn test_reads_reflect_writes_made_during_outage() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.remote.set_available(false);
    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(vec![Flashcard(json!({"front": "during outage"}))]),
            },
        )
        .await
        .unwrap();

    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.flashcards[0].0["front"], "during outage");
}

#[tokio::test]
async fn test_remote_wins_again_once_it_returns() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.remote.set_available(false);
    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(vec![Flashcard(json!({"front": "local only"}))]),
            },
        )
        .await
        .unwrap();

    // Loads prefer the remote, which never saw the outage write.
    ctx.remote.set_available(true);
    let doc = ctx.service.read_document(&id).await.unwrap();
    assert!(doc.flashcards.is_empty());
}

#[tokio::test]
async fn test_unknown_keys_still_not_found_offline() {
    let ctx = TestContext::offline();

    assert!(
        ctx.service
            .read_document("user_missing")
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(
        ctx.service
            .login("nobody@example.com", "x")
            .await
            .unwrap_err()
            .is_authentication_error()
    );
}
