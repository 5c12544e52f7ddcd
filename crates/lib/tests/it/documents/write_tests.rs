//! Read-merge-write behaviour of document saves

use notesync::documents::{Flashcard, IncomingDocument, Project};
use serde_json::json;

use crate::helpers::*;

fn cards(names: &[&str]) -> Vec<Flashcard> {
    names
        .iter()
        .map(|name| Flashcard(json!({"front": name, "back": format!("{name} answer")})))
        .collect()
}

#[tokio::test]
async fn test_fresh_account_has_empty_document() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.owner, id);
    assert!(doc.projects.is_empty());
    assert!(doc.flashcards.is_empty());
    assert_eq!(doc.last_synced_at.timestamp_millis() as u64, START_MILLIS);
}

#[tokio::test]
async fn test_second_write_replaces_flashcards() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(cards(&["a", "b", "c"])),
            },
        )
        .await
        .unwrap();
    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(cards(&["d"])),
            },
        )
        .await
        .unwrap();

    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.flashcards, cards(&["d"]));
}

#[tokio::test]
async fn test_missing_flashcards_keep_existing() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(cards(&["keep me"])),
            },
        )
        .await
        .unwrap();
    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: vec![Project::new(id.clone()).with_field("title", "New")],
                flashcards: None,
            },
        )
        .await
        .unwrap();

    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.flashcards, cards(&["keep me"]));
    assert_eq!(doc.projects.len(), 1);
}

#[tokio::test]
async fn test_missing_projects_clear_existing() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: vec![Project::new(id.clone())],
                flashcards: None,
            },
        )
        .await
        .unwrap();
    ctx.service
        .write_document(&id, IncomingDocument::default())
        .await
        .unwrap();

    assert!(ctx.service.read_document(&id).await.unwrap().projects.is_empty());
}

#[tokio::test]
async fn test_write_stamps_sync_time() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.clock.advance(60_000);
    let ack = ctx
        .service
        .write_document(&id, IncomingDocument::default())
        .await
        .unwrap();

    assert!(ack.remote_persisted);
    assert_eq!(ack.synced_at.timestamp_millis() as u64, START_MILLIS + 60_000);
    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.last_synced_at, ack.synced_at);
}

#[tokio::test]
async fn test_project_fields_survive_round_trip() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    let project = Project::new(id.clone())
        .with_field("id", 1712)
        .with_field("title", "Thesis")
        .with_field("notes", json!([{"text": "intro", "pinned": true}]));
    ctx.service
        .write_document(
            &id,
            IncomingDocument {
                projects: vec![project.clone()],
                flashcards: None,
            },
        )
        .await
        .unwrap();

    let doc = ctx.service.read_document(&id).await.unwrap();
    assert_eq!(doc.projects, vec![project]);
}

#[tokio::test]
async fn test_unknown_user_has_no_document() {
    let ctx = TestContext::new();
    let err = ctx.service.read_document("user_unknown").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_write_for_unknown_user_creates_document() {
    let ctx = TestContext::new();
    ctx.service
        .write_document(
            "user_orphan",
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(cards(&["x"])),
            },
        )
        .await
        .unwrap();

    let doc = ctx.service.read_document("user_orphan").await.unwrap();
    assert_eq!(doc.flashcards.len(), 1);
}

#[tokio::test]
async fn test_writes_do_not_touch_other_users() {
    let ctx = TestContext::new();
    let ada = register_ada(&ctx.service).await;
    let bob = ctx
        .service
        .register("Bob", "bob@example.com", "pw")
        .await
        .unwrap()
        .account
        .id;

    ctx.service
        .write_document(
            &bob,
            IncomingDocument {
                projects: vec![Project::new(bob.clone())],
                flashcards: Some(cards(&["bob"])),
            },
        )
        .await
        .unwrap();
    ctx.service
        .write_document(
            &ada,
            IncomingDocument {
                projects: Vec::new(),
                flashcards: Some(cards(&["ada"])),
            },
        )
        .await
        .unwrap();

    let doc = ctx.service.read_document(&bob).await.unwrap();
    assert_eq!(doc.flashcards, cards(&["bob"]));
    assert_eq!(doc.projects.len(), 1);
}
