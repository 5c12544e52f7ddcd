//! Registration: id assignment, duplicates and what gets persisted

use notesync::{
    KeyedRecords,
    cache::LocalCache,
    constants::{DIRECTORY_CACHE_KEY, DOCUMENTS_CACHE_KEY},
    directory::Account,
};

use crate::helpers::*;

#[tokio::test]
async fn test_register_returns_fresh_ids() {
    let ctx = TestContext::new();
    let ada = ctx
        .service
        .register("Ada", "ada@example.com", "p@ss")
        .await
        .expect("Register Ada");
    let bob = ctx
        .service
        .register("Bob", "bob@example.com", "p@ss")
        .await
        .expect("Register Bob");

    assert_ne!(ada.account.id, bob.account.id);
    assert_eq!(ada.account.name, "Ada");
    assert_eq!(ada.account.email, "ada@example.com");
    assert!(!ada.token.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_rejected_online() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    let err = ctx
        .service
        .register("Imposter", "ada@example.com", "other")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_duplicate_email_rejected_offline() {
    let ctx = TestContext::offline();
    register_ada(&ctx.service).await;

    let err = ctx
        .service
        .register("Imposter", "ada@example.com", "other")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_duplicate_detected_after_remote_goes_down() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    ctx.remote.set_available(false);
    let err = ctx
        .service
        .register("Imposter", "ada@example.com", "other")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_duplicate_detected_after_remote_comes_back() {
    let ctx = TestContext::offline();
    let id = register_ada(&ctx.service).await;

    ctx.remote.set_available(true);
    let err = ctx
        .service
        .register("Imposter", "ada@example.com", "other")
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    let session = ctx
        .service
        .login("ada@example.com", "p@ss")
        .await
        .expect("Original credentials still work");
    assert_eq!(session.account.id, id);
}

#[tokio::test]
async fn test_outage_account_reaches_remote_on_next_registration() {
    let ctx = TestContext::offline();
    let ada = register_ada(&ctx.service).await;
    assert!(ctx.remote.raw_directory().is_none());

    ctx.remote.set_available(true);
    ctx.service
        .register("Bob", "bob@example.com", "p@ss")
        .await
        .unwrap();

    let remote_dir: KeyedRecords<Account> =
        serde_json::from_str(&ctx.remote.raw_directory().expect("remote directory")).unwrap();
    assert_eq!(remote_dir["ada@example.com"].id, ada);
    assert!(remote_dir.contains_key("bob@example.com"));
    assert_eq!(ctx.service.list_accounts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_emails_are_case_sensitive() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    ctx.service
        .register("Ada", "Ada@Example.com", "p@ss")
        .await
        .expect("Different case is a different email");
    assert_eq!(ctx.service.list_accounts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_register_writes_both_mappings_to_both_sides() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    let remote_dir: KeyedRecords<Account> =
        serde_json::from_str(&ctx.remote.raw_directory().expect("remote directory")).unwrap();
    let cached_dir: KeyedRecords<Account> =
        serde_json::from_str(&ctx.cache.get(DIRECTORY_CACHE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(remote_dir, cached_dir);
    assert_eq!(remote_dir["ada@example.com"].id, id);

    assert!(ctx.remote.raw_documents().unwrap().contains(&id));
    assert!(ctx.cache.get(DOCUMENTS_CACHE_KEY).unwrap().unwrap().contains(&id));
}

#[tokio::test]
async fn test_password_is_never_stored_in_plaintext() {
    let ctx = TestContext::new();
    ctx.service
        .register("Ada", "ada@example.com", "correct horse battery staple")
        .await
        .unwrap();

    let raw = ctx.remote.raw_directory().unwrap();
    assert!(!raw.contains("correct horse battery staple"));
    assert!(raw.contains("$argon2id$"));
}

#[tokio::test]
async fn test_list_accounts_hides_secrets() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;
    ctx.service
        .set_api_key(&id, "sk-very-secret-api-key-value")
        .await
        .unwrap();

    let accounts = ctx.service.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    let json = serde_json::to_string(&accounts).unwrap();
    assert!(!json.contains("sk-very-secret"));
    assert!(!json.contains("argon2"));
}
