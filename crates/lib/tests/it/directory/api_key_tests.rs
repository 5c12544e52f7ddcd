//! API key storage on accounts

use crate::helpers::*;

#[tokio::test]
async fn test_set_get_clear_api_key() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    assert_eq!(ctx.service.get_api_key(&id).await.unwrap(), None);

    ctx.service.set_api_key(&id, "abc").await.unwrap();
    assert_eq!(ctx.service.get_api_key(&id).await.unwrap().as_deref(), Some("abc"));

    ctx.service.clear_api_key(&id).await.unwrap();
    assert_eq!(ctx.service.get_api_key(&id).await.unwrap(), None);
}

#[tokio::test]
async fn test_api_key_leaves_credentials_alone() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.service.set_api_key(&id, "abc").await.unwrap();
    ctx.service.clear_api_key(&id).await.unwrap();

    let session = ctx.service.login("ada@example.com", "p@ss").await.unwrap();
    assert_eq!(session.account.id, id);
}

#[tokio::test]
async fn test_api_key_only_touches_its_account() {
    let ctx = TestContext::new();
    let ada = register_ada(&ctx.service).await;
    let bob = ctx
        .service
        .register("Bob", "bob@example.com", "pw")
        .await
        .unwrap()
        .account
        .id;

    ctx.service.set_api_key(&bob, "bobs-key").await.unwrap();
    assert_eq!(ctx.service.get_api_key(&ada).await.unwrap(), None);
    assert_eq!(
        ctx.service.get_api_key(&bob).await.unwrap().as_deref(),
        Some("bobs-key")
    );
}

#[tokio::test]
async fn test_api_key_survives_outage() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    ctx.remote.set_available(false);
    ctx.service.set_api_key(&id, "offline-key").await.unwrap();
    assert_eq!(
        ctx.service.get_api_key(&id).await.unwrap().as_deref(),
        Some("offline-key")
    );
}

#[tokio::test]
async fn test_usable_api_key_needs_more_than_twenty_chars() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    assert!(!ctx.service.has_usable_api_key(&id).await.unwrap());
    ctx.service.set_api_key(&id, "short").await.unwrap();
    assert!(!ctx.service.has_usable_api_key(&id).await.unwrap());
    ctx.service
        .set_api_key(&id, "sk-0123456789abcdefghij")
        .await
        .unwrap();
    assert!(ctx.service.has_usable_api_key(&id).await.unwrap());
}

#[tokio::test]
async fn test_unknown_account_id() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    for err in [
        ctx.service.set_api_key("user_missing", "k").await.unwrap_err(),
        ctx.service.clear_api_key("user_missing").await.unwrap_err(),
        ctx.service.get_api_key("user_missing").await.unwrap_err(),
    ] {
        assert!(err.is_not_found());
    }
}
