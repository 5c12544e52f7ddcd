//! Login: matching ids and indistinguishable failures

use notesync::directory::LoginFailure;

use crate::helpers::*;

#[tokio::test]
async fn test_login_returns_registered_id() {
    let ctx = TestContext::new();
    let accounts = [
        ("Ada", "ada@example.com", "p@ss"),
        ("Bob", "bob@example.com", "hunter2"),
        ("Émilie", "emilie@example.com", "mot de passe ünïcödé"),
        ("Empty", "empty@example.com", ""),
    ];

    for (name, email, password) in accounts {
        let registered = ctx.service.register(name, email, password).await.unwrap();
        let session = ctx.service.login(email, password).await.unwrap();
        assert_eq!(session.account.id, registered.account.id, "{email}");
        assert_ne!(session.token, registered.token);
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    let wrong_password = ctx
        .service
        .login("ada@example.com", "wrong")
        .await
        .unwrap_err();
    let unknown_email = ctx
        .service
        .login("nobody@example.com", "p@ss")
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.to_string(), "Invalid email or password");
    assert!(wrong_password.is_authentication_error());
    assert!(unknown_email.is_authentication_error());
}

#[tokio::test]
async fn test_login_cause_is_kept_internally() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    let cause = |err: notesync::Error| match err {
        notesync::Error::Directory(err) => err.login_failure(),
        _ => None,
    };

    let err = ctx.service.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(cause(err), Some(LoginFailure::WrongPassword));

    let err = ctx.service.login("nobody@example.com", "x").await.unwrap_err();
    assert_eq!(cause(err), Some(LoginFailure::UnknownAccount));
}

#[tokio::test]
async fn test_passwords_are_case_sensitive() {
    let ctx = TestContext::new();
    ctx.service
        .register("Ada", "ada@example.com", "MyPassword")
        .await
        .unwrap();

    assert!(ctx.service.login("ada@example.com", "mypassword").await.is_err());
    assert!(ctx.service.login("ada@example.com", "MYPASSWORD").await.is_err());
    assert!(ctx.service.login("ada@example.com", "MyPassword").await.is_ok());
}

#[tokio::test]
async fn test_login_from_another_client() {
    let ctx = TestContext::new();
    let id = register_ada(&ctx.service).await;

    let other = ctx.second_client();
    let session = other.login("ada@example.com", "p@ss").await.unwrap();
    assert_eq!(session.account.id, id);
}

#[tokio::test]
async fn test_password_reset_acknowledges_known_email() {
    let ctx = TestContext::new();
    register_ada(&ctx.service).await;

    let ack = ctx
        .service
        .request_password_reset("ada@example.com")
        .await
        .unwrap();
    assert_eq!(ack.email, "ada@example.com");
    assert_eq!(ack.message, "Password reset link sent to your email");

    let err = ctx
        .service
        .request_password_reset("nobody@example.com")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
