mod common;

use session_auth::auth::events::AuthEvent;
use session_auth::auth::models::RememberMeCookie;
use session_auth::AuthError;

use common::Harness;

#[tokio::test]
async fn test_attempt_establishes_a_session_for_later_requests() {
    let harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    let user = auth.attempt("alice@example.com", "s3cret", false).await.unwrap();
    assert_eq!(user.username, "alice");
    assert!(auth.is_logged_in().unwrap());
    assert!(!auth.is_authenticated().unwrap());

    // Next request over the same session resumes the user
    let mut auth = harness.request();
    let resumed = auth.authenticate().await.unwrap();
    assert_eq!(resumed.id, user.id);
    assert!(auth.is_authenticated().unwrap());
    assert!(!auth.via_remember().unwrap());
}

#[tokio::test]
async fn test_attempt_rejects_bad_credentials() {
    let harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    let result = auth.attempt("alice@example.com", "wrong", false).await;
    assert!(matches!(
        result.unwrap_err(),
        AuthError::InvalidPassword { .. }
    ));

    let result = auth.attempt("nobody@example.com", "s3cret", false).await;
    assert!(matches!(result.unwrap_err(), AuthError::InvalidUid { .. }));

    // Nothing was established for later requests
    let mut auth = harness.request();
    assert!(!auth.check().await.unwrap());
}

#[tokio::test]
async fn test_remember_me_survives_session_expiry() {
    let mut harness = Harness::new();
    let seeded = harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    auth.attempt("alice@example.com", "s3cret", true).await.unwrap();

    // The minted token was persisted on the user row
    let stored = harness.store.get(&seeded.id).unwrap().unwrap();
    assert!(stored.remember_me_token.is_some());

    harness.expire_session();

    let mut auth = harness.request();
    let resumed = auth.authenticate().await.unwrap();
    assert_eq!(resumed.id, seeded.id);
    assert!(auth.via_remember().unwrap());

    // The resumed session works without the cookie on the request after
    let mut auth = harness.request();
    auth.authenticate().await.unwrap();
    assert!(!auth.via_remember().unwrap());
}

#[tokio::test]
async fn test_without_remember_session_expiry_logs_out() {
    let mut harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    auth.attempt("alice@example.com", "s3cret", false).await.unwrap();

    harness.expire_session();

    let mut auth = harness.request();
    let result = auth.authenticate().await;
    assert!(matches!(
        result.unwrap_err(),
        AuthError::InvalidSession { .. }
    ));
}

#[tokio::test]
async fn test_tampered_remember_me_cookie_is_rejected() {
    let mut harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    auth.attempt("alice@example.com", "s3cret", true).await.unwrap();

    harness.expire_session();
    let (value, _) = harness.cookies.cookie("remember_web").unwrap();
    let mut payload = RememberMeCookie::decode(&value).unwrap();
    payload.token = "forged_token".to_string();
    harness
        .cookies
        .put_raw("remember_web", &payload.encode().unwrap());

    let mut auth = harness.request();
    let result = auth.authenticate().await;
    assert!(matches!(
        result.unwrap_err(),
        AuthError::InvalidSession { .. }
    ));
}

#[tokio::test]
async fn test_logout_ends_the_session_and_drops_the_cookie() {
    let mut harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    auth.attempt("alice@example.com", "s3cret", true).await.unwrap();

    let mut auth = harness.request();
    auth.logout(false).await.unwrap();
    assert!(auth.is_logged_out().unwrap());
    assert!(harness.cookies.cookie("remember_web").is_none());

    harness.expire_session();
    let mut auth = harness.request();
    assert!(!auth.check().await.unwrap());
}

#[tokio::test]
async fn test_recycle_logout_invalidates_previously_issued_cookies() {
    let mut harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");

    let mut auth = harness.request();
    auth.attempt("alice@example.com", "s3cret", true).await.unwrap();

    // A second device keeps a copy of the remember-me cookie
    let (old_cookie, _) = harness.cookies.cookie("remember_web").unwrap();

    let mut auth = harness.request();
    auth.logout(true).await.unwrap();

    // The old cookie no longer matches the rotated token
    harness.expire_session();
    harness.cookies.put_raw("remember_web", &old_cookie);

    let mut auth = harness.request();
    let result = auth.authenticate().await;
    assert!(matches!(
        result.unwrap_err(),
        AuthError::InvalidSession { .. }
    ));
}

#[tokio::test]
async fn test_recycle_logout_without_a_user_completes() {
    let harness = Harness::new();

    let mut auth = harness.request();
    auth.logout(true).await.unwrap();
    assert!(auth.is_logged_out().unwrap());
}

#[tokio::test]
async fn test_login_emits_a_lifecycle_event() {
    let harness = Harness::new();
    harness.seed_user("alice", "alice@example.com", "s3cret");
    let mut events = harness.events.subscribe();

    let mut auth = harness.request();
    auth.attempt("alice@example.com", "s3cret", true).await.unwrap();

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_name(), "session:login");
    assert_eq!(event.guard(), "web");
    match event {
        AuthEvent::Login(login) => {
            assert_eq!(login.user.username, "alice");
            assert!(login.token.is_some());
        }
        other => panic!("expected login event, got {:?}", other),
    }

    // The next request's authenticate announces the resumption
    let mut auth = harness.request();
    auth.authenticate().await.unwrap();

    let event = events.try_recv().unwrap();
    assert_eq!(event.event_name(), "session:authenticate");
    match event {
        AuthEvent::Authenticate(event) => assert!(!event.via_remember),
        other => panic!("expected authenticate event, got {:?}", other),
    }
}
