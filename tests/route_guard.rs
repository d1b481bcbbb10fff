mod common;

use aeroadmin::api::CredentialMode;
use aeroadmin::error::ApiError;
use aeroadmin::guard::{GuardDecision, GuardState, HOME_LOCATION};
use aeroadmin::models::ResourceKind;
use aeroadmin::session::{MemoryStorage, RETURN_KEY, TOKEN_KEY};
use common::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_restored_session_admits_protected_views() {
    let server = MockServer::start().await;
    let mut console = open_console(&server, persisted("USER_ADMIN", "t1"));

    assert_eq!(console.guard().state(), GuardState::Authenticated);
    assert_eq!(
        console.enter("/vols"),
        GuardDecision::Render {
            location: "/vols".to_string()
        }
    );
}

#[tokio::test]
async fn test_without_session_redirects_and_returns_after_login() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;

    let mut console = open_console(&server, MemoryStorage::new());
    assert_eq!(console.guard().state(), GuardState::Unauthenticated);
    assert_eq!(
        console.enter("/maintenance"),
        GuardDecision::RedirectToLogin {
            from: "/maintenance".to_string()
        }
    );

    let (session, next) = console.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(session.token, "t1");
    assert_eq!(next, "/maintenance");
    assert_eq!(console.guard().state(), GuardState::Authenticated);
    assert!(matches!(
        console.enter("/maintenance"),
        GuardDecision::Render { .. }
    ));
}

#[tokio::test]
async fn test_failed_login_keeps_guard_closed() {
    let server = MockServer::start().await;
    mount_login_rejected(&server).await;

    let mut console = open_console(&server, MemoryStorage::new());
    console.enter("/avions");
    assert!(console.login("alice", "nope").await.is_err());

    assert_eq!(console.guard().state(), GuardState::Unauthenticated);
    assert_eq!(console.guard().remembered(), Some("/avions"));
}

#[tokio::test]
async fn test_failed_login_does_not_expire_existing_session() {
    let server = MockServer::start().await;
    mount_login_rejected(&server).await;

    let storage = persisted("alice", "still-valid");
    let mut console = open_console(&server, storage.clone());
    assert!(console.login("alice", "typo").await.is_err());

    assert_eq!(console.guard().state(), GuardState::Authenticated);
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("still-valid"));
}

#[tokio::test]
async fn test_resource_401_sends_guard_back_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights/flights/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})),
        )
        .mount(&server)
        .await;

    let storage = persisted("USER_ADMIN", "stale");
    let mut console = open_console_with_mode(&server, storage.clone(), CredentialMode::Bearer);
    assert!(matches!(console.enter("/vols"), GuardDecision::Render { .. }));

    let err = console
        .resources()
        .list(ResourceKind::Flight)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AuthenticationRejected { .. }));

    console.refresh();
    assert_eq!(console.guard().state(), GuardState::Unauthenticated);
    assert_eq!(console.store().current(), None);
    assert!(storage.is_empty());

    assert_eq!(
        console.enter("/vols"),
        GuardDecision::RedirectToLogin {
            from: "/vols".to_string()
        }
    );
    assert_eq!(console.guard().remembered(), Some("/vols"));
}

#[tokio::test]
async fn test_resource_403_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/aircrafts/aircrafts/4"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut console = open_console(&server, persisted("USER_ADMIN", "t1"));
    let err = console
        .resources()
        .delete(ResourceKind::Aircraft, "4")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AuthorizationDenied { .. }));

    console.refresh();
    assert_eq!(console.guard().state(), GuardState::Authenticated);
    assert!(console.store().is_authenticated());
}

#[tokio::test]
async fn test_logout_closes_guard_without_reload() {
    let server = MockServer::start().await;
    let mut console = open_console(&server, persisted("USER_ADMIN", "t1"));

    console.logout();
    assert_eq!(console.guard().state(), GuardState::Unauthenticated);
    assert!(matches!(
        console.enter("/passagers"),
        GuardDecision::RedirectToLogin { .. }
    ));
}

#[tokio::test]
async fn test_login_without_prior_redirect_goes_home() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;

    let mut console = open_console(&server, MemoryStorage::new());
    let (_, next) = console.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(next, HOME_LOCATION);
}

#[tokio::test]
async fn test_earlier_401_does_not_end_new_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights/flights/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "fresh").await;

    let storage = persisted(ADMIN_USER, "stale");
    let mut console = open_console_with_mode(&server, storage.clone(), CredentialMode::Bearer);
    assert!(console.resources().list(ResourceKind::Flight).await.is_err());

    let (session, _) = console.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(session.token, "fresh");

    console.refresh();
    assert_eq!(console.store().token().as_deref(), Some("fresh"));
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("fresh"));
    assert_eq!(console.guard().state(), GuardState::Authenticated);
}

#[tokio::test]
async fn test_return_location_survives_restart() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;

    let storage = MemoryStorage::new();
    let mut first = open_console(&server, storage.clone());
    assert!(matches!(
        first.enter("/vols"),
        GuardDecision::RedirectToLogin { .. }
    ));
    assert_eq!(storage.get(RETURN_KEY).as_deref(), Some("/vols"));
    drop(first);

    let mut second = open_console(&server, storage.clone());
    assert_eq!(second.guard().remembered(), Some("/vols"));
    let (_, next) = second.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(next, "/vols");
    assert_eq!(storage.get(RETURN_KEY), None);

    // Consumed: the next login lands on the home location
    let mut third = open_console(&server, storage.clone());
    let (_, next) = third.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(next, HOME_LOCATION);
}
