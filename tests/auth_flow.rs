mod common;

use aeroadmin::api::{ApiClient, ClientSettings, CredentialMode};
use aeroadmin::auth::{AuthController, LOGIN_FAILED};
use aeroadmin::error::{ApiError, AuthError};
use aeroadmin::models::Session;
use aeroadmin::session::{MemoryStorage, SessionStore, TOKEN_KEY, USER_KEY};
use common::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn controller(base_url: &str, mode: CredentialMode, storage: MemoryStorage) -> (AuthController, Arc<SessionStore>, Arc<ApiClient>) {
    let store = Arc::new(SessionStore::new(storage));
    store.load();
    let client = Arc::new(
        ApiClient::new(
            ClientSettings::new(base_url).with_credential_mode(mode),
            Arc::clone(&store),
        )
        .unwrap(),
    );
    let auth = AuthController::new(Arc::clone(&client), Arc::clone(&store));
    (auth, store, client)
}

#[tokio::test]
async fn test_login_with_default_credentials_stores_token() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;

    let (auth, store, _) = controller(&server.uri(), CredentialMode::Bearer, MemoryStorage::new());
    let session = auth.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();

    let expected = Session::new("USER_ADMIN", "ADMIN", "t1");
    assert_eq!(session, expected);
    assert_eq!(store.current(), Some(expected));
}

#[tokio::test]
async fn test_requests_after_login_carry_bearer_token() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;
    Mock::given(method("GET"))
        .and(path("/flights/flights/"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(flights()))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _, client) = controller(&server.uri(), CredentialMode::Bearer, MemoryStorage::new());
    auth.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();

    let body = client.get("/flights/flights/").await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 3);

    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert_eq!(last.headers.get("authorization").unwrap(), "Bearer t1");
}

#[tokio::test]
async fn test_mixed_mode_sends_service_account_and_bearer() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;
    Mock::given(method("GET"))
        .and(path("/aircrafts/aircrafts/"))
        .and(header("x-db-user", "USER_ADMIN"))
        .and(header("x-db-password", "admin123"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, _, client) = controller(&server.uri(), CredentialMode::Mixed, MemoryStorage::new());
    auth.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    client.get("/aircrafts/aircrafts/").await.unwrap();
}

#[tokio::test]
async fn test_failed_login_leaves_store_untouched() {
    let server = MockServer::start().await;
    mount_login_rejected(&server).await;

    let storage = persisted("alice", "old-token");
    let (auth, store, _) = controller(&server.uri(), CredentialMode::Mixed, storage.clone());
    let before = store.current();
    assert!(before.is_some());

    let err = auth.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err.message(), "Incorrect username or password");
    match err {
        AuthError::Rejected { cause, .. } => {
            assert!(matches!(cause, ApiError::AuthenticationRejected { .. }))
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(store.current(), before);
    assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("old-token"));
}

#[tokio::test]
async fn test_failed_login_without_detail_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (auth, store, _) = controller(&server.uri(), CredentialMode::Mixed, MemoryStorage::new());
    let err = auth.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap_err();
    assert_eq!(err.message(), LOGIN_FAILED);
    assert_eq!(store.current(), None);
}

#[tokio::test]
async fn test_login_response_without_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "alice"})))
        .mount(&server)
        .await;

    let storage = MemoryStorage::new();
    let (auth, store, _) = controller(&server.uri(), CredentialMode::Mixed, storage.clone());
    let err = auth.login("alice", "pw").await.unwrap_err();
    assert_eq!(err.message(), LOGIN_FAILED);
    assert_eq!(store.current(), None);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_login_defaults_role_to_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"username": "alice", "access_token": "abc"})),
        )
        .mount(&server)
        .await;

    let (auth, _, _) = controller(&server.uri(), CredentialMode::Mixed, MemoryStorage::new());
    let session = auth.login("alice", "pw").await.unwrap();
    assert_eq!(session.role, "ADMIN");
}

#[tokio::test]
async fn test_login_against_unreachable_server() {
    let (auth, store, _) =
        controller("http://127.0.0.1:1", CredentialMode::Mixed, MemoryStorage::new());
    let err = auth.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::Unreachable { .. }));
    assert!(err.message().starts_with(LOGIN_FAILED));
    assert_eq!(store.current(), None);
}

#[tokio::test]
async fn test_logout_clears_session_and_credential() {
    let server = MockServer::start().await;
    mount_login(&server, ADMIN_USER, ADMIN_PASSWORD, "t1").await;

    let storage = MemoryStorage::new();
    let (auth, store, client) = controller(&server.uri(), CredentialMode::Bearer, storage.clone());
    auth.login(ADMIN_USER, ADMIN_PASSWORD).await.unwrap();
    assert!(client.credential_headers().unwrap().contains_key("authorization"));

    auth.logout();
    assert_eq!(store.current(), None);
    assert_eq!(storage.get(USER_KEY), None);
    assert_eq!(storage.get(TOKEN_KEY), None);
    assert!(client.credential_headers().unwrap().is_empty());

    // Logging out again is harmless
    auth.logout();
    assert_eq!(store.current(), None);
}

#[tokio::test]
async fn test_logout_login_sequence_injects_latest_token() {
    let server = MockServer::start().await;
    mount_login(&server, "alice", "pw1", "first").await;
    mount_login(&server, "bob", "pw2", "second").await;
    Mock::given(method("GET"))
        .and(path("/passengers/passengers/"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (auth, store, client) =
        controller(&server.uri(), CredentialMode::Bearer, MemoryStorage::new());

    auth.logout();
    auth.login("alice", "pw1").await.unwrap();
    auth.logout();
    auth.login("bob", "pw2").await.unwrap();

    assert_eq!(store.token().as_deref(), Some("second"));
    assert_eq!(
        client.credential_headers().unwrap()["authorization"],
        "Bearer second"
    );
    client.get("/passengers/passengers/").await.unwrap();
}
