#![allow(dead_code)]

use aeroadmin::api::{ClientSettings, CredentialMode};
use aeroadmin::app::Console;
use aeroadmin::session::{MemoryStorage, TOKEN_KEY, USER_KEY};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ADMIN_USER: &str = "USER_ADMIN";
pub const ADMIN_PASSWORD: &str = "admin123";

pub fn settings(server: &MockServer, mode: CredentialMode) -> ClientSettings {
    ClientSettings::new(server.uri()).with_credential_mode(mode)
}

pub fn open_console(server: &MockServer, storage: MemoryStorage) -> Console {
    Console::with_storage(settings(server, CredentialMode::Mixed), storage).unwrap()
}

pub fn open_console_with_mode(
    server: &MockServer,
    storage: MemoryStorage,
    mode: CredentialMode,
) -> Console {
    Console::with_storage(settings(server, mode), storage).unwrap()
}

/// Storage that already holds a persisted session.
pub fn persisted(username: &str, token: &str) -> MemoryStorage {
    MemoryStorage::with_entries([
        (
            USER_KEY.to_string(),
            json!({"username": username, "role": "ADMIN"}).to_string(),
        ),
        (TOKEN_KEY.to_string(), token.to_string()),
    ])
}

pub fn login_ok(username: &str, token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "username": username,
        "role": "ADMIN",
        "message": "Login successful"
    })
}

pub async fn mount_login(server: &MockServer, username: &str, password: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"username": username, "password": password})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_ok(username, token)))
        .mount(server)
        .await;
}

pub async fn mount_login_rejected(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect username or password"})),
        )
        .mount(server)
        .await;
}

pub fn flights() -> Value {
    json!([
        {"vol_num": 101, "destination": "Paris", "state": "Scheduled", "avion_id": 1},
        {"vol_num": 102, "destination": "Tunis", "state": "Boarding", "avion_id": 2},
        {"vol_num": 103, "destination": "Rome", "state": "Scheduled", "avion_id": 1}
    ])
}
