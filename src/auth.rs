use crate::api::{ApiClient, LOGIN_PATH};
use crate::error::{ApiError, AuthError};
use crate::models::{Credentials, LoginRequest, LoginResponse, Session};
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{info, warn};

pub const LOGIN_FAILED: &str = "Login failed";

/// Login/logout use cases.
///
/// Holds only shared handles, so it is cheap to clone and safe to call
/// concurrently; preventing overlapping submissions is up to the caller.
#[derive(Clone)]
pub struct AuthController {
    client: Arc<ApiClient>,
    store: Arc<SessionStore>,
}

impl AuthController {
    pub fn new(client: Arc<ApiClient>, store: Arc<SessionStore>) -> Self {
        Self { client, store }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        info!(username, "attempting login");

        let request = LoginRequest { username, password };
        let response: LoginResponse = self
            .client
            .post_json(LOGIN_PATH, &request)
            .await
            .map_err(login_error)?;

        let session = Session::new(
            response.username.clone(),
            response.role(),
            response.access_token.clone(),
        );
        self.store.set(session.clone())?;

        info!(
            username = %session.username,
            role = %session.role,
            message = response.message.as_deref().unwrap_or(""),
            "login succeeded"
        );
        Ok(session)
    }

    pub async fn login_with(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.login(&credentials.username, &credentials.password)
            .await
    }

    /// Local only; the next request carries no bearer credential.
    pub fn logout(&self) {
        self.end_session("logged out");
    }

    /// Drop a session the server no longer accepts.
    pub fn expire(&self) {
        self.end_session("session expired");
    }

    fn end_session(&self, reason: &str) {
        let username = self.store.current().map(|s| s.username);
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "session cleared in memory but not in storage");
        }
        info!(username = username.as_deref().unwrap_or("-"), "{}", reason);
    }

    pub fn current(&self) -> Option<Session> {
        self.store.current()
    }
}

fn login_error(cause: ApiError) -> AuthError {
    warn!(error = %cause, "login failed");
    match cause {
        ApiError::NetworkUnavailable(_) => AuthError::Unreachable {
            message: format!("{}: server unreachable", LOGIN_FAILED),
            cause,
        },
        _ => AuthError::Rejected {
            message: cause.detail().unwrap_or_else(|| LOGIN_FAILED.to_string()),
            cause,
        },
    }
}
