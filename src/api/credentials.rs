use crate::error::ApiError;
use crate::models::Session;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SERVICE_USER_HEADER: &str = "x-db-user";
pub const SERVICE_PASSWORD_HEADER: &str = "x-db-password";

pub const DEFAULT_SERVICE_USER: &str = "USER_ADMIN";
pub const DEFAULT_SERVICE_PASSWORD: &str = "admin123";

/// Which credential headers are attached to outgoing requests.
///
/// The backend authorizes data calls with a fixed database account pair while
/// the login endpoint issues a bearer token; both paths are kept selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialMode {
    /// Service-account pair on every request, bearer token when logged in.
    #[default]
    Mixed,
    /// Bearer token only, nothing before login.
    Bearer,
    /// Service-account pair only; login state never reaches the wire.
    ServiceAccount,
}

impl CredentialMode {
    pub fn sends_service_account(&self) -> bool {
        matches!(self, CredentialMode::Mixed | CredentialMode::ServiceAccount)
    }

    pub fn sends_bearer(&self) -> bool {
        matches!(self, CredentialMode::Mixed | CredentialMode::Bearer)
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialMode::Mixed => "mixed",
            CredentialMode::Bearer => "bearer",
            CredentialMode::ServiceAccount => "service-account",
        };
        f.write_str(name)
    }
}

impl FromStr for CredentialMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mixed" => Ok(CredentialMode::Mixed),
            "bearer" | "token" => Ok(CredentialMode::Bearer),
            "service-account" | "service_account" | "service" => {
                Ok(CredentialMode::ServiceAccount)
            }
            other => Err(format!(
                "unknown credential mode '{}' (expected mixed, bearer or service-account)",
                other
            )),
        }
    }
}

/// Fixed database account forwarded by the backend to its connection pool.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    pub user: String,
    pub password: String,
}

impl ServiceAccount {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl Default for ServiceAccount {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_USER, DEFAULT_SERVICE_PASSWORD)
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("user", &self.user)
            .field("password", &"<hidden>")
            .finish()
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ApiError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|e| ApiError::Request(format!("invalid {} header: {}", name, e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Credential headers for one request, computed from the session at send time.
pub fn credential_headers(
    mode: CredentialMode,
    account: &ServiceAccount,
    session: Option<&Session>,
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();

    if mode.sends_service_account() {
        headers.insert(
            HeaderName::from_static(SERVICE_USER_HEADER),
            header_value(SERVICE_USER_HEADER, &account.user)?,
        );
        headers.insert(
            HeaderName::from_static(SERVICE_PASSWORD_HEADER),
            header_value(SERVICE_PASSWORD_HEADER, &account.password)?,
        );
    }

    if mode.sends_bearer() {
        if let Some(session) = session {
            headers.insert(
                AUTHORIZATION,
                header_value("authorization", &format!("Bearer {}", session.token))?,
            );
        }
    }

    Ok(headers)
}
