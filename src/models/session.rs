use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated identity and the token issued for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub role: String,
    pub token: String,
}

impl Session {
    pub fn new(
        username: impl Into<String>,
        role: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            token: token.into(),
        }
    }

    pub fn user(&self) -> StoredUser {
        StoredUser {
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

/// Identity half of a session as it is kept under the `user` storage key.
/// The token lives under its own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub username: String,
    pub role: String,
}

/// Username and password held only for the duration of a login attempt.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .finish()
    }
}
