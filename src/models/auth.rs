use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_ROLE: &str = "ADMIN";

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// Role reported by the endpoint, `ADMIN` when it sends none.
    pub fn role(&self) -> &str {
        self.role
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE)
    }
}

/// Error payload of the API; `detail` is either a string or a list of field errors.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Value,
}
