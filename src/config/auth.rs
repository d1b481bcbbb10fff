use crate::api::CredentialMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub credential_mode: Option<CredentialMode>,
    #[serde(default)]
    pub service_account: ServiceAccountConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceAccountConfig {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
