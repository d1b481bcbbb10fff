mod api;
mod auth;
mod defaults;
mod validation;

use crate::api::{ClientSettings, CredentialMode, ServiceAccount, DEFAULT_BASE_URL};
use crate::cli::Args;
use crate::session::FilesystemStorage;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::ApiConfig;
pub use auth::{AuthConfig, ServiceAccountConfig};
pub use defaults::*;
pub use validation::{expand_env_var_in_string, normalize, validate_base_url};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub storage_dir: Option<String>,
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// Shape of `.aeroadmin.yaml` / `.aeroadmin.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct JsonConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Resolved settings: CLI flag > environment > config file > default.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub credential_mode: CredentialMode,
    pub service_account: ServiceAccount,
    pub storage_dir: PathBuf,
    pub ephemeral: bool,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let json_config = JsonConfig::load()?;
        Self::resolve(args, json_config, |key| env::var(key).ok())
    }

    /// Merge the three sources; `lookup` stands in for the process environment.
    pub fn resolve<F>(args: &Args, json_config: JsonConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_var = |key: &str| normalize(lookup(key));

        let base_url = args
            .base_url
            .clone()
            .or_else(|| env_var(ENV_BASE_URL))
            .or_else(|| normalize(json_config.api.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = validate_base_url(&base_url).map_err(|e| anyhow!(e))?;

        let timeout = match env_var(ENV_TIMEOUT) {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .with_context(|| format!("{} must be a number of seconds", ENV_TIMEOUT))?,
            ),
            None => json_config.api.timeout_secs,
        }
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

        let credential_mode = match args.credential_mode {
            Some(mode) => mode,
            None => match env_var(ENV_CREDENTIAL_MODE) {
                Some(raw) => raw.parse::<CredentialMode>().map_err(|e| anyhow!(e))?,
                None => json_config.auth.credential_mode.unwrap_or_default(),
            },
        };

        let account = &json_config.auth.service_account;
        let defaults = ServiceAccount::default();
        let service_account = ServiceAccount::new(
            env_var(ENV_DB_USER)
                .or_else(|| normalize(account.user.clone()))
                .unwrap_or(defaults.user),
            env_var(ENV_DB_PASSWORD)
                .or_else(|| normalize(account.password.clone()))
                .unwrap_or(defaults.password),
        );

        let storage_dir = args
            .home
            .clone()
            .or_else(|| env_var(ENV_HOME).map(PathBuf::from))
            .or_else(|| normalize(json_config.session.storage_dir.clone()).map(PathBuf::from))
            .map(|dir| expand_home(&dir))
            .unwrap_or_else(FilesystemStorage::default_dir);

        let verbose = args.verbose
            || env_var(ENV_VERBOSE)
                .map(|v| parse_flag(&v))
                .or(json_config.session.verbose)
                .unwrap_or(false);

        Ok(Config {
            base_url,
            timeout,
            credential_mode,
            service_account,
            storage_dir,
            ephemeral: args.ephemeral,
            verbose,
        })
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            credential_mode: self.credential_mode,
            service_account: self.service_account.clone(),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

impl JsonConfig {
    /// First config file found wins; no file at all means defaults.
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(JsonConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str());
        if matches!(extension, Some("yaml") | Some("yml")) {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Local override first
        for ext in ["yaml", "yml", "json"] {
            paths.push(PathBuf::from(format!(".{}.{}", CONFIG_FILE_STEM, ext)));
        }

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join(CONFIG_FILE_STEM);
            for ext in ["yaml", "yml", "json"] {
                paths.push(config_dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)));
            }
        }

        paths
    }
}
