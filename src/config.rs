//! # Sync Configuration
//!
//! Layered configuration: built-in defaults, then an optional `orgsync.toml`
//! (or an explicit file), then `ORGSYNC_*` environment variables, then the
//! short variables `ORG_ID`, `TOKEN` and `API_TOKEN`. A `.env` file in the
//! working directory is read first.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{api, pacing};
use crate::error::{Result, SyncError};

const DEFAULT_CONFIG_FILE: &str = "orgsync";
const ENV_PREFIX: &str = "ORGSYNC";

/// Backoff settings for the retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    /// Optional ceiling on a single backoff delay.
    pub max_delay_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: pacing::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: pacing::DEFAULT_BASE_DELAY_MS,
            max_delay_ms: None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub org_id: String,
    pub token: String,
    pub api_base: String,
    pub page_size: u32,
    pub request_timeout_ms: u64,
    pub retry: RetryConfig,
    /// Pause between consecutive user creations.
    pub user_pause_ms: u64,
    pub departments_csv: PathBuf,
    pub users_csv: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            org_id: String::new(),
            token: String::new(),
            api_base: api::DEFAULT_API_BASE.to_string(),
            page_size: api::DEFAULT_PAGE_SIZE,
            request_timeout_ms: api::DEFAULT_REQUEST_TIMEOUT_MS,
            retry: RetryConfig::default(),
            user_pause_ms: pacing::DEFAULT_USER_PAUSE_MS,
            departments_csv: PathBuf::from("departments.csv"),
            users_csv: PathBuf::from("users.csv"),
        }
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("org_id", &self.org_id)
            .field("token", &if self.token.is_empty() { "" } else { "[redacted]" })
            .field("api_base", &self.api_base)
            .field("page_size", &self.page_size)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("retry", &self.retry)
            .field("user_pause_ms", &self.user_pause_ms)
            .field("departments_csv", &self.departments_csv)
            .field("users_csv", &self.users_csv)
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from `.env`, an optional config file and the environment.
    ///
    /// With `config_file = None` an `orgsync.{toml,yaml,json}` in the working
    /// directory is used when present. An explicit file must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let builder = config::Config::builder();
        let builder = match config_file {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let mut config = Self::from_builder(builder)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());

        debug!("Loaded sync configuration: {:?}", config);
        Ok(config)
    }

    /// Configuration from environment variables only.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::from_builder(config::Config::builder())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Configuration from a single file, without consulting the environment.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path).required(true))
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(|e| {
                SyncError::configuration(format!(
                    "Failed to load config file {}: {e}",
                    path.display()
                ))
            })
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(|e| SyncError::configuration(format!("Failed to load configuration: {e}")))
    }

    /// Apply the short variable names; `TOKEN` takes precedence over `API_TOKEN`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(org_id) = non_empty("ORG_ID") {
            self.org_id = org_id;
        }
        if let Some(token) = non_empty("TOKEN").or_else(|| non_empty("API_TOKEN")) {
            self.token = token;
        }
    }

    /// Check everything a live sync needs. Dry runs skip this.
    pub fn validate(&self) -> Result<()> {
        if self.org_id.trim().is_empty() {
            return Err(SyncError::configuration(
                "ORG_ID environment variable is required",
            ));
        }
        if self.token.trim().is_empty() {
            return Err(SyncError::configuration(
                "TOKEN (or API_TOKEN) environment variable is required",
            ));
        }
        url::Url::parse(&self.api_base)
            .map_err(|e| SyncError::configuration(format!("Invalid api_base: {e}")))?;
        if self.page_size == 0 {
            return Err(SyncError::configuration("page_size must be positive"));
        }
        if self.retry.max_attempts == 0 {
            return Err(SyncError::configuration(
                "retry.max_attempts must be positive",
            ));
        }
        Ok(())
    }
}
