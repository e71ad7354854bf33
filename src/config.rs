//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::export::ExportFormat;
use crate::{AppError, Result};

/// Keychain service name.
pub const KEYRING_SERVICE: &str = "planpatch";
/// Keychain entry holding the API key.
pub const KEYRING_API_KEY: &str = "api_key";
/// Environment variable consulted when the keychain has no API key.
pub const API_KEY_ENV: &str = "PLANPATCH_API_KEY";

/// Generation service connection settings.
///
/// The API key is loaded at runtime via OS keychain or environment
/// variable, never from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ServiceConfig {
    /// Chat-completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Bearer token (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            temperature: default_temperature(),
            api_key: String::new(),
        }
    }
}

impl ServiceConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.2
}

/// Retry policy for transient service failures.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound for the exponential backoff.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

/// Defaults for combined patch export.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ExportConfig {
    /// Default export layout.
    #[serde(default)]
    pub format: ExportFormat,
    /// Whether to prepend the metadata comment block.
    #[serde(default = "default_true")]
    pub include_metadata: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            include_metadata: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_steps() -> usize {
    3
}

/// Global configuration parsed from `planpatch.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Generation service settings.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Export defaults.
    #[serde(default)]
    pub export: ExportConfig,
    /// Upper bound on step executions running at once.
    #[serde(default = "default_max_concurrent_steps")]
    pub max_concurrent_steps: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            retry: RetryConfig::default(),
            export: ExportConfig::default(),
            max_concurrent_steps: default_max_concurrent_steps(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the service API key from OS keychain with env-var fallback.
    ///
    /// Tries the `planpatch` keyring service first, then falls back to the
    /// `PLANPATCH_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides a key.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.service.api_key = load_credential(KEYRING_API_KEY, API_KEY_ENV).await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_concurrent_steps == 0 {
            return Err(AppError::Config(
                "max_concurrent_steps must be greater than zero".into(),
            ));
        }

        if self.service.timeout_seconds == 0 {
            return Err(AppError::Config(
                "service.timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.service.endpoint.trim().is_empty() {
            return Err(AppError::Config("service.endpoint must not be empty".into()));
        }

        if self.retry.max_attempts == 0 {
            return Err(AppError::Config(
                "retry.max_attempts must be at least one".into(),
            ));
        }

        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            return Err(AppError::Config(
                "retry.max_delay_ms must not be less than retry.initial_delay_ms".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))),
    }
}
