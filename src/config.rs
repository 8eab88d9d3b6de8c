//! Server configuration.
//!
//! Settings are layered with the `config` crate, later sources winning:
//!
//! 1. an optional TOML file (`--config`)
//! 2. `GOOGLE_*` environment variables for the OAuth credentials
//!    (`GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`,
//!    `GOOGLE_REFRESH_TOKEN`)
//! 3. `GSC_*` environment variables with `__` as the nesting separator,
//!    e.g. `GSC_RETRY__MAX_ATTEMPTS=6`
//!
//! A `.env` file is loaded into the process environment by the binary before
//! this module runs.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use crate::auth::{OAuthCredentials, DEFAULT_REDIRECT_URI};
use crate::retry::RetryPolicy;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Client id or secret is missing or empty.
    #[error("Missing required environment variables: GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET")]
    MissingCredentials,

    /// The configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Error from the config crate.
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Retry tuning, overridable per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub jitter_max_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            jitter_max_ms: policy.jitter_max.as_millis() as u64,
        }
    }
}

impl RetrySettings {
    /// Builds the retry policy these settings describe.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .with_max_attempts(self.max_attempts)
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms))
            .with_jitter_max(Duration::from_millis(self.jitter_max_ms))
    }
}

/// Flat shape shared by the TOML file and the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    refresh_token: Option<String>,
    retry: RetrySettings,
}

/// Everything the server binary needs at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub credentials: OAuthCredentials,
    pub retry: RetrySettings,
}

impl ServerConfig {
    /// Loads configuration from the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, None)
    }

    /// Loads configuration, reading environment variables from `env` instead
    /// of the process environment when given.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let raw: RawConfig = builder
            .add_source(
                Environment::with_prefix("GOOGLE")
                    .prefix_separator("_")
                    .source(env.clone()),
            )
            .add_source(
                Environment::with_prefix("GSC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let (client_id, client_secret) =
            match (non_empty(raw.client_id), non_empty(raw.client_secret)) {
                (Some(id), Some(secret)) => (id, secret),
                _ => return Err(ConfigError::MissingCredentials),
            };

        let credentials = OAuthCredentials {
            client_id,
            client_secret,
            redirect_uri: non_empty(raw.redirect_uri)
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            refresh_token: non_empty(raw.refresh_token),
        };

        if credentials.refresh_token.is_none() {
            tracing::warn!("GOOGLE_REFRESH_TOKEN is not set; API calls will fail until gsc-auth is run");
        }

        Ok(Self {
            credentials,
            retry: raw.retry,
        })
    }
}
