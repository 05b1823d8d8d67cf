//! Runtime configuration.
//!
//! Values come from environment variables, falling back to defaults:
//!
//! | Variable | Default |
//! |---|---|
//! | `BLING_BASE_URL` | `http://localhost` |
//! | `BLING_API_REVISION` | `3.1.0` |
//! | `BLING_HTTP_TIMEOUT_SECS` | `30` |
//! | `BLING_STORE_PATH` | `<config dir>/bling-connect/session.json` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Path of the token endpoint under the base URL.
pub const TOKEN_PATH: &str = "/Api/v3/oauth/token";

const DEFAULT_BASE_URL: &str = "http://localhost";
const DEFAULT_API_REVISION: &str = "3.1.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL could not be parsed.
    #[error("invalid base URL {value:?}: {message}")]
    InvalidUrl {
        /// Offending value.
        value: String,
        /// Parser message.
        message: String,
    },

    /// A numeric variable could not be parsed.
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },

    /// No store path was given and no config directory exists.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Settings shared by the HTTP adapters and the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlingConfig {
    /// Base URL of the Bling API (token endpoint and REST API live under it).
    pub base_url: Url,
    /// Value sent in the `x-api-revision` header.
    pub api_revision: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
    /// Location of the durable session file.
    pub store_path: PathBuf,
}

impl BlingConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("BLING_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            message: e.to_string(),
        })?;

        let api_revision =
            lookup("BLING_API_REVISION").unwrap_or_else(|| DEFAULT_API_REVISION.to_string());

        let timeout_secs = match lookup("BLING_HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidNumber {
                    key: "BLING_HTTP_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let store_path = match lookup("BLING_STORE_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_store_path().ok_or(ConfigError::NoConfigDir)?,
        };

        Ok(Self {
            base_url,
            api_revision,
            http_timeout: Duration::from_secs(timeout_secs),
            store_path,
        })
    }

    /// Configuration pointing at `base_url` with every other value defaulted.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` does not parse.
    pub fn for_base_url(base_url: &str, store_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let store_path = store_path.into();
        Self::from_lookup(|key| match key {
            "BLING_BASE_URL" => Some(base_url.to_string()),
            "BLING_STORE_PATH" => Some(store_path.display().to_string()),
            _ => None,
        })
    }

    /// Joins `path` onto the base URL, keeping any base path prefix.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Absolute URL of the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        self.endpoint(TOKEN_PATH)
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bling-connect").join("session.json"))
}
