use std::env;
use std::path::PathBuf;
use std::time::Duration;

use validator::Validate;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TOKEN_FILE: &str = ".dreamspace/tokens.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for [`crate::client::ApiClient`], usually read from the environment.
#[derive(Debug, Clone, Validate)]
pub struct ClientConfig {
    #[validate(url)]
    pub api_url: String,
    pub token_file: PathBuf,
    #[validate(range(min = 1, max = 600))]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Reads `DREAMSPACE_API_URL`, `DREAMSPACE_TOKEN_FILE` and `DREAMSPACE_TIMEOUT_SECS`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ApiError> {
        let defaults = Self::default();
        let timeout_secs = match env::var("DREAMSPACE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ApiError::Config(format!("DREAMSPACE_TIMEOUT_SECS must be a number, got {:?}", raw))
            })?,
            Err(_) => defaults.timeout_secs,
        };

        let config = Self {
            api_url: env::var("DREAMSPACE_API_URL").unwrap_or(defaults.api_url),
            token_file: env::var("DREAMSPACE_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Base URL with any trailing slash removed, so paths can always start with `/`.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
