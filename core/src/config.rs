//! Client configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid url: {value}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a whole number of seconds: {value}")]
    InvalidTimeout { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Absolute base URL, without trailing slash.
    pub base_url: String,
    /// Header that carries the signed-in user's id.
    pub user_id_header: String,
    /// Global request timeout. `None` leaves it to the transport default.
    pub timeout: Option<Duration>,
    /// Where `FileCredentialStore` keeps the session, if anywhere.
    pub credentials_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id_header: DEFAULT_USER_ID_HEADER.to_string(),
            timeout: None,
            credentials_path: default_credentials_path(),
        }
    }

    /// Read `COACHBOARD_API_URL`, `COACHBOARD_USER_ID_HEADER`,
    /// `COACHBOARD_TIMEOUT_SECS` and `COACHBOARD_CREDENTIALS_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("COACHBOARD_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if url::Url::parse(&base_url).is_err() {
            return Err(ConfigError::InvalidUrl {
                var: "COACHBOARD_API_URL",
                value: base_url,
            });
        }

        let mut config = Self::new(&base_url);
        if let Some(header) = lookup("COACHBOARD_USER_ID_HEADER").filter(|h| !h.trim().is_empty()) {
            config.user_id_header = header.trim().to_string();
        }
        if let Some(raw) = lookup("COACHBOARD_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                var: "COACHBOARD_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = lookup("COACHBOARD_CREDENTIALS_PATH") {
            config.credentials_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    pub fn with_user_id_header(mut self, header: impl Into<String>) -> Self {
        self.user_id_header = header.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn default_credentials_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coachboard").join("credentials.json"))
}
