use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/ORSP10";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Paths that never trip the session gate.
pub const PUBLIC_PATHS: [&str; 7] = [
    "/login",
    "/Auth",
    "/logout",
    "/forgotpassword",
    "/signup",
    "/login/true",
    "/",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/ORSP10`
    pub base_url: String,
    pub login_path: String,
    pub public_paths: Vec<String>,
    /// Request timeout in seconds. `None` leaves it to the HTTP client.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            public_paths: PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Parse `base_url`, normalised to end in exactly one `/` so relative
    /// endpoints join below it instead of replacing its last segment.
    pub fn base(&self) -> Result<Url, ClientError> {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ClientError::InvalidConfig("base_url is empty".into()));
        }
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }
}
