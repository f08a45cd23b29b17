use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A failed transport call, as seen by the dispatcher.
///
/// `status` is `None` when no HTTP response was received at all
/// (connection refused, timeout).
#[derive(Debug, Clone, Error)]
#[error("transport failure (status {status:?}): {}", .message.as_deref().unwrap_or("no message"))]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: Option<String>,
}

impl TransportError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            message: None,
        }
    }

    /// 401 and 403 both mean the server no longer accepts our identity.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}
