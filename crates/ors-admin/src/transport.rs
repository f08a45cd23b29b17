use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::envelope::result_message;
use crate::error::{ClientError, TransportError};
use crate::store::{KeyValueStore, TOKEN};

/// Outbound HTTP seam used by the dispatcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value, TransportError>;

    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError>;
}

/// reqwest-backed transport.
///
/// When the store holds a `token` it is sent as a Bearer credential.
pub struct HttpTransport {
    http: reqwest::Client,
    store: Arc<dyn KeyValueStore>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            store,
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = self.store.get(TOKEN).filter(|t| !t.is_empty() && t != "null") {
            req = req.bearer_auth(token);
        }
        req.header("Accept", "application/json")
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Value, TransportError> {
        let resp = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(connect_error)?;
        handle_response(resp).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        let resp = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(connect_error)?;
        handle_response(resp).await
    }
}

fn connect_error(e: reqwest::Error) -> TransportError {
    TransportError::new(e.status().map(|s| s.as_u16()), format!("Failed to connect to server: {e}"))
}

async fn handle_response(resp: reqwest::Response) -> Result<Value, TransportError> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| body_error(status, e))?;
    interpret(status, &body)
}

/// A body that cannot be read keeps the response status, so a 401/403 still
/// counts as an authentication failure.
fn body_error(status: StatusCode, e: impl std::fmt::Display) -> TransportError {
    TransportError::new(Some(status.as_u16()), format!("Failed to read response body: {e}"))
}

fn interpret(status: StatusCode, body: &str) -> Result<Value, TransportError> {
    if !status.is_success() {
        // The ORS backend reports errors inside its own envelope.
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| result_message(&json).map(str::to_string))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    format!("HTTP {status}: {body}")
                }
            });
        return Err(TransportError::new(Some(status.as_u16()), message));
    }

    if body.is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(body).map_err(|e| {
        TransportError::new(Some(status.as_u16()), format!("Failed to parse response JSON: {e}"))
    })
}
