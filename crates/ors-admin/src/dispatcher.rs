//! Request dispatcher: session gate in front, failure envelopes behind.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::envelope::{Envelope, GENERIC_FAILURE_MESSAGE};
use crate::error::{ClientError, TransportError};
use crate::session::SessionContext;
use crate::transport::Transport;

/// How a dispatch resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The gate tripped before any I/O. The session context's status
    /// explains why.
    Aborted,
    /// Raw success body, or a failure envelope synthesised from a
    /// transport failure.
    Completed(Value),
}

impl Outcome {
    pub fn into_completed(self) -> Option<Value> {
        match self {
            Outcome::Completed(v) => Some(v),
            Outcome::Aborted => None,
        }
    }
}

/// Issues requests on behalf of one page.
///
/// The page is fixed at construction (the navigator's current path, unless
/// overridden with [`RequestDispatcher::with_page`]). A gate trip moves the
/// navigator to the public login page, but later calls from this dispatcher
/// are still judged against its own page and keep aborting until a session
/// is stored.
pub struct RequestDispatcher {
    session: Arc<SessionContext>,
    transport: Arc<dyn Transport>,
    base: Url,
    page: String,
}

impl RequestDispatcher {
    pub fn new(base: Url, session: Arc<SessionContext>, transport: Arc<dyn Transport>) -> Self {
        let page = session.navigator().current_path();
        Self {
            session,
            transport,
            base,
            page,
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    /// Resolve `endpoint` below the base URL and append `query` pairs.
    pub fn endpoint_url(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self.base.join(endpoint.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn read(&self, url: &Url) -> Outcome {
        if self.session.is_session_invalid(&self.page) {
            debug!(url = %url, "GET aborted, session invalid");
            return Outcome::Aborted;
        }
        debug!(url = %url, "GET");
        let result = self.transport.get(url.as_str()).await;
        Outcome::Completed(self.settle(result))
    }

    pub async fn write(&self, url: &Url, body: &Value) -> Outcome {
        if self.session.is_session_invalid(&self.page) {
            debug!(url = %url, "POST aborted, session invalid");
            return Outcome::Aborted;
        }
        debug!(url = %url, "POST");
        let result = self.transport.post(url.as_str(), body).await;
        Outcome::Completed(self.settle(result))
    }

    fn settle(&self, result: Result<Value, TransportError>) -> Value {
        match result {
            Ok(body) => body,
            Err(e) if e.is_auth_failure() => {
                warn!(status = ?e.status, "authentication failure, clearing session");
                self.session.expire();
                Envelope::session_expired().into_value()
            }
            Err(e) => {
                warn!(status = ?e.status, message = ?e.message, "request failed");
                let message = e
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                Envelope::failure(message).into_value()
            }
        }
    }
}
