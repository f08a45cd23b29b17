//! Session gate.
//!
//! A [`SessionContext`] bundles what the gate needs: the persisted store,
//! the navigator, and the allowlist of public paths. It also carries the
//! user-visible status (message + error flag) and the pending redirect
//! target, which the login flow reads to send the user back afterwards.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::navigation::Navigator;
use crate::store::{FIRST_NAME, IDENTITY_KEYS, KeyValueStore};

pub const GATE_EXPIRED_MESSAGE: &str = "Your Session has been Expired! Please Re-Login";
pub const AUTH_FAILURE_MESSAGE: &str = "Your session has expired. Please login again.";

/// What the view shows about the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub message: Option<String>,
    pub error: bool,
    pub pending_redirect: Option<String>,
}

pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    navigator: Arc<dyn Navigator>,
    public_paths: Vec<String>,
    login_path: String,
    status: Mutex<SessionStatus>,
}

impl SessionContext {
    pub fn new(
        config: &ClientConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            navigator,
            public_paths: config.public_paths.clone(),
            login_path: config.login_path.clone(),
            status: Mutex::new(SessionStatus::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// A path is public when it equals an allowlist entry or is a prefix of one.
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_paths
            .iter()
            .any(|entry| entry == path || entry.starts_with(path))
    }

    /// `true` when the marker field holds a usable value.
    pub fn is_logged_in(&self) -> bool {
        match self.store.get(FIRST_NAME) {
            Some(marker) => !marker.is_empty() && marker != "null",
            None => false,
        }
    }

    /// Run the gate for a request issued from `path`.
    ///
    /// On the invalid branch this records `path` as the pending redirect,
    /// sets the expired message and navigates to the login path. It never
    /// clears stored state. Each invalid call navigates again.
    pub fn is_session_invalid(&self, path: &str) -> bool {
        if self.is_public_path(path) {
            return false;
        }
        if self.is_logged_in() {
            return false;
        }

        {
            let mut status = self.lock_status();
            status.message = Some(GATE_EXPIRED_MESSAGE.to_string());
            status.error = true;
            status.pending_redirect = Some(path.to_string());
        }
        debug!(path = %path, login = %self.login_path, "session marker missing, redirecting to login");
        self.navigator.navigate_to(&self.login_path);
        true
    }

    /// Purge every identity key, flag the session expired and go to login.
    ///
    /// The purge is a single store operation. If it fails it is logged and
    /// the status and redirect still happen.
    pub fn expire(&self) {
        if let Err(e) = self.store.remove_all(&IDENTITY_KEYS) {
            warn!(error = %e, "failed to purge identity state");
        }
        {
            let mut status = self.lock_status();
            status.message = Some(AUTH_FAILURE_MESSAGE.to_string());
            status.error = true;
        }
        self.navigator.navigate_to(&self.login_path);
    }

    pub fn status(&self) -> SessionStatus {
        self.lock_status().clone()
    }

    /// Take the pending redirect target, leaving the slot empty.
    pub fn take_pending_redirect(&self) -> Option<String> {
        self.lock_status().pending_redirect.take()
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, SessionStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }
}
