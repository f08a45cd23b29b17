use std::sync::Mutex;

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    fn navigate_to(&self, path: &str);
}

/// Navigations kept by [`RouteNavigator::history`].
pub const HISTORY_LIMIT: usize = 32;

/// In-process router state: the current path plus the most recent
/// navigations. Used by the CLI and by tests to observe redirects.
#[derive(Debug)]
pub struct RouteNavigator {
    inner: Mutex<RouteState>,
}

#[derive(Debug, Default)]
struct RouteState {
    current: String,
    history: Vec<String>,
}

impl RouteNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(RouteState {
                current: start.into(),
                history: Vec::new(),
            }),
        }
    }

    /// The last [`HISTORY_LIMIT`] paths navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .history
            .clone()
    }
}

impl Default for RouteNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for RouteNavigator {
    fn current_path(&self) -> String {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .clone()
    }

    fn navigate_to(&self, path: &str) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.current = path.to_string();
        if state.history.len() == HISTORY_LIMIT {
            state.history.remove(0);
        }
        state.history.push(path.to_string());
    }
}
