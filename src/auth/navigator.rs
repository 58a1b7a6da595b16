//! Hooks into the host's location, used to leave protected pages on session loss.

use std::sync::{Mutex, PoisonError};

pub trait Navigator: Send + Sync {
    /// Path of the page currently shown, if known.
    fn current_path(&self) -> Option<String>;
    /// Force navigation to `path`.
    fn redirect(&self, path: &str);
}

/// For hosts without a location (server side, CLIs).
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn current_path(&self) -> Option<String> {
        None
    }
    fn redirect(&self, _path: &str) {}
}

/// Keeps the current path in memory and records every redirect.
pub struct InMemoryNavigator {
    state: Mutex<NavState>,
}

struct NavState {
    current: String,
    redirects: Vec<String>,
}

impl InMemoryNavigator {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: current.into(),
                redirects: Vec::new(),
            }),
        }
    }

    pub fn set_current(&self, path: impl Into<String>) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).current = path.into();
    }

    pub fn redirects(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .redirects
            .clone()
    }
}

impl Navigator for InMemoryNavigator {
    fn current_path(&self) -> Option<String> {
        Some(
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .current
                .clone(),
        )
    }

    fn redirect(&self, path: &str) {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        st.redirects.push(path.to_string());
        st.current = path.to_string();
    }
}
