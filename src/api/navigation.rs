//! Navigator implementations

use super::Navigator;
use std::sync::Mutex;

/// Opens navigation targets in the web frontend
#[derive(Debug)]
pub struct BrowserNavigator {
    frontend_url: String,
    open_in_browser: bool,
    last: Mutex<Option<String>>,
}

impl BrowserNavigator {
    pub fn new(frontend_url: impl Into<String>, open_in_browser: bool) -> Self {
        Self {
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
            open_in_browser,
            last: Mutex::new(None),
        }
    }

    /// Full URL for an application path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.frontend_url, path.trim_start_matches('/'))
    }

    /// Most recent URL navigated to
    pub fn last_url(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

impl Navigator for BrowserNavigator {
    fn go_to(&self, path: &str) {
        let url = self.url_for(path);
        tracing::info!(url = %url, "Navigating");

        if self.open_in_browser {
            if let Err(e) = open::that(&url) {
                tracing::error!(url = %url, error = %e, "Failed to open browser");
            }
        }
        if let Ok(mut last) = self.last.lock() {
            *last = Some(url);
        }
    }
}

/// Records every path it is asked to go to
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(path.to_string());
        }
    }
}
