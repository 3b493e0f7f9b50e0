use std::sync::{Mutex, PoisonError};

use crate::warning;

/// Receiver of navigation requests issued by the core.
///
/// The core never routes by itself: when a session expires it asks the
/// navigator once to show the login route and leaves the rest to whoever
/// owns the screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Keeps every requested route, for embedders that poll and for tests.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}

/// Terminal stand-in for a router: tells the user to log in again.
#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        if route.trim_start_matches('/') == "login" {
            warning!("Your session has expired. Run `reelsync login` to sign in again.");
        } else {
            warning!("Continue at {}", route);
        }
    }
}
