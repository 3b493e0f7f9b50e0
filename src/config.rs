//! Configuration management for reelsync.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory, and fall back to defaults that match a
//! movie server running on the developer's machine:
//!
//! | Variable                | Default                      |
//! |-------------------------|------------------------------|
//! | `REELSYNC_API_URL`      | `http://localhost:5000/api`  |
//! | `REELSYNC_TIMEOUT_SECS` | `10`                         |
//! | `REELSYNC_LOGIN_ROUTE`  | `/login`                     |
//! | `REELSYNC_STORE_PATH`   | `<data dir>/reelsync/storage.json` |
//!
//! The accessors are read once into [`Settings`], which is what the rest of
//! the crate consumes. Tests build `Settings` directly and never touch the
//! environment.

use std::{env, path::PathBuf, time::Duration};

use crate::management::FileStore;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Loads environment variables from `<data dir>/reelsync/.env`.
///
/// The directory is created when missing so users find the place to put
/// the file. A missing `.env` is not an error; an unreadable one is.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/reelsync/.env`
/// - macOS: `~/Library/Application Support/reelsync/.env`
/// - Windows: `%LOCALAPPDATA%/reelsync/.env`
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("reelsync/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Base URL of the movie server API, without a trailing slash.
pub fn api_url() -> String {
    env::var("REELSYNC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Timeout applied to every request. Unparsable values fall back to the
/// default.
pub fn request_timeout() -> Duration {
    let secs = env::var("REELSYNC_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Route the navigator is sent to when a session expires.
pub fn login_route() -> String {
    env::var("REELSYNC_LOGIN_ROUTE").unwrap_or_else(|_| DEFAULT_LOGIN_ROUTE.to_string())
}

/// Location of the persistent key-value store.
pub fn store_path() -> PathBuf {
    env::var_os("REELSYNC_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(FileStore::default_path)
}

/// Resolved configuration handed to [`crate::SyncContext`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub timeout: Duration,
    pub login_route: String,
    pub store_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            api_url: api_url(),
            timeout: request_timeout(),
            login_route: login_route(),
            store_path: store_path(),
        }
    }

    /// Defaults for everything except the server location.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            store_path: FileStore::default_path(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
