//! Reelsync Library
//!
//! Keeps a local, synchronously readable view of "who is logged in" and
//! "what this user did with each movie" (liked, saved for later, watched,
//! rated) in step with the movie server.
//!
//! # Modules
//!
//! - `cli` - Command-line handlers used by the `reelsync` binary
//! - `client` - HTTP gateway and endpoint functions for the movie server
//! - `config` - Configuration from environment variables and `.env`
//! - `context` - [`SyncContext`], the wired-up service object
//! - `error` - The crate's error taxonomy
//! - `management` - Session store, movie caches, persistence and change events
//! - `navigation` - Navigation requests issued on session expiry
//! - `types` - Identifiers, wire shapes and table rows
//! - `utils` - Terminal formatting helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use reelsync::{SyncContext, config::Settings, management::MemoryStore, navigation::RecordingNavigator};
//!
//! #[tokio::main]
//! async fn main() -> reelsync::Result<()> {
//!     let ctx = SyncContext::new(
//!         Settings::default(),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(RecordingNavigator::new()),
//!     )?;
//!     ctx.init().await?;
//!     if ctx.state().authenticated {
//!         ctx.ensure_hydrated().await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod management;
pub mod navigation;
pub mod types;
pub mod utils;

pub use context::SyncContext;
pub use error::{Error, Result};

/// Prints an informational message with a blue bullet point.
///
/// ```
/// info!("Fetching {} lists...", 3);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// ```
/// success!("Logged in as {}", username);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits with code 1.
///
/// Only for the binary's command handlers; library code returns
/// [`Error`] instead.
///
/// ```
/// error!("Cannot reach the movie server: {}", err);
/// // unreachable
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning with a yellow exclamation mark.
///
/// ```
/// warning!("Cache is stale, syncing first");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
