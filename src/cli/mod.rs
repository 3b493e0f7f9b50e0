//! # CLI Module
//!
//! Command handlers for the `reelsync` binary. Each handler receives the
//! process-wide [`crate::SyncContext`], performs one operation and reports
//! the outcome with the crate's output macros.
//!
//! ## Command Categories
//!
//! ### Session
//!
//! - [`login`] / [`register`] - start a session and persist it
//! - [`logout`] - drop the session and every cached list
//! - [`whoami`] - show the persisted session without any network call
//! - [`profile`] - show the server-side profile with its counters
//!
//! ### Movie State
//!
//! - [`sync`] - hydrate the lists and ratings from the server
//! - [`status`] - one movie's membership in each list plus its rating
//! - [`library`] - every list as a table
//! - [`toggle`] - flip a movie in one list
//! - [`rate`] / [`rating`] - submit or re-read a rating
//!
//! ## Data Flow
//!
//! ```text
//! CLI handler
//!     ↓
//! SyncContext (session store, caches)
//!     ↓
//! HttpClientGateway
//!     ↓
//! Movie server
//! ```
//!
//! Reads (`status`, `library`) hydrate the caches first when they are stale,
//! since a fresh process always starts with empty caches.
//!
//! ## Error Handling
//!
//! Every failure ends in `error!`, which prints and exits with status 1. An
//! expired session has already been torn down by the gateway at that point,
//! and the navigator has printed the login hint.

mod auth;
mod movies;

pub use auth::login;
pub use auth::logout;
pub use auth::profile;
pub use auth::register;
pub use auth::whoami;
pub use movies::library;
pub use movies::rate;
pub use movies::rating;
pub use movies::status;
pub use movies::sync;
pub use movies::toggle;
