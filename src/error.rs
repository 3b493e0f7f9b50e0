//! Error taxonomy for the synchronization layer.
//!
//! Every fallible operation in the crate returns [`Error`]. The variants
//! mirror how a caller is expected to react: pre-flight validation failures
//! never touched the network, [`Error::SessionExpired`] has already been
//! handled globally by the gateway before reaching the caller, and the
//! remaining variants are plain failures to report.

use reqwest::StatusCode;

/// Unified error type for reelsync.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The movie identifier is not a positive integer.
    #[error("invalid movie id: {input:?}")]
    InvalidId {
        /// The raw input that failed validation.
        input: String,
    },

    /// A rating outside the accepted range was submitted to the server.
    #[error("invalid rating {rating}: expected a value between {min} and {max}")]
    InvalidRating { rating: f64, min: f64, max: f64 },

    /// Login or registration was rejected by the server.
    #[error("{message}")]
    Auth {
        /// Message reported by the server, passed through verbatim.
        message: String,
    },

    /// The server answered 401 and the session was torn down.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Timeout or transport failure.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Any other non-success status, passed through unmodified.
    #[error(
        "server responded with {status}: {}",
        .message.as_deref().unwrap_or("no details")
    )]
    Http {
        status: StatusCode,
        /// `error` (or `message`) field of the response body, if any.
        message: Option<String>,
    },

    /// A server record did not carry a usable movie identifier.
    #[error("malformed movie record: {reason}")]
    MalformedRecord { reason: String },

    /// A response body could not be decoded into the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The persistent key-value store could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A persisted value could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_id(input: impl Into<String>) -> Self {
        Self::InvalidId {
            input: input.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// True for errors produced before any request was sent.
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::InvalidId { .. } | Self::InvalidRating { .. })
    }

    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
