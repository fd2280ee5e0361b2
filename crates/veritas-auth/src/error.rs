//! Error types for the auth layer.

use std::time::Duration;

/// Why a call to the auth client failed.
///
/// Variants mirror what the provider's HTTP API can tell us; the
/// synchronizer turns them into retry decisions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected the credentials (401/403).
    #[error("authentication rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The provider asked us to slow down (429).
    /// `retry_after` is the server's hint in whole seconds, if it sent one.
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    /// The provider answered with a server-side failure (5xx, 408).
    #[error("auth server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never completed: DNS, TCP, TLS, or no connectivity.
    #[error("network error: {0}")]
    Network(String),

    /// Anything the provider reported that we don't know how to handle.
    #[error("auth error: {0}")]
    Other(String),
}

impl AuthError {
    /// Builds an error from an HTTP-like status code.
    ///
    /// - 401, 403 → [`Rejected`](Self::Rejected)
    /// - 429 → [`RateLimited`](Self::RateLimited), carrying `retry_after`
    /// - 408, 5xx → [`Server`](Self::Server)
    /// - anything else → [`Other`](Self::Other)
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<u64>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Rejected { status, message },
            429 => Self::RateLimited { retry_after },
            408 | 500..=599 => Self::Server { status, message },
            _ => Self::Other(format!("{status}: {message}")),
        }
    }

    /// The HTTP-like status code, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Network(_) | Self::Other(_) => None,
        }
    }

    /// The server's retry-after hint as a duration.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// `true` for failures that say nothing about the credentials
    /// themselves and may succeed if simply tried again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Network(_))
    }
}
