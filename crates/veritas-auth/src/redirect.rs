//! Sign-in redirects after unrecoverable session failures.
//!
//! When the synchronizer gives up on a session it asks the
//! [`Navigator`] to send the user to the sign-in page, tagging the URL
//! with a machine-readable [`RedirectReason`]. The sign-in page turns
//! that reason back into a [`Banner`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the sign-in entry point lives unless configured otherwise.
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/login";

/// Why the user was sent back to sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    /// The provider rejected the credentials.
    SessionExpired,
    /// Renewal kept failing until the retry budget ran out.
    MaxRetries,
    /// Renewal failed in a way we couldn't classify.
    Unknown,
}

impl RedirectReason {
    /// The query-string value for this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionExpired => "session_expired",
            Self::MaxRetries => "max_retries",
            Self::Unknown => "unknown",
        }
    }

    /// The message the sign-in page shows for this reason.
    pub fn banner(self) -> Banner {
        match self {
            Self::SessionExpired => Banner {
                title: "Session Expired",
                description: "Your session has expired. Please sign in again.",
            },
            Self::MaxRetries => Banner {
                title: "Connection Error",
                description: "We had trouble maintaining your session. Please sign in again.",
            },
            Self::Unknown => Banner {
                title: "Error",
                description: "An unexpected error occurred. Please try signing in again.",
            },
        }
    }
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedirectReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session_expired" => Ok(Self::SessionExpired),
            "max_retries" => Ok(Self::MaxRetries),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unrecognized redirect reason {other:?}")),
        }
    }
}

/// A user-facing notice keyed by [`RedirectReason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Banner {
    pub title: &'static str,
    pub description: &'static str,
}

/// A request to navigate to the sign-in entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRedirect {
    pub path: String,
    pub reason: RedirectReason,
}

impl SignInRedirect {
    /// Redirect to `path` with the given reason.
    pub fn new(path: impl Into<String>, reason: RedirectReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }

    /// The full location, e.g. `/auth/login?error=session_expired`.
    pub fn location(&self) -> String {
        let sep = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{sep}error={}", self.path, self.reason)
    }
}

/// Performs navigation on behalf of the synchronizer.
///
/// This is the only externally visible side effect of a fatal session
/// failure, besides the cross-tab broadcast.
pub trait Navigator: Send + Sync + 'static {
    /// Sends the user to the sign-in entry point.
    fn navigate(&self, redirect: SignInRedirect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_appends_error_query() {
        let r = SignInRedirect::new(DEFAULT_SIGN_IN_PATH, RedirectReason::SessionExpired);
        assert_eq!(r.location(), "/auth/login?error=session_expired");
    }

    #[test]
    fn test_location_respects_existing_query() {
        let r = SignInRedirect::new("/auth/login?next=/dashboard", RedirectReason::MaxRetries);
        assert_eq!(r.location(), "/auth/login?next=/dashboard&error=max_retries");
    }

    #[test]
    fn test_reason_parses_its_own_string() {
        for reason in [
            RedirectReason::SessionExpired,
            RedirectReason::MaxRetries,
            RedirectReason::Unknown,
        ] {
            assert_eq!(reason.as_str().parse::<RedirectReason>(), Ok(reason));
        }
        assert!("nope".parse::<RedirectReason>().is_err());
    }

    #[test]
    fn test_banner_titles() {
        assert_eq!(RedirectReason::SessionExpired.banner().title, "Session Expired");
        assert_eq!(RedirectReason::MaxRetries.banner().title, "Connection Error");
        assert_eq!(RedirectReason::Unknown.banner().title, "Error");
    }
}
