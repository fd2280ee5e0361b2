//! Unified error type for Veritas.

use veritas_auth::AuthError;
use veritas_channel::ChannelError;
use veritas_protocol::ProtocolError;
use veritas_sync::SyncError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `veritas` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum VeritasError {
    /// Encoding or decoding a cross-tab message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The cross-tab channel failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The auth client reported an error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The synchronizer could not answer.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let veritas_err: VeritasError = err.into();
        assert!(matches!(veritas_err, VeritasError::Protocol(_)));
        assert!(veritas_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_channel_error() {
        let err = ChannelError::Closed("veritas_session_sync".into());
        let veritas_err: VeritasError = err.into();
        assert!(matches!(veritas_err, VeritasError::Channel(_)));
    }

    #[test]
    fn test_from_auth_error() {
        let err = AuthError::from_status(401, "expired", None);
        let veritas_err: VeritasError = err.into();
        assert!(matches!(veritas_err, VeritasError::Auth(_)));
    }

    #[test]
    fn test_from_sync_error() {
        let veritas_err: VeritasError = SyncError::ShutDown.into();
        assert!(matches!(veritas_err, VeritasError::Sync(SyncError::ShutDown)));
    }

    #[test]
    fn test_sync_error_wrapping_auth_error_stays_transparent() {
        let err = SyncError::from(AuthError::Network("reset".into()));
        let veritas_err: VeritasError = err.into();
        assert_eq!(veritas_err.to_string(), AuthError::Network("reset".into()).to_string());
    }
}
