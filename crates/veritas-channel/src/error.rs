/// Errors that can occur on a cross-tab channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel was closed (locally, or the hub went away).
    #[error("channel {0} is closed")]
    Closed(String),

    /// Posting a message failed for a reason other than closure.
    #[error("post failed: {0}")]
    PostFailed(String),

    /// The runtime has no broadcast support.
    #[error("cross-tab broadcast is unavailable")]
    Unsupported,
}
