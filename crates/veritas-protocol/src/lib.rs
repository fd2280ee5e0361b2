//! Session types and cross-tab wire format for Veritas.
//!
//! This crate defines the data that the session synchronizer caches and
//! the messages that tabs of the same origin exchange:
//!
//! - **Types** ([`Session`], [`SessionUser`], [`UserId`], [`SyncMessage`]):
//!   the credential bundle and the `SESSION_UPDATED` envelope.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes before they hit the cross-tab channel.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the channel (raw bytes) and the
//! synchronizer (session lifecycle). It knows nothing about timers or
//! retries; it only knows how to serialize and deserialize sessions.
//!
//! ```text
//! Channel (bytes) → Protocol (SyncMessage) → Sync (session lifecycle)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Session, SessionUser, SyncMessage, UserId};
