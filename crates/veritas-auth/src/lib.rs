//! Auth provider integration for Veritas.
//!
//! Veritas doesn't implement authentication; a hosted identity provider
//! does. This crate defines the narrow seams the session synchronizer
//! needs from the rest of the application:
//!
//! 1. **Auth client**: read, renew, observe and end a session
//!    ([`AuthClient`], [`AuthEvent`], [`AuthError`])
//! 2. **Navigation**: send the user back to sign in after a fatal
//!    failure ([`Navigator`], [`SignInRedirect`], [`RedirectReason`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Sync Layer (above)  ← drives renewals and redirects through these traits
//!     ↕
//! Auth Layer (this crate)  ← provider-agnostic session capabilities
//!     ↕
//! Protocol Layer (below)  ← provides Session, UserId
//! ```

#![allow(async_fn_in_trait)]

mod client;
mod error;
mod redirect;

pub use client::{AuthClient, AuthEvent};
pub use error::AuthError;
pub use redirect::{Banner, DEFAULT_SIGN_IN_PATH, Navigator, RedirectReason, SignInRedirect};
