//! Error types for BOSH pre-binding.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by a pre-bind attempt.
///
/// A caller receives either the `(jid, sid, rid)` triple or exactly one of
/// these; no partial handshake state is exposed.
#[derive(Debug, Error)]
pub enum BoshError {
    /// The connection manager did not answer within the per-request deadline.
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// Service endpoint the request was sent to
        url: String,
        /// Deadline that was exceeded
        timeout: Duration,
    },

    /// The connection manager could not be reached, or answered with an
    /// HTTP-level failure.
    #[error("could not connect to {url}: {reason}")]
    ConnectionFailed {
        /// Service endpoint the request was sent to
        url: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The handshake ran but never reached the established state.
    #[error("could not authenticate {jid}")]
    AuthFailed {
        /// Bare JID that failed to authenticate
        jid: String,
    },

    /// A response violated a structural requirement of the protocol.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The configured service URL is not a valid HTTP(S) URL.
    #[error("invalid service URL {url}: {reason}")]
    InvalidServiceUrl {
        /// The rejected URL
        url: String,
        /// Parse failure detail
        reason: String,
    },
}

/// A specialized Result type for pre-bind operations.
pub type Result<T> = std::result::Result<T, BoshError>;
