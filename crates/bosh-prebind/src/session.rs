//! Session state for one handshake attempt.

use serde::Serialize;
use tracing::debug;

use crate::response;
use crate::rid::RequestIdSequencer;

/// Mutable handshake state. One per attempt; a failed attempt is discarded
/// rather than resumed, since its RID/SID stream cannot be trusted.
#[derive(Debug)]
pub(crate) struct Session {
    /// Session ID assigned by the connection manager, once seen.
    pub sid: Option<String>,
    /// Request ID stream for this attempt.
    pub rid: RequestIdSequencer,
    /// Set only after all four post-initiation steps succeeded in order.
    pub established: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            sid: None,
            rid: RequestIdSequencer::new(),
            established: false,
        }
    }

    /// Refresh the session ID from a raw response. Responses without a
    /// usable `sid` attribute leave the current value untouched.
    pub fn absorb_sid(&mut self, raw: &str) {
        if let Some(sid) = response::extract_sid(raw) {
            debug!(%sid, "connection manager issued session id");
            self.sid = Some(sid);
        }
    }
}

/// The outcome of a successful pre-bind: everything a follow-on BOSH client
/// needs to attach to the established session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrebindSession {
    /// Authenticated bare JID
    pub jid: String,
    /// Session ID assigned by the connection manager
    pub sid: String,
    /// Request ID reserved for the caller's first request
    pub rid: u64,
}
