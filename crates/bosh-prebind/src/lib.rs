//! # bosh-prebind
//!
//! XMPP session pre-binding over BOSH (XEP-0124 / XEP-0206).
//!
//! Performs the multi-step handshake that establishes an authenticated XMPP
//! session over plain HTTP and hands back the `(jid, sid, rid)` triple a
//! follow-on client (typically in a browser) uses to attach to it:
//!
//! 1. session initiation
//! 2. SASL PLAIN authentication
//! 3. stream restart
//! 4. resource binding
//! 5. session start
//!
//! ```no_run
//! use bosh_prebind::{BoshClient, BoshConfig};
//!
//! # async fn run() -> Result<(), bosh_prebind::BoshError> {
//! let config = BoshConfig::new(
//!     "alice@example.com",
//!     "secret",
//!     "https://example.com:5280/http-bind",
//! );
//! let session = BoshClient::new(&config)?.connect().await?;
//! println!("{} {} {}", session.jid, session.sid, session.rid);
//! # Ok(())
//! # }
//! ```
//!
//! The driver is one-shot: `connect` consumes the client, and a failed
//! handshake is retried by building a new one. Stanza exchange, long-lived
//! polling and SASL mechanisms beyond PLAIN are out of scope.

pub mod client;
pub mod envelope;
pub mod jid;
pub mod response;
pub mod rid;
pub mod transport;

mod error;
mod session;

pub use client::{BoshClient, BoshConfig};
pub use envelope::{ns, Payload};
pub use error::{BoshError, Result};
pub use jid::Jid;
pub use rid::RequestIdSequencer;
pub use session::PrebindSession;
pub use transport::{HttpTransport, Transport};
