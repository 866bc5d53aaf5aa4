//! The BOSH pre-bind handshake driver.
//!
//! Drives the five-step exchange against the connection manager:
//! session initiation, SASL PLAIN authentication, stream restart, resource
//! binding, session start. Each step is one HTTP POST whose response is
//! inspected for that step's success marker; the session ID is refreshed
//! from every response along the way.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::envelope::{self, Payload};
use crate::error::{BoshError, Result};
use crate::jid::Jid;
use crate::response;
use crate::session::{PrebindSession, Session};
use crate::transport::{HttpTransport, Transport};

/// Default per-request deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default BOSH long-poll wait hint, in seconds.
const DEFAULT_WAIT: u32 = 5;
/// Default BOSH hold hint (requests the manager may keep pending).
const DEFAULT_HOLD: u32 = 1;

/// Connection parameters for one pre-bind attempt.
#[derive(Debug, Clone)]
pub struct BoshConfig {
    /// Full or resource-qualified JID
    pub jid: String,
    /// Account password for SASL PLAIN
    pub password: String,
    /// BOSH connection-manager endpoint
    pub service_url: String,
    /// Per-request deadline
    pub timeout: Duration,
    /// Long-poll wait hint sent to the manager
    pub wait: u32,
    /// Hold hint sent to the manager
    pub hold: u32,
}

impl BoshConfig {
    /// Create a config with the default timeout, wait and hold hints.
    pub fn new(
        jid: impl Into<String>,
        password: impl Into<String>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            jid: jid.into(),
            password: password.into(),
            service_url: service_url.into(),
            timeout: DEFAULT_TIMEOUT,
            wait: DEFAULT_WAIT,
            hold: DEFAULT_HOLD,
        }
    }

    /// Set the per-request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the BOSH wait hint.
    pub fn with_wait(mut self, wait: u32) -> Self {
        self.wait = wait;
        self
    }

    /// Set the BOSH hold hint.
    pub fn with_hold(mut self, hold: u32) -> Self {
        self.hold = hold;
        self
    }
}

/// One-shot handshake driver.
///
/// `connect` consumes the client: a failed attempt leaves RID/SID state that
/// cannot safely be resumed, so a retry means building a fresh client.
pub struct BoshClient<T: Transport> {
    jid: Jid,
    password: String,
    wait: u32,
    hold: u32,
    transport: T,
    session: Session,
}

impl BoshClient<HttpTransport> {
    /// Build a client that talks to the configured endpoint over HTTP.
    pub fn new(config: &BoshConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.service_url, config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> BoshClient<T> {
    /// Build a client over a caller-supplied transport.
    pub fn with_transport(config: &BoshConfig, transport: T) -> Self {
        Self {
            jid: Jid::parse(&config.jid),
            password: config.password.clone(),
            wait: config.wait,
            hold: config.hold,
            transport,
            session: Session::new(),
        }
    }

    /// Run the handshake to completion.
    ///
    /// On success the returned session carries the bare JID, the session ID
    /// and the request ID reserved for the caller's first own request. A
    /// step that misses its success marker aborts the handshake without
    /// sending the remaining steps and surfaces as [`BoshError::AuthFailed`];
    /// transport failures propagate as-is.
    pub async fn connect(mut self) -> Result<PrebindSession> {
        info!(jid = %self.jid, "starting BOSH pre-bind handshake");

        self.initiate().await?;

        self.session.established = self.authenticate().await?
            && self.restart_stream().await?
            && self.bind_resource().await?
            && self.open_session().await?;

        if !self.session.established {
            warn!(jid = %self.jid.bare(), "handshake did not reach established state");
            return Err(BoshError::AuthFailed {
                jid: self.jid.bare().to_string(),
            });
        }

        // One more increment so the first post-handshake request the caller
        // makes continues the stream without a gap.
        let rid = self.session.rid.next();
        let sid = self.session.sid.clone().ok_or_else(|| {
            BoshError::ProtocolViolation(
                "handshake established but no session id was issued".to_string(),
            )
        })?;

        info!(jid = %self.jid.bare(), %sid, rid, "pre-bind complete");
        Ok(PrebindSession {
            jid: self.jid.bare().to_string(),
            sid,
            rid,
        })
    }

    /// POST one envelope, refresh the session ID, return the raw response.
    async fn exchange(&mut self, extra: &[(&str, String)], payload: &Payload) -> Result<String> {
        let rid = self.session.rid.next();
        let body = envelope::build(rid, self.session.sid.as_deref(), extra, payload);
        trace!(rid, %body, "sending envelope");

        let raw = self.transport.post(&body).await?;
        trace!(rid, %raw, "received response");

        self.session.absorb_sid(&raw);
        Ok(raw)
    }

    /// Step 1: open the BOSH session. The response normally carries the
    /// first session ID; there is no failure marker for this step.
    async fn initiate(&mut self) -> Result<()> {
        debug!(domain = self.jid.domain(), "initiating BOSH session");
        let extra = [
            ("to", self.jid.domain().to_string()),
            ("wait", self.wait.to_string()),
            ("hold", self.hold.to_string()),
        ];
        self.exchange(&extra, &Payload::None).await?;
        Ok(())
    }

    /// Step 2: SASL PLAIN authentication.
    async fn authenticate(&mut self) -> Result<bool> {
        debug!("sending SASL PLAIN auth");
        let credential = plain_credential(&self.jid, &self.password);
        let raw = self.exchange(&[], &Payload::Auth(credential)).await?;
        Ok(response::auth_succeeded(&raw))
    }

    /// Step 3: restart the XML stream over the authenticated session.
    async fn restart_stream(&mut self) -> Result<bool> {
        debug!("requesting stream restart");
        let raw = self.exchange(&[], &Payload::Restart).await?;
        Ok(response::restart_succeeded(&raw))
    }

    /// Step 4: bind the connection resource.
    async fn bind_resource(&mut self) -> Result<bool> {
        let resource = bind_resource_name(&self.jid);
        debug!(%resource, "requesting resource binding");
        let raw = self.exchange(&[], &Payload::Bind { resource }).await?;
        Ok(response::bind_succeeded(&raw))
    }

    /// Step 5: open the IM session.
    async fn open_session(&mut self) -> Result<bool> {
        debug!("requesting session start");
        let raw = self.exchange(&[], &Payload::Session).await?;
        Ok(response::session_succeeded(&raw))
    }
}

/// The SASL PLAIN credential: `\0 localpart \0 password`, Base64-encoded.
/// The standard engine emits no padding whitespace, matching the wire
/// requirement that the credential carry none.
fn plain_credential(jid: &Jid, password: &str) -> String {
    let payload = format!("\0{}\0{}", jid.local().trim(), password);
    STANDARD.encode(payload.as_bytes())
}

/// The resource used for binding: the JID's override when the caller gave
/// one, otherwise a generated `bosh_<n>` identifier.
fn bind_resource_name(jid: &Jid) -> String {
    match jid.resource() {
        Some(resource) => resource.to_string(),
        None => format!("bosh_{}", rand::rng().random_range(0..10_000)),
    }
}
