//! HTTP transport to the BOSH connection manager.
//!
//! The handshake only needs one primitive: POST a rendered envelope, get
//! back the raw response text or a typed failure. The trait keeps the core
//! testable against a scripted transport.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::error::BoshError;

/// Request/response primitive used by the handshake driver.
pub trait Transport: Send + Sync {
    /// POST one envelope and return the raw response body.
    fn post(&self, body: &str) -> impl Future<Output = Result<String, BoshError>> + Send;
}

/// Transport over plain HTTP(S) using a shared reqwest client.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the given connection-manager endpoint.
    pub fn new(service_url: &str, timeout: Duration) -> Result<Self, BoshError> {
        let url = Url::parse(service_url).map_err(|e| BoshError::InvalidServiceUrl {
            url: service_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(BoshError::InvalidServiceUrl {
                url: service_url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            url,
            timeout,
        })
    }

    /// The endpoint requests are sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn translate(&self, error: reqwest::Error) -> BoshError {
        if error.is_timeout() {
            BoshError::Timeout {
                url: self.url.to_string(),
                timeout: self.timeout,
            }
        } else {
            BoshError::ConnectionFailed {
                url: self.url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

impl Transport for HttpTransport {
    async fn post(&self, body: &str) -> Result<String, BoshError> {
        debug!(url = %self.url, bytes = body.len(), "POST to connection manager");

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header(ACCEPT, "text/xml")
            .timeout(self.timeout)
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| self.translate(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BoshError::ConnectionFailed {
                url: self.url.to_string(),
                reason: format!("HTTP status {status}"),
            });
        }

        response.text().await.map_err(|e| self.translate(e))
    }
}
