//! Jabber ID handling.
//!
//! Pre-binding does not enforce JID syntax; the connection manager is the
//! authority on addressing. We only locate the `@` and `/` separators, the
//! same way the servers we target do on their relaxed input paths.

/// A parsed Jabber ID of the form `local@domain` or `local@domain/resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jid {
    bare: String,
    resource: Option<String>,
}

impl Jid {
    /// Parse a raw JID string.
    ///
    /// The part after the first `/` (if any) is kept as the caller's
    /// requested resource for binding. No further validation is performed:
    /// a string without `@` yields a JID whose domain is the whole string.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('/') {
            Some((bare, resource)) => Self {
                bare: bare.to_string(),
                resource: Some(resource.to_string()),
            },
            None => Self {
                bare: raw.to_string(),
                resource: None,
            },
        }
    }

    /// The bare JID (`local@domain`).
    pub fn bare(&self) -> &str {
        &self.bare
    }

    /// The localpart (everything before the first `@`).
    pub fn local(&self) -> &str {
        self.bare.split('@').next().unwrap_or(&self.bare)
    }

    /// The domain (everything after the last `@`).
    pub fn domain(&self) -> &str {
        self.bare.rsplit('@').next().unwrap_or(&self.bare)
    }

    /// The caller-requested resource, if the raw JID carried one.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }
}

impl std::fmt::Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.resource {
            Some(resource) => write!(f, "{}/{}", self.bare, resource),
            None => f.write_str(&self.bare),
        }
    }
}
