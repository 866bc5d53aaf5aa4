//! BOSH `<body/>` envelope construction.
//!
//! Every request of the handshake is one `<body>` element in the BOSH
//! namespace, carrying the request ID and session attributes, optionally
//! wrapping a single inner stanza. Inner stanzas are built with minidom;
//! the envelope tag itself is rendered by hand because it carries prefixed
//! attributes (`xmpp:version`, `xmpp:restart`, `xmlns:xmpp`) that an XML
//! tree builder cannot attach to an element.

use std::collections::BTreeMap;

use minidom::Element;
use rand::Rng;

/// Namespace URIs used by the BOSH handshake.
pub mod ns {
    /// BOSH HTTP binding namespace (XEP-0124)
    pub const BOSH: &str = "http://jabber.org/protocol/httpbind";
    /// XMPP-over-BOSH extension namespace (XEP-0206)
    pub const XBOSH: &str = "urn:xmpp:xbosh";
    /// SASL namespace
    pub const SASL: &str = "urn:ietf:params:xml:ns:xmpp-sasl";
    /// Resource binding namespace
    pub const BIND: &str = "urn:ietf:params:xml:ns:xmpp-bind";
    /// Session namespace
    pub const SESSION: &str = "urn:ietf:params:xml:ns:xmpp-session";
    /// XMPP client namespace
    pub const CLIENT: &str = "jabber:client";
    /// XMPP streams namespace
    pub const STREAM: &str = "http://etherx.jabber.org/streams";
}

/// The inner content of a handshake envelope.
///
/// Exactly five shapes ever go over the wire, one per handshake step, so
/// they are a closed set rather than an open-ended element callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Bare envelope (session initiation).
    None,
    /// SASL PLAIN `<auth>` element carrying the Base64 credential.
    Auth(String),
    /// Stream restart request; rendered as the `xmpp:restart` attribute.
    Restart,
    /// `<iq type='set'>` with a resource binding request.
    Bind {
        /// Resource identifier to bind
        resource: String,
    },
    /// `<iq type='set'>` opening the IM session.
    Session,
}

/// Render one envelope.
///
/// Base attributes are `rid`, the BOSH `xmlns`, `xmpp:version` and the
/// `xmpp` prefix declaration; `sid` is added once the session has one, and
/// `extra` attributes are merged last so a per-call value wins on collision.
pub fn build(rid: u64, sid: Option<&str>, extra: &[(&str, String)], payload: &Payload) -> String {
    let mut attrs: BTreeMap<String, String> = BTreeMap::new();
    attrs.insert("rid".to_string(), rid.to_string());
    attrs.insert("xmlns".to_string(), ns::BOSH.to_string());
    attrs.insert("xmpp:version".to_string(), "1.0".to_string());
    attrs.insert("xmlns:xmpp".to_string(), ns::XBOSH.to_string());

    if let Some(sid) = sid {
        attrs.insert("sid".to_string(), sid.to_string());
    }

    if matches!(payload, Payload::Restart) {
        attrs.insert("xmpp:restart".to_string(), "true".to_string());
    }

    for (name, value) in extra {
        attrs.insert((*name).to_string(), value.clone());
    }

    let mut body = String::from("<body");
    for (name, value) in &attrs {
        body.push_str(&format!(" {}='{}'", name, escape_attr(value)));
    }

    match inner_stanza(payload) {
        Some(stanza) => {
            body.push('>');
            body.push_str(&String::from(&stanza));
            body.push_str("</body>");
        }
        None => body.push_str("/>"),
    }

    body
}

/// Build the child element for payloads that carry one.
fn inner_stanza(payload: &Payload) -> Option<Element> {
    match payload {
        Payload::None | Payload::Restart => None,
        Payload::Auth(credential) => Some(
            Element::builder("auth", ns::SASL)
                .attr("mechanism", "PLAIN")
                .append(credential.clone())
                .build(),
        ),
        Payload::Bind { resource } => {
            let bind = Element::builder("bind", ns::BIND)
                .append(
                    Element::builder("resource", ns::BIND)
                        .append(resource.clone())
                        .build(),
                )
                .build();
            Some(
                Element::builder("iq", ns::CLIENT)
                    .attr("id", format!("bind_{}", rand::rng().random_range(0..100_000)))
                    .attr("type", "set")
                    .append(bind)
                    .build(),
            )
        }
        Payload::Session => Some(
            Element::builder("iq", ns::CLIENT)
                .attr("id", format!("sess_{}", rand::rng().random_range(0..100_000)))
                .attr("type", "set")
                .append(Element::builder("session", ns::SESSION).build())
                .build(),
        ),
    }
}

/// Escape an attribute value for single-quoted rendering.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
