//! Inspection of connection-manager responses.
//!
//! Each handshake step has one success marker. The markers are checked
//! structurally: the response is parsed into an element tree and the
//! expected attribute or child element must actually be present, so an
//! incidental token elsewhere in the payload cannot produce a false
//! positive.

use minidom::Element;
use tracing::debug;

use crate::envelope::ns;

/// Parse a raw response, tolerating malformed input.
fn parse(raw: &str) -> Option<Element> {
    match raw.parse::<Element>() {
        Ok(elem) => Some(elem),
        Err(e) => {
            debug!(error = %e, "response is not well-formed XML");
            None
        }
    }
}

/// Read the `sid` attribute off the response root, if there is one.
///
/// This is a best-effort refresh: a response that fails to parse or carries
/// no session ID yields `None` and the caller keeps its last known value.
pub fn extract_sid(raw: &str) -> Option<String> {
    parse(raw)?.attr("sid").map(str::to_string)
}

/// Did the SASL exchange succeed? True when the response root carries a
/// `sid` attribute: a successful auth negotiation response includes the
/// session attributes.
pub fn auth_succeeded(raw: &str) -> bool {
    parse(raw).is_some_and(|elem| elem.attr("sid").is_some())
}

/// Did the stream restart succeed? True when the response wraps a
/// `<stream:features>` element.
pub fn restart_succeeded(raw: &str) -> bool {
    parse(raw).is_some_and(|elem| elem.get_child("features", ns::STREAM).is_some())
}

/// Did resource binding succeed? True when a bound `<jid>` element is
/// present in the response.
pub fn bind_succeeded(raw: &str) -> bool {
    parse(raw).is_some_and(|elem| has_descendant(&elem, "jid", ns::BIND))
}

/// Did the session request succeed? True when the response is a well-formed
/// BOSH `<body>` envelope.
pub fn session_succeeded(raw: &str) -> bool {
    parse(raw).is_some_and(|elem| elem.is("body", ns::BOSH))
}

fn has_descendant(elem: &Element, name: &str, namespace: &str) -> bool {
    elem.children()
        .any(|child| child.is(name, namespace) || has_descendant(child, name, namespace))
}
