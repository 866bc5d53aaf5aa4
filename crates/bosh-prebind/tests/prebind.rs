//! End-to-end handshake tests against a scripted transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bosh_prebind::{BoshClient, BoshConfig, BoshError, Transport};

const BOSH_NS: &str = "http://jabber.org/protocol/httpbind";

/// Transport that replays a fixed script of responses and records every
/// request body it was handed.
#[derive(Clone)]
struct ScriptedTransport {
    inner: Arc<ScriptInner>,
}

struct ScriptInner {
    responses: Mutex<VecDeque<Result<String, BoshError>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<String, BoshError>>) -> Self {
        Self {
            inner: Arc::new(ScriptInner {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.inner.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, body: &str) -> Result<String, BoshError> {
        self.inner.requests.lock().unwrap().push(body.to_string());
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("handshake sent more requests than scripted")
    }
}

/// Pull a single-quoted attribute value out of a rendered envelope.
fn attr_value(body: &str, name: &str) -> Option<String> {
    let pattern = format!("{name}='");
    let start = body.find(&pattern)? + pattern.len();
    let end = body[start..].find('\'')? + start;
    Some(body[start..end].to_string())
}

fn config(jid: &str) -> BoshConfig {
    BoshConfig::new(jid, "secret", "http://localhost:5280/http-bind")
        .with_timeout(Duration::from_secs(1))
}

fn happy_path_script() -> Vec<Result<String, BoshError>> {
    vec![
        Ok(format!(
            "<body xmlns='{BOSH_NS}' sid='S1' wait='5' hold='1' requests='2'/>"
        )),
        Ok(format!(
            "<body xmlns='{BOSH_NS}' sid='S1'>\
             <success xmlns='urn:ietf:params:xml:ns:xmpp-sasl'/></body>"
        )),
        Ok(format!(
            "<body xmlns='{BOSH_NS}'>\
             <stream:features xmlns:stream='http://etherx.jabber.org/streams'>\
             <bind xmlns='urn:ietf:params:xml:ns:xmpp-bind'/>\
             </stream:features></body>"
        )),
        Ok(format!(
            "<body xmlns='{BOSH_NS}'>\
             <iq xmlns='jabber:client' type='result'>\
             <bind xmlns='urn:ietf:params:xml:ns:xmpp-bind'>\
             <jid>alice@example.com/bosh_42</jid>\
             </bind></iq></body>"
        )),
        Ok(format!("<body xmlns='{BOSH_NS}'/>")),
    ]
}

#[tokio::test]
async fn full_handshake_yields_jid_sid_and_reserved_rid() {
    let transport = ScriptedTransport::new(happy_path_script());
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());

    let session = client.connect().await.unwrap();

    assert_eq!(session.jid, "alice@example.com");
    assert_eq!(session.sid, "S1");

    let requests = transport.requests();
    assert_eq!(requests.len(), 5);

    // RIDs are consecutive across the handshake and the returned rid is
    // reserved one past the last request.
    let initial_rid: u64 = attr_value(&requests[0], "rid").unwrap().parse().unwrap();
    for (i, request) in requests.iter().enumerate() {
        let rid: u64 = attr_value(request, "rid").unwrap().parse().unwrap();
        assert_eq!(rid, initial_rid + i as u64);
    }
    assert_eq!(session.rid, initial_rid + 5);
}

#[tokio::test]
async fn handshake_requests_have_the_expected_shape() {
    let transport = ScriptedTransport::new(happy_path_script());
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());
    client.connect().await.unwrap();

    let requests = transport.requests();

    // Initiation: addressed to the JID domain with the protocol hints,
    // before any session id exists.
    assert_eq!(attr_value(&requests[0], "to").as_deref(), Some("example.com"));
    assert_eq!(attr_value(&requests[0], "wait").as_deref(), Some("5"));
    assert_eq!(attr_value(&requests[0], "hold").as_deref(), Some("1"));
    assert_eq!(attr_value(&requests[0], "sid"), None);

    // Every later request carries the issued session id.
    for request in &requests[1..] {
        assert_eq!(attr_value(request, "sid").as_deref(), Some("S1"));
    }

    // Auth: SASL PLAIN credential decodes to \0local\0password.
    assert!(requests[1].contains("mechanism='PLAIN'"));
    let auth_elem = requests[1].find("<auth").unwrap();
    let auth_start = requests[1][auth_elem..].find('>').unwrap() + auth_elem + 1;
    let auth_end = requests[1][auth_start..].find('<').unwrap() + auth_start;
    let decoded = STANDARD.decode(&requests[1][auth_start..auth_end]).unwrap();
    assert_eq!(decoded, b"\0alice\0secret");

    // Restart: flag attribute, no inner stanza.
    assert_eq!(attr_value(&requests[2], "xmpp:restart").as_deref(), Some("true"));
    assert!(requests[2].ends_with("/>"));

    // Bind: generated resource for a bare JID.
    assert!(requests[3].contains("urn:ietf:params:xml:ns:xmpp-bind"));
    assert!(requests[3].contains(">bosh_"));

    // Session start.
    assert!(requests[4].contains("urn:ietf:params:xml:ns:xmpp-session"));
}

#[tokio::test]
async fn bind_uses_the_jid_resource_override() {
    let transport = ScriptedTransport::new(happy_path_script());
    let client = BoshClient::with_transport(&config("alice@example.com/laptop"), transport.clone());
    client.connect().await.unwrap();

    let requests = transport.requests();
    assert!(requests[3].contains(">laptop<"));
    assert!(!requests[3].contains("bosh_"));
}

#[tokio::test]
async fn auth_failure_stops_the_handshake() {
    let transport = ScriptedTransport::new(vec![
        Ok(format!("<body xmlns='{BOSH_NS}' sid='S1'/>")),
        // SASL failure: no sid attribute on the auth response.
        Ok(format!(
            "<body xmlns='{BOSH_NS}'>\
             <failure xmlns='urn:ietf:params:xml:ns:xmpp-sasl'><not-authorized/></failure>\
             </body>"
        )),
    ]);
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());

    let error = client.connect().await.unwrap_err();
    assert!(matches!(
        error,
        BoshError::AuthFailed { ref jid } if jid == "alice@example.com"
    ));

    // Steps 3-5 were never sent.
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn restart_failure_stops_the_handshake() {
    let mut script = happy_path_script();
    script[2] = Ok(format!("<body xmlns='{BOSH_NS}'/>"));
    script.truncate(3);

    let transport = ScriptedTransport::new(script);
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());

    let error = client.connect().await.unwrap_err();
    assert!(matches!(error, BoshError::AuthFailed { .. }));
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn timeout_propagates_and_aborts() {
    let mut script = happy_path_script();
    script[1] = Err(BoshError::Timeout {
        url: "http://localhost:5280/http-bind".to_string(),
        timeout: Duration::from_secs(1),
    });
    script.truncate(2);

    let transport = ScriptedTransport::new(script);
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());

    let error = client.connect().await.unwrap_err();
    assert!(matches!(error, BoshError::Timeout { .. }));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn connection_failure_propagates_from_the_first_step() {
    let transport = ScriptedTransport::new(vec![Err(BoshError::ConnectionFailed {
        url: "http://localhost:5280/http-bind".to_string(),
        reason: "connection refused".to_string(),
    })]);
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());

    let error = client.connect().await.unwrap_err();
    assert!(matches!(error, BoshError::ConnectionFailed { .. }));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn sid_refreshes_from_later_responses() {
    let mut script = happy_path_script();
    // The manager rotates the sid on the auth response.
    script[1] = Ok(format!(
        "<body xmlns='{BOSH_NS}' sid='S2'>\
         <success xmlns='urn:ietf:params:xml:ns:xmpp-sasl'/></body>"
    ));

    let transport = ScriptedTransport::new(script);
    let client = BoshClient::with_transport(&config("alice@example.com"), transport.clone());

    let session = client.connect().await.unwrap();
    assert_eq!(session.sid, "S2");
    assert_eq!(
        attr_value(&transport.requests()[2], "sid").as_deref(),
        Some("S2")
    );
}
