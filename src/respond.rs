use crate::{Error, Request, Response, ResponseTemplate, Transport};
use std::fmt;
use std::sync::Arc;

/// Anything that implements `Respond` can be registered on a [`MockTransport`] to reply to
/// matching requests.
///
/// A responder gets the request and returns either a response or an error: whatever it returns
/// is handed back, untouched, to the code that issued the request.
///
/// ## Fixed responses
///
/// The simplest `Respond` is [`ResponseTemplate`]: no matter the request, it will
/// always return the response it describes.
///
/// ```rust
/// use tripmock::{MockTransport, Request, ResponseTemplate, http::Method};
///
/// let transport = MockTransport::new();
/// transport.register_responder(
///     "GET",
///     "http://example.com/",
///     ResponseTemplate::new(200).set_body_string("hello"),
/// );
///
/// let request = Request::parse(Method::GET, "http://example.com/").unwrap();
/// let response = transport.dispatch(&request).unwrap();
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body().as_ref(), b"hello");
/// ```
///
/// ## Dynamic responses
///
/// Closures taking a `&Request` and returning a `Result<Response, Error>` implement `Respond`
/// out of the box. You can use them to build responses from the request data, or to simulate
/// failures:
///
/// ```rust
/// use tripmock::{Error, MockTransport, Request, Response, ResponseTemplate, Respond, http::Method};
///
/// let transport = MockTransport::new();
/// transport.register_responder("POST", "http://example.com/echo", |request: &Request| {
///     ResponseTemplate::new(201)
///         .set_body_bytes(request.body.clone())
///         .respond(request)
/// });
/// transport.register_responder(
///     "GET",
///     "http://example.com/flaky",
///     |_: &Request| -> Result<Response, Error> { Err(Error::responder("connection reset by peer")) },
/// );
///
/// let request = Request::parse(Method::POST, "http://example.com/echo")
///     .unwrap()
///     .body("ping");
/// assert_eq!(transport.dispatch(&request).unwrap().body().as_ref(), b"ping");
///
/// let request = Request::parse(Method::GET, "http://example.com/flaky").unwrap();
/// assert!(transport.dispatch(&request).is_err());
/// ```
///
/// [`MockTransport`]: crate::MockTransport
pub trait Respond: Send + Sync {
    /// Given a reference to a [`Request`], return the outcome the issuing client should observe.
    fn respond(&self, request: &Request) -> Result<Response, Error>;
}

impl<F> Respond for F
where
    F: Fn(&Request) -> Result<Response, Error>,
    F: Send + Sync,
{
    fn respond(&self, request: &Request) -> Result<Response, Error> {
        self(request)
    }
}

impl Respond for ResponseTemplate {
    fn respond(&self, _request: &Request) -> Result<Response, Error> {
        if let Some(delay) = self.delay() {
            std::thread::sleep(*delay);
        }
        Ok(self.generate_response())
    }
}

/// A responder that always fails with [`Error::NoResponderFound`].
///
/// It is what a [`MockTransport`] falls back to when nothing else matches.
///
/// [`MockTransport`]: crate::MockTransport
pub fn connection_failure(_request: &Request) -> Result<Response, Error> {
    Err(Error::NoResponderFound)
}

/// A responder forwarding requests to another [`Transport`].
///
/// Register it as the catch-all responder to let unmocked requests through to the network:
///
/// ```rust,no_run
/// use tripmock::Passthrough;
///
/// let _session = tripmock::session();
/// tripmock::register_no_responder(Some(Passthrough::new(tripmock::initial_transport())));
///
/// // Any request without a registered responder is now fetched for real.
/// ```
#[derive(Clone)]
pub struct Passthrough(Arc<dyn Transport>);

impl Passthrough {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self(transport)
    }
}

impl Respond for Passthrough {
    fn respond(&self, request: &Request) -> Result<Response, Error> {
        self.0.round_trip(request)
    }
}

impl fmt::Debug for Passthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passthrough(..)")
    }
}
