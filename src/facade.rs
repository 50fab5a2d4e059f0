//! Free functions driving the process-wide [`ActivationController`].
use crate::{ActivationController, Client, MockSession, MockTransport, Respond, Transport};
use std::sync::Arc;

fn controller() -> &'static ActivationController {
    ActivationController::global()
}

/// Start intercepting requests: the default mock transport becomes the process-wide default
/// transport, so every [`Client`] without a transport of its own is routed to it.
///
/// If another session is open, e.g. in a test running in parallel, `activate` blocks until it
/// is closed with [`deactivate`].
///
/// Prefer [`session`] in tests: it deactivates automatically, panics included.
///
/// ### Example:
/// ```rust
/// use tripmock::{Client, ResponseTemplate};
///
/// tripmock::activate();
/// tripmock::register_responder("GET", "http://example.com/articles", ResponseTemplate::new(200));
///
/// let status = Client::new().get("http://example.com/articles").unwrap().status();
/// assert_eq!(status, 200);
///
/// tripmock::deactivate_and_reset();
/// ```
pub fn activate() {
    controller().activate()
}

/// Like [`activate`], but installs the mock transport on `client` only.
///
/// Use it for clients that were given a transport of their own.
pub fn activate_non_default(client: &Client) {
    controller().activate_non_default(client)
}

/// Stop intercepting requests, putting back the transport replaced by the last activation.
///
/// Does nothing if no session is open. Registered responders are left alone.
pub fn deactivate() {
    controller().deactivate()
}

/// Drop every responder registered on the default mock transport.
pub fn reset() {
    controller().reset()
}

/// [`deactivate`], then [`reset`]. The responders are dropped before another session can start.
pub fn deactivate_and_reset() {
    controller().deactivate_and_reset()
}

/// Route requests for `method` and `url` to `responder` on the default mock transport.
///
/// If the URL of a request does not match exactly, the same URL without its query string is
/// tried as well.
///
/// ### Example:
/// ```rust
/// use tripmock::{Client, ResponseTemplate};
///
/// let _session = tripmock::session();
/// tripmock::register_responder(
///     "GET",
///     "http://example.com/",
///     ResponseTemplate::new(200).set_body_string("hello world"),
/// );
///
/// let response = Client::new().get("http://example.com/?lang=en").unwrap();
/// assert_eq!(response.body().as_ref(), b"hello world");
/// ```
pub fn register_responder<M, U, R>(method: M, url: U, responder: R)
where
    M: Into<String>,
    U: Into<String>,
    R: Respond + 'static,
{
    controller().with_mock(|mock| mock.register_responder(method, url, responder))
}

/// Set the responder called for requests matching no registered route.
/// `None` goes back to the default: failing with [`Error::NoResponderFound`], same as
/// [`clear_no_responder`].
///
/// [`Error::NoResponderFound`]: crate::Error::NoResponderFound
pub fn register_no_responder<R>(responder: Option<R>)
where
    R: Respond + 'static,
{
    controller().with_mock(|mock| mock.register_no_responder(responder))
}

/// Remove the catch-all responder: unmatched requests fail with [`Error::NoResponderFound`].
///
/// [`Error::NoResponderFound`]: crate::Error::NoResponderFound
pub fn clear_no_responder() {
    controller().with_mock(MockTransport::clear_no_responder)
}

/// The mock transport driven by the free functions of this crate.
pub fn default_mock() -> Arc<MockTransport> {
    controller().mock()
}

/// The transport that [`deactivate`] puts back - usually the real, network-backed, one.
pub fn initial_transport() -> Arc<dyn Transport> {
    controller().initial_transport()
}

/// `true` if mocking is turned off for this process via `TRIPMOCK_DISABLED`.
pub fn disabled() -> bool {
    controller().is_disabled()
}

/// [`activate`] and return a guard that calls [`deactivate_and_reset`] when dropped.
pub fn session() -> MockSession {
    MockSession::start(controller())
}

/// [`activate_non_default`] and return a guard that calls [`deactivate_and_reset`] when dropped.
pub fn session_non_default(client: &Client) -> MockSession {
    MockSession::start_non_default(controller(), client)
}
