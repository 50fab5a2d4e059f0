use crate::{ActivationController, Client};
use log::debug;

/// A scoped mock session: the mock transport stays installed until the `MockSession` is dropped.
///
/// Dropping it deactivates the session and removes every registered responder, even when the
/// test is unwinding from a panic - other tests waiting to activate are never left hanging.
///
/// ### Example:
/// ```rust
/// use tripmock::{Client, ResponseTemplate};
///
/// {
///     let _session = tripmock::session();
///     tripmock::register_responder(
///         "GET",
///         "http://example.com/",
///         ResponseTemplate::new(200).set_body_string("hi"),
///     );
///
///     let response = Client::new().get("http://example.com/").unwrap();
///     assert_eq!(response.body().as_ref(), b"hi");
/// }
/// // The session is over: responders are gone.
/// assert!(tripmock::default_mock().is_empty());
/// ```
#[must_use = "the mock session ends as soon as the `MockSession` is dropped"]
#[derive(Debug)]
pub struct MockSession {
    controller: &'static ActivationController,
}

impl MockSession {
    pub(crate) fn start(controller: &'static ActivationController) -> Self {
        controller.activate();
        Self { controller }
    }

    pub(crate) fn start_non_default(
        controller: &'static ActivationController,
        client: &Client,
    ) -> Self {
        controller.activate_non_default(client);
        Self { controller }
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if std::thread::panicking() {
            debug!("Closing the mock session while unwinding from a panic.");
        }
        self.controller.deactivate_and_reset();
    }
}
