//! `tripmock` intercepts the outgoing HTTP requests of the code under test and answers them
//! with responders you register, instead of going over the network.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Routing](#routing)
//! 3. [Responders](#responders)
//! 4. [Custom clients](#custom-clients)
//! 5. [Test isolation](#test-isolation)
//! 6. [Configuration](#configuration)
//!
//! ## Getting started
//! ```rust
//! use tripmock::{Client, ResponseTemplate};
//!
//! // Route every client relying on the default transport to the mock transport.
//! // The session ends when `_session` goes out of scope.
//! let _session = tripmock::session();
//!
//! // When it sees a GET request for 'http://example.com/hello' it will respond with a 200.
//! tripmock::register_responder(
//!     "GET",
//!     "http://example.com/hello",
//!     ResponseTemplate::new(200).set_body_string("hi"),
//! );
//!
//! let response = Client::new().get("http://example.com/hello").unwrap();
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body().as_ref(), b"hi");
//!
//! // Requests without a responder fail.
//! let error = Client::new().get("http://example.com/missing").unwrap_err();
//! assert!(error.is_no_responder_found());
//! ```
//!
//! ## Routing
//!
//! Responders are registered for an HTTP method and a full URL. A request goes to:
//! 1. the responder registered for its exact method and URL;
//! 2. failing that, the responder registered for its method and its URL stripped of the query
//!    string;
//! 3. failing that, the catch-all responder set with [`register_no_responder`];
//! 4. failing that, it fails with [`Error::NoResponderFound`].
//!
//! Registering again for the same method and URL replaces the previous responder.
//!
//! ## Responders
//!
//! Anything implementing [`Respond`] can be registered: a [`ResponseTemplate`], a closure taking
//! a `&Request` and returning a `Result<Response, Error>`, or a [`Passthrough`] to another
//! transport. Check [`Respond`]'s documentation for examples.
//!
//! ## Custom clients
//!
//! [`activate`] swaps the process-wide default transport. A [`Client`] that was given its own
//! transport is not affected: use [`activate_non_default`] (or [`session_non_default`]) to swap
//! the transport of that specific client instead.
//!
//! A [`MockTransport`] can also be used on its own, without any global state, by installing it on
//! a client with [`Client::with_transport`].
//!
//! ## Test isolation
//!
//! There is only one default mock transport per process. To avoid cross-test interference when
//! tests run in parallel, only one mock session can be open at a time: [`activate`] blocks until
//! the session opened by another test has been closed with [`deactivate`]. Waiting activations
//! are let in in arrival order.
//!
//! [`session`] returns a guard closing the session and dropping all responders when it goes out
//! of scope, panics included: prefer it to pairing [`activate`] and [`deactivate`] by hand.
//!
//! ## Configuration
//!
//! - `TRIPMOCK_DISABLED`: set it to anything but an empty string, `0` or `false` to turn
//!   [`activate`] and [`deactivate`] into no-ops, e.g. to run a test suite against real services.
//! - `TRIPMOCK_BODY_PRINT_LIMIT`: how many bytes of a request body to print in logs.
//!
//! Both are read once, the first time they are needed.
//!
//! `tripmock` logs through the [`log`](https://docs.rs/log/) facade: plug in the logger of your
//! choice to see activations, hand-overs between sessions and outgoing requests.
mod activation;
mod client;
mod error;
mod facade;
pub mod http;
mod mock_transport;
mod request;
mod respond;
mod response_template;
mod settings;
mod transport;

pub use activation::{ActivationController, MockSession};
pub use client::Client;
pub use error::{BoxError, Error};
pub use facade::{
    activate, activate_non_default, clear_no_responder, deactivate, deactivate_and_reset,
    default_mock, disabled, initial_transport, register_no_responder, register_responder, reset,
    session, session_non_default,
};
pub use mock_transport::{MockTransport, RouteKey};
pub use request::{BodyPrintLimit, Request};
pub use respond::{connection_failure, Passthrough, Respond};
pub use response_template::ResponseTemplate;
pub use settings::{Settings, BODY_PRINT_LIMIT_ENV, DISABLED_ENV};
pub use transport::{
    default_transport, same_transport, set_default_transport, HyperTransport, Response, Transport,
};
