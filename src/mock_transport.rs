use crate::respond::connection_failure;
use crate::{Error, Request, Respond, Response, Transport};
use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// The key responders are registered under: an HTTP method and a full URL.
///
/// Both sides are compared verbatim - no normalisation, no validation. Empty strings are fine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: String,
    pub url: String,
}

impl RouteKey {
    pub fn new<M, U>(method: M, url: U) -> Self
    where
        M: Into<String>,
        U: Into<String>,
    {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[derive(Default)]
struct Routes {
    responders: HashMap<RouteKey, Arc<dyn Respond>>,
    no_responder: Option<Arc<dyn Respond>>,
}

/// How a request was routed to its responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Exact,
    WithoutQuery,
    NoResponder,
}

/// A [`Transport`] that never touches the network: each request is routed to the responder
/// registered for its method and URL.
///
/// Routing follows a fixed precedence:
/// 1. the responder registered for the exact method and URL;
/// 2. if the URL has a query string, the responder registered for the same method and the URL
///    truncated at its first `?`;
/// 3. the catch-all responder set with [`register_no_responder`], if any;
/// 4. otherwise the request fails with [`Error::NoResponderFound`].
///
/// A `MockTransport` can be used on its own - install it on a [`Client`] with
/// [`Client::with_transport`] - or through the process-wide one driven by [`activate`].
///
/// Responders are invoked after the internal lock has been released: a slow responder does not
/// hold up registrations or other requests.
///
/// [`register_no_responder`]: MockTransport::register_no_responder
/// [`Client`]: crate::Client
/// [`Client::with_transport`]: crate::Client::with_transport
/// [`activate`]: crate::activate
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Routes>,
}

impl MockTransport {
    /// A `MockTransport` with no responders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route requests for `method` and `url` to `responder`.
    ///
    /// Registering twice for the same method and URL replaces the previous responder.
    pub fn register_responder<M, U, R>(&self, method: M, url: U, responder: R)
    where
        M: Into<String>,
        U: Into<String>,
        R: Respond + 'static,
    {
        let key = RouteKey::new(method, url);
        trace!("Registering a responder for {}", key);
        self.routes
            .lock()
            .expect("Poisoned lock!")
            .responders
            .insert(key, Arc::new(responder));
    }

    /// Set the responder invoked for requests that match no registered route.
    ///
    /// Pass `None` (or call [`clear_no_responder`]) to go back to failing with
    /// [`Error::NoResponderFound`].
    ///
    /// [`clear_no_responder`]: MockTransport::clear_no_responder
    pub fn register_no_responder<R>(&self, responder: Option<R>)
    where
        R: Respond + 'static,
    {
        self.routes.lock().expect("Poisoned lock!").no_responder =
            responder.map(|r| Arc::new(r) as Arc<dyn Respond>);
    }

    /// Remove the catch-all responder, if any.
    pub fn clear_no_responder(&self) {
        self.routes.lock().expect("Poisoned lock!").no_responder = None;
    }

    /// Drop all registered responders, the catch-all one included.
    pub fn reset(&self) {
        *self.routes.lock().expect("Poisoned lock!") = Routes::default();
    }

    /// The number of registered routes. The catch-all responder is not counted.
    pub fn len(&self) -> usize {
        self.routes.lock().expect("Poisoned lock!").responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if a catch-all responder is set.
    pub fn has_no_responder(&self) -> bool {
        self.routes
            .lock()
            .expect("Poisoned lock!")
            .no_responder
            .is_some()
    }

    /// Route `request` to a responder and return whatever it produced.
    pub fn dispatch(&self, request: &Request) -> Result<Response, Error> {
        match self.responder_for(request) {
            Some((route, responder)) => {
                trace!(
                    "{} {} routed via {:?}",
                    request.method,
                    request.url,
                    route
                );
                responder.respond(request)
            }
            None => connection_failure(request),
        }
    }

    fn responder_for(&self, request: &Request) -> Option<(Route, Arc<dyn Respond>)> {
        let method = request.method.as_str();
        let url = request.url.as_str();

        let routes = self.routes.lock().expect("Poisoned lock!");
        if let Some(responder) = routes.responders.get(&RouteKey::new(method, url)) {
            return Some((Route::Exact, responder.clone()));
        }
        // Only the first `?` counts: everything after it is dropped, no query string parsing.
        if let Some((without_query, _)) = url.split_once('?') {
            if let Some(responder) = routes
                .responders
                .get(&RouteKey::new(method, without_query))
            {
                return Some((Route::WithoutQuery, responder.clone()));
            }
        }
        routes
            .no_responder
            .clone()
            .map(|responder| (Route::NoResponder, responder))
    }
}

impl Transport for MockTransport {
    fn round_trip(&self, request: &Request) -> Result<Response, Error> {
        self.dispatch(request)
    }

    // Nothing is ever in flight.
    fn cancel_request(&self, _request: &Request) {}
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes = self.routes.lock().expect("Poisoned lock!");
        let mut keys: Vec<_> = routes.responders.keys().map(|k| k.to_string()).collect();
        keys.sort();
        f.debug_struct("MockTransport")
            .field("routes", &keys)
            .field("has_no_responder", &routes.no_responder.is_some())
            .finish()
    }
}
