use crate::settings::Settings;
use crate::transport::default_transport;
use crate::{Error, Request, Response, Transport};
use http::Method;
use log::{debug, log_enabled, trace, Level};
use std::fmt;
use std::sync::{Arc, RwLock};

/// A minimal blocking HTTP client.
///
/// Each `Client` either has a transport of its own or, by default, uses the process-wide default
/// transport (see [`default_transport`](crate::default_transport)) at the time each request is sent.
///
/// `Client` is a handle: clones share the same transport field, so swapping the transport of one
/// clone - e.g. with [`activate_non_default`](crate::activate_non_default) - affects them all.
#[derive(Clone, Default)]
pub struct Client {
    transport: Arc<RwLock<Option<Arc<dyn Transport>>>>,
}

impl Client {
    /// A client relying on the default transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client sending every request through `transport`.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Arc::new(RwLock::new(Some(transport))),
        }
    }

    /// The client's own transport, `None` if it relies on the default one.
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport.read().expect("Poisoned lock!").clone()
    }

    /// Replace the client's own transport, returning the previous one.
    pub fn set_transport(
        &self,
        transport: Option<Arc<dyn Transport>>,
    ) -> Option<Arc<dyn Transport>> {
        let mut slot = self.transport.write().expect("Poisoned lock!");
        std::mem::replace(&mut *slot, transport)
    }

    /// Send `request` and wait for the response.
    ///
    /// Transport failures are wrapped in [`Error::Request`], recording the method and URL.
    pub fn execute(&self, request: Request) -> Result<Response, Error> {
        let transport = self.transport().unwrap_or_else(default_transport);

        debug!("{} {}", request.method, request.url);
        if log_enabled!(Level::Trace) {
            let mut dump = String::new();
            if request
                .print_with_limit(&mut dump, Settings::global().body_print_limit())
                .is_ok()
            {
                trace!("Sending request:\n{}", dump);
            }
        }

        transport
            .round_trip(&request)
            .map_err(|source| Error::Request {
                method: request.method.clone(),
                url: request.url.clone(),
                source: Box::new(source),
            })
    }

    pub fn get(&self, url: &str) -> Result<Response, Error> {
        self.execute(Request::parse(Method::GET, url)?)
    }

    pub fn post<B>(&self, url: &str, body: B) -> Result<Response, Error>
    where
        B: Into<Vec<u8>>,
    {
        self.execute(Request::parse(Method::POST, url)?.body(body))
    }

    /// `true` if both handles are clones of the same client.
    pub fn same_client(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("uses_default_transport", &self.transport().is_none())
            .finish()
    }
}
