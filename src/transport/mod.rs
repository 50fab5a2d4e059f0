//! The seam between HTTP clients and whatever fulfils their requests.
//!
//! A [`Client`](crate::Client) hands every request to a [`Transport`]: its own, if one was set,
//! or the process-wide default transport otherwise.
//! The default transport starts out as a [`HyperTransport`], performing real network I/O, and it
//! can be swapped at any time with [`set_default_transport`] - that is what
//! [`activate`](crate::activate) does under the hood.
mod hyper;

pub use self::hyper::HyperTransport;

use crate::{Error, Request};
use ::hyper::body::Bytes;
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

/// The response returned by a [`Transport`].
pub type Response = http::Response<Bytes>;

/// Anything that can fulfil a single HTTP request.
pub trait Transport: Send + Sync {
    /// Turn `request` into a response, or fail.
    fn round_trip(&self, request: &Request) -> Result<Response, Error>;

    /// Abort an in-flight request, if the transport supports it.
    ///
    /// Does nothing by default.
    fn cancel_request(&self, _request: &Request) {}
}

static DEFAULT_TRANSPORT: Lazy<RwLock<Arc<dyn Transport>>> =
    Lazy::new(|| RwLock::new(Arc::new(HyperTransport::new())));

/// The transport used by clients that do not have one of their own.
pub fn default_transport() -> Arc<dyn Transport> {
    DEFAULT_TRANSPORT.read().expect("Poisoned lock!").clone()
}

/// Install `transport` as the process-wide default, returning the one it replaces.
pub fn set_default_transport(transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
    let mut slot = DEFAULT_TRANSPORT.write().expect("Poisoned lock!");
    std::mem::replace(&mut *slot, transport)
}

/// `true` if both handles point to the same transport instance.
pub fn same_transport<A, B>(a: &Arc<A>, b: &Arc<B>) -> bool
where
    A: ?Sized,
    B: ?Sized,
{
    // Compare data pointers only: vtables for the same type may differ across codegen units.
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}
