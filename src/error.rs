use http::Method;
use url::Url;

/// A boxed error, as produced by responders and by the network stack.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything that can go wrong when a request goes through a [`Transport`].
///
/// [`Transport`]: crate::Transport
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No responder was registered for the request and no catch-all responder was set.
    ///
    /// This is the expected outcome for a request that was not mocked: assert on it in tests
    /// that expect a failure.
    #[error("no responder found")]
    NoResponderFound,
    /// An error returned by a user-supplied responder, passed through untouched.
    #[error("{0}")]
    Responder(BoxError),
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),
    /// The real network transport failed to perform the request.
    #[error("network transport failed: {0}")]
    Network(#[source] BoxError),
    #[error("network transport is no longer running")]
    TransportClosed,
    /// A transport error, as surfaced by a [`Client`](crate::Client).
    #[error("{method} {url}: {source}")]
    Request {
        method: Method,
        url: Url,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an arbitrary error so that it can be returned from a responder.
    pub fn responder<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Responder(error.into())
    }

    /// `true` if this is the "no responder found" sentinel, looking through the
    /// client-level wrapper if needed.
    pub fn is_no_responder_found(&self) -> bool {
        match self {
            Error::NoResponderFound => true,
            Error::Request { source, .. } => source.is_no_responder_found(),
            _ => false,
        }
    }
}
