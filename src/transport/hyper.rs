use crate::transport::{Response, Transport};
use crate::{Error, Request};
use futures::executor::block_on;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use log::debug;
use once_cell::sync::OnceCell;
use tokio::sync::{mpsc, oneshot};

type HyperClient = Client<HttpConnector, Full<Bytes>>;
type Job = (Request, oneshot::Sender<Result<Response, Error>>);

/// A [`Transport`] performing real HTTP/1.1 requests over plain TCP with `hyper`.
///
/// This is the process-wide default transport until something else is installed.
///
/// `round_trip` is blocking: requests are handed over to a background thread running its own
/// single-threaded `tokio` runtime, started the first time the transport is used.
/// Dropping the `HyperTransport` shuts that thread down once in-flight requests are done.
#[derive(Debug, Default)]
pub struct HyperTransport {
    jobs: OnceCell<mpsc::UnboundedSender<Job>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HyperTransport {
    fn round_trip(&self, request: &Request) -> Result<Response, Error> {
        let jobs = self.jobs.get_or_try_init(spawn_worker)?;
        let (reply, response) = oneshot::channel();
        jobs.send((request.clone(), reply))
            .map_err(|_| Error::TransportClosed)?;
        block_on(response).map_err(|_| Error::TransportClosed)?
    }
}

fn spawn_worker() -> Result<mpsc::UnboundedSender<Job>, Error> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Network(Box::new(e)))?;
    let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

    std::thread::Builder::new()
        .name("tripmock-network".into())
        .spawn(move || {
            runtime.block_on(async move {
                let client: HyperClient = Client::builder(TokioExecutor::new()).build_http();
                while let Some((request, reply)) = receiver.recv().await {
                    let client = client.clone();
                    tokio::spawn(async move {
                        // The caller might have stopped waiting.
                        let _ = reply.send(send(&client, request).await);
                    });
                }
                debug!("Network transport dropped, shutting down its runtime.");
            })
        })
        .map_err(|e| Error::Network(Box::new(e)))?;

    Ok(sender)
}

async fn send(client: &HyperClient, request: Request) -> Result<Response, Error> {
    let Request {
        mut url,
        method,
        headers,
        body,
    } = request;
    // Fragments never go on the wire.
    url.set_fragment(None);

    let mut builder = hyper::Request::builder().method(method).uri(url.as_str());
    if let Some(request_headers) = builder.headers_mut() {
        request_headers.extend(headers);
    }
    let hyper_request = builder.body(Full::new(Bytes::from(body)))?;

    debug!("Sending {} {} over the network.", hyper_request.method(), url);
    let response = client
        .request(hyper_request)
        .await
        .map_err(|e| Error::Network(Box::new(e)))?;

    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| Error::Network(Box::new(e)))?
        .to_bytes();
    Ok(Response::from_parts(parts, body))
}
