//! hyper-util transport.
//!
//! [`HyperClient`] sends fully resolved requests over a pooled rustls
//! connection and returns whatever status the server answered. Middleware
//! layers are stacked around the raw transport at build time.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::middleware::{DecompressionLayer, LoggingLayer};
use crate::{
    Error, Response, Result,
    config::{ClientConfig, ClientConfigBuilder},
    connector::https_connector,
};

/// Type-erased transport stack, as seen by middleware layers.
pub type BoxedService = BoxCloneService<http::Request<Bytes>, Response, Error>;

/// Future returned by the transport stack.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

type Wrap = Box<dyn FnOnce(BoxedService) -> BoxedService + Send>;

/// `BoxCloneService` is `Send` but not `Sync`. Each call clones the stack
/// out of the mutex, so the lock is never held across an await.
#[derive(Clone)]
struct SharedStack(Arc<Mutex<BoxedService>>);

impl SharedStack {
    fn call(&self, request: http::Request<Bytes>) -> ServiceFuture {
        let mut service = self.0.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Box::pin(async move { service.call(request).await })
    }
}

// ---------------------------------------------------------------------------
// Raw transport
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Transport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl Transport {
    fn new(config: &ClientConfig) -> Self {
        // A request is sent at most once, even on a connection the pool
        // found closed.
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .retry_canceled_requests(false)
            .build(https_connector(config.connect_timeout));

        Self {
            client,
            timeout: config.timeout,
        }
    }

    async fn send(self, request: http::Request<Bytes>) -> Result<Response> {
        let pending = self.client.request(request.map(Full::new));
        let response = tokio::time::timeout(self.timeout, pending)
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(transport_error)?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Error::connection(format!("reading body: {e}")))?
            .to_bytes();

        Ok(Response::new(
            parts.status.as_u16(),
            flatten_headers(&parts.headers),
            body,
        ))
    }
}

impl Service<http::Request<Bytes>> for Transport {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        Box::pin(self.clone().send(request))
    }
}

/// Repeated headers are joined with `", "`; non-UTF-8 values are skipped.
fn flatten_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
    let mut flat: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        flat.entry(name.as_str().to_owned())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }
    flat
}

/// TLS failures surface as a `rustls::Error`, usually wrapped in an
/// `io::Error`, somewhere in the source chain.
#[allow(clippy::needless_pass_by_value)]
fn transport_error(err: hyper_util::client::legacy::Error) -> Error {
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        let wrapped = cause
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::get_ref)
            .is_some_and(|inner| inner.is::<rustls::Error>());
        if wrapped || cause.is::<rustls::Error>() {
            return Error::tls(err.to_string());
        }
        source = cause.source();
    }
    Error::connection(err.to_string())
}

// ---------------------------------------------------------------------------
// Public client
// ---------------------------------------------------------------------------

/// Pooled HTTPS client with optional tower middleware.
///
/// Any status is a successful transport result; checking it against an
/// expectation is up to the caller.
///
/// # Example
///
/// ```ignore
/// use orgs::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .with_decompression()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    stack: SharedStack,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Client with default configuration and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Client with `config` and no middleware.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::from_stack(BoxCloneService::new(Transport::new(&config)), config)
    }

    fn from_stack(service: BoxedService, config: ClientConfig) -> Self {
        Self {
            stack: SharedStack(Arc::new(Mutex::new(service))),
            config,
        }
    }

    /// Start a [`HyperClientBuilder`].
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl orgs_core::HttpClient for HyperClient {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<Response> {
        self.stack.call(request).await
    }
}

impl Service<http::Request<Bytes>> for HyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        self.stack.call(request)
    }
}

/// Builder for [`HyperClient`].
///
/// Layers apply in the order they are added: the last one sees the request
/// first.
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    layers: Vec<Wrap>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Replace the whole transport configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = ClientConfigBuilder::from(config);
        self
    }

    /// Deadline for the response head to arrive.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// TCP connect deadline.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// How long an idle pooled connection is kept.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Wrap the stack built so far in `layer`.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + 'static,
        L::Service: Service<http::Request<Bytes>, Response = Response, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<http::Request<Bytes>>>::Future: Send,
    {
        self.layers
            .push(Box::new(move |inner| BoxCloneService::new(layer.layer(inner))));
        self
    }

    /// Log every request at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log every request at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Advertise and decode gzip and deflate bodies.
    #[must_use]
    pub fn with_decompression(self) -> Self {
        self.layer(DecompressionLayer::new())
    }

    /// Assemble the stack.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let raw: BoxedService = BoxCloneService::new(Transport::new(&config));
        let service = self.layers.into_iter().fold(raw, |inner, wrap| wrap(inner));
        HyperClient::from_stack(service, config)
    }
}
