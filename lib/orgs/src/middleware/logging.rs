//! Request logging.
//!
//! Every call runs inside an `http_request` span carrying the method and
//! URI. Header dumps at [`LogLevel::Debug`] are safe: the connection marks
//! `Authorization` sensitive, and `http` prints sensitive values as
//! `Sensitive`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{Error, Response, Result};

/// How much the logging layer says about outgoing requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Method, URI and headers at `debug`.
    Debug,
    /// Method and URI at `info`.
    #[default]
    Info,
}

/// Layer producing [`Logging`] services.
///
/// ```ignore
/// use orgs::middleware::LoggingLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(LoggingLayer::debug())
///     .service(client);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

impl LoggingLayer {
    /// Summary logging at `info`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detailed logging at `debug`.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Configured verbosity.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Logs each request and how it ended.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Wrap `inner` with summary logging.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            level: LogLevel::Info,
        }
    }
}

fn log_outcome(result: &Result<Response>, started: Instant) {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(response) if response.is_success() => {
            info!(status = response.status(), elapsed_ms, "response received");
        }
        // Non-2xx can still be the expected status; the dispatcher decides.
        Ok(response) => {
            info!(status = response.status(), elapsed_ms, "non-success response received");
        }
        Err(err) => warn!(error = %err, elapsed_ms, "request failed"),
    }
}

impl<S> Service<http::Request<Bytes>> for Logging<S>
where
    S: Service<http::Request<Bytes>, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        let span = info_span!("http_request", method = %request.method(), uri = %request.uri());

        if self.level == LogLevel::Debug {
            span.in_scope(|| debug!(headers = ?request.headers(), "sending request"));
        } else {
            span.in_scope(|| info!("sending request"));
        }

        let future = self.inner.call(request);
        Box::pin(
            async move {
                let started = Instant::now();
                let result = future.await;
                log_outcome(&result, started);
                result
            }
            .instrument(span),
        )
    }
}
