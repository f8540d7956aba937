//! Response decompression middleware.
//!
//! Adds `Accept-Encoding: gzip, deflate` to requests and decodes response
//! bodies according to their `Content-Encoding` header, whatever the status.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::HeaderValue;
use http::header::{ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH};
use tower::{Layer, Service};

use crate::{Error, Response, Result};

const ACCEPTED_ENCODINGS: &str = "gzip, deflate";

/// Layer that enables automatic response decompression.
///
/// # Example
///
/// ```ignore
/// use orgs::middleware::DecompressionLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(DecompressionLayer::new())
///     .service(client);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DecompressionLayer {
    _private: (),
}

impl DecompressionLayer {
    /// Create a new decompression layer.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl<S> Layer<S> for DecompressionLayer {
    type Service = Decompression<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Decompression { inner }
    }
}

/// Service that automatically decompresses HTTP responses.
#[derive(Debug, Clone)]
pub struct Decompression<S> {
    inner: S,
}

impl<S> Decompression<S> {
    /// Create a new decompression service wrapping the given service.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn is_supported(encoding: &str) -> bool {
    matches!(
        encoding.trim().to_ascii_lowercase().as_str(),
        "gzip" | "x-gzip" | "deflate"
    )
}

/// Decode the body in place and drop `Content-Encoding`.
fn decompress(response: Response) -> Result<Response> {
    let Some(encoding) = response
        .header(CONTENT_ENCODING.as_str())
        .filter(|encoding| is_supported(encoding))
        .map(str::to_owned)
    else {
        return Ok(response);
    };

    let (status, mut headers, body) = response.into_parts();
    let decoded = orgs_core::decode_content(&encoding, body)?;

    headers.retain(|name, _| {
        !name.eq_ignore_ascii_case(CONTENT_ENCODING.as_str())
            && !name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str())
    });
    headers.insert(CONTENT_LENGTH.to_string(), decoded.len().to_string());

    Ok(Response::new(status, headers, decoded))
}

impl<S> Service<http::Request<Bytes>> for Decompression<S>
where
    S: Service<http::Request<Bytes>, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<Bytes>) -> Self::Future {
        request
            .headers_mut()
            .entry(ACCEPT_ENCODING)
            .or_insert(HeaderValue::from_static(ACCEPTED_ENCODINGS));

        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(request).await?;
            decompress(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    #[test]
    fn decompression_layer_default() {
        let _layer = DecompressionLayer::default();
    }

    #[test]
    fn plain_response_is_untouched() {
        let response = Response::new(200, HashMap::new(), "hello world");
        let result = decompress(response.clone()).expect("decompress");
        assert_eq!(result, response);
    }

    #[test]
    fn gzip_response_is_decoded() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"user":{}}"#).expect("write");
        let compressed = encoder.finish().expect("finish");

        let headers = HashMap::from([
            ("content-encoding".to_string(), "gzip".to_string()),
            ("content-length".to_string(), compressed.len().to_string()),
        ]);
        let result =
            decompress(Response::new(200, headers, compressed)).expect("decompress");

        assert_eq!(result.body().as_ref(), br#"{"user":{}}"#);
        assert_eq!(result.header("content-encoding"), None);
        assert_eq!(result.header("content-length"), Some("11"));
    }

    #[test]
    fn unsupported_encoding_is_left_alone() {
        let headers = HashMap::from([("content-encoding".to_string(), "br".to_string())]);
        let response = Response::new(200, headers, "opaque");
        assert_eq!(decompress(response.clone()).expect("decompress"), response);
    }

    #[test]
    fn corrupt_gzip_fails() {
        let headers = HashMap::from([("content-encoding".to_string(), "gzip".to_string())]);
        let result = decompress(Response::new(500, headers, "oops"));
        assert!(matches!(result, Err(Error::Decompression(_))));
    }
}
