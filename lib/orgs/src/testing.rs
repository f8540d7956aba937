//! In-memory transport for unit tests.

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use http::{HeaderMap, Method, Uri};

use crate::{HttpClient, Response, Result};

/// What the fake transport received.
#[derive(Debug, Clone)]
pub(crate) struct Sent {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

/// Answers every request with the same response and records what it was sent.
#[derive(Clone)]
pub(crate) struct FakeClient {
    response: Response,
    requests: Arc<Mutex<Vec<Sent>>>,
}

impl FakeClient {
    pub(crate) fn new(response: Response) -> Self {
        Self {
            response,
            requests: Arc::default(),
        }
    }

    pub(crate) fn status(status: u16) -> Self {
        Self::new(Response::new(status, HashMap::new(), Bytes::new()))
    }

    pub(crate) fn json(status: u16, body: &str) -> Self {
        let headers = HashMap::from([("content-type".to_owned(), "application/json".to_owned())]);
        Self::new(Response::new(status, headers, body.to_owned()))
    }

    pub(crate) fn gzip(status: u16, body: &str) -> Self {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body.as_bytes()).expect("gzip write");
        let headers = HashMap::from([
            ("content-type".to_owned(), "application/json".to_owned()),
            ("content-encoding".to_owned(), "gzip".to_owned()),
        ]);
        Self::new(Response::new(status, headers, encoder.finish().expect("gzip finish")))
    }

    pub(crate) fn requests(&self) -> Vec<Sent> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for FakeClient {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<Response> {
        let (parts, body) = request.into_parts();
        self.requests.lock().expect("requests lock").push(Sent {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        Ok(self.response.clone())
    }
}
