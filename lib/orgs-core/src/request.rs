//! Request descriptors.
//!
//! A [`Request`] says what to send and which status counts as success. It
//! holds a path, not a URL: the connection that sends it owns the base URL.
//!
//! ```
//! use orgs_core::{Method, Request};
//!
//! let unlock = Request::builder(Method::Delete, "/v1/app/my-app/lock")
//!     .expects(204)
//!     .build();
//!
//! assert_eq!(unlock.path(), "/v1/app/my-app/lock");
//! assert_eq!(unlock.expects(), 204);
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::{APPLICATION_JSON, Method};

/// One call against the API. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    path: String,
    expects: u16,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl Request {
    /// Start describing a `method` call to `path`.
    #[must_use]
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// Verb.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path below the base URL, already escaped.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The one status accepted as success.
    #[must_use]
    pub const fn expects(&self) -> u16 {
        self.expects
    }

    /// Headers layered over the connection's own.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// One header, looked up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value.as_str()))
    }

    /// Encoded body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

/// Builder for [`Request`]. Expects `200` unless told otherwise.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Same as [`Request::builder`].
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request: Request {
                method,
                path: path.into(),
                expects: 200,
                headers: HashMap::new(),
                body: None,
            },
        }
    }

    /// Accept `status` as success instead of `200`.
    #[must_use]
    pub const fn expects(mut self, status: u16) -> Self {
        self.request.expects = status;
        self
    }

    /// Add or replace one header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.insert(name.into(), value.into());
        self
    }

    /// Add or replace several headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.request.headers.extend(headers);
        self
    }

    /// Raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// JSON body, with `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonSerialization`] if `value` cannot be encoded.
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> crate::Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self.header("Content-Type", APPLICATION_JSON).body(body))
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Request {
        self.request
    }
}
