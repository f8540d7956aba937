//! What the service sent back.

use std::collections::HashMap;

use bytes::Bytes;

use crate::{GZIP, Result, decode_content, header};

/// A buffered response.
///
/// Header names are kept as received; lookups through [`Response::header`]
/// ignore ASCII case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Assemble a response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// All headers.
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

    /// Raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Split into status, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// `2xx`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// `Content-Encoding: gzip`.
    #[must_use]
    pub fn is_gzip(&self) -> bool {
        self.header(header::CONTENT_ENCODING.as_str())
            .is_some_and(|encoding| encoding.trim().eq_ignore_ascii_case(GZIP))
    }

    /// Swap a gzip body for its decompressed bytes.
    ///
    /// Other responses come back unchanged. `Content-Encoding` is removed
    /// after decoding, so a second call does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decompression`] if the body is not valid gzip.
    pub fn gunzip(self) -> Result<Self> {
        if !self.is_gzip() {
            return Ok(self);
        }

        let (status, mut headers, body) = self.into_parts();
        let body = decode_content(GZIP, body)?;
        headers.retain(|name, _| !name.eq_ignore_ascii_case(header::CONTENT_ENCODING.as_str()));

        Ok(Self::new(status, headers, body))
    }

    /// Decode the body as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonDeserialization`] naming the failing path.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(&self.body)
    }

    /// Decode the body as a JSON value; a blank body is `null`.
    ///
    /// Join, lock and member calls may answer with no content at all.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank body is not JSON.
    pub fn json_or_null(&self) -> Result<serde_json::Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            Ok(serde_json::Value::Null)
        } else {
            self.json()
        }
    }

    /// Body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error for binary bodies.
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}
