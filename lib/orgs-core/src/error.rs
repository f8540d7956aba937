//! Error types for the organization API client.
//!
//! The transport reports a status it did not expect as a generic
//! [`BadStatus`]. The dispatcher turns that into an [`ApiError`] tagged with an
//! [`ErrorKind`], keeping the [`BadStatus`] as its [`source`](std::error::Error::source).

use std::fmt;

use derive_more::{Display, Error, From};

use crate::{Method, Response};

/// Domain classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// 401: the API key was rejected.
    #[display("unauthorized")]
    Unauthorized,
    /// 402: the account must be verified first.
    #[display("verification required")]
    VerificationRequired,
    /// 403: the caller lacks permission.
    #[display("forbidden")]
    Forbidden,
    /// 404 on a path whose app segment is empty.
    #[display("no app specified")]
    NilApp,
    /// 404 for a missing resource.
    #[display("not found")]
    NotFound,
    /// 408: the service timed out.
    #[display("timeout")]
    Timeout,
    /// 422 or any 5xx.
    #[display("request failed")]
    RequestFailed,
    /// 423: the app is locked.
    #[display("locked")]
    Locked,
    /// 429: too many requests.
    #[display("rate limit exceeded")]
    RateLimitExceeded,
    /// Any other unexpected status.
    #[display("unexpected response")]
    ErrorWithResponse,
}

impl ErrorKind {
    /// Classify an unexpected status for the request `path`.
    ///
    /// # Example
    ///
    /// ```
    /// use orgs_core::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::classify(423, "/v1/app/demo/lock"), ErrorKind::Locked);
    /// assert_eq!(ErrorKind::classify(404, "/v1/app//lock"), ErrorKind::NilApp);
    /// assert_eq!(ErrorKind::classify(503, "/v1/user/info"), ErrorKind::RequestFailed);
    /// ```
    #[must_use]
    pub fn classify(status: u16, path: &str) -> Self {
        match status {
            401 => Self::Unauthorized,
            402 => Self::VerificationRequired,
            403 => Self::Forbidden,
            404 if is_nil_app_path(path) => Self::NilApp,
            404 => Self::NotFound,
            408 => Self::Timeout,
            422 | 500..=599 => Self::RequestFailed,
            423 => Self::Locked,
            429 => Self::RateLimitExceeded,
            _ => Self::ErrorWithResponse,
        }
    }
}

/// An app path built with an empty app name has a doubled separator where the
/// name belongs (`/v1/app//join`). Only the app prefixes count: an org named
/// `app/` must not look like a missing app.
fn is_nil_app_path(path: &str) -> bool {
    ["/v1/app//", "/apps//"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// The transport's generic signal: the response status differs from the
/// expected one.
#[derive(Debug, Clone, Error)]
pub struct BadStatus {
    method: Method,
    path: String,
    expected: u16,
    response: Response,
}

impl BadStatus {
    /// Record a status mismatch for `method path`.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, expected: u16, response: Response) -> Self {
        Self {
            method,
            path: path.into(),
            expected,
            response,
        }
    }

    /// Method of the failed request.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path of the failed request.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Status the request expected.
    #[must_use]
    pub const fn expected(&self) -> u16 {
        self.expected
    }

    /// Status actually received.
    #[must_use]
    pub const fn actual(&self) -> u16 {
        self.response.status()
    }

    /// Raw response, as received from the transport.
    #[must_use]
    pub const fn response(&self) -> &Response {
        &self.response
    }
}

impl fmt::Display for BadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expected({}) <=> Actual({}", self.expected, self.actual())?;
        if let Some(reason) = http::StatusCode::from_u16(self.actual())
            .ok()
            .and_then(|status| status.canonical_reason())
        {
            write!(f, " {reason}")?;
        }
        write!(f, ")")
    }
}

/// A classified failure: what went wrong, the response the service sent, and
/// the original [`BadStatus`] as source.
#[derive(Debug, Clone, Display, Error)]
#[display("{kind}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    response: Response,
    source: BadStatus,
}

impl ApiError {
    /// Classify a status mismatch.
    ///
    /// A gzip-encoded body is decompressed before it is attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompression`] if the body claims gzip but is not.
    pub fn classify(source: BadStatus) -> Result<Self> {
        let kind = ErrorKind::classify(source.actual(), source.path());
        let response = source.response().clone().gunzip()?;

        Ok(Self {
            kind,
            message: source.to_string(),
            response,
            source,
        })
    }

    /// Error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Response attached to the error, with its body decompressed.
    #[must_use]
    pub const fn response(&self) -> &Response {
        &self.response
    }

    /// Received status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.response.status()
    }

    /// The transport failure this error was classified from.
    #[must_use]
    pub const fn bad_status(&self) -> &BadStatus {
        &self.source
    }
}

/// Everything a call against the organization API can fail with.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The service answered with an unexpected status, classified.
    #[display("{_0}")]
    #[from]
    Api(ApiError),

    /// Unclassified status mismatch, as reported by the transport.
    #[display("unexpected status: {_0}")]
    #[from]
    UnexpectedStatus(BadStatus),

    /// The server could not be reached, or the exchange broke off.
    #[display("transport failure: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// The TLS handshake or certificate check failed.
    #[display("TLS handshake failed: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The transport gave up waiting for a response.
    #[display("no response before the deadline")]
    #[from(skip)]
    Timeout,

    /// The request could not be turned into a valid HTTP message.
    #[display("cannot build request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// The API key could not be obtained.
    #[display("credentials error: {_0}")]
    #[from(skip)]
    Credentials(#[error(not(source))] String),

    /// A response body could not be decompressed.
    #[display("decompression error: {_0}")]
    #[from(skip)]
    Decompression(#[error(not(source))] String),

    /// A request body could not be encoded.
    #[display("cannot encode body: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// A response body did not match the expected shape.
    #[display("cannot decode body at `{path}`: {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// Where decoding stopped, such as `[0].email`.
        path: String,
        /// What serde reported.
        message: String,
    },

    /// The base URL does not parse.
    #[display("bad base URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// [`Error::Connection`] with `message`.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// [`Error::Tls`] with `message`.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// [`Error::InvalidRequest`] with `message`.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// [`Error::Credentials`] with `message`.
    #[must_use]
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }

    /// [`Error::Decompression`] with `message`.
    #[must_use]
    pub fn decompression(message: impl Into<String>) -> Self {
        Self::Decompression(message.into())
    }

    /// [`Error::JsonDeserialization`] at `path`.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The transport deadline passed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// The server was unreachable or hung up.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Classification, for [`Error::Api`] only.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Api(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Status actually received, for status failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status()),
            Self::UnexpectedStatus(bad) => Some(bad.actual()),
            _ => None,
        }
    }

    /// Shorthand for a [`ErrorKind::NotFound`] classification.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(ErrorKind::NotFound)
    }

    /// Body the service sent along with a classified failure.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Api(err) => Some(err.response().body()),
            _ => None,
        }
    }

    /// Decode the error body, if there is one.
    ///
    /// `None` for anything but [`Error::Api`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ServiceError {
    ///     id: String,
    ///     message: String,
    /// }
    ///
    /// if let Err(e) = client.lock_app("demo").await {
    ///     if let Some(Ok(details)) = e.decode_body::<ServiceError>() {
    ///         eprintln!("{}: {}", details.id, details.message);
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
