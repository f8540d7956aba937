//! HTTP transport trait.
//!
//! [`HttpClient`] is the seam between the dispatcher and the network. The
//! `orgs` crate ships a hyper-based implementation; tests plug in fakes.

use std::future::Future;

use bytes::Bytes;

use crate::{Response, Result};

/// Sends one request and buffers the answer.
///
/// Receives a fully resolved request (absolute URI, merged headers) and
/// returns whatever the server answered, whatever the status. Status checks
/// happen above this layer.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use bytes::Bytes;
/// use orgs_core::{HttpClient, Response, Result};
///
/// #[derive(Clone)]
/// struct AlwaysLocked;
///
/// impl HttpClient for AlwaysLocked {
///     async fn execute(&self, _request: http::Request<Bytes>) -> Result<Response> {
///         Ok(Response::new(423, HashMap::new(), Bytes::new()))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Send `request` once.
    ///
    /// # Errors
    ///
    /// Only transport failures: [`crate::Error::Connection`],
    /// [`crate::Error::Tls`] or [`crate::Error::Timeout`]. A non-2xx answer is
    /// still `Ok`.
    fn execute(
        &self,
        request: http::Request<Bytes>,
    ) -> impl Future<Output = Result<Response>> + Send;
}
