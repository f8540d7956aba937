//! The shared connection to the organization service.
//!
//! [`ConnectionManager`] builds one [`Connection`] on first use and hands the
//! same instance to every later caller. Building it reads the API key and
//! resolves the base URL; both failures surface from the first request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use bytes::Bytes;
use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

use crate::{
    BadStatus, Error, HttpClient, Request, Response, Result, config::ManagerConfig,
    credentials::CredentialProvider,
};

/// A transport bound to the service base URL with default headers.
///
/// Requests go through [`OrgsClient::request`](crate::OrgsClient::request),
/// which classifies failures; the connection cannot send on its own:
///
/// ```compile_fail
/// async fn unclassified(client: &orgs::OrgsClient) {
///     let connection = client.manager().connection().await.unwrap();
///     let request = orgs::Request::builder(orgs::Method::Get, "/v1/user/info").build();
///     let _ = connection.request(&request).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Connection<C> {
    client: C,
    base_url: Url,
    headers: HeaderMap,
}

impl<C> Connection<C> {
    /// Bind `client` to `base_url`, sending `headers` with every request.
    #[must_use]
    pub fn new(client: C, base_url: Url, headers: HeaderMap) -> Self {
        Self {
            client,
            base_url,
            headers,
        }
    }

    /// Service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers sent with every request.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Absolute URL for a request path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

impl<C: HttpClient> Connection<C> {
    /// Send `request` and check the status against its expectation.
    ///
    /// Request headers override connection headers with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] when the status differs from
    /// [`Request::expects`], or the transport error as-is. Only the dispatcher
    /// sees the unclassified status.
    pub(crate) async fn request(&self, request: &Request) -> Result<Response> {
        let http_request = self.to_http(request)?;

        debug!(method = %request.method(), path = request.path(), "dispatching");
        let response = self.client.execute(http_request).await?;

        if response.status() == request.expects() {
            Ok(response)
        } else {
            Err(BadStatus::new(request.method(), request.path(), request.expects(), response).into())
        }
    }

    fn to_http(&self, request: &Request) -> Result<http::Request<Bytes>> {
        let mut http_request = http::Request::new(request.body().cloned().unwrap_or_default());
        *http_request.method_mut() = request.method().into();
        *http_request.uri_mut() = self
            .url_for(request.path())
            .parse::<http::Uri>()
            .map_err(|e| Error::invalid_request(e.to_string()))?;

        let headers = http_request.headers_mut();
        headers.clone_from(&self.headers);
        for (name, value) in request.headers() {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }

        Ok(http_request)
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::invalid_request(format!("header name {name:?}: {e}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| Error::invalid_request(format!("header {name}: {e}")))?;
    Ok((header_name, header_value))
}

/// `Basic` authorization for an API key: empty user, key as password.
pub(crate) fn basic_authorization(key: &SecretString) -> Result<HeaderValue> {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!(":{}", key.expose_secret()));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| Error::credentials(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Builds the shared [`Connection`] once and reuses it.
pub struct ConnectionManager<C> {
    client: C,
    config: ManagerConfig,
    credentials: Arc<dyn CredentialProvider>,
    extra_headers: Mutex<ExtraHeaders>,
    connection: OnceCell<Connection<C>>,
}

/// Headers registered before connecting. `sealed` flips under the same lock
/// that hands them to the connection, so a late `set_headers` always sees it.
#[derive(Debug, Default)]
struct ExtraHeaders {
    headers: HashMap<String, String>,
    sealed: bool,
}

impl<C> std::fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl<C> ConnectionManager<C> {
    /// Manager that will bind `client` using `credentials` and `config`.
    pub fn new(
        client: C,
        credentials: impl CredentialProvider + 'static,
        config: ManagerConfig,
    ) -> Self {
        Self::with_shared_credentials(client, Arc::new(credentials), config)
    }

    pub(crate) fn with_shared_credentials(
        client: C,
        credentials: Arc<dyn CredentialProvider>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            client,
            config,
            credentials,
            extra_headers: Mutex::new(ExtraHeaders::default()),
            connection: OnceCell::new(),
        }
    }

    /// Whether the connection has been built.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Replace the extra headers sent on the connection.
    ///
    /// Only takes effect before the connection is built; later calls are
    /// ignored with a warning. `Authorization` always comes from the
    /// credentials.
    pub fn set_headers(&self, headers: impl IntoIterator<Item = (String, String)>) {
        let mut extra = self
            .extra_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if extra.sealed {
            warn!("connection already established, ignoring extra headers");
            return;
        }
        extra.headers = headers.into_iter().collect();
    }
}

impl<C: HttpClient + Clone> ConnectionManager<C> {
    /// The shared connection, built on first call.
    ///
    /// Concurrent first callers wait for a single build. A failed build is
    /// not cached; the next call tries again.
    ///
    /// # Errors
    ///
    /// Returns the credential provider's error, or [`Error::InvalidUrl`] if
    /// the base URL does not parse.
    pub async fn connection(&self) -> Result<&Connection<C>> {
        self.connection.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Connection<C>> {
        let key = self.credentials.api_key()?;
        let base_url = self.config.resolve_base_url()?;

        let authorization = basic_authorization(&key)?;

        let mut headers = HeaderMap::new();
        {
            let mut extra = self
                .extra_headers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (name, value) in &extra.headers {
                let (name, value) = header_pair(name, value)?;
                headers.insert(name, value);
            }
            // Nothing below can fail, so these headers are final.
            extra.sealed = true;
        }
        headers.insert(AUTHORIZATION, authorization);

        debug!(base_url = %base_url, "connection established");
        Ok(Connection::new(self.client.clone(), base_url, headers))
    }
}
