//! Request dispatch and failure classification.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::{
    ApiError, ClientConfig, Error, HttpClient, HyperClient, ManagerConfig, Request, Response,
    Result,
    connection::ConnectionManager,
    credentials::{CredentialProvider, EnvCredentials},
};

/// Client for the organization API.
///
/// Every call goes through one shared connection, built on first use. A
/// status other than the expected one comes back as [`Error::Api`] with an
/// [`crate::ErrorKind`]; other failures pass through unchanged.
///
/// # Example
///
/// ```ignore
/// use orgs::prelude::*;
///
/// let client = OrgsClient::builder()
///     .base_url("https://manager-api.heroku.com")
///     .credentials(StaticCredentials::new(api_key))
///     .build();
///
/// let info = client.get_orgs().await?;
/// ```
#[derive(Debug)]
pub struct OrgsClient<C = HyperClient> {
    manager: ConnectionManager<C>,
}

impl OrgsClient {
    /// Client with the default transport and configuration.
    #[must_use]
    pub fn new(credentials: impl CredentialProvider + 'static) -> Self {
        Self::builder().credentials(credentials).build()
    }

    /// Client reading the key and base URL from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EnvCredentials::default())
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> OrgsClientBuilder {
        OrgsClientBuilder::default()
    }
}

impl<C> OrgsClient<C> {
    /// Client over a custom transport.
    pub fn with_client(
        client: C,
        credentials: impl CredentialProvider + 'static,
        config: ManagerConfig,
    ) -> Self {
        Self {
            manager: ConnectionManager::new(client, credentials, config),
        }
    }

    /// The underlying connection manager.
    #[must_use]
    pub const fn manager(&self) -> &ConnectionManager<C> {
        &self.manager
    }

    /// See [`ConnectionManager::set_headers`].
    pub fn set_headers(&self, headers: impl IntoIterator<Item = (String, String)>) {
        self.manager.set_headers(headers);
    }
}

impl<C: HttpClient + Clone> OrgsClient<C> {
    /// Send a request and classify status mismatches.
    ///
    /// # Errors
    ///
    /// - [`Error::Api`] when the status differs from [`Request::expects`].
    /// - [`Error::Decompression`] when that failure's body claims gzip but
    ///   does not decode.
    /// - Credential, URL and transport errors unchanged.
    pub async fn request(&self, request: Request) -> Result<Response> {
        let connection = self.manager.connection().await?;

        match connection.request(&request).await {
            Err(Error::UnexpectedStatus(bad)) => {
                let error = ApiError::classify(bad)?;
                warn!(
                    method = %request.method(),
                    path = request.path(),
                    status = error.status(),
                    kind = %error.kind(),
                    "request rejected"
                );
                Err(error.into())
            }
            other => other,
        }
    }
}

/// Builder for [`OrgsClient`].
#[derive(Default)]
pub struct OrgsClientBuilder {
    manager: ManagerConfig,
    client: ClientConfig,
    credentials: Option<Arc<dyn CredentialProvider>>,
    headers: HashMap<String, String>,
}

impl std::fmt::Debug for OrgsClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrgsClientBuilder")
            .field("manager", &self.manager)
            .field("client", &self.client)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl OrgsClientBuilder {
    /// Pin the service base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.manager = self.manager.base_url(url);
        self
    }

    /// Key source. Defaults to [`EnvCredentials`].
    #[must_use]
    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Transport configuration for the default [`HyperClient`].
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.client = config;
        self
    }

    /// Request timeout for the default [`HyperClient`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.client.timeout = timeout;
        self
    }

    /// Extra header sent on every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build over the default transport: logging and decompression enabled.
    #[must_use]
    pub fn build(self) -> OrgsClient {
        let client = HyperClient::builder()
            .config(self.client.clone())
            .with_logging()
            .with_decompression()
            .build();
        self.build_with_client(client)
    }

    /// Build over a custom transport. Transport configuration is ignored.
    pub fn build_with_client<C>(self, client: C) -> OrgsClient<C> {
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(EnvCredentials::default()));
        let manager = ConnectionManager::with_shared_credentials(client, credentials, self.manager);
        if !self.headers.is_empty() {
            manager.set_headers(self.headers);
        }
        OrgsClient { manager }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use assert2::{check, let_assert};
    use bytes::Bytes;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;
    use crate::testing::FakeClient;
    use crate::{ErrorKind, Method, StaticCredentials};

    fn client(fake: &FakeClient) -> OrgsClient<FakeClient> {
        OrgsClient::builder()
            .base_url("https://manager.example.com")
            .credentials(StaticCredentials::new("key"))
            .build_with_client(fake.clone())
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).expect("write");
        encoder.finish().expect("finish")
    }

    #[tokio::test]
    async fn expected_status_returns_response() {
        let fake = FakeClient::json(200, r#"{"ok":true}"#);
        let response = client(&fake)
            .request(Request::builder(Method::Get, "/v1/user/info").build())
            .await
            .expect("response");

        check!(response.status() == 200);
        check!(response.body().as_ref() == br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn mismatch_is_classified() {
        let fake = FakeClient::json(423, r#"{"error":"locked"}"#);
        let request = Request::builder(Method::Post, "/v1/app/my-app/lock").build();

        let_assert!(Err(Error::Api(error)) = client(&fake).request(request).await);
        check!(error.kind() == ErrorKind::Locked);
        check!(error.message() == "Expected(200) <=> Actual(423 Locked)");
        check!(error.response().body().as_ref() == br#"{"error":"locked"}"#);
        check!(error.bad_status().expected() == 200);
    }

    #[tokio::test]
    async fn empty_app_path_is_nil_app() {
        let fake = FakeClient::status(404);
        let request = Request::builder(Method::Post, "/v1/app//join").build();

        let_assert!(Err(error) = client(&fake).request(request).await);
        check!(error.kind() == Some(ErrorKind::NilApp));
    }

    #[tokio::test]
    async fn gzip_error_body_is_decompressed() {
        let headers = HashMap::from([("Content-Encoding".to_owned(), "gzip".to_owned())]);
        let body = Bytes::from(gzip(br#"{"id":"forbidden"}"#));
        let fake = FakeClient::new(Response::new(403, headers, body));

        let request = Request::builder(Method::Get, "/v1/organization/acme/user").build();
        let_assert!(Err(Error::Api(error)) = client(&fake).request(request).await);
        check!(error.kind() == ErrorKind::Forbidden);
        check!(error.response().body().as_ref() == br#"{"id":"forbidden"}"#);
        check!(error.response().header("content-encoding").is_none());
    }

    #[tokio::test]
    async fn invalid_gzip_error_body() {
        let headers = HashMap::from([("content-encoding".to_owned(), "gzip".to_owned())]);
        let fake = FakeClient::new(Response::new(500, headers, "not gzip"));

        let request = Request::builder(Method::Get, "/v1/user/info").build();
        let_assert!(Err(Error::Decompression(_)) = client(&fake).request(request).await);
    }

    #[tokio::test]
    async fn credential_failure_passes_through() {
        let fake = FakeClient::status(200);
        let client = OrgsClient::builder()
            .credentials(|| -> Result<secrecy::SecretString> { Err(Error::credentials("no key")) })
            .base_url("https://manager.example.com")
            .build_with_client(fake.clone());

        let request = Request::builder(Method::Get, "/v1/user/info").build();
        let_assert!(Err(Error::Credentials(message)) = client.request(request).await);
        check!(message == "no key");
        check!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn builder_headers_reach_the_wire() {
        let fake = FakeClient::status(200);
        let client = OrgsClient::builder()
            .base_url("https://manager.example.com")
            .credentials(StaticCredentials::new("key"))
            .header("User-Agent", "orgs-tests")
            .build_with_client(fake.clone());

        client
            .request(Request::builder(Method::Get, "/v1/user/info").build())
            .await
            .expect("response");

        let sent = fake.requests();
        let_assert!([sent] = sent.as_slice());
        check!(sent.headers.get("user-agent").expect("user agent") == "orgs-tests");
    }
}
