//! Status classification through the full client stack.

use std::io::Write;

use assert2::{check, let_assert};
use flate2::Compression;
use flate2::write::GzEncoder;
use orgs::{Error, ErrorKind, Method, OrgsClient, Request, StaticCredentials};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

const CASES: &[(u16, ErrorKind)] = &[
    (401, ErrorKind::Unauthorized),
    (402, ErrorKind::VerificationRequired),
    (403, ErrorKind::Forbidden),
    (404, ErrorKind::NotFound),
    (408, ErrorKind::Timeout),
    (409, ErrorKind::ErrorWithResponse),
    (422, ErrorKind::RequestFailed),
    (423, ErrorKind::Locked),
    (429, ErrorKind::RateLimitExceeded),
    (500, ErrorKind::RequestFailed),
    (503, ErrorKind::RequestFailed),
    (302, ErrorKind::ErrorWithResponse),
];

fn client(server: &MockServer) -> OrgsClient {
    OrgsClient::builder()
        .base_url(server.uri())
        .credentials(StaticCredentials::new("key"))
        .build()
}

#[tokio::test]
async fn test_every_status_is_classified() {
    let server = MockServer::start().await;
    for (status, _) in CASES {
        Mock::given(method("GET"))
            .and(path(format!("/status/{status}")))
            .respond_with(ResponseTemplate::new(*status))
            .mount(&server)
            .await;
    }

    let client = client(&server);
    for (status, kind) in CASES {
        let request = Request::builder(Method::Get, format!("/status/{status}")).build();
        let_assert!(Err(Error::Api(error)) = client.request(request).await);
        check!(error.kind() == *kind, "status {status}");
        check!(error.status() == *status);
    }
}

#[tokio::test]
async fn test_gzip_error_body_is_readable() {
    let server = MockServer::start().await;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(br#"{"id":"rate_limit","message":"slow down"}"#)
        .expect("write");
    let compressed = encoder.finish().expect("finish");

    Mock::given(method("GET"))
        .and(path("/v1/user/info"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(compressed),
        )
        .mount(&server)
        .await;

    // No decompression layer, so the dispatcher decodes the body itself.
    let client = OrgsClient::builder()
        .base_url(server.uri())
        .credentials(StaticCredentials::new("key"))
        .build_with_client(orgs::HyperClient::new());

    let request = Request::builder(Method::Get, "/v1/user/info").build();
    let_assert!(Err(error) = client.request(request).await);
    check!(error.kind() == Some(ErrorKind::RateLimitExceeded));
    check!(error.body().expect("body").as_ref() == br#"{"id":"rate_limit","message":"slow down"}"#);
}

#[tokio::test]
async fn test_connection_headers_and_request_headers_merge() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/user/info"))
        .and(header("X-Heroku-Client", "orgs"))
        .and(header("X-Request-Id", "42"))
        .and(header("Authorization", "Basic OmtleQ=="))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.set_headers([("X-Heroku-Client".to_owned(), "orgs".to_owned())]);

    let request = Request::builder(Method::Get, "/v1/user/info")
        .header("X-Request-Id", "42")
        .build();
    let response = client.request(request).await.expect("response");
    check!(response.status() == 200);
}

#[tokio::test]
async fn test_missing_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = OrgsClient::builder()
        .base_url(server.uri())
        .credentials(orgs::EnvCredentials::new("ORGS_TEST_UNSET_KEY"))
        .build();

    let_assert!(Err(Error::Credentials(message)) = client.get_orgs().await);
    check!(message.contains("ORGS_TEST_UNSET_KEY"));
}
