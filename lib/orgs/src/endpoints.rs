//! Organization, app and member operations.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{ErrorKind, HttpClient, Method, OrgsClient, Request, Result};

/// Bytes escaped in a member identifier: everything but unreserved characters.
const MEMBER: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Escape a member identifier for use as a path segment.
///
/// ```
/// assert_eq!(orgs::escape_member("jo+dev@example.com"), "jo%2Bdev%40example.com");
/// ```
#[must_use]
pub fn escape_member(member: &str) -> String {
    utf8_percent_encode(member, MEMBER).to_string()
}

/// An organization member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Member email.
    pub email: String,
    /// Role in the organization (`admin`, `member`...).
    #[serde(default)]
    pub role: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Success bodies are gunzipped here as well as by the decompression layer,
/// so a bare transport still decodes them.
impl<C: HttpClient + Clone> OrgsClient<C> {
    /// Organizations the current user belongs to.
    ///
    /// A user outside any organization gets `{"user": {}}`.
    ///
    /// # Errors
    ///
    /// Any failure other than [`ErrorKind::NotFound`].
    pub async fn get_orgs(&self) -> Result<Value> {
        let request = Request::builder(Method::Get, "/v1/user/info").build();
        match self.request(request).await {
            Ok(response) => response.gunzip()?.json_or_null(),
            Err(err) if err.kind() == Some(ErrorKind::NotFound) => Ok(json!({ "user": {} })),
            Err(err) => Err(err),
        }
    }

    /// Join `app` to its organization.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`].
    pub async fn join_app(&self, app: &str) -> Result<Value> {
        let request = Request::builder(Method::Post, format!("/v1/app/{app}/join")).build();
        self.request(request).await?.gunzip()?.json_or_null()
    }

    /// Leave the organization `app` belongs to.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`].
    pub async fn leave_app(&self, app: &str) -> Result<()> {
        let request = Request::builder(Method::Delete, format!("/v1/app/{app}/join"))
            .expects(204)
            .build();
        self.request(request).await?;
        Ok(())
    }

    /// Lock `app` so that only admins can join it.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`]. A locked app reports [`ErrorKind::Locked`].
    pub async fn lock_app(&self, app: &str) -> Result<Value> {
        let request = Request::builder(Method::Post, format!("/v1/app/{app}/lock")).build();
        self.request(request).await?.gunzip()?.json_or_null()
    }

    /// Unlock `app`.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`].
    pub async fn unlock_app(&self, app: &str) -> Result<()> {
        let request = Request::builder(Method::Delete, format!("/v1/app/{app}/lock"))
            .expects(204)
            .build();
        self.request(request).await?;
        Ok(())
    }

    /// Members of `org`.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`], or a decoding error for an unexpected body.
    pub async fn get_members(&self, org: &str) -> Result<Vec<Member>> {
        let request = Request::builder(Method::Get, format!("/v1/organization/{org}/user")).build();
        self.request(request).await?.gunzip()?.json()
    }

    /// Add `member` to `org` with `role`.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`].
    pub async fn add_member(&self, org: &str, member: &str, role: &str) -> Result<Value> {
        let request = Request::builder(Method::Post, format!("/v1/organization/{org}/user"))
            .expects(201)
            .json(&json!({ "email": member, "role": role }))?
            .build();
        self.request(request).await?.gunzip()?.json_or_null()
    }

    /// Change the role of `member` in `org`.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`].
    pub async fn set_member(&self, org: &str, member: &str, role: &str) -> Result<Value> {
        let path = format!("/v1/organization/{org}/user/{}", escape_member(member));
        let request = Request::builder(Method::Put, path)
            .json(&json!({ "role": role }))?
            .build();
        self.request(request).await?.gunzip()?.json_or_null()
    }

    /// Remove `member` from `org`.
    ///
    /// # Errors
    ///
    /// See [`OrgsClient::request`].
    pub async fn remove_member(&self, org: &str, member: &str) -> Result<()> {
        let path = format!("/v1/organization/{org}/user/{}", escape_member(member));
        let request = Request::builder(Method::Delete, path).expects(204).build();
        self.request(request).await?;
        Ok(())
    }
}
