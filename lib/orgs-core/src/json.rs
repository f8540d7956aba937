//! JSON bodies.

use bytes::Bytes;

use crate::{Error, Result};

/// `Content-Type` of every body the API accepts.
pub const APPLICATION_JSON: &str = "application/json";

/// Encode `value` as a request body.
///
/// ```
/// use serde_json::json;
///
/// let body = orgs_core::to_json(&json!({ "role": "admin" })).expect("encode");
/// assert_eq!(body.as_ref(), br#"{"role":"admin"}"#);
/// ```
///
/// # Errors
///
/// Returns [`Error::JsonSerialization`] if `value` cannot be represented.
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Decode a response body.
///
/// Failures name the offending location, such as `[1].email` for a member
/// list whose second entry has no email.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] with the path and the cause.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(deserializer)
        .map_err(|err| Error::json_deserialization(err.path().to_string(), err.inner().to_string()))
}
