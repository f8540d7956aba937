//! Core types and traits for the organization-management API client.
//!
//! This crate provides the transport-independent pieces used by `orgs`:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - request descriptors (path + expected status)
//! - [`Response`] - HTTP response type
//! - [`Error`], [`ApiError`], [`BadStatus`] and [`ErrorKind`] - failure taxonomy
//! - [`HttpClient`] - transport trait
//! - [`decode_content`] - `Content-Encoding` decoding

mod client;
mod encoding;
mod error;
mod json;
mod method;
pub mod prelude;
mod request;
mod response;

pub use client::HttpClient;
pub use encoding::{GZIP, decode_content};
pub use error::{ApiError, BadStatus, Error, ErrorKind, Result};
pub use json::{APPLICATION_JSON, from_json, to_json};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
