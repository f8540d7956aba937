//! Prelude module for convenient imports.
//!
//! ```ignore
//! use orgs_core::prelude::*;
//! ```

pub use crate::{
    ApiError, BadStatus, Error, ErrorKind, HttpClient, Method, Request,
    RequestBuilder, Response, Result, from_json, to_json,
};
