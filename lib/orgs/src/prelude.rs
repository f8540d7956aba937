//! Prelude module for convenient imports.
//!
//! ```ignore
//! use orgs::prelude::*;
//! ```

pub use crate::{
    ApiError, ClientConfig, CredentialProvider, EnvCredentials, Error, ErrorKind, HttpClient,
    HyperClient, ManagerConfig, Member, Method, OrgsClient, Request, Response, Result,
    StaticCredentials,
};
