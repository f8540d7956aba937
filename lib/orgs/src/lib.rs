//! Async client for the organization-management API.
//!
//! Join apps to organizations, lock them, and manage members, with typed
//! failures for every unexpected status.
//!
//! # Example
//!
//! ```ignore
//! use orgs::prelude::*;
//!
//! // Reads HEROKU_API_KEY and HEROKU_MANAGER_URL on first use.
//! let client = OrgsClient::from_env();
//!
//! client.lock_app("my-app").await?;
//! for member in client.get_members("acme").await? {
//!     println!("{} ({:?})", member.email, member.role);
//! }
//!
//! match client.join_app("my-app").await {
//!     Err(err) if err.kind() == Some(ErrorKind::Locked) => println!("app is locked"),
//!     other => { other?; }
//! }
//! ```

mod client;
mod config;
mod connection;
mod connector;
mod credentials;
mod dispatcher;
mod endpoints;
pub mod middleware;
pub mod prelude;
#[cfg(test)]
mod testing;

// Re-export client types
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_MANAGER_URL, MANAGER_URL_ENV, ManagerConfig,
};
pub use connection::{Connection, ConnectionManager};
pub use credentials::{API_KEY_ENV, CredentialProvider, EnvCredentials, StaticCredentials};
pub use dispatcher::{OrgsClient, OrgsClientBuilder};
pub use endpoints::{Member, escape_member};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use orgs_core::{
    ApiError, BadStatus, APPLICATION_JSON, Error, ErrorKind, HttpClient, Method, Request,
    RequestBuilder, Response, Result, from_json, to_json,
};

// Re-export http types for status codes and headers
pub use orgs_core::{StatusCode, header};

pub use secrecy;
