//! Layers stacked around [`HyperClient`](crate::HyperClient).
//!
//! Every layer is a tower service from `http::Request<Bytes>` to
//! [`Response`](crate::Response). [`LoggingLayer`] traces each call and
//! [`DecompressionLayer`] advertises and decodes gzip and deflate bodies.
//!
//! ```ignore
//! let client = orgs::HyperClient::builder()
//!     .with_logging()
//!     .with_decompression()
//!     .build();
//! ```
//!
//! No retry layer exists: a dispatch sends one request.

mod decompression;
mod logging;

pub use decompression::{Decompression, DecompressionLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::{Layer, ServiceBuilder};
