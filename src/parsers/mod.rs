//! Concrete [`ValueParser`](crate::ValueParser) implementations.
//!
//! HTTP parsers read an [`HttpSource`](crate::HttpSource), CLI parsers read
//! [`CliArgs`](crate::CliArgs), and the environment based parsers read an
//! [`EnvSource`](crate::EnvSource). All of them share their source through an `Arc` so
//! one snapshot can back every parser of a request.

mod action;
mod analytics;
mod api_version;
mod bearer_token;
mod client;
mod client_version;
mod environment;
mod generic;
mod host;
mod route_info;
mod tracing_info;
mod url;

pub use action::*;
pub use analytics::*;
pub use api_version::*;
pub use bearer_token::*;
pub use client::*;
pub use client_version::*;
pub use environment::*;
pub use generic::*;
pub use host::*;
pub use route_info::*;
pub use tracing_info::*;
pub use url::*;
