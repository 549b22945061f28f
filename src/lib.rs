//! # corona
//!
//! The request-handling core of a small dispatch framework for web and command line
//! entry points.
//!
//! A call is described by a [`Request`]: a route target plus a registry of
//! [`ValueParser`]s that lazily derive request values (action, client, API version,
//! trace ids, base URL, ...) from raw [`HttpSource`], [`CliArgs`] and [`EnvSource`]
//! snapshots. Around it sit:
//!
//! | Component | Role |
//! |-----------|------|
//! | [`RequestGuard`] | Authorization by client or IP, API version checks |
//! | [`FrontController`] | Routing rules, controller lookup, dispatch |
//! | [`RequestResultHandler`] | Turns action outcomes into result codes, emits analytics |
//! | [`Response`] | Response data, view and per-call result codes |
//!
//! Everything is configured through TOML.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use corona::{
//!     Action, ActionResult, Config, Controller, EnvSource, HttpError, HttpSource,
//!     MemoryEventLogger, Request, Response, RouteTarget,
//! };
//!
//! struct StatusController;
//!
//! impl StatusController {
//!     fn get(&self, _params: &[String]) -> ActionResult {
//!         Err(HttpError::not_found("Nothing here!").into())
//!     }
//! }
//!
//! impl Controller for StatusController {
//!     fn action(&self, name: &str) -> Option<Action<Self>> {
//!         (name == "get").then_some(Self::get as Action<Self>)
//!     }
//! }
//!
//! let config = Config::builtin().with_analytics(true).with_analytics_code(404, "not_found");
//! config.setup_tracing();
//!
//! let source = Arc::new(HttpSource::new().with_header("X-Trace-Id", "abc"));
//! let env = Arc::new(EnvSource::new().with_hostname("web-1"));
//! let mut request = Request::new(RouteTarget::new("status", "get"));
//! config.request.register_http_parsers(&mut request, &source, &env);
//!
//! let response = Arc::new(Response::new());
//! let logger = Arc::new(MemoryEventLogger::new());
//! let front = config.front_controller(Arc::new(request), response.clone(), logger.clone());
//!
//! front.dispatch(&StatusController)?;
//! assert_eq!(response.result_code(None), Some(404));
//! assert_eq!(logger.events()[0].trace_id(), Some("abc"));
//! # Ok::<(), corona::Error>(())
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [request]
//! entry_point = "index.php"
//! api_keys = [{ key = "{{ WEB_API_KEY }}", client = "web" }]
//!
//! [routing]
//! lookup_paths = [{ id = "app", path = "src/controllers" }]
//! rules = [{ call = "admin", deny = true }]
//!
//! [analytics]
//! enabled = true
//! codes = [{ code = 400, event = "bad_request" }]
//! ```
//!
//! Loaded with [`Config::from_rust_env`] from `config/{RUST_ENV}.toml`.
//!
//! # Error Handling
//!
//! Framework failures (misconfiguration, unregistered parsers, ambiguous controllers)
//! are [`Error`]s. Controller actions return [`ActionResult`]: an [`HttpError`] becomes
//! the call's result code, anything else becomes a 500.
mod analytics;
mod authorization;
mod config;
mod error;
mod front_controller;
mod guard;
mod parsers;
mod request;
mod response;
mod result_handler;
mod utils;

pub use analytics::*;
pub use authorization::*;
pub use config::*;
pub use error::*;
pub use front_controller::*;
pub use guard::*;
pub use parsers::*;
pub use request::*;
pub use response::*;
pub use result_handler::*;
pub use utils::*;

pub type Result<T> = std::result::Result<T, Error>;
