//! Request values.
//!
//! A [`Request`] gives controllers, guards and the result handler uniform access to
//! everything known about the current call, regardless of whether it came in over HTTP
//! or the command line. Values are grouped in [`ValueDomain`]s, each served by a single
//! [`ValueParser`] that reads from a raw source snapshot ([`HttpSource`], [`CliArgs`],
//! [`EnvSource`]) on first use.

mod parser;
mod registry;
mod source;
mod value;

pub use parser::*;
pub use registry::*;
pub use source::*;
pub use value::*;
