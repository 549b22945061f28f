//! Error types for the request-handling core.
//!
//! Errors are split into three tiers:
//!
//! - [`Error`] / [`ErrorKind`]: configuration and programming mistakes (an unregistered
//!   parser, an ambiguous controller, missing tracing ids once analytics is enabled).
//!   These are never recovered; they abort the dispatch.
//! - [`HttpError`]: client/request errors raised by authorizers, the request guard or
//!   controller code. They are recovered at the dispatch boundary and turned into a
//!   response outcome.
//! - [`ActionError::Internal`]: anything else a controller action fails with. Recovered
//!   at the same boundary, logged, and mapped to `500`.
//!
//! # Design
//!
//! [`Error`] is an opaque struct paired with an [`ErrorKind`] enum, following the
//! `std::io::Error` pattern, so the underlying sources can change without breaking
//! callers.
//!
//! # Example
//!
//! ```rust
//! use corona::{Error, ErrorKind};
//!
//! let error = Error::config("no lookup paths registered");
//!
//! match error.kind() {
//!     ErrorKind::Configuration => println!("Configuration error: {}", error),
//!     _ => println!("Other error: {}", error),
//! }
//! ```

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The kind of a fatal error.
///
/// Use [`Error::kind()`] to get the kind of an error.
///
/// # Stability
///
/// This enum is marked `#[non_exhaustive]`, so new variants may be added
/// in future versions without breaking existing code. Always include a
/// wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Invalid or inconsistent configuration.
    #[error("configuration error")]
    Configuration,

    /// A parser was asked for a key it does not serve.
    #[error("unsupported request value")]
    UnsupportedValue,

    /// No parser is registered for the requested value domain.
    #[error("unregistered parser")]
    UnregisteredParser,

    /// No authorizer is registered for the requested authorization type.
    #[error("unregistered authorizer")]
    UnregisteredAuthorizer,

    /// More than one controller file matches the requested controller name.
    #[error("ambiguous controller")]
    AmbiguousController,

    /// Trace or span ids were unavailable while recording analytics.
    #[error("tracing error")]
    Tracing,

    /// I/O error (directory scans, configuration files).
    #[error("I/O error")]
    Io,
}

/// A fatal error of the dispatch core.
///
/// Opaque wrapper around an error source. Use [`Error::kind()`] to match on
/// the category and `Display` for the message.
///
/// ```rust
/// use corona::{Error, ErrorKind};
///
/// let err = Error::ambiguous_controller();
/// assert_eq!(err.kind(), ErrorKind::AmbiguousController);
/// assert_eq!(err.to_string(), "Found multiple matching controllers!");
/// ```
pub struct Error {
    kind: ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    /// Creates a new error with the given kind and source.
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self {
            kind,
            source: error.into(),
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns a stable identifier for this error, suitable for log filtering.
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            ErrorKind::Configuration => "CONFIG_ERROR",
            ErrorKind::UnsupportedValue => "UNSUPPORTED_VALUE",
            ErrorKind::UnregisteredParser => "UNREGISTERED_PARSER",
            ErrorKind::UnregisteredAuthorizer => "UNREGISTERED_AUTHORIZER",
            ErrorKind::AmbiguousController => "AMBIGUOUS_CONTROLLER",
            ErrorKind::Tracing => "TRACING_ERROR",
            ErrorKind::Io => "IO_ERROR",
        }
    }

    /// Consumes the error and returns the inner error source.
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.source
    }
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates the error raised when a parser is asked for a key outside its set.
    pub fn unsupported_value(key: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnsupportedValue,
            format!("Unsupported request value type \"{key}\""),
        )
    }

    /// Creates the error raised when no parser serves a value domain.
    pub fn unregistered_parser(domain: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnregisteredParser,
            format!("No parser registered for request value type \"{domain}\"!"),
        )
    }

    /// Creates the error raised when no authorizer serves an authorization type.
    pub fn unregistered_authorizer(kind: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnregisteredAuthorizer,
            format!("No authorizer registered for authorization type \"{kind}\"!"),
        )
    }

    /// Creates the error raised when a controller name matches several files.
    pub fn ambiguous_controller() -> Self {
        Self::new(
            ErrorKind::AmbiguousController,
            "Found multiple matching controllers!",
        )
    }

    /// Creates a tracing correlation error.
    pub fn tracing(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Tracing, msg.into())
    }

    /// Creates an I/O error from a message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg.into())
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

// ============================================================================
// HttpError
// ============================================================================

/// Client input attached to an [`HttpError`] for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientData {
    /// Name of the offending input.
    pub key: String,
    /// Raw value of the offending input, if there was one.
    pub value: Option<String>,
}

/// A client/request error carrying an HTTP result code.
///
/// Raised by authorizers, the [`RequestGuard`](crate::RequestGuard) and controller
/// actions. The [`RequestResultHandler`](crate::RequestResultHandler) turns it into a
/// `(code, message, app_code)` outcome.
///
/// ```rust
/// use corona::HttpError;
///
/// let err = HttpError::forbidden("Insufficient privileges to access resource!")
///     .with_app_code(4030)
///     .with_data("Client", Some("Website"));
///
/// assert_eq!(err.code(), 403);
/// assert_eq!(err.app_code(), Some(4030));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HttpError {
    code: StatusCode,
    message: String,
    app_code: Option<i32>,
    data: Option<ClientData>,
    report: Option<String>,
}

impl HttpError {
    /// Creates an error with an arbitrary status code.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            app_code: None,
            data: None,
            report: None,
        }
    }

    /// `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// `401 Unauthorized`.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// `403 Forbidden`.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// `404 Not Found`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// `409 Conflict`.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// `412 Precondition Failed`.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PRECONDITION_FAILED, message)
    }

    /// `501 Not Implemented`.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, message)
    }

    /// Sets the application specific info code.
    pub fn with_app_code(mut self, app_code: i32) -> Self {
        self.app_code = Some(app_code);
        self
    }

    /// Attaches the client input that caused the error.
    pub fn with_data(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.data = Some(ClientData {
            key: key.into(),
            value: value.map(Into::into),
        });
        self
    }

    /// Attaches a free-form report.
    pub fn with_report(mut self, report: impl Into<String>) -> Self {
        self.report = Some(report.into());
        self
    }

    /// The numeric result code.
    pub fn code(&self) -> u16 {
        self.code.as_u16()
    }

    /// The result code as a status.
    pub fn status_code(&self) -> StatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn app_code(&self) -> Option<i32> {
        self.app_code
    }

    pub fn data(&self) -> Option<&ClientData> {
        self.data.as_ref()
    }

    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }
}

// ============================================================================
// ActionError
// ============================================================================

/// The failure of a controller action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A declared client/request error; becomes the call's outcome.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A configuration error; aborts the dispatch.
    #[error(transparent)]
    Fatal(#[from] Error),

    /// Anything else; logged and mapped to `500`.
    #[error("{0}")]
    Internal(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ActionError {
    /// Wraps an unexpected error.
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Internal(error.into())
    }
}

/// Result of a controller action.
pub type ActionResult = std::result::Result<(), ActionError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    // ========================================================================
    // Error tests
    // ========================================================================

    #[test]
    fn test_error_new() {
        let err = Error::new(ErrorKind::Configuration, "test error");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(format!("{}", err), "test error");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::Configuration), "configuration error");
        assert_eq!(format!("{}", ErrorKind::AmbiguousController), "ambiguous controller");
    }

    #[test]
    fn test_error_unsupported_value_message() {
        let err = Error::unsupported_value("url.baseUrl");
        assert_eq!(err.kind(), ErrorKind::UnsupportedValue);
        assert_eq!(err.to_string(), "Unsupported request value type \"url.baseUrl\"");
    }

    #[test]
    fn test_error_unregistered_authorizer_message() {
        let err = Error::unregistered_authorizer("IP");
        assert_eq!(err.kind(), ErrorKind::UnregisteredAuthorizer);
        assert_eq!(
            err.to_string(),
            "No authorizer registered for authorization type \"IP\"!"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::config("x").error_code(), "CONFIG_ERROR");
        assert_eq!(Error::ambiguous_controller().error_code(), "AMBIGUOUS_CONTROLLER");
        assert_eq!(Error::tracing("x").error_code(), "TRACING_ERROR");
        assert_eq!(Error::io("x").error_code(), "IO_ERROR");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Table>("invalid").unwrap_err();
        let err: Error = toml_err.into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_error_source_and_into_inner() {
        let err = Error::config("test message");
        assert!(StdError::source(&err).is_some());
        assert_eq!(format!("{}", err.into_inner()), "test message");
    }

    // ========================================================================
    // HttpError tests
    // ========================================================================

    #[test]
    fn test_http_error_codes() {
        assert_eq!(HttpError::bad_request("x").code(), 400);
        assert_eq!(HttpError::unauthorized("x").code(), 401);
        assert_eq!(HttpError::forbidden("x").code(), 403);
        assert_eq!(HttpError::not_found("x").code(), 404);
        assert_eq!(HttpError::conflict("x").code(), 409);
        assert_eq!(HttpError::precondition_failed("x").code(), 412);
        assert_eq!(HttpError::not_implemented("x").code(), 501);
    }

    #[test]
    fn test_http_error_builders() {
        let err = HttpError::bad_request("Bad Request!")
            .with_app_code(4001)
            .with_data("input-key", Some("bad-value"))
            .with_report("input-key: bad-value");

        assert_eq!(err.message(), "Bad Request!");
        assert_eq!(err.to_string(), "Bad Request!");
        assert_eq!(err.app_code(), Some(4001));
        assert_eq!(
            err.data(),
            Some(&ClientData {
                key: "input-key".to_string(),
                value: Some("bad-value".to_string()),
            })
        );
        assert_eq!(err.report(), Some("input-key: bad-value"));
    }

    #[test]
    fn test_http_error_data_without_value() {
        let err = HttpError::bad_request("x").with_data("apiVersion", None::<String>);
        assert_eq!(err.data().map(|d| d.value.is_none()), Some(true));
    }

    // ========================================================================
    // ActionError tests
    // ========================================================================

    #[test]
    fn test_action_error_from_http_error() {
        let err: ActionError = HttpError::conflict("Conflict!").into();
        assert!(matches!(err, ActionError::Http(_)));
        assert_eq!(err.to_string(), "Conflict!");
    }

    #[test]
    fn test_action_error_from_fatal_error() {
        let err: ActionError = Error::config("broken").into();
        assert!(matches!(err, ActionError::Fatal(_)));
    }

    #[test]
    fn test_action_error_internal() {
        let err = ActionError::internal("boom");
        assert!(matches!(err, ActionError::Internal(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
