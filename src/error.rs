//! Error types and the failure envelope.
//!
//! Every failure in the request path is an [`Error`] carrying an [`ErrorKind`].
//! The kind decides the HTTP status and whether the envelope reports
//! `"fail"` (client-caused, 4xx) or `"error"` (server-caused, 5xx).
//!
//! # Design
//!
//! `Error` is an opaque struct paired with an `ErrorKind` enum, following the
//! `std::io::Error` pattern, so the underlying source can change without
//! breaking callers.
//!
//! Rendering an error never exposes the source of a 5xx to the client. The
//! full message travels in the response extensions as an [`ErrorReport`] where
//! the error funnel middleware picks it up for logging, and adds it to the
//! body only in development mode.
//!
//! # Example
//!
//! ```rust
//! use folio_content::{Error, ErrorKind};
//! use axum::http::StatusCode;
//!
//! let error = Error::missing_parameter("locale");
//! assert_eq!(error.kind(), ErrorKind::MissingParameter);
//! assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
//! assert_eq!(error.status_label(), "fail");
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A required request parameter was absent.
    #[error("missing parameter")]
    MissingParameter,

    /// A request parameter was present but malformed.
    #[error("invalid format")]
    InvalidFormat,

    /// No document, no resolvable translation, or an unknown route.
    #[error("not found")]
    NotFound,

    /// The route exists but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The document store failed (connection, timeout, query).
    #[error("upstream failure")]
    Upstream,

    /// A stored document does not have the expected shape.
    #[error("data integrity error")]
    DataIntegrity,

    /// Configuration error (missing environment variables, invalid TOML).
    #[error("configuration error")]
    Configuration,

    /// I/O error (file operations, network).
    #[error("I/O error")]
    Io,

    /// Internal/unexpected error.
    #[error("internal error")]
    Internal,
}

/// An error raised anywhere in the service.
///
/// Use [`Error::kind()`] to match on the category and the `Display`
/// implementation for the full, internal message.
///
/// ```rust
/// use folio_content::{Error, ErrorKind};
///
/// let err = Error::upstream("connection refused");
/// assert_eq!(err.kind(), ErrorKind::Upstream);
/// // The client never sees the cause of a server-side failure.
/// assert_eq!(err.public_message(), "An error occurred while fetching data");
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

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::MissingParameter => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidFormat => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::DataIntegrity => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `"fail"` for client errors and `"error"` for server errors.
    pub fn status_label(&self) -> &'static str {
        status_label(self.status_code())
    }

    /// The message shown to clients.
    ///
    /// Client errors carry their own message. Server errors are replaced by a
    /// generic sentence so store or I/O details never leave the process.
    pub fn public_message(&self) -> String {
        match self.kind {
            ErrorKind::Upstream => "An error occurred while fetching data".into(),
            ErrorKind::DataIntegrity => "Stored content is malformed".into(),
            ErrorKind::Configuration | ErrorKind::Io | ErrorKind::Internal => {
                "Something went wrong!".into()
            }
            _ => self.to_string(),
        }
    }

    /// Converts the error into the failure envelope (without details).
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.status_label(), self.public_message())
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
    /// Creates a missing parameter error for the named parameter.
    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            ErrorKind::MissingParameter,
            format!("{} parameter is required", capitalize(name)),
        )
    }

    /// Creates an invalid format error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat, msg.into())
    }

    /// Creates a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg.into())
    }

    /// Creates a method not allowed error.
    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, msg.into())
    }

    /// Creates an upstream (document store) error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Upstream, msg.into())
    }

    /// Creates a data integrity error.
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataIntegrity, msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, msg.into())
    }

    /// Creates an I/O error from a message.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, msg.into())
    }

    /// Creates an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, msg.into())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn status_label(status: StatusCode) -> &'static str {
    if status.is_client_error() {
        "fail"
    } else {
        "error"
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

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.to_error_response();
        let report = ErrorReport::from(&self);

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

// ============================================================================
// From implementations
// ============================================================================

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Self::new(ErrorKind::Configuration, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::DataIntegrity, err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::new(ErrorKind::Upstream, err)
    }
}

// ============================================================================
// ErrorResponse / ErrorReport
// ============================================================================

/// The failure envelope sent to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// `"fail"` for 4xx, `"error"` for 5xx.
    pub status: String,
    /// Human-readable error message.
    pub message: String,
    /// Internal detail, only filled in development mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Creates a new failure envelope.
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Adds internal details to the envelope.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Diagnostics attached to an error response for the error funnel.
///
/// The funnel reads this from the response extensions to log the full
/// message and, in development mode, to add it to the envelope.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub public_message: String,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        // Include the source chain so wrapped store errors stay visible in logs.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&*err.source);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            kind: err.kind,
            status: err.status_code(),
            public_message: err.public_message(),
            message,
        }
    }
}
