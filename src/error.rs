//! Error handling for verteiler
//!
//! Every fallible operation in the crate returns [`Result`]. The error keeps a
//! coarse [`ErrorCode`] for callers that branch on the kind of failure, plus the
//! HTTP status and response body when the failure came from a remote platform.

use std::fmt;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Config file missing, unreadable or malformed
    Config,
    /// Referenced artifact, version or changelog file unreadable
    Io,
    /// Credential exchange failed
    Auth,
    /// Remote platform answered with an unexpected status
    Http,
    /// Request could not be sent or the response could not be read
    Network,
    /// Request or response body could not be (de)serialized
    Serialization,
    /// Human game version has no platform id
    UnknownVersion,
    /// Loader name has no platform id
    UnknownLoader,
    /// Webhook notification failed
    Notify,
    /// Required input (argument, env var, API key) is absent
    MissingInput,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Config => "Config error",
            ErrorCode::Io => "I/O error",
            ErrorCode::Auth => "Authentication failed",
            ErrorCode::Http => "HTTP error",
            ErrorCode::Network => "Network error",
            ErrorCode::Serialization => "Serialization error",
            ErrorCode::UnknownVersion => "Unknown game version",
            ErrorCode::UnknownLoader => "Unknown loader",
            ErrorCode::Notify => "Notification failed",
            ErrorCode::MissingInput => "Missing input",
        }
    }
}

/// Crate error type
#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    /// HTTP status code if this error came from an HTTP response
    pub(crate) http_status: Option<u16>,
    /// Response body captured for diagnostics
    pub(crate) body: Option<String>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: message.into(),
            http_status: None,
            body: None,
        }
    }

    /// Unexpected status from a remote call, keeping the body for diagnostics
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Error::new(
            ErrorCode::Http,
            format!("unexpected status code: {status}, body: {body}"),
        )
        .with_http_status(status)
        .with_body(body)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::new(ErrorCode::Config, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Error::new(ErrorCode::Io, msg)
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Error::new(ErrorCode::Network, msg)
    }

    pub fn missing_input(msg: impl Into<String>) -> Self {
        Error::new(ErrorCode::MissingInput, msg)
    }

    /// Add HTTP status code (builder pattern)
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Add the response body (builder pattern)
    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Prefix the message with the step that failed, keeping code, status and body
    pub fn context(mut self, step: impl fmt::Display) -> Self {
        self.message = format!("{step}: {}", self.message);
        self
    }

    /// Get the HTTP status code if available
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// Get the captured response body if available
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorCode::Network, "Connection failed");
        assert_eq!(err.code, ErrorCode::Network);
        assert_eq!(err.message, "Connection failed");
        assert_eq!(err.http_status(), None);
        assert_eq!(err.body(), None);
    }

    #[test]
    fn test_http_error_keeps_status_and_body() {
        let err = Error::http(400, "{\"error\":\"bad channel\"}");
        assert_eq!(err.code, ErrorCode::Http);
        assert_eq!(err.http_status(), Some(400));
        assert_eq!(err.body(), Some("{\"error\":\"bad channel\"}"));
        assert!(err.message.contains("400"));
    }

    #[test]
    fn test_context_prefixes_message() {
        let err = Error::http(500, "boom").context("failed to create version");

        assert_eq!(err.code, ErrorCode::Http);
        assert_eq!(err.http_status(), Some(500));
        assert!(err.message.starts_with("failed to create version: "));
        assert_eq!(
            err.to_string(),
            "HTTP error: failed to create version: unexpected status code: 500, body: boom"
        );
    }
}
