//! Error types for the RAWS service clients.
//!
//! # Design
//! Every non-success status lands in `HttpError` with the status code, the
//! reason phrase and the raw body, because the remote services put their
//! diagnostics in the body. The library does not classify statuses beyond
//! success/failure; `is_not_found` is a convenience for the common check.
//! Local precondition failures and transport failures get their own variants
//! so they are never confused with a server answer.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by `RawsClient` and the service facades.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status the operation does not accept.
    #[error("HTTP {status} {reason}: {body}")]
    HttpError {
        status: u16,
        reason: String,
        body: String,
    },

    /// A transcoding job was described inconsistently; nothing was sent.
    #[error("invalid job: {0}")]
    InvalidJob(String),

    /// A required URI argument was empty.
    #[error("a valid URI argument is required by {0}")]
    MissingUri(&'static str),

    /// The transport could not complete the exchange.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A local media file could not be read.
    #[error("media source unavailable: {0}")]
    Media(String),

    /// A connection setting is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn http(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    /// Status code carried by an `HttpError`, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_includes_body() {
        let err = ApiError::http(409, "Conflict", "{\"error\":\"exists\"}");
        assert_eq!(err.to_string(), "HTTP 409 Conflict: {\"error\":\"exists\"}");
    }

    #[test]
    fn not_found_is_detected_from_status() {
        assert!(ApiError::http(404, "Not Found", "").is_not_found());
        assert!(!ApiError::http(500, "Internal Server Error", "").is_not_found());
        assert!(!ApiError::Transport("refused".to_string()).is_not_found());
    }

    #[test]
    fn status_is_only_reported_for_http_errors() {
        assert_eq!(ApiError::http(401, "Unauthorized", "").status(), Some(401));
        assert_eq!(ApiError::MissingUri("get_job").status(), None);
    }
}
