//! Error types used throughout the SDK

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Hiveport
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HiveError {
    /// A required parameter was missing or malformed. Raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The token-issuing endpoint could not produce a usable credential.
    #[error("Unable to obtain credential: {0}")]
    Credential(String),

    /// The remote rejected the credentials outright (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A domain operation returned an error envelope or a non-success status.
    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    /// No destination endpoint matched the requested name or its fallback.
    #[error("Endpoint not found: {0}")]
    EndpointNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HiveError {
    /// The bare error message, without the variant prefix.
    ///
    /// Used where a human-readable message is surfaced as a value (paging
    /// failures, per-file upload reports) rather than as an error chain.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(msg)
            | Self::Credential(msg)
            | Self::Forbidden(msg)
            | Self::EndpointNotFound(msg)
            | Self::Network(msg)
            | Self::Internal(msg) => msg,
            Self::Api { message, .. } => message,
        }
    }

    /// HTTP-style status code for response-envelope translation.
    ///
    /// Success responses carry 200; every error kind maps to a stable
    /// code >= 400 so callers can branch on status without inspecting
    /// error variants.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::Credential(_) => 401,
            Self::Forbidden(_) => 403,
            Self::Api { code, .. } => *code,
            Self::EndpointNotFound(_) => 404,
            Self::Network(_) | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias for Hiveport operations
pub type Result<T> = std::result::Result<T, HiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_strips_variant_prefix() {
        assert_eq!(HiveError::Network("boom".to_string()).message(), "boom");
        assert_eq!(HiveError::Api { code: 502, message: "bad gateway".to_string() }.message(), "bad gateway");
    }

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(HiveError::InvalidArgument("x".to_string()).status_code(), 400);
        assert_eq!(HiveError::Credential("x".to_string()).status_code(), 401);
        assert_eq!(HiveError::Forbidden("x".to_string()).status_code(), 403);
        assert_eq!(HiveError::EndpointNotFound("x".to_string()).status_code(), 404);
        assert_eq!(HiveError::Api { code: 422, message: "x".to_string() }.status_code(), 422);
    }
}
