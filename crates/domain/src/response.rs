//! Response envelope for status-code-based consumption
//!
//! A tagged union replacing exception-style control flow at the outer API
//! surface: a success carries code 200 and a result, a failure carries a
//! code >= 400 and a message. Consumers match exhaustively instead of
//! downcasting error types.

use chrono::{DateTime, Utc};

use crate::errors::HiveError;

/// Outcome of an SDK operation at the response-producing layer.
///
/// Immutable once constructed. `created_at` records when the envelope was
/// built, not when the remote produced the payload.
#[derive(Debug, Clone)]
pub enum ApiResponse<T> {
    Success { result: T, created_at: DateTime<Utc> },
    Failure { code: u16, message: String, created_at: DateTime<Utc> },
}

impl<T> ApiResponse<T> {
    /// Wrap a successful result (code 200).
    pub fn ok(result: T) -> Self {
        Self::Success { result, created_at: Utc::now() }
    }

    /// Wrap a failure with an explicit status code.
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self::Failure { code: code.max(400), message: message.into(), created_at: Utc::now() }
    }

    /// Translate an error into a failure envelope using its stable code.
    pub fn from_error(err: &HiveError) -> Self {
        Self::failure(err.status_code(), err.message())
    }

    /// HTTP-style status code: 200 for success, >= 400 for failure.
    pub fn code(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Failure { code, .. } => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Borrow the result payload, if any.
    pub fn result(&self) -> Option<&T> {
        match self {
            Self::Success { result, .. } => Some(result),
            Self::Failure { .. } => None,
        }
    }

    /// Consume the envelope, yielding the result payload.
    pub fn into_result(self) -> Option<T> {
        match self {
            Self::Success { result, .. } => Some(result),
            Self::Failure { .. } => None,
        }
    }

    /// The failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
        }
    }
}

impl<T> From<crate::errors::Result<T>> for ApiResponse<T> {
    fn from(result: crate::errors::Result<T>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(err) => Self::from_error(&err),
        }
    }
}
