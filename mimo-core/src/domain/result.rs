//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown for any credential mismatch, whether or not the user exists
pub const INVALID_CREDENTIALS: &str = "invalid id or password";

/// Message shown when a backing file or database cannot be read
pub const STORAGE_UNAVAILABLE: &str = "could not load data";

/// Core library error type
///
/// Every variant is recoverable: services return it to the presentation
/// layer, which renders the message in an error banner.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input shape: empty field, too short, confirmation mismatch
    #[error("{0}")]
    Validation(String),

    /// The referenced user does not exist
    #[error("{0}")]
    NotFound(String),

    /// Credential mismatch
    #[error("{0}")]
    AuthFailure(String),

    /// Duplicate user id or email at sign-up
    #[error("{0}")]
    Conflict(String),

    /// A backing store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Credential mismatch, always rendered with the same message
    pub fn auth_failure() -> Self {
        Self::AuthFailure(INVALID_CREDENTIALS.to_string())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Message safe to show to an end user
    ///
    /// Storage and IO failures collapse into a generic message; the detail
    /// belongs in the event log, not in a banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Io(_) | Self::Json(_) => STORAGE_UNAVAILABLE.to_string(),
            other => other.to_string(),
        }
    }

    /// Short machine-readable kind, used for `--json` output and event logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::AuthFailure(_) => "auth_failure",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) | Self::Io(_) | Self::Json(_) => "storage",
        }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result as rendered by the presentation layer: a success flag
/// plus either the payload or a displayable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_kind: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut failed = Self::fail(e.user_message());
                failed.error_kind = Some(e.kind().to_string());
                failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_result_keeps_validation_message() {
        let err: Result<i32> = Err(Error::validation("enter a nickname"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("enter a nickname"));
        assert_eq!(result.error_kind.as_deref(), Some("validation"));
    }

    #[test]
    fn test_storage_errors_are_generic_for_users() {
        let err: Result<()> = Err(Error::storage("CSV deserialize error: record 3"));
        let result: OperationResult<()> = err.into();
        assert_eq!(result.error.as_deref(), Some(STORAGE_UNAVAILABLE));
        assert_eq!(result.error_kind.as_deref(), Some("storage"));
    }

    #[test]
    fn test_json_shape() {
        let ok = serde_json::to_value(OperationResult::ok(1)).unwrap();
        let keys: Vec<&str> = ok.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"success") && keys.contains(&"data") && keys.contains(&"error"));

        let err: Result<i32> = Err(Error::conflict("user id already exists"));
        let failed = serde_json::to_value(OperationResult::from(err)).unwrap();
        assert_eq!(failed["error_kind"], "conflict");
        assert_eq!(failed.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_auth_failure_message_is_fixed() {
        assert_eq!(Error::auth_failure().to_string(), INVALID_CREDENTIALS);
    }
}
