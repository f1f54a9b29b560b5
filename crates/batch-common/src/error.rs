//! Error types shared across the workspace

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised by the shared value types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid batch status: '{0}'. Expected one of UNKNOWN, STARTING, STARTED, STOPPING, STOPPED, FAILED, COMPLETED")]
    InvalidStatus(String),
}

impl CommonError {
    /// Create an invalid status error
    pub fn invalid_status(token: impl Into<String>) -> Self {
        Self::InvalidStatus(token.into())
    }
}
