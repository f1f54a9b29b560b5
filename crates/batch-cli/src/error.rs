//! Error types for the batch-jobs CLI
//!
//! User-facing errors with messages that say what to fix.

use batch_registry::RegistryError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Registry discovery, validation or compilation failed
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions.")]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_message_is_kept() {
        let err: CliError =
            RegistryError::schema("/m/config/batch_jobs.yml", "jobs", "required field is missing")
                .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Invalid job declaration"));
        assert!(msg.contains("/m/config/batch_jobs.yml"));
    }

    #[test]
    fn test_io_error_has_hint() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.to_string().contains("Check file permissions"));
    }
}
