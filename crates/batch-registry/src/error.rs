//! Error types for registry compilation
//!
//! Every error that concerns a declaration file carries its path, so that the
//! host can report the offending file whatever its failure policy is.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised while discovering, validating or compiling job declarations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A module root, declaration directory or declaration file could not be read
    #[error("Cannot read job declarations at '{}': {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The declaration file is not well-formed YAML
    #[error("Malformed job declaration '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// The document does not match the connector schema
    #[error("Invalid job declaration '{}' at '{field}': {message}", .path.display())]
    Schema {
        path: PathBuf,
        field: String,
        message: String,
    },

    /// The same job step is declared by two files and duplicates are rejected
    #[error(
        "Step '{step}' of job '{job}' is declared in both '{}' and '{}'",
        .first.display(),
        .second.display()
    )]
    DuplicateStep {
        job: String,
        step: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A collaborator references a service the locator does not know
    #[error("Step '{step}' needs service '{service_id}' for '{setter}', but no such service is registered")]
    UnknownService {
        step: String,
        setter: String,
        service_id: String,
    },

    /// Pipeline configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// Create a discovery error for `path`
    pub fn discovery(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Discovery {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error for `path`
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema error for `field` within the document at `path`
    pub fn schema(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Schema {
            path: path.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Declaration file the error is about, if any.
    ///
    /// For duplicates this is the file that repeated the declaration.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Discovery { path, .. } | Self::Parse { path, .. } | Self::Schema { path, .. } => {
                Some(path)
            },
            Self::DuplicateStep { second, .. } => Some(second),
            Self::UnknownService { .. } | Self::Config(_) => None,
        }
    }
}

impl From<walkdir::Error> for RegistryError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        Self::discovery(path, err.into())
    }
}
