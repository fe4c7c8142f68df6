//! Error handling for the API catalog library.
//!
//! This module defines the main error type `Error` used throughout the
//! library, along with a convenient `Result` type alias.

use thiserror::Error;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Index store error
    #[error("index store error: {0}")]
    Index(#[from] rusqlite::Error),

    /// Index connection pool error
    #[error("index connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// No spec files found, or the spec directory does not exist
    #[error("spec error: {0}")]
    Spec(String),

    /// Catalog lookup failed: unknown spec, operation, or schema
    #[error("not found: {0}")]
    NotFound(String),

    /// Outbound HTTP execution error
    #[error("execution error: {0}")]
    Execution(String),

    /// Execution capability disabled via configuration
    #[error("execution is disabled (set OPENAPI_EXECUTION=1 to enable)")]
    ExecutionDisabled,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

#[allow(dead_code)]
impl Error {
    /// Create a new spec error.
    pub fn spec<S: Into<String>>(msg: S) -> Self {
        Self::Spec(msg.into())
    }

    /// Create a new not-found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new execution error.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}
