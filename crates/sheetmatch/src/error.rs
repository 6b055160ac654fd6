//! Common error types for Sheetmatch hosts.

use sheetmatch_core::{ConfigError, ExportError};
use thiserror::Error;

/// Common error type for Sheetmatch operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid target or matcher configuration
    #[error("target error: {0}")]
    Target(#[from] ConfigError),

    /// Result export error
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Result type alias using Sheetmatch Error.
pub type Result<T> = std::result::Result<T, Error>;
