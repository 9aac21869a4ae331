//! Error types for Vault
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Main error type for Vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// No usable library root in the global settings
    #[error("library root is not configured - run 'vault init' or set LibraryPath in {file}")]
    LibraryNotConfigured { file: PathBuf },

    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Lookup by pack name or file id found nothing
    #[error("no pack named '{name}' in the library")]
    PackNotFound { name: String },

    /// Asset identifier absent from the registry snapshot
    #[error("asset '{asset}' is not present in the registry snapshot")]
    UnknownAsset { asset: String },

    /// Registry snapshot failed to parse
    #[error("invalid registry snapshot {file}: {message}")]
    InvalidRegistry { file: PathBuf, message: String },

    /// No packaging tool configured in the local settings
    #[error("pack tool is not configured - set PackToolPath in the local settings")]
    PackToolNotConfigured,

    /// Packaging tool ran but reported failure
    #[error("pack tool exited with {status}")]
    PackToolFailed { status: String },

    /// Required publish field left empty
    #[error("required field '{field}' is empty")]
    MissingField { field: String },

    /// Publish was declined at a confirmation gate
    #[error("publish aborted by user")]
    PublishAborted,

    /// Home directory could not be determined
    #[error("could not determine the user home directory")]
    NoHomeDirectory,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
