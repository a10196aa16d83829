//! Error types and result aliases for Keel operations.
//!
//! Provides a unified error type covering version parsing, schema decoding
//! and configuration loading across the Keel workspace.

use thiserror::Error;

use crate::types::VersionError;

/// Unified error type for all Keel operations
#[derive(Error, Debug)]
pub enum KeelError {
    // Version errors
    #[error(transparent)]
    Version(#[from] VersionError),

    // Decode errors
    #[error("{record} must be built from a table, got {found}")]
    NotATable {
        record: &'static str,
        found: &'static str,
    },

    #[error("{record} requires the field '{field}' to be {expected}, got {found}")]
    FieldType {
        record: &'static str,
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("{record} requires a field '{field}' but none was supplied")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("{reason}")]
    DependencyConflict { reason: &'static str },

    // Loader errors
    #[error("failed to parse TOML: {message}")]
    TomlParse { message: String },

    #[error("lock file format version {found} is newer than the supported version {supported}")]
    LockNewer { found: i64, supported: u64 },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Keel operations
pub type KeelResult<T> = Result<T, KeelError>;

impl KeelError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }
}
