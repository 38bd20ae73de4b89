//! Domain error types
//!
//! The taxonomy mirrors the decisions the controller has to make:
//! configuration problems abort before any network attempt, connection
//! failures are retried once, and transfer failures are split into the
//! transient, local and remote cases.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid folder ID format
    #[error("Invalid folder ID: {0}")]
    InvalidFolderId(String),

    /// Unknown transfer mode on the command line
    #[error("Unknown mode: {0} (expected listen or upload)")]
    UnknownMode(String),

    /// Round limit is not a non-negative integer
    #[error("Invalid round limit: {0}")]
    InvalidRoundLimit(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Errors loading the credentials file or the runtime settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or read
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required key is absent or empty
    #[error("Missing required credential: {0}")]
    MissingKey(&'static str),

    /// A value is present but cannot be used
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Authentication or handshake failure while opening a session
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The key material could not be decrypted or used for signing
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// The token endpoint rejected the assertion
    #[error("Authentication rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The configured folder could not be resolved
    #[error("Folder {folder} is not accessible: {message}")]
    FolderUnavailable { folder: String, message: String },

    /// The endpoint could not be reached
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Failure of a single enumerate/download/upload/delete call
#[derive(Debug, Error)]
pub enum TransferError {
    /// Connection-class failure; reconnecting is likely to help
    #[error("Connection lost: {0}")]
    Transient(String),

    /// A local file could not be opened, read or written
    #[error("Local I/O error on {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote service refused the operation
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },
}

impl TransferError {
    /// Wraps an I/O error with the local path it happened on
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Returns true when a reconnect should be attempted
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
