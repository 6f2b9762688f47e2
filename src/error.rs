// src/error.rs

//! Error types shared across the crate.
//!
//! Errors fall into a small set of kinds with different handling rules:
//! validation failures surface before any database work, connectivity
//! failures are subject to the check-time policy, and persistence failures
//! are always fatal. Temp cleanup never produces an error at all.

use std::io;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Identity key failed validation (empty, all whitespace, or over the
    /// 128 character bound). Raised before any connection is attempted.
    #[error("invalid identity key: {0}")]
    Validation(String),

    /// The target database could not be opened or verified.
    #[error("target database '{target}' is not available: {reason}")]
    Connectivity { target: String, reason: String },

    /// A statement against the property store failed after a successful
    /// connection.
    #[error("property store statement failed: {0}")]
    Persistence(rusqlite::Error),

    /// The package is not a readable zip archive or lacks a required entry.
    #[error("package archive error: {0}")]
    Archive(String),

    /// The metadata document inside the package is not well-formed XML.
    #[error("malformed metadata document: {0}")]
    Metadata(String),

    /// Filesystem I/O failed while reading or extracting package content.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The operation was aborted by a cancellation request.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Archive(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Metadata(err.to_string())
    }
}
