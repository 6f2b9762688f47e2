// src/store/mod.rs

//! Deployment property storage in the target database.
//!
//! The skipper needs exactly two capabilities from the target: ask whether a
//! key/value pair is recorded, and record one. `PropertyStore` captures that
//! seam; `SqliteStore` is the shipped backend.

pub mod sqlite;

pub use sqlite::{Access, SqliteStore};

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Key/value persistence for deployment records.
///
/// Concurrency contract: two concurrent `upsert` calls for the same key are
/// last-write-wins. The shipped backend performs the upsert in one atomic
/// statement; a backend that implements it as an existence check followed by
/// a write inherits a window in which the later writer prevails.
pub trait PropertyStore {
    /// True iff a record with exactly this key and this value exists
    fn exists(&self, key: &str, value: &str) -> Result<bool>;

    /// Create or replace the single record for `key`
    fn upsert(&self, key: &str, value: &str) -> Result<()>;
}

/// A target database file on disk
#[derive(Debug, Clone)]
pub struct TargetDb {
    path: PathBuf,
}

impl TargetDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name for logs and status lines: the file stem of the
    /// database path
    pub fn database_name(&self) -> String {
        match self.path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => self.path.display().to_string(),
        }
    }
}
