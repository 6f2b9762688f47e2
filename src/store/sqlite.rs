// src/store/sqlite.rs

//! SQLite-backed property store.
//!
//! Deployment records live in a tool-owned `deployment_properties` table
//! inside the target database, one row per identity key. The check flow
//! opens the target read-only and treats a missing table as "nothing
//! recorded"; the mark flow opens read-write and bootstraps the table.
//! Neither mode creates the database file itself.

use std::time::Duration;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::identity::MAX_KEY_LEN;

use super::{PropertyStore, TargetDb};

const PROPERTY_TABLE: &str = "deployment_properties";

const CREATE_PROPERTY_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS deployment_properties (
        name       TEXT PRIMARY KEY CHECK (length(name) <= 128),
        value      TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )";

/// How the target is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Check flow: query without touching the target
    ReadOnly,
    /// Mark flow: read-write plus schema bootstrap
    ReadWrite,
}

/// An open connection to the target database
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    target_name: String,
}

impl SqliteStore {
    /// Open the target database.
    ///
    /// A missing, unreadable, or non-database target is
    /// [`Error::Connectivity`]. Schema or statement failures after a
    /// successful open are [`Error::Persistence`]. The connection registers
    /// an interrupt hook on `cancel` so an in-flight statement aborts when
    /// cancellation is requested.
    pub fn connect(target: &TargetDb, access: Access, cancel: &CancelToken) -> Result<Self> {
        let flags = match access {
            Access::ReadOnly => {
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI
            }
            Access::ReadWrite => {
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI
            }
        };

        let connectivity = |reason: String| Error::Connectivity {
            target: target.database_name(),
            reason,
        };

        let conn = Connection::open_with_flags(target.path(), flags)
            .map_err(|e| connectivity(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| connectivity(e.to_string()))?;

        // A nonexistent file fails at open, but a file that is not a
        // database only fails once something reads it. A pure expression
        // query never touches the file, so read the schema table here to
        // surface that failure as a connectivity error.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|e| connectivity(e.to_string()))?;

        let handle = conn.get_interrupt_handle();
        cancel.register_interrupt(move || handle.interrupt());

        let store = Self {
            conn,
            target_name: target.database_name(),
        };

        if access == Access::ReadWrite {
            store.ensure_schema()?;
        }

        debug!("Connected to target database {}", store.target_name);
        Ok(store)
    }

    /// Name of the connected database, for status lines
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Create the property table on first mark against this target
    fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute(CREATE_PROPERTY_TABLE, [])
            .map_err(statement_error)?;
        Ok(())
    }

    fn has_property_table(&self) -> Result<bool> {
        let present: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![PROPERTY_TABLE],
                |row| row.get(0),
            )
            .optional()
            .map_err(statement_error)?;
        Ok(present.is_some())
    }
}

impl PropertyStore for SqliteStore {
    fn exists(&self, key: &str, value: &str) -> Result<bool> {
        // A target nothing was ever marked on has no table
        if !self.has_property_table()? {
            return Ok(false);
        }

        let hit: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM deployment_properties WHERE name = ?1 AND value = ?2",
                params![key, value],
                |row| row.get(0),
            )
            .optional()
            .map_err(statement_error)?;
        Ok(hit.is_some())
    }

    fn upsert(&self, key: &str, value: &str) -> Result<()> {
        // Mirrors the column CHECK so oversized keys fail the same way on
        // every backend
        if key.chars().count() > MAX_KEY_LEN {
            return Err(Error::Validation(format!(
                "identity key '{}' exceeds {} characters",
                key, MAX_KEY_LEN
            )));
        }

        self.conn
            .execute(
                "INSERT INTO deployment_properties (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET
                    value = excluded.value,
                    updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .map_err(statement_error)?;
        Ok(())
    }
}

/// Statement failure mapping; a cancellation interrupt is not a persistence
/// error
fn statement_error(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == rusqlite::ErrorCode::OperationInterrupted {
            return Error::Cancelled;
        }
    }
    Error::Persistence(err)
}
