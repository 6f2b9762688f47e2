// src/dacpac/mod.rs

//! Dacpac container access.
//!
//! A `.dacpac` is a zip archive. The entries that matter here live at the
//! archive root: the metadata document (`model.xml`, required) and the
//! optional pre/post deployment scripts.

pub mod metadata;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Metadata document entry, required in a well-formed package
pub const MODEL_DOCUMENT: &str = "model.xml";
/// Optional pre-deployment script entry
pub const PREDEPLOY_SCRIPT: &str = "predeploy.sql";
/// Optional post-deployment script entry
pub const POSTDEPLOY_SCRIPT: &str = "postdeploy.sql";

/// A dacpac on disk, opened as a zip archive
#[derive(Debug)]
pub struct DacPackage {
    archive: ZipArchive<File>,
    path: PathBuf,
}

impl DacPackage {
    /// Open a package and validate its container format
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(file)?;
        debug!(
            "Opened package {} ({} entries)",
            path.display(),
            archive.len()
        );
        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }

    /// Extract every entry into a fresh temporary directory.
    ///
    /// The directory lives until the returned handle drops. Removal is
    /// best-effort: a cleanup failure is suppressed and never affects the
    /// outcome of the operation that triggered the extraction.
    pub fn extract_to_temp(mut self) -> Result<ExtractedPackage> {
        let dir = TempDir::new()?;
        for i in 0..self.archive.len() {
            let mut entry = self.archive.by_index(i)?;
            let Some(dest) = entry.enclosed_name().map(|p| dir.path().join(p)) else {
                warn!("Skipping archive entry with unsafe name: {}", entry.name());
                continue;
            };
            if entry.is_dir() {
                fs::create_dir_all(&dest)?;
                continue;
            }
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&dest)?;
            io::copy(&mut entry, &mut outfile)?;
        }
        debug!(
            "Extracted {} into {}",
            self.path.display(),
            dir.path().display()
        );
        Ok(ExtractedPackage { dir })
    }
}

/// Extracted package contents in a scoped temporary directory
pub struct ExtractedPackage {
    dir: TempDir,
}

impl ExtractedPackage {
    /// Read a required entry from the extraction root
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        match fs::read(self.dir.path().join(name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::Archive(format!("package has no {} entry", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read an optional entry; absence is not an error
    pub fn read_optional(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.dir.path().join(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Root of the extraction directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the extraction directory now rather than at drop time.
    ///
    /// A removal failure is logged and suppressed; it never becomes an
    /// error. Dropping the handle removes the directory too, silently.
    pub fn cleanup(self) {
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove extraction directory: {}", e);
        }
    }
}
