// src/identity.rs

//! Identity key derivation.
//!
//! The identity key names a deployment record in the target database. It is
//! derived from the package path in one of two modes and validated against
//! the store's key bound before any database work happens.

use crate::error::{Error, Result};
use crate::hash;

/// Longest identity key the property store accepts
pub const MAX_KEY_LEN: usize = 128;

/// How the identity key is derived from the package path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Uppercase hex SHA-256 of the package path string exactly as given,
    /// with no canonicalization.
    ///
    /// The digest covers the path, not the package content: the same package
    /// checked from two different locations carries two different
    /// identities. Preserved for compatibility with existing records; use
    /// `FileName` when the key must survive relocation.
    #[default]
    PathDigest,
    /// Base name of the package file without its extension.
    FileName,
}

/// Derive the identity key for a package path.
///
/// `FileName` keys must be non-empty, not all whitespace, and at most
/// [`MAX_KEY_LEN`] characters. `PathDigest` keys are always 64 characters
/// and need no validation.
pub fn derive_key(package_path: &str, mode: KeyMode) -> Result<String> {
    match mode {
        KeyMode::FileName => {
            let stem = file_stem(package_path);
            if stem.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "package path '{}' has no usable file name",
                    package_path
                )));
            }
            if stem.chars().count() > MAX_KEY_LEN {
                return Err(Error::Validation(format!(
                    "identity key '{}' exceeds {} characters",
                    stem, MAX_KEY_LEN
                )));
            }
            Ok(stem.to_string())
        }
        KeyMode::PathDigest => Ok(hash::sha256_upper(package_path.as_bytes())),
    }
}

/// Final path segment (either separator) with the extension stripped at the
/// last dot
fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}
