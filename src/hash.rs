// src/hash.rs

//! SHA-256 helpers for package fingerprints and identity digests.
//!
//! Every digest in this crate renders as uppercase hex, which is the format
//! stored in and compared against the target database.

use sha2::{Digest, Sha256};

/// Length of a rendered digest in hex characters (256 bits = 32 bytes)
pub const DIGEST_HEX_LEN: usize = 64;

/// Incremental SHA-256 with uppercase hex output
///
/// Used where a digest spans several byte streams (canonical metadata plus
/// auxiliary scripts) without concatenating them first.
pub struct Hasher {
    state: Sha256,
}

impl Hasher {
    pub fn new() -> Self {
        Self {
            state: Sha256::new(),
        }
    }

    /// Update the hasher with more data
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Finalize and render as uppercase hex
    pub fn finalize(self) -> String {
        hex::encode_upper(self.state.finalize())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the uppercase hex SHA-256 of a byte slice
pub fn sha256_upper(data: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_value() {
        let digest = sha256_upper(b"Hello, World!");
        assert_eq!(
            digest,
            "DFFD6021BB2BD5B0AF676290809EC3A53191DD81C7F70A4B28688A362182986F"
        );
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_sha256_uppercase_only() {
        let digest = sha256_upper(b"hello world");
        assert_eq!(
            digest,
            "B94D27B9934D3E08A52E52D7DA7DABFAC484EFE37A5380EE9088F7ACE2EFCDE9"
        );
        assert!(digest.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hasher_incremental() {
        let full = sha256_upper(b"Hello, World!");

        let mut hasher = Hasher::new();
        hasher.update(b"Hello, ");
        hasher.update(b"World!");
        let incremental = hasher.finalize();

        assert_eq!(full, incremental);
    }

    #[test]
    fn test_empty_input() {
        // SHA-256 of the empty string
        assert_eq!(
            sha256_upper(b""),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }
}
