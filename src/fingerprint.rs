// src/fingerprint.rs

//! Package fingerprint computation.
//!
//! The fingerprint is the uppercase hex SHA-256 over the canonical metadata
//! document followed by the optional deployment scripts in a fixed order
//! (predeploy, then postdeploy). Normalization makes it independent of the
//! build host; any other change to the metadata or either script changes
//! the fingerprint.

use std::path::Path;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::dacpac::{self, metadata, DacPackage};
use crate::error::Result;
use crate::hash::Hasher;

/// Digest canonical metadata plus auxiliary streams in the given order
pub fn fingerprint_streams(canonical_metadata: &[u8], auxiliary: &[Vec<u8>]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(canonical_metadata);
    for stream in auxiliary {
        hasher.update(stream);
    }
    hasher.finalize()
}

/// Extract a package into scoped temp space, normalize its metadata, and
/// digest it together with any deployment scripts.
///
/// The extraction directory is removed best-effort on every exit path,
/// including errors; cleanup failures never affect the result.
pub fn fingerprint_package(package_path: &Path, cancel: &CancelToken) -> Result<String> {
    cancel.check()?;
    let extracted = DacPackage::open(package_path)?.extract_to_temp()?;
    cancel.check()?;

    let document = extracted.read(dacpac::MODEL_DOCUMENT)?;
    let canonical = metadata::normalize(&document)?;

    let mut auxiliary = Vec::new();
    if let Some(pre) = extracted.read_optional(dacpac::PREDEPLOY_SCRIPT)? {
        auxiliary.push(pre);
    }
    if let Some(post) = extracted.read_optional(dacpac::POSTDEPLOY_SCRIPT)? {
        auxiliary.push(post);
    }

    let fingerprint = fingerprint_streams(&canonical, &auxiliary);
    extracted.cleanup();
    debug!(
        "Fingerprint for {}: {}",
        package_path.display(),
        fingerprint
    );
    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hash::{sha256_upper, DIGEST_HEX_LEN};
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_test_package(entries: &[(&str, &[u8])]) -> NamedTempFile {
        let temp_file = NamedTempFile::with_suffix(".dacpac").unwrap();
        let mut writer = ZipWriter::new(temp_file.reopen().unwrap());
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
        temp_file
    }

    #[test]
    fn test_streams_digest_matches_concatenation() {
        let digest = fingerprint_streams(b"metadata", &[b"pre".to_vec(), b"post".to_vec()]);
        assert_eq!(digest, sha256_upper(b"metadataprepost"));
        assert_eq!(digest.len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_auxiliary_order_matters() {
        let forward = fingerprint_streams(b"m", &[b"a".to_vec(), b"b".to_vec()]);
        let reversed = fingerprint_streams(b"m", &[b"b".to_vec(), b"a".to_vec()]);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_package_fingerprint_is_deterministic() {
        let model = br#"<DataSchemaModel><Metadata Name="FileName" Value="C:\ci\App.dacpac"/></DataSchemaModel>"#;
        let package = write_test_package(&[("model.xml", model.as_slice())]);

        let cancel = CancelToken::new();
        let first = fingerprint_package(package.path(), &cancel).unwrap();
        let second = fingerprint_package(package.path(), &cancel).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn test_build_path_does_not_affect_fingerprint() {
        let model_a = br#"<DataSchemaModel><Metadata Name="FileName" Value="C:\agent1\App.dacpac"/></DataSchemaModel>"#;
        let model_b = br#"<DataSchemaModel><Metadata Name="FileName" Value="/agent2/work/App.dacpac"/></DataSchemaModel>"#;
        let package_a = write_test_package(&[("model.xml", model_a.as_slice())]);
        let package_b = write_test_package(&[("model.xml", model_b.as_slice())]);

        let cancel = CancelToken::new();
        let fp_a = fingerprint_package(package_a.path(), &cancel).unwrap();
        let fp_b = fingerprint_package(package_b.path(), &cancel).unwrap();
        assert_eq!(fp_a, fp_b);
    }

    #[test]
    fn test_deploy_scripts_change_fingerprint() {
        let model = b"<DataSchemaModel/>";
        let bare = write_test_package(&[("model.xml", model.as_slice())]);
        let with_pre = write_test_package(&[
            ("model.xml", model.as_slice()),
            ("predeploy.sql", b"PRINT 'pre'".as_slice()),
        ]);

        let cancel = CancelToken::new();
        let fp_bare = fingerprint_package(bare.path(), &cancel).unwrap();
        let fp_pre = fingerprint_package(with_pre.path(), &cancel).unwrap();
        assert_ne!(fp_bare, fp_pre);

        // Scripts contribute raw bytes, in predeploy/postdeploy order
        let canonical = metadata::normalize(model).unwrap();
        assert_eq!(
            fp_pre,
            fingerprint_streams(&canonical, &[b"PRINT 'pre'".to_vec()])
        );
    }

    #[test]
    fn test_missing_metadata_document_is_fatal() {
        let package = write_test_package(&[("predeploy.sql", b"PRINT 1".as_slice())]);
        let cancel = CancelToken::new();
        let err = fingerprint_package(package.path(), &cancel).unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_cancelled_token_aborts() {
        let package = write_test_package(&[("model.xml", b"<m/>".as_slice())]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = fingerprint_package(package.path(), &cancel).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
