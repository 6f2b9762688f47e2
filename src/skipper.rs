// src/skipper.rs

//! Check and mark orchestration.
//!
//! Both flows run the same stages in a fixed order: derive the identity key,
//! connect to the target, fingerprint the package, then query or record.
//! Identity validation always runs first, so a bad key surfaces even when
//! the target is unreachable. Connectivity failures are treated differently
//! per flow: check applies [`ConnectivityPolicy`], mark always fails.

use std::path::Path;

use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::fingerprint;
use crate::identity::{self, KeyMode};
use crate::store::{Access, PropertyStore, SqliteStore, TargetDb};

/// What a check does when the target cannot be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityPolicy {
    /// Report the package as not deployed, so an unreachable target results
    /// in a deployment attempt rather than a silent skip.
    #[default]
    AssumeNotDeployed,
    /// Propagate the connectivity error instead.
    Fail,
}

/// Decides whether a package deployment can be skipped and records
/// completed deployments
#[derive(Debug, Clone, Default)]
pub struct Skipper {
    connectivity: ConnectivityPolicy,
}

impl Skipper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connectivity_policy(policy: ConnectivityPolicy) -> Self {
        Self {
            connectivity: policy,
        }
    }

    /// Check whether the package is already recorded in the target database.
    ///
    /// Returns `Ok(false)` for an unreachable target under the default
    /// policy; every other failure propagates.
    pub fn check(
        &self,
        package_path: &str,
        target: &TargetDb,
        mode: KeyMode,
        cancel: &CancelToken,
    ) -> Result<bool> {
        let key = identity::derive_key(package_path, mode)?;
        cancel.check()?;

        let store = match SqliteStore::connect(target, Access::ReadOnly, cancel) {
            Ok(store) => store,
            Err(Error::Connectivity { target: name, reason })
                if self.connectivity == ConnectivityPolicy::AssumeNotDeployed =>
            {
                warn!(
                    "Target database {} is not available ({}); reporting package as not deployed",
                    name, reason
                );
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let fingerprint = fingerprint::fingerprint_package(Path::new(package_path), cancel)?;
        cancel.check()?;

        let deployed = store.exists(&key, &fingerprint)?;
        if deployed {
            info!(
                "The package with id '{}' and checksum {} has already been deployed to database {}",
                key,
                fingerprint,
                store.target_name()
            );
        } else {
            info!(
                "The package with id '{}' and checksum {} has not been deployed to database {}",
                key,
                fingerprint,
                store.target_name()
            );
        }
        Ok(deployed)
    }

    /// Record the package in the target database.
    ///
    /// Fail-closed: an unreachable target is an error, never a silent
    /// success.
    pub fn mark(
        &self,
        package_path: &str,
        target: &TargetDb,
        mode: KeyMode,
        cancel: &CancelToken,
    ) -> Result<()> {
        let key = identity::derive_key(package_path, mode)?;
        cancel.check()?;

        let store = SqliteStore::connect(target, Access::ReadWrite, cancel)?;
        let fingerprint = fingerprint::fingerprint_package(Path::new(package_path), cancel)?;
        cancel.check()?;

        store.upsert(&key, &fingerprint)?;
        info!(
            "The package with id '{}' and checksum {} has been registered for database {}",
            key,
            fingerprint,
            store.target_name()
        );
        Ok(())
    }

    /// Check against any property store backend.
    ///
    /// The store is already connected, so no connectivity policy applies
    /// here; stage order is otherwise identical to [`Skipper::check`].
    pub fn check_with_store<S>(
        &self,
        store: &S,
        package_path: &str,
        mode: KeyMode,
        cancel: &CancelToken,
    ) -> Result<bool>
    where
        S: PropertyStore + ?Sized,
    {
        let key = identity::derive_key(package_path, mode)?;
        cancel.check()?;

        let fingerprint = fingerprint::fingerprint_package(Path::new(package_path), cancel)?;
        cancel.check()?;

        let deployed = store.exists(&key, &fingerprint)?;
        info!(
            "The package with id '{}' and checksum {} is {} in the property store",
            key,
            fingerprint,
            if deployed { "recorded" } else { "not recorded" }
        );
        Ok(deployed)
    }

    /// Record the package in any property store backend.
    pub fn mark_with_store<S>(
        &self,
        store: &S,
        package_path: &str,
        mode: KeyMode,
        cancel: &CancelToken,
    ) -> Result<()>
    where
        S: PropertyStore + ?Sized,
    {
        let key = identity::derive_key(package_path, mode)?;
        cancel.check()?;

        let fingerprint = fingerprint::fingerprint_package(Path::new(package_path), cancel)?;
        cancel.check()?;

        store.upsert(&key, &fingerprint)?;
        info!(
            "The package with id '{}' and checksum {} has been recorded in the property store",
            key, fingerprint
        );
        Ok(())
    }
}
