// src/lib.rs

//! Dacskip
//!
//! Deployment guard for dacpac packages: decide whether a package has
//! already been applied to a target database, and record applied
//! deployments durably in the target itself.
//!
//! # How it works
//!
//! - Content fingerprint: the package metadata document is normalized so
//!   build-host paths do not matter, then digested together with the
//!   optional pre/post deployment scripts
//! - Identity key: the package file name, or a digest of the package path
//! - Durable record: one row per identity key in a tool-owned table inside
//!   the target database, queried by `check` and written by `mark`

pub mod cancel;
pub mod dacpac;
mod error;
pub mod fingerprint;
pub mod hash;
pub mod identity;
pub mod skipper;
pub mod store;

pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use identity::{derive_key, KeyMode, MAX_KEY_LEN};
pub use skipper::{ConnectivityPolicy, Skipper};
pub use store::{Access, PropertyStore, SqliteStore, TargetDb};
