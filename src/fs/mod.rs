//! Filesystem module.
//!
//! Provides:
//! - Local path derivation for remote nodes
//! - Staging and export file names

pub mod paths;

pub use paths::{
    append_suffix, ensure_dir, export_extension, local_child_path, staging_path, STAGING_SUFFIX,
};
