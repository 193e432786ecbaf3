//! Path and directory management.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::Result;

/// Suffix marking in-progress downloads.
pub const STAGING_SUFFIX: &str = ".temp";

/// Local path of a remote child, always inside `parent`.
///
/// Separators in a name nest the child (`a/b` becomes `parent/a/b`). Root,
/// prefix, `.` and `..` components are dropped. Otherwise names are used
/// verbatim: two siblings with the same name map to the same path, and names
/// that are illegal on the local filesystem fail when used.
pub fn local_child_path(parent: &Path, name: &str) -> PathBuf {
    let mut path = parent.to_path_buf();
    for component in Path::new(name).components() {
        if let Component::Normal(part) = component {
            path.push(part);
        }
    }
    path
}

/// Append a literal suffix to the last path component.
///
/// Unlike [`Path::with_extension`] this never replaces an existing extension,
/// so `report.txt` becomes `report.txt.temp`.
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Staging file for a final path: `<path>.temp`.
pub fn staging_path(final_path: &Path) -> PathBuf {
    append_suffix(final_path, STAGING_SUFFIX)
}

/// File extension for an export format, without the dot.
pub fn export_extension(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "application/pdf" => Some("pdf"),
        other => mime_guess::get_mime_extensions_str(other).and_then(|exts| exts.first().copied()),
    }
}

/// Ensure a directory exists, creating it and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
