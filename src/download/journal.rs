//! Append-only failure journals.
//!
//! Journals are opened, appended to and closed for every record, so no
//! handle is kept between failures.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sink for files that could not be mirrored.
pub trait FailureJournal: Send + Sync {
    /// Record the intended final path of a file that was not written.
    fn record(&self, path: &Path);
}

/// Sink for folders that could not be listed.
pub trait FolderJournal: Send + Sync {
    fn record_folder(&self, folder_id: &str, local_path: &Path, error: &str);
}

/// A journal backed by a text file, created on the first record.
#[derive(Debug, Clone)]
pub struct JournalFile {
    path: PathBuf,
}

impl JournalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", line));

        if let Err(e) = result {
            tracing::error!(
                "Unable to write to journal {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl FailureJournal for JournalFile {
    fn record(&self, path: &Path) {
        self.append_line(&path.display().to_string());
    }
}

impl FolderJournal for JournalFile {
    fn record_folder(&self, folder_id: &str, local_path: &Path, error: &str) {
        // One record per line; the error text must not break the line format.
        let error = error.replace(['\r', '\n'], " ");
        self.append_line(&format!("{},{},{}", folder_id, local_path.display(), error));
    }
}
