//! Single file download with staging and atomic commit.
//!
//! A file is streamed into `<path>.temp` (or `<path>.temp.<ext>` for
//! exported documents) and renamed into place only once fully written, so the
//! existence of the final path always means a complete download. That makes
//! re-runs resumable at whole-file granularity.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::{is_native_mime_type, Content, DriveApi};
use crate::download::journal::FailureJournal;
use crate::download::state::FetchOutcome;
use crate::error::{Error, Result};
use crate::fs::{append_suffix, export_extension, staging_path};
use crate::output::{
    create_download_bar, print_already_exists, print_downloaded, print_writing,
};

/// Minimum file size to show a progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// How a file's content is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Representation {
    Raw,
    Export { mime_type: String, extension: String },
}

impl Representation {
    fn staging_path(&self, final_path: &Path) -> PathBuf {
        match self {
            Representation::Raw => staging_path(final_path),
            Representation::Export { extension, .. } => {
                append_suffix(&staging_path(final_path), &format!(".{}", extension))
            }
        }
    }

    fn committed_path(&self, final_path: &Path) -> PathBuf {
        match self {
            Representation::Raw => final_path.to_path_buf(),
            Representation::Export { extension, .. } => {
                append_suffix(final_path, &format!(".{}", extension))
            }
        }
    }
}

/// Downloads files and journals the ones that fail.
pub struct Fetcher<'a> {
    api: &'a dyn DriveApi,
    journal: &'a dyn FailureJournal,
    export_mime_type: String,
    export_extension: String,
    show_progress: bool,
}

impl<'a> Fetcher<'a> {
    /// Create a fetcher exporting native documents to `export_mime_type`.
    pub fn new(
        api: &'a dyn DriveApi,
        journal: &'a dyn FailureJournal,
        export_mime_type: impl Into<String>,
    ) -> Result<Self> {
        let export_mime_type = export_mime_type.into();
        let export_extension = export_extension(&export_mime_type)
            .ok_or_else(|| Error::ConfigValidation {
                field: "export_mime_type".to_string(),
                message: format!("No file extension is known for '{}'", export_mime_type),
            })?
            .to_string();

        Ok(Self {
            api,
            journal,
            export_mime_type,
            export_extension,
            show_progress: false,
        })
    }

    /// Show a byte progress bar for large transfers.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Mirror one remote file to `final_path`.
    ///
    /// Never fails: any error after the existence check is logged, the
    /// intended `final_path` is journaled and [`FetchOutcome::Failed`] is
    /// returned so the walk can continue.
    pub async fn fetch(&self, file_id: &str, final_path: &Path) -> FetchOutcome {
        if final_path.exists() {
            print_already_exists(final_path);
            return FetchOutcome::Skipped;
        }

        match self.try_fetch(file_id, final_path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", final_path.display(), e);
                self.journal.record(final_path);
                FetchOutcome::Failed
            }
        }
    }

    async fn try_fetch(&self, file_id: &str, final_path: &Path) -> Result<FetchOutcome> {
        remove_stale_staging(final_path).await?;

        let mime_type = self.api.get_mime_type(file_id).await?;
        let representation = self.resolve(&mime_type);
        let committed = representation.committed_path(final_path);

        // Exported documents land under a different name than the one checked above.
        if committed != final_path && committed.exists() {
            print_already_exists(&committed);
            return Ok(FetchOutcome::Skipped);
        }

        let content = match &representation {
            Representation::Raw => self.api.download_raw(file_id).await?,
            Representation::Export { mime_type, .. } => {
                self.api.export_as(file_id, mime_type).await?
            }
        };

        let staging = representation.staging_path(final_path);
        print_writing(&staging);

        let bytes = match self.write_staging(content, &staging).await {
            Ok(bytes) => bytes,
            Err(e) => {
                // A partial staging file is never resumed; drop it right away.
                if let Err(remove_err) = tokio::fs::remove_file(&staging).await {
                    tracing::debug!(
                        "Could not remove partial {}: {}",
                        staging.display(),
                        remove_err
                    );
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&staging, &committed)
            .await
            .map_err(|source| Error::Commit {
                staging: staging.clone(),
                source,
            })?;

        print_downloaded(&committed);

        Ok(match representation {
            Representation::Raw => FetchOutcome::Downloaded { bytes },
            Representation::Export { .. } => FetchOutcome::Exported { bytes },
        })
    }

    fn resolve(&self, mime_type: &str) -> Representation {
        if is_native_mime_type(mime_type) {
            Representation::Export {
                mime_type: self.export_mime_type.clone(),
                extension: self.export_extension.clone(),
            }
        } else {
            Representation::Raw
        }
    }

    /// Stream content into the staging file. The file handle and the
    /// remote stream are both dropped before this returns.
    async fn write_staging(&self, content: Content, staging: &Path) -> Result<u64> {
        let show_progress = self.show_progress
            && content.length.map(|l| l > PROGRESS_THRESHOLD).unwrap_or(false);
        let progress = if show_progress {
            Some(create_download_bar(content.length.unwrap_or(0)))
        } else {
            None
        };

        let mut file = File::create(staging).await?;
        let mut stream = content.stream;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(written);
            }
        }

        file.flush().await?;
        drop(file);

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(written)
    }
}

/// Delete staging files left behind by an aborted run.
async fn remove_stale_staging(final_path: &Path) -> Result<()> {
    let staging = staging_path(final_path);
    match tokio::fs::remove_file(&staging).await {
        Ok(()) => {
            tracing::debug!("Removed stale staging file {}", staging.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingJournal, StubContent, StubDrive};

    const PDF: &str = "application/pdf";
    const DOC: &str = "application/vnd.google-apps.document";

    #[tokio::test]
    async fn test_downloads_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file("f1", "text/plain", b"hello world");
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();

        let target = dir.path().join("notes.txt");
        let outcome = fetcher.fetch("f1", &target).await;

        assert_eq!(outcome, FetchOutcome::Downloaded { bytes: 11 });
        assert_eq!(std::fs::read(&target).unwrap(), b"hello world");
        assert!(!staging_path(&target).exists());
        assert!(journal.files().is_empty());
    }

    #[tokio::test]
    async fn test_second_fetch_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file("f1", "text/plain", b"data");
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();
        let target = dir.path().join("a.bin");

        fetcher.fetch("f1", &target).await;
        let outcome = fetcher.fetch("f1", &target).await;

        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(api.content_calls(), 1);
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_staging_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("photo.jpg");
        std::fs::write(staging_path(&target), b"stale partial bytes from last run").unwrap();

        let api = StubDrive::new().file("f1", "image/jpeg", b"fresh");
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();

        let outcome = fetcher.fetch("f1", &target).await;

        assert_eq!(outcome, FetchOutcome::Downloaded { bytes: 5 });
        assert_eq!(std::fs::read(&target).unwrap(), b"fresh");
        assert!(!staging_path(&target).exists());
    }

    #[tokio::test]
    async fn test_native_document_is_exported() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file("d1", DOC, b"%PDF-1.7");
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();
        let target = dir.path().join("Budget");

        let outcome = fetcher.fetch("d1", &target).await;

        assert_eq!(outcome, FetchOutcome::Exported { bytes: 8 });
        assert_eq!(
            api.calls(),
            vec![
                Call::MimeType("d1".into()),
                Call::Export {
                    file_id: "d1".into(),
                    mime_type: PDF.into()
                },
            ]
        );
        assert!(!target.exists());
        assert_eq!(
            std::fs::read(dir.path().join("Budget.pdf")).unwrap(),
            b"%PDF-1.7"
        );
        assert!(!dir.path().join("Budget.temp.pdf").exists());
    }

    #[tokio::test]
    async fn test_exported_document_is_not_fetched_twice() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file("d1", DOC, b"%PDF");
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();
        let target = dir.path().join("Plan");

        fetcher.fetch("d1", &target).await;
        let outcome = fetcher.fetch("d1", &target).await;

        assert_eq!(outcome, FetchOutcome::Skipped);
        assert_eq!(api.content_calls(), 1);
    }

    #[tokio::test]
    async fn test_stream_failure_leaves_no_final_file() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file_with(
            "f1",
            Some("video/mp4"),
            StubContent::BreaksAfter(b"first chunk".to_vec()),
        );
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();
        let target = dir.path().join("clip.mp4");

        let outcome = fetcher.fetch("f1", &target).await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert!(!target.exists());
        assert!(!staging_path(&target).exists());
        assert_eq!(journal.files(), vec![target]);
    }

    #[tokio::test]
    async fn test_metadata_failure_is_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file_with("f1", None, StubContent::Bytes(vec![1]));
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();
        let target = dir.path().join("x");

        assert_eq!(fetcher.fetch("f1", &target).await, FetchOutcome::Failed);
        assert_eq!(api.content_calls(), 0);
        assert_eq!(journal.files(), vec![target]);
    }

    #[tokio::test]
    async fn test_export_failure_journals_intended_path() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubDrive::new().file_with(
            "form",
            Some("application/vnd.google-apps.form"),
            StubContent::Unavailable,
        );
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();
        let target = dir.path().join("Survey");

        assert_eq!(fetcher.fetch("form", &target).await, FetchOutcome::Failed);
        assert_eq!(journal.files(), vec![target]);
        assert!(!dir.path().join("Survey.pdf").exists());
    }

    #[tokio::test]
    async fn test_existing_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("kept.txt");
        std::fs::write(&target, b"local copy").unwrap();

        let api = StubDrive::new().file("f1", "text/plain", b"remote copy");
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();

        assert_eq!(fetcher.fetch("f1", &target).await, FetchOutcome::Skipped);
        assert!(api.calls().is_empty());
        assert_eq!(std::fs::read(&target).unwrap(), b"local copy");
    }

    #[tokio::test]
    async fn test_rename_failure_keeps_staging_and_journals() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("video.mp4");
        let api = StubDrive::new().file_with(
            "v1",
            Some("video/mp4"),
            StubContent::Occupied {
                bytes: b"complete".to_vec(),
                occupant: target.clone(),
            },
        );
        let journal = RecordingJournal::default();
        let fetcher = Fetcher::new(&api, &journal, PDF).unwrap();

        let outcome = fetcher.fetch("v1", &target).await;

        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(journal.files(), vec![target.clone()]);
        assert_eq!(std::fs::read(staging_path(&target)).unwrap(), b"complete");
        assert!(target.is_dir());
    }

    #[test]
    fn test_unknown_export_format_is_rejected() {
        let api = StubDrive::new();
        let journal = RecordingJournal::default();
        assert!(Fetcher::new(&api, &journal, "application/x-nope").is_err());
    }
}
