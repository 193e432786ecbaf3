//! Download module for mirroring a drive tree.
//!
//! This module provides:
//! - The depth-first tree walker
//! - Per-file fetching through a staging file
//! - Failure journals
//! - Run statistics

pub mod fetcher;
pub mod journal;
pub mod state;
pub mod walker;

pub use fetcher::Fetcher;
pub use journal::{FailureJournal, FolderJournal, JournalFile};
pub use state::{FetchOutcome, SyncStats};
pub use walker::TreeWalker;

use crate::api::DriveApi;
use crate::config::OptionsConfig;
use crate::error::Result;

/// Mirror `options.root_folder_id` into `options.destination`.
///
/// Failed files end up in `options.failed_downloads_file`; unlistable
/// folders end up in `options.failed_folders_file` when the listing failure
/// policy is `journal`.
pub async fn mirror_drive(api: &dyn DriveApi, options: &OptionsConfig) -> Result<SyncStats> {
    let file_journal = JournalFile::new(&options.failed_downloads_file);
    let folder_journal = JournalFile::new(&options.failed_folders_file);

    let fetcher = Fetcher::new(api, &file_journal, options.export_mime_type.as_str())?
        .with_progress(options.show_progress);
    let walker = TreeWalker::new(api, fetcher, &folder_journal, options.listing_failure);

    tracing::info!(
        "Mirroring folder {} into {}",
        options.root_folder_id,
        options.destination.display()
    );
    let stats = walker
        .run(&options.root_folder_id, &options.destination)
        .await?;
    tracing::info!(
        "Mirror finished: {} written, {} skipped, {} failed",
        stats.total_written(),
        stats.files_skipped,
        stats.files_failed
    );

    Ok(stats)
}
