//! Run statistics.

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The final file already existed.
    Skipped,
    /// Raw content was written.
    Downloaded { bytes: u64 },
    /// An exported document was written.
    Exported { bytes: u64 },
    /// Nothing was written and the path was journaled.
    Failed,
}

/// Counters for one mirror run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub folders_visited: u64,
    pub folders_failed: u64,
    pub files_downloaded: u64,
    pub files_exported: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub bytes_written: u64,
}

impl SyncStats {
    /// Count a folder whose listing started.
    pub fn increment_folder(&mut self) {
        self.folders_visited += 1;
    }

    /// Count a folder that could not be listed.
    pub fn increment_failed_folder(&mut self) {
        self.folders_failed += 1;
    }

    /// Count the outcome of one file.
    pub fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Skipped => self.files_skipped += 1,
            FetchOutcome::Downloaded { bytes } => {
                self.files_downloaded += 1;
                self.bytes_written += bytes;
            }
            FetchOutcome::Exported { bytes } => {
                self.files_exported += 1;
                self.bytes_written += bytes;
            }
            FetchOutcome::Failed => self.files_failed += 1,
        }
    }

    /// Files written during this run.
    pub fn total_written(&self) -> u64 {
        self.files_downloaded + self.files_exported
    }

    /// Files seen during this run, whatever happened to them.
    pub fn total_files(&self) -> u64 {
        self.total_written() + self.files_skipped + self.files_failed
    }

    /// Whether anything needs a re-run.
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0 || self.folders_failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcomes() {
        let mut stats = SyncStats::default();
        stats.record(FetchOutcome::Downloaded { bytes: 10 });
        stats.record(FetchOutcome::Exported { bytes: 5 });
        stats.record(FetchOutcome::Skipped);
        assert!(!stats.has_failures());

        stats.record(FetchOutcome::Failed);
        assert!(stats.has_failures());

        assert_eq!(stats.total_written(), 2);
        assert_eq!(stats.total_files(), 4);
        assert_eq!(stats.bytes_written, 15);
    }

    #[test]
    fn test_failed_folder_is_a_failure() {
        let mut stats = SyncStats::default();
        stats.increment_folder();
        stats.increment_failed_folder();
        assert!(stats.has_failures());
    }
}
