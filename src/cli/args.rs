//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, ListingFailurePolicy};

/// Google Drive mirror CLI.
#[derive(Parser, Debug)]
#[command(
    name = "drive-mirror",
    version,
    about = "Mirror a Google Drive folder tree to local disk",
    long_about = "Walks a Google Drive folder tree depth-first and downloads every file into a \
                  local directory.\n\n\
                  Re-running resumes: files already on disk are skipped, and files that failed \
                  are listed in the failed downloads journal."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Local directory to mirror into.
    #[arg(short, long, env = "DRIVE_MIRROR_DESTINATION")]
    pub destination: Option<PathBuf>,

    /// Remote folder ID to start from ("root" for My Drive).
    #[arg(short, long)]
    pub root: Option<String>,

    /// What to do when a subfolder cannot be listed.
    #[arg(long, value_enum)]
    pub listing_failure: Option<ListingFailureArg>,

    /// Hide byte progress for large transfers.
    #[arg(long, short)]
    pub quiet: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    pub init_config: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI listing failure policy argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListingFailureArg {
    /// Stop the run.
    Abort,
    /// Record the folder in the folder journal and continue.
    Journal,
}

impl From<ListingFailureArg> for ListingFailurePolicy {
    fn from(arg: ListingFailureArg) -> Self {
        match arg {
            ListingFailureArg::Abort => ListingFailurePolicy::Abort,
            ListingFailureArg::Journal => ListingFailurePolicy::Journal,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(ref destination) = self.destination {
            config.options.destination = destination.clone();
        }

        if let Some(ref root) = self.root {
            config.options.root_folder_id = root.clone();
        }

        if let Some(policy) = self.listing_failure {
            config.options.listing_failure = policy.into();
        }

        // Only override when set
        if self.quiet {
            config.options.show_progress = false;
        }
    }
}
