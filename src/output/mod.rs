//! Output module for console output and progress.
//!
//! Provides:
//! - The per-node walk trace and colored messages
//! - Progress bars
//! - Statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    indent, print_already_exists, print_banner, print_config_summary, print_downloaded,
    print_downloading_file, print_empty_folder, print_error, print_folder, print_folder_complete,
    print_folder_failed, print_info, print_next_page, print_warning, print_writing,
};
pub use progress::create_download_bar;
pub use stats::print_summary;
