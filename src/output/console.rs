//! Console output utilities.
//!
//! The walk prints one line per visited folder and file, indented by depth.
//! These lines go to stdout and are independent of the tracing log.

use std::fmt::Display;
use std::path::Path;

use console::style;

/// Marker repeated once per level of depth.
pub const INDENT_MARKER: &str = "--";

/// Indentation prefix for a depth.
pub fn indent(depth: usize) -> String {
    INDENT_MARKER.repeat(depth)
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     drive-mirror                                      ║
║     Mirror a Google Drive tree to local disk          ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(root_folder_id: &str, destination: &str, listing_failure: &str) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Root folder: {}", root_folder_id);
    println!("  Destination: {}", destination);
    println!("  On listing failure: {}", listing_failure);
    println!();
}

pub fn print_folder(depth: usize, name: &str) {
    println!("{}{} {}", indent(depth), style("[Folder]").blue().bold(), name);
}

pub fn print_downloading_file(depth: usize, name: &str) {
    println!("{}[Downloading file] {}", indent(depth), name);
}

pub fn print_empty_folder(depth: usize, folder_id: &str) {
    println!("{}No files found in folder {}.", indent(depth), folder_id);
}

pub fn print_next_page(depth: usize, folder_id: &str) {
    println!("{}Fetching next page for folder {}.", indent(depth), folder_id);
}

pub fn print_folder_complete(depth: usize, folder_id: &str) {
    println!("{}Completed folder {}.", indent(depth), folder_id);
}

pub fn print_folder_failed(depth: usize, name: &str, error: &dyn Display) {
    println!(
        "{}{} Failed to list folder {} with error: {}",
        indent(depth),
        style("WARN").yellow().bold(),
        name,
        error
    );
}

pub fn print_already_exists(path: &Path) {
    println!(
        "{}",
        style(format!(
            "File {} already exists, skipping download",
            path.display()
        ))
        .dim()
    );
}

pub fn print_writing(path: &Path) {
    println!("Writing file {}", path.display());
}

pub fn print_downloaded(path: &Path) {
    println!("{} Downloaded '{}' successfully.", style("OK").green(), path.display());
}
