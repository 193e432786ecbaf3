//! Statistics reporting.

use console::style;

use crate::download::SyncStats;

/// Print statistics for a finished run.
pub fn print_summary(stats: &SyncStats, failed_downloads_file: &str) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Mirror Statistics:").bold());
    println!("  Folders:    {}", stats.folders_visited);
    println!("  Downloaded: {}", stats.files_downloaded);
    println!("  Exported:   {}", stats.files_exported);
    println!("  Skipped:    {} (already present)", stats.files_skipped);
    if stats.files_failed > 0 {
        println!(
            "  Failed:     {} (see {})",
            style(stats.files_failed).red(),
            failed_downloads_file
        );
    }
    if stats.folders_failed > 0 {
        println!(
            "  Folders failed: {}",
            style(stats.folders_failed).red()
        );
    }
    println!("  Written:    {} bytes", stats.bytes_written);
    println!("{}", style("═".repeat(50)).dim());
}
