//! Drive Mirror - Mirror a Google Drive folder tree to local disk
//!
//! This library walks a remote folder tree depth-first and reproduces it on
//! the local filesystem.
//!
//! # Features
//!
//! - Depth-first pre-order walk with paginated listings
//! - Resumable runs: files already on disk are never fetched again
//! - Atomic commits through a `.temp` staging file
//! - Provider-native documents exported to PDF
//! - Failure journals for files and, optionally, folders
//! - OAuth2 with a persisted, auto-refreshed token
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use drive_mirror::{api::StaticToken, download::mirror_drive, Config, DriveClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let token = Arc::new(StaticToken("ya29.access-token".to_string()));
//!     let client = DriveClient::new(token, config.options.list_options())?;
//!
//!     let stats = mirror_drive(&client, &config.options).await?;
//!     println!("{} files written", stats.total_written());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod output;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use api::{DriveApi, DriveClient};
pub use config::{Config, ListingFailurePolicy};
pub use download::{mirror_drive, SyncStats, TreeWalker};
pub use error::{Error, Result};
