//! Error types for the drive-mirror application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid client credentials in {}: {message}", path.display())]
    Credentials { path: PathBuf, message: String },

    // API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited by the remote service")]
    RateLimited,

    #[error("Unable to list folder {folder_id}: {message}")]
    Listing { folder_id: String, message: String },

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Export to {mime_type} failed: {message}")]
    Export { mime_type: String, message: String },

    #[error("Unable to move {} into place: {source}", staging.display())]
    Commit {
        staging: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Aborted: {0}")]
    Aborted(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Exit code the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_)
            | Error::ConfigValidation { .. }
            | Error::MissingConfig(_)
            | Error::Credentials { .. }
            | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
            Error::Api(_)
            | Error::Authentication(_)
            | Error::RateLimited
            | Error::Listing { .. }
            | Error::Http(_) => exit_codes::API_ERROR,
            Error::Download(_) | Error::Export { .. } | Error::Commit { .. } => {
                exit_codes::DOWNLOAD_ERROR
            }
            Error::Aborted(_) => exit_codes::ABORT,
            _ => exit_codes::UNEXPECTED_ERROR,
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORT: i32 = 1;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
