//! Configuration structures and loading logic.

use crate::api::ListOptions;
use crate::config::modes::ListingFailurePolicy;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// OAuth credential locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Client secret JSON downloaded from the Google Cloud console.
    #[serde(default = "default_client_secret_file")]
    pub client_secret_file: PathBuf,

    /// Where the OAuth token is persisted between runs.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            client_secret_file: default_client_secret_file(),
            token_file: default_token_file(),
        }
    }
}

/// Mirror options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Local directory the drive is mirrored into.
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// Remote folder to start from. `root` is the top of "My Drive".
    #[serde(default = "default_root_folder_id")]
    pub root_folder_id: String,

    /// Journal of file paths that could not be downloaded.
    #[serde(default = "default_failed_downloads_file")]
    pub failed_downloads_file: PathBuf,

    /// Journal of folders that could not be listed (journal policy only).
    #[serde(default = "default_failed_folders_file")]
    pub failed_folders_file: PathBuf,

    /// Format provider-native documents are exported to.
    #[serde(default = "default_export_mime_type")]
    pub export_mime_type: String,

    /// Items requested per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Whether trashed items are mirrored too.
    #[serde(default)]
    pub include_trashed: bool,

    /// What to do when a subfolder cannot be listed.
    #[serde(default)]
    pub listing_failure: ListingFailurePolicy,

    /// Whether to show byte progress for large transfers.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            root_folder_id: default_root_folder_id(),
            failed_downloads_file: default_failed_downloads_file(),
            failed_folders_file: default_failed_folders_file(),
            export_mime_type: default_export_mime_type(),
            page_size: default_page_size(),
            include_trashed: false,
            listing_failure: ListingFailurePolicy::default(),
            show_progress: true,
        }
    }
}

impl OptionsConfig {
    /// Listing options passed to the API client.
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            page_size: self.page_size,
            include_trashed: self.include_trashed,
        }
    }
}

fn default_client_secret_file() -> PathBuf {
    PathBuf::from("client_secret.json")
}

fn default_token_file() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_destination() -> PathBuf {
    PathBuf::from("./clone")
}

fn default_root_folder_id() -> String {
    "root".to_string()
}

fn default_failed_downloads_file() -> PathBuf {
    PathBuf::from("failed_downloads.txt")
}

fn default_failed_folders_file() -> PathBuf {
    PathBuf::from("failed_folders.txt")
}

fn default_export_mime_type() -> String {
    "application/pdf".to_string()
}

fn default_page_size() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.options.root_folder_id, "root");
        assert_eq!(config.options.destination, PathBuf::from("./clone"));
        assert_eq!(
            config.options.failed_downloads_file,
            PathBuf::from("failed_downloads.txt")
        );
        assert_eq!(config.options.export_mime_type, "application/pdf");
        assert_eq!(config.options.listing_failure, ListingFailurePolicy::Abort);
    }

    #[test]
    fn test_partial_options() {
        let config: Config = toml::from_str(
            r#"
            [credentials]
            token_file = "/tmp/token.json"

            [options]
            destination = "/backup/drive"
            page_size = 500
            listing_failure = "journal"
            "#,
        )
        .unwrap();

        assert_eq!(config.credentials.token_file, PathBuf::from("/tmp/token.json"));
        assert_eq!(
            config.credentials.client_secret_file,
            PathBuf::from("client_secret.json")
        );
        assert_eq!(config.options.destination, PathBuf::from("/backup/drive"));
        assert_eq!(config.options.listing_failure, ListingFailurePolicy::Journal);
        assert_eq!(
            config.options.list_options(),
            ListOptions {
                page_size: 500,
                include_trashed: false
            }
        );
    }

    #[test]
    fn test_unparsable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[options\npage_size = ").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::TomlParse(_))));
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load(&dir.path().join("nope.toml")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.options.include_trashed = true;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
