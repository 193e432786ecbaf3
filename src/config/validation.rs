//! Configuration validation logic.

use crate::api::MAX_PAGE_SIZE;
use crate::config::loader::Config;
use crate::error::{Error, Result};
use crate::fs::export_extension;
use regex::Regex;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_folder_id(&config.options.root_folder_id)?;
    validate_page_size(config.options.page_size)?;
    validate_export_mime_type(&config.options.export_mime_type)?;

    if config.options.destination.as_os_str().is_empty() {
        return Err(Error::MissingConfig("destination".to_string()));
    }

    if config.options.failed_downloads_file.as_os_str().is_empty() {
        return Err(Error::MissingConfig("failed_downloads_file".to_string()));
    }

    if config.options.failed_folders_file.as_os_str().is_empty() {
        return Err(Error::MissingConfig("failed_folders_file".to_string()));
    }

    Ok(())
}

/// Validate a remote folder id. Drive ids are URL-safe base64-ish strings.
pub fn validate_folder_id(folder_id: &str) -> Result<()> {
    if folder_id.is_empty() {
        return Err(Error::MissingConfig("root_folder_id".to_string()));
    }

    let id_pattern = Regex::new(r"^[A-Za-z0-9_-]+$")
        .map_err(|e| Error::Config(format!("Invalid folder id pattern: {}", e)))?;

    if !id_pattern.is_match(folder_id) {
        return Err(Error::ConfigValidation {
            field: "root_folder_id".to_string(),
            message: format!(
                "'{}' is not a valid folder id. Use 'root' or the id from the folder's URL.",
                folder_id
            ),
        });
    }

    Ok(())
}

/// Validate the listing page size.
pub fn validate_page_size(page_size: u32) -> Result<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::ConfigValidation {
            field: "page_size".to_string(),
            message: format!(
                "Page size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, page_size
            ),
        });
    }

    Ok(())
}

/// Validate the export format.
pub fn validate_export_mime_type(mime_type: &str) -> Result<()> {
    if mime_type.is_empty() {
        return Err(Error::MissingConfig("export_mime_type".to_string()));
    }

    if export_extension(mime_type).is_none() {
        return Err(Error::ConfigValidation {
            field: "export_mime_type".to_string(),
            message: format!("No file extension is known for '{}'", mime_type),
        });
    }

    Ok(())
}
