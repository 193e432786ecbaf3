//! Configuration module for drive-mirror.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Listing failure policy selection
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, CredentialsConfig, OptionsConfig};
pub use modes::ListingFailurePolicy;
pub use validation::validate_config;
