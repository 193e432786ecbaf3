//! Google Drive API module.
//!
//! This module provides:
//! - The `DriveApi` port used by the walker and fetcher
//! - HTTP client for the Drive v3 REST API
//! - OAuth2 authorization and token persistence
//! - API response types

pub mod auth;
pub mod client;
pub mod drive;
pub mod types;

pub use auth::{AccessToken, FileTokenStore, RefreshingToken, StaticToken, Token, TokenStore};
pub use client::{DriveClient, ListOptions, MAX_PAGE_SIZE};
pub use drive::DriveApi;
pub use types::*;
