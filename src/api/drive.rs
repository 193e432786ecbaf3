//! The remote drive port consumed by the walker and fetcher.

use async_trait::async_trait;

use crate::api::types::{Content, Page};
use crate::error::Result;

/// Operations the mirror needs from a remote drive.
///
/// Every call is awaited to completion before the next one is issued, so
/// implementations never see concurrent requests from the mirror.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// List one page of the direct children of `parent_id`.
    ///
    /// `page_token` is `None` for the first page and the previous page's
    /// continuation token afterwards.
    async fn list(&self, parent_id: &str, page_token: Option<&str>) -> Result<Page>;

    /// Look up the mime type of a file.
    async fn get_mime_type(&self, file_id: &str) -> Result<String>;

    /// Open the raw content stream of a file.
    async fn download_raw(&self, file_id: &str) -> Result<Content>;

    /// Open a stream of the file converted to `mime_type` by the server.
    async fn export_as(&self, file_id: &str, mime_type: &str) -> Result<Content>;
}
