//! Google Drive v3 HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::api::auth::AccessToken;
use crate::api::drive::DriveApi;
use crate::api::types::*;
use crate::error::{Error, Result};

/// Drive API base URL.
const API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Fields requested for each listed file.
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// Maximum page size accepted by the listing endpoint.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Options applied to every listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: u32,
    pub include_trashed: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            include_trashed: false,
        }
    }
}

/// Drive API client authenticating each request with a bearer token.
pub struct DriveClient {
    client: Client,
    base_url: String,
    token: Arc<dyn AccessToken>,
    options: ListOptions,
}

impl DriveClient {
    /// Create a client against the public Drive API.
    pub fn new(token: Arc<dyn AccessToken>, options: ListOptions) -> Result<Self> {
        Self::with_base_url(token, options, API_BASE)
    }

    /// Create a client with a custom base URL (useful for testing).
    pub fn with_base_url(
        token: Arc<dyn AccessToken>,
        options: ListOptions,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            options,
        })
    }

    /// Build the listing query for the direct children of a folder.
    pub fn children_query(&self, parent_id: &str) -> String {
        let parent = parent_id.replace('\\', "\\\\").replace('\'', "\\'");
        if self.options.include_trashed {
            format!("'{}' in parents", parent)
        } else {
            format!("'{}' in parents and trashed = false", parent)
        }
    }

    /// Make an authenticated GET request.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        let bearer = self.token.bearer().await?;

        tracing::debug!("GET {} {:?}", url, query);

        let request: RequestBuilder = self.client.get(&url).query(query).bearer_auth(bearer);
        let response = request.send().await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
            StatusCode::UNAUTHORIZED => Err(Error::Authentication(format!(
                "HTTP {}: {}",
                status, message
            ))),
            _ => Err(Error::Api(format!("HTTP {}: {}", status, message))),
        }
    }

    fn into_content(response: Response) -> Content {
        Content {
            length: response.content_length(),
            stream: response
                .bytes_stream()
                .map_ok(|chunk| chunk.to_vec())
                .map_err(Error::from)
                .boxed(),
        }
    }
}

/// Longest response excerpt quoted in an error.
const MAX_LOGGED_BODY_CHARS: usize = 500;

/// At most `max` characters of `text`, cut on a character boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[async_trait]
impl DriveApi for DriveClient {
    async fn list(&self, parent_id: &str, page_token: Option<&str>) -> Result<Page> {
        let q = self.children_query(parent_id);
        let page_size = self.options.page_size.to_string();

        let mut query = vec![
            ("q", q.as_str()),
            ("spaces", "drive"),
            ("fields", LIST_FIELDS),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.get("/files", &query).await?;
        let text = response.text().await?;
        let list: FileList = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse file list: {} - Response: {}",
                e,
                truncate_chars(&text, MAX_LOGGED_BODY_CHARS)
            ))
        })?;

        Ok(list.into())
    }

    async fn get_mime_type(&self, file_id: &str) -> Result<String> {
        let path = format!("/files/{}", file_id);
        let metadata: FileMetadata = self
            .get(&path, &[("fields", "mimeType")])
            .await?
            .json()
            .await?;

        Ok(metadata.mime_type)
    }

    async fn download_raw(&self, file_id: &str) -> Result<Content> {
        let path = format!("/files/{}", file_id);
        let response = self
            .get(&path, &[("alt", "media")])
            .await
            .map_err(|e| Error::Download(e.to_string()))?;

        Ok(Self::into_content(response))
    }

    async fn export_as(&self, file_id: &str, mime_type: &str) -> Result<Content> {
        let path = format!("/files/{}/export", file_id);
        let response = self
            .get(&path, &[("mimeType", mime_type)])
            .await
            .map_err(|e| Error::Export {
                mime_type: mime_type.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self::into_content(response))
    }
}
