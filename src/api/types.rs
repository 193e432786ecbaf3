//! Remote node and API response type definitions.

use futures::stream::BoxStream;
use serde::Deserialize;

use crate::error::Result;

/// Mime type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Prefix shared by all provider-native document types (Docs, Sheets, Slides, ...).
///
/// These have no raw byte content and must be exported.
pub const NATIVE_MIME_PREFIX: &str = "application/vnd.google-apps.";

/// Whether a mime type denotes a provider-native document.
pub fn is_native_mime_type(mime_type: &str) -> bool {
    mime_type.starts_with(NATIVE_MIME_PREFIX)
}

/// What a remote node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    File { mime_type: String },
}

/// A single entry returned by the listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

impl RemoteNode {
    /// Create a folder node.
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::Folder,
        }
    }

    /// Create a file node.
    pub fn file(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: NodeKind::File {
                mime_type: mime_type.into(),
            },
        }
    }
}

impl From<DriveFile> for RemoteNode {
    fn from(file: DriveFile) -> Self {
        if file.mime_type == FOLDER_MIME_TYPE {
            RemoteNode::folder(file.id, file.name)
        } else {
            RemoteNode::file(file.id, file.name, file.mime_type)
        }
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<RemoteNode>,
    /// Present when more pages follow.
    pub next_page_token: Option<String>,
}

impl From<FileList> for Page {
    fn from(list: FileList) -> Self {
        Self {
            items: list.files.into_iter().map(RemoteNode::from).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// Stream of content chunks.
pub type ContentStream = BoxStream<'static, Result<Vec<u8>>>;

/// Downloadable content of a file, raw or exported.
pub struct Content {
    /// Size reported by the server, if any.
    pub length: Option<u64>,
    pub stream: ContentStream,
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Content")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Response of `GET /files`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

/// File resource as requested with `files(id, name, mimeType)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Response of `GET /files/{id}?fields=mimeType`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub mime_type: String,
}

/// Error body returned by the Drive API.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}
