//! In-memory drive and journals shared by the engine tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;

use crate::api::{Content, DriveApi, Page, RemoteNode};
use crate::download::{FailureJournal, FolderJournal};
use crate::error::{Error, Result};

/// A call made against [`StubDrive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        parent: String,
        page_token: Option<String>,
    },
    MimeType(String),
    Raw(String),
    Export {
        file_id: String,
        mime_type: String,
    },
}

/// How a stub file's content behaves.
#[derive(Debug, Clone)]
pub enum StubContent {
    Bytes(Vec<u8>),
    /// Yields the bytes, then fails mid-stream.
    BreaksAfter(Vec<u8>),
    /// The content request itself fails.
    Unavailable,
    /// Yields the bytes, then a directory appears at `occupant` before the
    /// stream ends, so nothing can be renamed onto it.
    Occupied { bytes: Vec<u8>, occupant: PathBuf },
}

#[derive(Debug, Clone)]
struct StubFile {
    mime_type: Option<String>,
    content: StubContent,
}

/// A scripted drive recording every call in order.
#[derive(Default)]
pub struct StubDrive {
    folders: HashMap<String, Vec<Vec<RemoteNode>>>,
    failing_folders: HashSet<String>,
    failing_pages: HashSet<(String, usize)>,
    files: HashMap<String, StubFile>,
    calls: Mutex<Vec<Call>>,
}

impl StubDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` for a folder; page `n > 0` is requested with token `page-n`.
    pub fn folder(mut self, id: &str, pages: Vec<Vec<RemoteNode>>) -> Self {
        self.folders.insert(id.to_string(), pages);
        self
    }

    /// Fail every listing of a folder.
    pub fn failing_folder(mut self, id: &str) -> Self {
        self.failing_folders.insert(id.to_string());
        self
    }

    /// Fail only the listing of page `index` of a folder.
    pub fn failing_page(mut self, id: &str, index: usize) -> Self {
        self.failing_pages.insert((id.to_string(), index));
        self
    }

    pub fn file(self, id: &str, mime_type: &str, bytes: &[u8]) -> Self {
        self.file_with(id, Some(mime_type), StubContent::Bytes(bytes.to_vec()))
    }

    /// A file whose metadata lookup fails when `mime_type` is `None`.
    pub fn file_with(mut self, id: &str, mime_type: Option<&str>, content: StubContent) -> Self {
        self.files.insert(
            id.to_string(),
            StubFile {
                mime_type: mime_type.map(str::to_string),
                content,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of raw or export requests.
    pub fn content_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Raw(_) | Call::Export { .. }))
            .count()
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn content_of(&self, file_id: &str) -> Result<Content> {
        let file = self
            .files
            .get(file_id)
            .ok_or_else(|| Error::Api(format!("HTTP 404 Not Found: {}", file_id)))?;

        let chunks: Vec<Result<Vec<u8>>> = match &file.content {
            StubContent::Bytes(bytes) => bytes.chunks(4).map(|c| Ok(c.to_vec())).collect(),
            StubContent::BreaksAfter(bytes) => vec![
                Ok(bytes.clone()),
                Err(Error::Download("connection reset".to_string())),
            ],
            StubContent::Unavailable => {
                return Err(Error::Download("HTTP 500 Internal Server Error".to_string()))
            }
            StubContent::Occupied { bytes, occupant } => {
                let bytes = bytes.clone();
                let occupant = occupant.clone();
                let occupy = futures::stream::once(async move {
                    std::fs::create_dir_all(occupant.join("taken")).map_err(Error::Io)?;
                    Ok::<_, Error>(Vec::new())
                });
                return Ok(Content {
                    length: None,
                    stream: futures::stream::iter(vec![Ok::<_, Error>(bytes)]).chain(occupy).boxed(),
                });
            }
        };

        Ok(Content {
            length: None,
            stream: futures::stream::iter(chunks).boxed(),
        })
    }
}

#[async_trait]
impl DriveApi for StubDrive {
    async fn list(&self, parent_id: &str, page_token: Option<&str>) -> Result<Page> {
        self.log(Call::List {
            parent: parent_id.to_string(),
            page_token: page_token.map(str::to_string),
        });

        if self.failing_folders.contains(parent_id) {
            return Err(Error::Api("HTTP 500 Internal Server Error".to_string()));
        }

        let pages = self.folders.get(parent_id).cloned().unwrap_or_default();
        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| Error::Api(format!("bad page token {}", token)))?,
        };

        if self.failing_pages.contains(&(parent_id.to_string(), index)) {
            return Err(Error::Api("HTTP 503 Service Unavailable".to_string()));
        }

        let items = pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));

        Ok(Page {
            items,
            next_page_token,
        })
    }

    async fn get_mime_type(&self, file_id: &str) -> Result<String> {
        self.log(Call::MimeType(file_id.to_string()));
        self.files
            .get(file_id)
            .and_then(|f| f.mime_type.clone())
            .ok_or_else(|| Error::Api(format!("HTTP 404 Not Found: {}", file_id)))
    }

    async fn download_raw(&self, file_id: &str) -> Result<Content> {
        self.log(Call::Raw(file_id.to_string()));
        self.content_of(file_id)
    }

    async fn export_as(&self, file_id: &str, mime_type: &str) -> Result<Content> {
        self.log(Call::Export {
            file_id: file_id.to_string(),
            mime_type: mime_type.to_string(),
        });
        self.content_of(file_id)
    }
}

/// Journal keeping records in memory.
#[derive(Default)]
pub struct RecordingJournal {
    files: Mutex<Vec<PathBuf>>,
    folders: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingJournal {
    pub fn files(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().clone()
    }

    pub fn folders(&self) -> Vec<(String, PathBuf)> {
        self.folders.lock().unwrap().clone()
    }
}

impl FailureJournal for RecordingJournal {
    fn record(&self, path: &Path) {
        self.files.lock().unwrap().push(path.to_path_buf());
    }
}

impl FolderJournal for RecordingJournal {
    fn record_folder(&self, folder_id: &str, local_path: &Path, _error: &str) {
        self.folders
            .lock()
            .unwrap()
            .push((folder_id.to_string(), local_path.to_path_buf()));
    }
}
