//! Depth-first walk of the remote folder tree.

use std::path::Path;

use futures::future::BoxFuture;

use crate::api::{DriveApi, NodeKind, RemoteNode};
use crate::config::ListingFailurePolicy;
use crate::download::fetcher::Fetcher;
use crate::download::journal::FolderJournal;
use crate::download::state::SyncStats;
use crate::error::{Error, Result};
use crate::fs::{ensure_dir, local_child_path};
use crate::output::{
    print_downloading_file, print_empty_folder, print_folder, print_folder_complete,
    print_folder_failed, print_next_page,
};

/// Mirrors a remote folder tree into a local directory.
///
/// Folders are walked in pre-order: a folder's whole subtree, downloads
/// included, is finished before its next sibling is looked at.
pub struct TreeWalker<'a> {
    api: &'a dyn DriveApi,
    fetcher: Fetcher<'a>,
    folder_journal: &'a dyn FolderJournal,
    policy: ListingFailurePolicy,
    stats: SyncStats,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        api: &'a dyn DriveApi,
        fetcher: Fetcher<'a>,
        folder_journal: &'a dyn FolderJournal,
        policy: ListingFailurePolicy,
    ) -> Self {
        Self {
            api,
            fetcher,
            folder_journal,
            policy,
            stats: SyncStats::default(),
        }
    }

    /// Walk `root_id` into `destination` and return the run statistics.
    ///
    /// Failing to list the root folder is always an error, whatever the
    /// listing failure policy.
    pub async fn run(mut self, root_id: &str, destination: &Path) -> Result<SyncStats> {
        self.walk(root_id, destination, 0).await?;
        Ok(self.stats)
    }

    /// Mirror every child of `folder_id` into `local_dir`.
    pub fn walk<'s>(
        &'s mut self,
        folder_id: &'s str,
        local_dir: &'s Path,
        depth: usize,
    ) -> BoxFuture<'s, Result<()>> {
        Box::pin(async move {
            ensure_dir(local_dir)?;
            self.stats.increment_folder();

            let mut page_token: Option<String> = None;
            loop {
                let page = self
                    .api
                    .list(folder_id, page_token.as_deref())
                    .await
                    .map_err(|e| Error::Listing {
                        folder_id: folder_id.to_string(),
                        message: e.to_string(),
                    })?;

                if page.items.is_empty() {
                    print_empty_folder(depth, folder_id);
                }

                for node in page.items {
                    self.visit(node, local_dir, depth).await?;
                }

                match page.next_page_token {
                    Some(token) => {
                        print_next_page(depth, folder_id);
                        page_token = Some(token);
                    }
                    None => {
                        print_folder_complete(depth, folder_id);
                        break;
                    }
                }
            }

            Ok(())
        })
    }

    async fn visit(&mut self, node: RemoteNode, local_dir: &Path, depth: usize) -> Result<()> {
        let local_path = local_child_path(local_dir, &node.name);

        match node.kind {
            NodeKind::Folder => {
                print_folder(depth, &node.name);
                match self.walk(&node.id, &local_path, depth + 1).await {
                    Ok(()) => Ok(()),
                    Err(e @ (Error::Listing { .. } | Error::Io(_)))
                        if self.policy == ListingFailurePolicy::Journal =>
                    {
                        print_folder_failed(depth, &node.name, &e);
                        self.folder_journal
                            .record_folder(&node.id, &local_path, &e.to_string());
                        self.stats.increment_failed_folder();
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            NodeKind::File { .. } => {
                print_downloading_file(depth, &node.name);
                let outcome = self.fetcher.fetch(&node.id, &local_path).await;
                self.stats.record(outcome);
                Ok(())
            }
        }
    }
}
