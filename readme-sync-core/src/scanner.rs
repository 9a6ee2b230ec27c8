//! Repository scanning: recursive directory expansion and markdown filtering.

use std::collections::VecDeque;

use tracing::debug;

use crate::contract::{EntryKind, RepoEntry, RepoSource, SourceError};

/// Recursively expand directories under `root` and return every file entry
/// reachable from it, in discovery order.
///
/// Expansion keeps an explicit frontier of directories still to list, so
/// newly-discovered directories are queued rather than spliced into a list
/// mid-iteration. Each directory is listed exactly once. Any listing error
/// aborts the scan.
pub async fn scan_files<S>(source: &S, root: &str) -> Result<Vec<RepoEntry>, SourceError>
where
    S: RepoSource,
{
    let mut files = Vec::new();
    let mut frontier = VecDeque::new();
    frontier.push_back(root.to_string());

    while let Some(dir) = frontier.pop_front() {
        for entry in source.list_dir(&dir).await? {
            match entry.kind {
                EntryKind::Dir => {
                    debug!(path = %entry.path, "Queueing directory for expansion");
                    frontier.push_back(entry.path);
                }
                EntryKind::File => files.push(entry),
            }
        }
    }

    Ok(files)
}

/// Whether a file name carries a markdown extension.
pub fn is_markdown(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".markdown")
}

/// Scan the tree under `root` and keep only markdown files.
pub async fn markdown_files<S>(source: &S, root: &str) -> Result<Vec<RepoEntry>, SourceError>
where
    S: RepoSource,
{
    let files = scan_files(source, root).await?;
    Ok(files
        .into_iter()
        .filter(|file| is_markdown(&file.name))
        .collect())
}
