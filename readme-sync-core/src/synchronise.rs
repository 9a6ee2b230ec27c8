//! High-level pipeline: orchestrates scan → fetch → parse → resolve → upsert
//! for every markdown file in a repository.
//!
//! This module provides the top-level orchestration logic for "synchronising"
//! a repository's docs to the documentation host. It implements a coordinated
//! pipeline that:
//!   - Scans the configured path recursively and keeps the markdown files
//!   - Fetches and parses each file into a [`document::Document`]
//!   - Resolves the authored category against the host
//!   - Decides create/update/no-op by comparing content fingerprints
//!   - Aggregates a per-document report of what happened.
//!
//! # Major Types
//! - [`SyncReport`]: per-run output, one [`DocReport`] per markdown file
//! - [`DocOutcome`]: the terminal state every document ends in
//!
//! # Responsibilities
//! - Every file's branch runs to its own terminal state; one document
//!   failing never cancels or blocks its siblings. The only run-level abort
//!   is the initial listing failing.
//! - Invokes logging throughout for traceability (see tracing events)
//! - Does not read the process environment: all inputs are in-memory
//!
//! # Callable From
//! - Used by both the CLI crate and integration tests
//! - Expects concrete (async) [`RepoSource`] and [`DocHost`] implementations
//!
//! # Error Handling
//! - [`SyncError`] is reserved for the listing abort; per-document errors are
//!   captured as [`DocOutcome::Failed`] entries in the report, and callers
//!   pick the first one in discovery order via [`SyncReport::first_failure`].
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Decision rule: [`decide`]

use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::contract::{DocHost, HostError, RemoteDoc, RepoEntry, RepoSource, SourceError};
use crate::document::{self, Document, DocumentError};
use crate::scanner;

/// Terminal state of one document's pipeline branch.
#[derive(Debug)]
pub enum DocOutcome {
    /// Required front-matter was missing; nothing was sent to the host.
    Skipped { reason: String },
    Created,
    Updated,
    /// Remote fingerprint matched; no write was issued.
    Unchanged,
    Failed(DocSyncError),
}

/// Report entry for one markdown file.
#[derive(Debug)]
pub struct DocReport {
    /// Repository-relative path of the file.
    pub path: String,
    /// Known once the branch has progressed far enough to derive it.
    pub slug: Option<String>,
    pub outcome: DocOutcome,
}

/// Output report for a whole run, in discovery order.
#[derive(Debug)]
pub struct SyncReport {
    pub docs: Vec<DocReport>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocOutcome::Created))
    }

    pub fn updated(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocOutcome::Updated))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocOutcome::Unchanged))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DocOutcome::Failed(_)))
    }

    /// First failed document in discovery order, if any. Callers use this to
    /// pick the run's exit error after every branch has completed.
    pub fn first_failure(&self) -> Option<(&DocReport, &DocSyncError)> {
        self.docs.iter().find_map(|doc| match &doc.outcome {
            DocOutcome::Failed(err) => Some((doc, err)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&DocOutcome) -> bool) -> usize {
        self.docs.iter().filter(|doc| pred(&doc.outcome)).count()
    }
}

/// Run-level failure: the initial listing could not complete, so there was
/// nothing to fan out over.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to list repository files under '{path}': {source}")]
    List {
        path: String,
        #[source]
        source: SourceError,
    },
}

/// Why one document's branch ended in [`DocOutcome::Failed`].
#[derive(Debug, Error)]
pub enum DocSyncError {
    #[error("fetching file content failed: {0}")]
    Fetch(#[from] SourceError),
    #[error("parsing document failed: {0}")]
    Document(#[from] DocumentError),
    /// The authored category does not exist on the host. Categories are
    /// never created implicitly.
    #[error("category '{name}' not found on host (lookup '{lookup}')")]
    CategoryNotFound { name: String, lookup: String },
    #[error("host call failed: {0}")]
    Host(#[from] HostError),
}

/// What the upsert step should do for one document.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Create,
    /// Carries the remote copy so the update payload can be merged over it.
    Update(RemoteDoc),
    Unchanged,
}

/// The sync decision, purely a function of the remote copy and the new
/// fingerprint: absent remote means create, matching stored hash means
/// no-op, anything else (including a remote without a hash) means update.
/// Last writer wins; there is no conflict detection beyond the hash compare.
pub fn decide(remote: Option<RemoteDoc>, fingerprint: &str) -> SyncAction {
    match remote {
        None => SyncAction::Create,
        Some(doc) if doc.last_updated_hash.as_deref() == Some(fingerprint) => {
            SyncAction::Unchanged
        }
        Some(doc) => SyncAction::Update(doc),
    }
}

/// Entrypoint: synchronise every markdown file under the configured path.
///
/// All document branches are launched together and joined, so they make
/// progress concurrently on one task and each reaches its own terminal
/// outcome. `Err` is returned only when the listing itself fails.
pub async fn synchronise<S, H>(
    config: &SyncConfig,
    source: &S,
    host: &H,
) -> Result<SyncReport, SyncError>
where
    S: RepoSource,
    H: DocHost,
{
    info!(repo = %config.repo, path = %config.path, "[SYNC] Scanning repository for markdown files");
    let files = scanner::markdown_files(source, &config.path)
        .await
        .map_err(|e| {
            error!(error = ?e, path = %config.path, "[SYNC][ERROR] Listing repository files failed");
            SyncError::List {
                path: config.path.clone(),
                source: e,
            }
        })?;
    info!(count = files.len(), "[SYNC] Markdown files discovered");

    let branches = files
        .iter()
        .map(|entry| sync_document(config, source, host, entry));
    let docs = join_all(branches).await;

    let report = SyncReport { docs };
    info!(
        created = report.created(),
        updated = report.updated(),
        unchanged = report.unchanged(),
        skipped = report.skipped(),
        failed = report.failed(),
        "[SYNC] Run complete"
    );
    Ok(report)
}

/// Run one file's pipeline to a terminal outcome. Never propagates an error:
/// every failure is captured in the returned report entry.
async fn sync_document<S, H>(
    config: &SyncConfig,
    source: &S,
    host: &H,
    entry: &RepoEntry,
) -> DocReport
where
    S: RepoSource,
    H: DocHost,
{
    info!(path = %entry.path, "[SYNC] Processing file");

    let file = match source.get_file(&entry.path).await {
        Ok(file) => file,
        Err(e) => return failed(entry, None, e.into()),
    };

    let doc = match Document::from_file(&file) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            warn!(path = %file.path, "not synced (missing title/category front-matter)");
            return DocReport {
                path: entry.path.clone(),
                slug: None,
                outcome: DocOutcome::Skipped {
                    reason: "missing title/category front-matter".to_string(),
                },
            };
        }
        Err(e) => return failed(entry, None, e.into()),
    };

    let lookup = document::normalize_category(&doc.category);
    let category = match host.get_category(&lookup).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return failed(
                entry,
                None,
                DocSyncError::CategoryNotFound {
                    name: doc.category.clone(),
                    lookup,
                },
            );
        }
        Err(e) => return failed(entry, None, e.into()),
    };

    let slug = document::derive_slug(&config.repo, &file.name);
    let payload = document::build_payload(&slug, &doc, &category.id);

    let remote = match host.get_doc(&slug).await {
        Ok(remote) => remote,
        Err(e) => return failed(entry, Some(slug), e.into()),
    };

    match decide(remote, &doc.fingerprint) {
        SyncAction::Unchanged => {
            info!(title = %doc.title, slug = %slug, "not updated, no changes");
            DocReport {
                path: entry.path.clone(),
                slug: Some(slug),
                outcome: DocOutcome::Unchanged,
            }
        }
        SyncAction::Create => match host.create_doc(payload).await {
            Ok(()) => {
                info!(title = %doc.title, "successfully created to /api/v1/docs/{slug}");
                DocReport {
                    path: entry.path.clone(),
                    slug: Some(slug),
                    outcome: DocOutcome::Created,
                }
            }
            Err(e) => failed(entry, Some(slug), e.into()),
        },
        SyncAction::Update(existing) => {
            let merged = document::merge_into_remote(&existing, &payload);
            match host.update_doc(&slug, merged).await {
                Ok(()) => {
                    info!(title = %doc.title, "successfully updated to /api/v1/docs/{slug}");
                    DocReport {
                        path: entry.path.clone(),
                        slug: Some(slug),
                        outcome: DocOutcome::Updated,
                    }
                }
                Err(e) => failed(entry, Some(slug), e.into()),
            }
        }
    }
}

fn failed(entry: &RepoEntry, slug: Option<String>, err: DocSyncError) -> DocReport {
    error!(path = %entry.path, error = %err, "[SYNC][ERROR] Document failed");
    DocReport {
        path: entry.path.clone(),
        slug,
        outcome: DocOutcome::Failed(err),
    }
}
