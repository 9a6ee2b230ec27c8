//! # contract: collaborator interfaces for the sync pipeline
//!
//! This module defines the two traits the pipeline depends on: a
//! [`RepoSource`] that lists and fetches repository files, and a [`DocHost`]
//! that reads and upserts documents on the documentation host. The concrete
//! data types and error taxonomies for both sides live here too.
//!
//! ## Interface & Extensibility
//! - Implement [`RepoSource`] to read from a new source-control backend.
//! - Implement [`DocHost`] to publish to a new documentation host.
//! - All methods are async. Lookups return `Ok(None)` on a 404-equivalent so
//!   callers can branch on absence without inspecting error contents.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall` so consumers can generate
//!   deterministic mocks for unit/integration tests.
//!
//! ## Error Handling
//! - A listing failure is the only error that aborts a whole run; everything
//!   else is scoped to the document being processed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Whether a listed entry is a plain file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// A directory entry as reported by the source content API.
#[derive(Debug, Clone)]
pub struct RepoEntry {
    /// Repository-relative path, used for fetching and for error reports.
    pub path: String,
    /// File or directory name, the last path segment.
    pub name: String,
    pub kind: EntryKind,
}

/// A fetched repository file: decoded text plus the web URL it lives at.
#[derive(Debug, Clone)]
pub struct RepoFile {
    pub path: String,
    pub name: String,
    /// Decoded UTF-8 content.
    pub content: String,
    /// Web URL of the file; may still carry a `refs/heads/` segment.
    pub html_url: String,
}

/// A category as stored on the documentation host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Opaque host-side identifier. Substituted for the authored category
    /// name in upsert payloads.
    #[serde(rename = "_id")]
    pub id: String,
}

/// A document already stored on the host.
///
/// Only `slug` and `lastUpdatedHash` are interpreted; every other
/// host-defined field is carried in `fields` and written back verbatim on
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDoc {
    #[serde(default)]
    pub slug: String,
    #[serde(
        rename = "lastUpdatedHash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated_hash: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

/// Errors from the repository side. A listing failure aborts the run; a
/// fetch failure fails only the affected document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The content API answered with a non-success status.
    #[error("source API returned status {status} for '{path}': {message}")]
    Status {
        status: u16,
        path: String,
        message: String,
    },
    /// The response arrived but could not be turned into usable content.
    #[error("could not decode content of '{path}': {reason}")]
    Decode { path: String, reason: String },
    #[error("source transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors from the documentation host. Lookup 404s are not errors (they
/// surface as `Ok(None)`); everything here fails the affected document.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host rejected the request payload (400-class status).
    #[error("host rejected the request (status {status}): {message}")]
    Validation { status: u16, message: String },
    /// Any other non-success response.
    #[error("unexpected host response (status {status}): {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("host transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Trait for listing and fetching repository files.
/// The implementor is responsible for authentication and content decoding.
/// Implemented by the real content-API client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// List the entries directly under `path`, non-recursive. An empty
    /// `path` means the repository root.
    async fn list_dir(&self, path: &str) -> Result<Vec<RepoEntry>, SourceError>;

    /// Fetch a single file's decoded content and web URL.
    async fn get_file(&self, path: &str) -> Result<RepoFile, SourceError>;
}

/// Trait for reading and upserting documents on the documentation host.
/// The implementor is responsible for authentication, versioning headers and
/// transport.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait DocHost: Send + Sync {
    /// Look up a category by its normalized name. `Ok(None)` when the host
    /// has no such category.
    async fn get_category(&self, normalized: &str) -> Result<Option<Category>, HostError>;

    /// Fetch an existing document by slug. `Ok(None)` when no document is
    /// stored under that slug.
    async fn get_doc(&self, slug: &str) -> Result<Option<RemoteDoc>, HostError>;

    /// Create a brand-new document from the given payload.
    async fn create_doc(&self, payload: Value) -> Result<(), HostError>;

    /// Overwrite an existing document with the merged payload.
    async fn update_doc(&self, slug: &str, payload: Value) -> Result<(), HostError>;
}
