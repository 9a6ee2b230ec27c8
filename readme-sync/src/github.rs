//! # GitHub Content Integration (CLI <-> Core)
//!
//! This module bridges the core's [`RepoSource`] abstraction to the real
//! GitHub contents API. It wires up listing and file retrieval for the CLI
//! binary; the core pipeline never sees HTTP, only the trait.
//!
//! ## Client Usage
//!
//! - Construct [`GitHubClient`] from the explicit configuration values
//!   (repository token, `owner/name`, optional git ref).
//! - Listings come back as JSON arrays; a single-file response object is
//!   tolerated and treated as a one-entry listing.
//! - File bodies arrive base64-encoded and line-wrapped; whitespace is
//!   stripped before decoding, and invalid UTF-8 is replaced lossily.
//!
//! For the trait contract and error taxonomy, see core's [`contract`] module.
//!
//! [`contract`]: readme_sync_core::contract

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::Value;

use readme_sync_core::contract::{EntryKind, RepoEntry, RepoFile, RepoSource, SourceError};

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("readme-sync/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Content-API client for one repository at one ref.
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    repository: String,
    git_ref: Option<String>,
    base_url: String,
}

impl GitHubClient {
    /// Build a client for `repository` (`owner/name`). `git_ref` of `None`
    /// reads from the repository's default branch.
    pub fn new(token: &str, repository: &str, git_ref: Option<&str>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        tracing::info!(
            repository = %repository,
            git_ref = ?git_ref,
            "Initialized GitHub content client"
        );
        Ok(GitHubClient {
            client,
            token: token.to_string(),
            repository: repository.to_string(),
            git_ref: git_ref.map(str::to_string),
            base_url: GITHUB_API_BASE.to_string(),
        })
    }

    async fn fetch_contents(&self, path: &str) -> Result<Value, SourceError> {
        let url = contents_url(&self.base_url, &self.repository, path);
        let mut request = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(reference) = &self.git_ref {
            request = request.query(&[("ref", reference)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Transport(Box::new(e)))?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            tracing::error!(status = %status, url = %url, "Content API returned error. Response body: {message}");
            return Err(SourceError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SourceError::Transport(Box::new(e)))
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn list_dir(&self, path: &str) -> Result<Vec<RepoEntry>, SourceError> {
        tracing::info!(repository = %self.repository, path = %path, "Listing repository contents");
        let body = self.fetch_contents(path).await?;
        let entries = parse_listing(path, body)?;
        tracing::debug!(count = entries.len(), path = %path, "Parsed directory listing");
        Ok(entries)
    }

    async fn get_file(&self, path: &str) -> Result<RepoFile, SourceError> {
        tracing::info!(repository = %self.repository, path = %path, "Fetching file content");
        let body = self.fetch_contents(path).await?;
        let file: ContentFile = serde_json::from_value(body).map_err(|e| SourceError::Decode {
            path: path.to_string(),
            reason: format!("unexpected file response shape: {e}"),
        })?;
        let content = decode_content(path, &file.content)?;
        tracing::debug!(path = %file.path, bytes = content.len(), "Decoded file content");
        Ok(RepoFile {
            path: file.path,
            name: file.name,
            content,
            html_url: file.html_url,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentFile {
    name: String,
    path: String,
    content: String,
    html_url: String,
}

/// Contents endpoint for a path within a repository. An empty path addresses
/// the repository root.
pub fn contents_url(base_url: &str, repository: &str, path: &str) -> String {
    format!("{base_url}/repos/{repository}/contents/{path}")
}

/// Shape a contents response into entries. Directories answer with a JSON
/// array; a path pointing at a single file answers with one object, which is
/// treated as a one-entry listing.
pub fn parse_listing(path: &str, body: Value) -> Result<Vec<RepoEntry>, SourceError> {
    let raw = if body.is_array() {
        serde_json::from_value::<Vec<ContentEntry>>(body)
    } else if body.is_object() {
        serde_json::from_value::<ContentEntry>(body).map(|entry| vec![entry])
    } else {
        return Err(SourceError::Decode {
            path: path.to_string(),
            reason: format!("expected a listing, got: {body}"),
        });
    };
    let raw = raw.map_err(|e| SourceError::Decode {
        path: path.to_string(),
        reason: format!("unexpected listing shape: {e}"),
    })?;

    Ok(raw
        .into_iter()
        .map(|entry| RepoEntry {
            kind: match entry.kind.as_str() {
                "dir" => EntryKind::Dir,
                _ => EntryKind::File,
            },
            path: entry.path,
            name: entry.name,
        })
        .collect())
}

/// Decode a base64 content field. The API line-wraps bodies, so all
/// whitespace is stripped first; invalid UTF-8 is replaced lossily.
pub fn decode_content(path: &str, raw: &str) -> Result<String, SourceError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SourceError::Decode {
            path: path.to_string(),
            reason: format!("invalid base64 content: {e}"),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
