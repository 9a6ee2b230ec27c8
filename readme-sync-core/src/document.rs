//! Document preparation: front-matter parsing, footer rendering, slug and
//! category normalization, fingerprinting and payload shaping.
//!
//! Everything here is pure, no I/O. [`Document::from_file`] turns a fetched
//! [`RepoFile`] into a host-ready [`Document`]; a file missing the required
//! front-matter surfaces as `Ok(None)` so callers can skip it without
//! treating it as a failure.

use regex::Regex;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::contract::{RemoteDoc, RepoFile};

/// Errors raised while turning file text into a [`Document`]. All of these
/// fail the affected document; absence of front-matter never lands here.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid front-matter YAML: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    #[error("front-matter `category` must be a string, got: {0}")]
    CategoryType(Value),
    #[error("front-matter keys must be strings")]
    NonStringKeys,
}

/// A markdown file parsed into host-ready parts. Immutable once built.
#[derive(Debug, Clone)]
pub struct Document {
    /// The `title` front-matter value, stringified for log lines.
    pub title: String,
    /// The `category` front-matter value as the author wrote it. Resolved to
    /// a host-side id before upsert.
    pub category: String,
    /// Markdown body (front-matter stripped) with the source footer appended.
    pub body: String,
    /// Every front-matter key as parsed.
    pub front_matter: Map<String, Value>,
    /// Hex digest over the full rendered text, front-matter included.
    pub fingerprint: String,
}

impl Document {
    /// Parse a fetched file into a document.
    ///
    /// The source footer is appended before parsing and fingerprinting, so
    /// both the stored body and the change-detection hash cover it. Returns
    /// `Ok(None)` when `title` or `category` front-matter is absent.
    pub fn from_file(file: &RepoFile) -> Result<Option<Document>, DocumentError> {
        let full = format!("{}{}", file.content, render_footer(&file.html_url));
        let (front_matter, body) = split_front_matter(&full)?;

        let (Some(title_value), Some(category_value)) =
            (front_matter.get("title"), front_matter.get("category"))
        else {
            return Ok(None);
        };

        let title = match title_value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let category = match category_value {
            Value::String(s) => s.clone(),
            other => return Err(DocumentError::CategoryType(other.clone())),
        };
        let fingerprint = fingerprint(&full);

        Ok(Some(Document {
            title,
            category,
            body,
            front_matter,
            fingerprint,
        }))
    }
}

/// Split a leading `---`-fenced YAML block from the body.
///
/// The opening fence must be the very first line of the text and the closing
/// fence must sit on a line of its own. Text without a fence, or with an
/// unterminated one, parses as front-matter-free: an empty mapping plus the
/// full text as body.
pub fn split_front_matter(text: &str) -> Result<(Map<String, Value>, String), DocumentError> {
    let Some(after_open) = open_fence(text) else {
        return Ok((Map::new(), text.to_string()));
    };
    let Some((yaml_src, body)) = close_fence(after_open) else {
        return Ok((Map::new(), text.to_string()));
    };
    let fields = parse_fields(yaml_src)?;
    Ok((fields, body.to_string()))
}

fn open_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))
}

fn close_fence(after_open: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

fn parse_fields(yaml_src: &str) -> Result<Map<String, Value>, DocumentError> {
    if yaml_src.trim().is_empty() {
        return Ok(Map::new());
    }
    let parsed: serde_yaml::Value = serde_yaml::from_str(yaml_src)?;
    let serde_yaml::Value::Mapping(_) = parsed else {
        // Scalar or sequence front-matter carries no keys; the required-key
        // check downstream turns this into a skip.
        return Ok(Map::new());
    };
    match serde_json::to_value(parsed) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(DocumentError::NonStringKeys),
    }
}

/// Footer appended to every synced body: a hard line break, a horizontal
/// rule, and a link back to the source file. The first `refs/heads/` segment
/// in the web URL is stripped so the link points at the plain branch path.
pub fn render_footer(html_url: &str) -> String {
    let url = html_url.replacen("refs/heads/", "", 1);
    format!("\n  \n***  \nSource: [{url}]({url})")
}

/// Hex SHA-256 over the full rendered text. Used only as a change-detection
/// token, compared against the host's stored `lastUpdatedHash`.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Collapse whitespace runs to single hyphens and lowercase the result.
fn normalize(text: &str) -> String {
    let collapsed = Regex::new(r"\s+").unwrap().replace_all(text, "-");
    collapsed.to_lowercase()
}

/// Derive the stable document slug from the repository full name and the
/// file name (extension dropped). Same inputs always yield the same slug, so
/// re-runs address the same host document.
pub fn derive_slug(repo: &str, file_name: &str) -> String {
    let stem = std::path::Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    normalize(&format!("{repo}-{stem}")).replace('/', "-")
}

/// Normalize an authored category name into the host's lookup segment.
pub fn normalize_category(name: &str) -> String {
    normalize(name)
}

/// Build the upsert payload: `slug` and `body` first, then every
/// front-matter key, then the resolved category id and the fingerprint.
/// Later keys override earlier ones, so authored front-matter may override
/// `body`, and the resolved category id always wins over the authored name.
pub fn build_payload(slug: &str, doc: &Document, category_id: &str) -> Value {
    let mut payload = Map::new();
    payload.insert("slug".to_string(), Value::String(slug.to_string()));
    payload.insert("body".to_string(), Value::String(doc.body.clone()));
    for (key, value) in &doc.front_matter {
        payload.insert(key.clone(), value.clone());
    }
    payload.insert(
        "category".to_string(),
        Value::String(category_id.to_string()),
    );
    payload.insert(
        "lastUpdatedHash".to_string(),
        Value::String(doc.fingerprint.clone()),
    );
    Value::Object(payload)
}

/// Merge an upsert payload over an existing remote document, carrying every
/// previously-stored host field forward. Payload keys win.
pub fn merge_into_remote(remote: &RemoteDoc, payload: &Value) -> Value {
    let mut merged = Map::new();
    merged.insert("slug".to_string(), Value::String(remote.slug.clone()));
    if let Some(hash) = &remote.last_updated_hash {
        merged.insert("lastUpdatedHash".to_string(), Value::String(hash.clone()));
    }
    for (key, value) in &remote.fields {
        merged.insert(key.clone(), value.clone());
    }
    if let Value::Object(overlay) = payload {
        for (key, value) in overlay {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}
