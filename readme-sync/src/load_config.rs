//! `load_config` module: reads the CI environment once into a [`RunConfig`].
//!
//! This module is the only place where the process environment is consulted.
//! Everything downstream receives explicit configuration values, so no other
//! part of the program performs ambient lookups mid-run.
//!
//! # Responsibilities
//! - Resolve each input from its GitHub-Actions-style `INPUT_*` variable
//!   first, then from plain environment fallbacks (an action workflow sets
//!   the former; local runs and `.env` files typically set the latter).
//! - Treat empty values as missing, the way an action input behaves.
//! - Produce clear diagnostics: any failure names the variables that were
//!   tried, so CI logs point straight at the missing secret.
//!
//! # Errors
//! All errors use `anyhow::Error` for context-rich diagnostics and are
//! surfaced at the CLI boundary.

use anyhow::Result;
use std::env;
use tracing::{error, info};

/// Configuration for one run, read from the environment exactly once.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// API key for the documentation host.
    pub readme_api_key: String,
    /// Version string sent as `x-readme-version` on every host call.
    pub readme_api_version: String,
    /// Token for the source-control content API.
    pub repo_token: String,
    /// Repository-relative path to scan. Empty means the repository root.
    pub file_path: String,
    /// Repository full name, `owner/name`. Feeds slug derivation.
    pub repository: String,
    /// Git ref the content API should read from, e.g. `refs/heads/main`.
    /// Absent means the repository's default branch.
    pub git_ref: Option<String>,
}

const README_API_KEY_VARS: &[&str] = &["INPUT_README-API-KEY", "README_API_KEY"];
const README_API_VERSION_VARS: &[&str] = &["INPUT_README-API-VERSION", "README_API_VERSION"];
const REPO_TOKEN_VARS: &[&str] = &["INPUT_REPO-TOKEN", "REPO_TOKEN", "GITHUB_TOKEN"];
const FILE_PATH_VARS: &[&str] = &["INPUT_FILE-PATH", "FILE_PATH"];
const REPOSITORY_VARS: &[&str] = &["GITHUB_REPOSITORY"];
const GIT_REF_VARS: &[&str] = &["GITHUB_REF"];

/// Reads the environment into a [`RunConfig`], failing with a diagnostic
/// that names the missing variable.
pub fn load_config() -> Result<RunConfig> {
    let config = RunConfig {
        readme_api_key: required_var(README_API_KEY_VARS)?,
        readme_api_version: required_var(README_API_VERSION_VARS)?,
        repo_token: required_var(REPO_TOKEN_VARS)?,
        file_path: optional_var(FILE_PATH_VARS).unwrap_or_default(),
        repository: required_var(REPOSITORY_VARS)?,
        git_ref: optional_var(GIT_REF_VARS),
    };

    info!(
        repository = %config.repository,
        file_path = %config.file_path,
        git_ref = ?config.git_ref,
        api_version = %config.readme_api_version,
        "Loaded run configuration from environment"
    );
    Ok(config)
}

/// First non-empty value among `names`, in order of preference.
fn optional_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    })
}

fn required_var(names: &[&str]) -> Result<String> {
    match optional_var(names) {
        Some(value) => Ok(value),
        None => {
            error!(
                variables = ?names,
                "Required configuration missing in environment"
            );
            Err(anyhow::anyhow!(
                "missing required environment variable (tried {})",
                names.join(", ")
            ))
        }
    }
}
