//! # Documentation Host Integration (CLI <-> Core)
//!
//! This module bridges the core's [`DocHost`] abstraction to the real ReadMe
//! REST API. It wires up category lookup, document retrieval and the two
//! upsert calls used by the sync pipeline.
//!
//! ## Client Usage
//!
//! - Construct [`ReadmeClient`] from the explicit configuration values
//!   (API key and API version).
//! - Every request carries `x-readme-version`, `x-readme-source: github`,
//!   and basic auth with the API key as the user and an empty password.
//! - Lookup 404s are not errors: they surface as `Ok(None)` so the decision
//!   procedure can branch on absence.
//! - Non-success write responses classify as validation errors (4xx) or
//!   unexpected statuses (everything else); see [`classify_status`].
//!
//! For the trait contract and error taxonomy, see core's [`contract`] module.
//!
//! [`contract`]: readme_sync_core::contract

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use readme_sync_core::contract::{Category, DocHost, HostError, RemoteDoc};

const README_API_BASE: &str = "https://dash.readme.io";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the ReadMe documentation host.
pub struct ReadmeClient {
    client: reqwest::Client,
    api_key: String,
    api_version: String,
    base_url: String,
}

impl ReadmeClient {
    pub fn new(api_key: &str, api_version: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        tracing::info!(
            api_key_set = !api_key.is_empty(),
            api_version = %api_version,
            "Initialized documentation host client"
        );
        Ok(ReadmeClient {
            client,
            api_key: api_key.to_string(),
            api_version: api_version.to_string(),
            base_url: README_API_BASE.to_string(),
        })
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("x-readme-version", &self.api_version)
            .header("x-readme-source", "github")
            .basic_auth(&self.api_key, None::<&str>)
    }

    /// GET a resource as JSON; a 404 answers `Ok(None)`.
    async fn get_json(&self, url: &str) -> Result<Option<Value>, HostError> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = body_text(response).await;
            tracing::error!(status = %status, url = %url, "Documentation host returned error. Response body: {message}");
            return Err(classify_status(status.as_u16(), message));
        }
        let value = response.json::<Value>().await.map_err(transport)?;
        Ok(Some(value))
    }

    async fn send_write(&self, method: Method, url: &str, payload: &Value) -> Result<(), HostError> {
        let response = self
            .request(method, url)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let message = body_text(response).await;
            tracing::error!(status = %status, url = %url, "Documentation host rejected write. Response body: {message}");
            return Err(classify_status(status.as_u16(), message));
        }
        Ok(())
    }
}

#[async_trait]
impl DocHost for ReadmeClient {
    async fn get_category(&self, normalized: &str) -> Result<Option<Category>, HostError> {
        tracing::info!(category = %normalized, "Looking up category on documentation host");
        let Some(value) = self
            .get_json(&categories_url(&self.base_url, normalized))
            .await?
        else {
            tracing::warn!(category = %normalized, "Category not found on documentation host");
            return Ok(None);
        };
        let category: Category = serde_json::from_value(value).map_err(transport)?;
        tracing::debug!(category = %normalized, id = %category.id, "Resolved category");
        Ok(Some(category))
    }

    async fn get_doc(&self, slug: &str) -> Result<Option<RemoteDoc>, HostError> {
        tracing::info!(slug = %slug, "Fetching existing document");
        let Some(value) = self.get_json(&docs_url(&self.base_url, slug)).await? else {
            tracing::debug!(slug = %slug, "No existing document under slug");
            return Ok(None);
        };
        let doc: RemoteDoc = serde_json::from_value(value).map_err(transport)?;
        Ok(Some(doc))
    }

    async fn create_doc(&self, payload: Value) -> Result<(), HostError> {
        let url = format!("{}/api/v1/docs", self.base_url);
        tracing::info!(slug = %payload["slug"], "Creating document on documentation host");
        self.send_write(Method::POST, &url, &payload).await
    }

    async fn update_doc(&self, slug: &str, payload: Value) -> Result<(), HostError> {
        let url = docs_url(&self.base_url, slug);
        tracing::info!(slug = %slug, "Updating document on documentation host");
        self.send_write(Method::PUT, &url, &payload).await
    }
}

fn transport<E>(e: E) -> HostError
where
    E: std::error::Error + Send + Sync + 'static,
{
    HostError::Transport(Box::new(e))
}

async fn body_text(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<Failed to decode response body>"))
}

/// Sort a non-success response into the error taxonomy: 4xx means the host
/// rejected the payload, anything else is unexpected.
pub fn classify_status(status: u16, message: String) -> HostError {
    if (400..500).contains(&status) {
        HostError::Validation { status, message }
    } else {
        HostError::UnexpectedStatus { status, message }
    }
}

pub fn categories_url(base_url: &str, normalized: &str) -> String {
    format!("{base_url}/api/v1/categories/{normalized}")
}

pub fn docs_url(base_url: &str, slug: &str) -> String {
    format!("{base_url}/api/v1/docs/{slug}")
}
