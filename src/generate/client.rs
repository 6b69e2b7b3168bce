//! HTTP client for the external generator service.
//!
//! Configuration is via environment variables:
//! - `DRAFTSMITH_GENERATOR_URL` - Base URL (default: `http://localhost:17031/v1`)
//! - `DRAFTSMITH_GENERATOR_API_KEY` - Bearer key (optional for local)

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GeneratorError;
use crate::models::Kind;

/// Default URL for a locally running generator.
const DEFAULT_URL: &str = "http://localhost:17031/v1";

/// Request for a document outline proposal.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineRequest {
    pub title: String,
    pub context: String,
    /// Hint: ask for at least this many root sections.
    pub min_sections: u32,
    /// Hint: keep nesting within this depth. `None` when unconstrained.
    pub max_depth: Option<usize>,
}

/// Request for section content.
#[derive(Debug, Clone, Serialize)]
pub struct ContentRequest {
    pub kind: Kind,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
struct OutlineResponse {
    outline: Option<Value>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: Option<String>,
    error: Option<String>,
}

/// HTTP client for the generator service.
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl GeneratorClient {
    /// Create client from environment variables. Returns `None` when no
    /// generator URL is configured and the default should not be assumed.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("DRAFTSMITH_GENERATOR_URL").ok()?;
        let api_key = std::env::var("DRAFTSMITH_GENERATOR_API_KEY").ok();
        Some(Self::new(base_url, api_key))
    }

    /// Create a client pointing at a locally running generator.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_URL, None)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: Client::new(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Ask the generator for an outline proposal.
    ///
    /// Returns the raw payload without inspecting it; callers must run it
    /// through the outline validator before converting.
    pub async fn generate_outline(&self, request: &OutlineRequest) -> Result<Value, GeneratorError> {
        let response = self
            .post("/outline")
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body: OutlineResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(GeneratorError::Upstream(error));
        }
        body.outline.ok_or(GeneratorError::EmptyResponse)
    }

    /// Ask the generator to draft content for one section.
    ///
    /// The returned string is opaque: markdown, a diagram description, or an
    /// image reference depending on the requested kind.
    pub async fn generate_content(
        &self,
        request: &ContentRequest,
    ) -> Result<String, GeneratorError> {
        let response = self
            .post("/content")
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body: ContentResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(GeneratorError::Upstream(error));
        }
        body.content.ok_or(GeneratorError::EmptyResponse)
    }
}
