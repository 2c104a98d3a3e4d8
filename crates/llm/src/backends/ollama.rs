use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use weiche_core::config::OllamaConfig;

use crate::backend::{LlmError, ModelBackend};

/// Backend speaking the Ollama wire protocol (`/api/tags`, `/api/generate`).
///
/// Listing and generation carry separate timeouts: a tags call should
/// answer in moments, while generation legitimately takes a while.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    list_timeout: Duration,
    generate_timeout: Duration,
}

impl OllamaBackend {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            list_timeout: Duration::from_secs(config.list_timeout_secs),
            generate_timeout: Duration::from_secs(config.generate_timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, err: reqwest::Error, operation: &str, secs: u64) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                operation: operation.to_string(),
                secs,
            }
        } else if err.is_connect() {
            LlmError::Unreachable(self.base_url.clone())
        } else {
            LlmError::HttpError(err.to_string())
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Option<Vec<TaggedModel>>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        debug!("fetching model tags from {}", url);

        let secs = self.list_timeout.as_secs();
        let response = self
            .client
            .get(&url)
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, "model listing", secs))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let models = tags.models.ok_or_else(|| {
            LlmError::ParseError("missing `models` field in tags response".into())
        })?;

        Ok(models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        debug!(model, "generate request to {}", url);

        let secs = self.generate_timeout.as_secs();
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(self.generate_timeout)
            .send()
            .await
            .map_err(|e| self.map_send_error(e, &format!("generation with model {model}"), secs))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        parsed.response.ok_or_else(|| {
            LlmError::ParseError("missing `response` field in generate payload".into())
        })
    }
}
