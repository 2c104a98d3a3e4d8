use async_trait::async_trait;

/// Trait for model-serving backends. Each transport implements this.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// List the descriptors of every model the backend can currently serve.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Run one non-streaming completion against `model`, returning the raw text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("cannot reach model endpoint at {0}")]
    Unreachable(String),
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },
    #[error("API error: {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("no model given and none selected by an availability probe")]
    NoModelSelected,
}
