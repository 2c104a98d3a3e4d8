//! Model routing shared by the model-backed agents.

use tracing::{error, info, warn};
use weiche_llm::{LlmError, ModelClient};

use crate::extract::ExtractError;

/// Failure of a model-backed stage. Never escapes an agent; it is
/// logged and converted into whichever fallback tier applies.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StageFailure {
    #[error("no models available")]
    NoModels,
    #[error("model call failed: {0}")]
    Generate(#[from] LlmError),
    #[error("no usable JSON in model output: {0}")]
    Extract(#[from] ExtractError),
    #[error("model verdict rejected: {0}")]
    Verdict(String),
}

/// Resolve which model to talk to: the designated one when the endpoint
/// serves it (under its actually-served descriptor), else the first
/// listed model, else nothing.
pub(crate) async fn pick_model(client: &ModelClient, designated: &str) -> Option<String> {
    if client.is_available(Some(designated)).await {
        // The availability probe remembered the served descriptor.
        return client.current_model().await;
    }
    warn!(model = designated, "designated model not available");

    let models = client.list_models().await;
    match models.into_iter().next() {
        Some(first) => {
            info!(model = first.as_str(), "falling back to available model");
            Some(first)
        }
        None => {
            error!("no models available at endpoint");
            None
        }
    }
}
