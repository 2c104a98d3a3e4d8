//! Liveness snapshot for host services.

use chrono::{DateTime, Utc};
use serde::Serialize;
use weiche_llm::ModelClient;

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    /// Whether at least one model is currently served.
    pub llm_enabled: bool,
    pub available_models: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

/// Snapshot the endpoint state. Never fails; a dead endpoint shows up
/// as `llm_enabled: false` with an empty model list.
pub async fn health(client: &ModelClient) -> Health {
    let models = client.list_models().await;
    Health {
        status: "ok",
        llm_enabled: !models.is_empty(),
        available_models: models,
        checked_at: Utc::now(),
    }
}
