//! Model endpoint client.
//!
//! Wraps a [`ModelBackend`] with the behavior every agent relies on:
//! - a TTL-cached model registry, refreshed on construction and on any
//!   stale read, failing safe to an empty list when the endpoint is down
//! - availability probing with normalized-name matching that remembers
//!   which served descriptor actually matched
//! - one-shot completions against an explicit or remembered model
//!
//! Endpoint trouble never escapes registry reads; it surfaces only as
//! an empty model list plus an error log, so callers can keep running
//! on their fallback tiers.

use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use weiche_core::Config;

use crate::backend::{LlmError, ModelBackend};
use crate::backends::create_backend;

/// How long a fetched registry snapshot stays trustworthy.
pub const DEFAULT_REGISTRY_TTL: Duration = Duration::from_secs(60);

/// Two descriptors name the same model if they agree after separators
/// (`:`, `-`) are stripped and case is folded. `gemma:2b`, `gemma-2b`
/// and `Gemma2B` all coincide.
pub fn names_equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect::<String>()
        .to_lowercase()
}

/// Point-in-time snapshot of what the endpoint serves.
#[derive(Debug, Clone, Default)]
struct Registry {
    models: Vec<String>,
    fetched_at: Option<Instant>,
}

impl Registry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.map_or(false, |at| at.elapsed() < ttl)
    }
}

pub struct ModelClient {
    backend: Box<dyn ModelBackend>,
    registry: RwLock<Registry>,
    current: RwLock<Option<String>>,
    ttl: Duration,
}

impl ModelClient {
    /// Wrap a backend and eagerly warm the registry. Construction never
    /// fails: a dead endpoint just leaves the registry empty.
    pub async fn connect(backend: Box<dyn ModelBackend>, ttl: Duration) -> Self {
        let client = Self {
            backend,
            registry: RwLock::new(Registry::default()),
            current: RwLock::new(None),
            ttl,
        };
        client.refresh_registry().await;

        let registry = client.registry.read().await;
        if registry.models.is_empty() {
            warn!("model endpoint reachable check found no models");
        } else {
            info!(models = registry.models.join(", "), "model endpoint ready");
        }
        drop(registry);

        client
    }

    /// Build the configured backend and connect through it.
    pub async fn from_config(config: &Config) -> Self {
        Self::connect(
            create_backend(config),
            Duration::from_secs(config.ollama.registry_ttl_secs),
        )
        .await
    }

    /// Fetch the served models and stamp the snapshot. A failed fetch
    /// stamps an empty snapshot so the next read inside the TTL does
    /// not hammer a dead endpoint.
    async fn refresh_registry(&self) {
        debug!("refreshing model registry");
        let models = match self.backend.list_models().await {
            Ok(models) => models,
            Err(e) => {
                error!(error = %e, "failed to refresh model registry");
                Vec::new()
            }
        };

        let mut registry = self.registry.write().await;
        registry.models = models;
        registry.fetched_at = Some(Instant::now());
    }

    /// Served model descriptors, from cache while fresh.
    pub async fn list_models(&self) -> Vec<String> {
        {
            let registry = self.registry.read().await;
            if registry.is_fresh(self.ttl) {
                return registry.models.clone();
            }
        }
        self.refresh_registry().await;
        self.registry.read().await.models.clone()
    }

    /// Probe availability. With a name: exact match first, then the
    /// normalized-name equivalence class; either match remembers the
    /// actually-served descriptor as the current model. Without a name:
    /// is anything served at all?
    pub async fn is_available(&self, name: Option<&str>) -> bool {
        let models = self.list_models().await;
        let Some(wanted) = name else {
            return !models.is_empty();
        };

        if models.iter().any(|m| m == wanted) {
            *self.current.write().await = Some(wanted.to_string());
            info!(model = wanted, "model is available");
            return true;
        }

        if let Some(actual) = models.iter().find(|m| names_equivalent(m, wanted)) {
            info!(
                requested = wanted,
                matched = actual.as_str(),
                "model matched to available model"
            );
            *self.current.write().await = Some(actual.clone());
            return true;
        }

        warn!(
            model = wanted,
            available = models.join(", "),
            "model is not available"
        );
        false
    }

    /// Descriptor remembered by the last successful availability probe.
    pub async fn current_model(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// One-shot completion. An explicit `model` wins; otherwise the
    /// remembered current model is used.
    pub async fn generate(&self, prompt: &str, model: Option<&str>) -> Result<String, LlmError> {
        let model = match model {
            Some(m) => m.to_string(),
            None => self
                .current_model()
                .await
                .ok_or(LlmError::NoModelSelected)?,
        };

        info!(model = model.as_str(), "generating response");
        debug!(prompt_head = head(prompt, 100).as_str(), "prompt");

        let started = std::time::Instant::now();
        let text = self.backend.generate(&model, prompt).await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "response received"
        );
        Ok(text)
    }
}

/// First `max_chars` characters, safe on multi-byte input.
fn head(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubBackend;

    const TTL: Duration = DEFAULT_REGISTRY_TTL;

    async fn client_over(stub: &StubBackend) -> ModelClient {
        ModelClient::connect(Box::new(stub.clone()), TTL).await
    }

    #[test]
    fn name_equivalence_strips_separators_and_case() {
        assert!(names_equivalent("gemma:2b", "gemma2b"));
        assert!(names_equivalent("gemma:2b", "Gemma-2B"));
        assert!(names_equivalent("phi3:mini", "phi3mini"));
        assert!(!names_equivalent("gemma:2b", "gemma:7b"));
    }

    #[tokio::test]
    async fn exact_match_sets_current_model() {
        let stub = StubBackend::classifying();
        let client = client_over(&stub).await;
        assert!(client.is_available(Some("gemma:2b")).await);
        assert_eq!(client.current_model().await.as_deref(), Some("gemma:2b"));
    }

    #[tokio::test]
    async fn normalized_match_remembers_served_descriptor() {
        let stub = StubBackend::classifying().with_models(vec!["gemma2b".to_string()]);
        let client = client_over(&stub).await;
        assert!(client.is_available(Some("gemma:2b")).await);
        // The descriptor the endpoint actually serves, not the requested one.
        assert_eq!(client.current_model().await.as_deref(), Some("gemma2b"));
    }

    #[tokio::test]
    async fn missing_model_is_reported_unavailable() {
        let stub = StubBackend::classifying();
        let client = client_over(&stub).await;
        assert!(!client.is_available(Some("llama3:70b")).await);
        assert_eq!(client.current_model().await, None);
    }

    #[tokio::test]
    async fn nameless_probe_checks_for_any_model() {
        let stub = StubBackend::classifying();
        let client = client_over(&stub).await;
        assert!(client.is_available(None).await);

        let empty = StubBackend::classifying().with_models(vec![]);
        let client = client_over(&empty).await;
        assert!(!client.is_available(None).await);
    }

    #[tokio::test]
    async fn dead_endpoint_yields_empty_registry() {
        let stub = StubBackend::unreachable();
        let client = client_over(&stub).await;
        assert!(client.list_models().await.is_empty());
        assert!(!client.is_available(Some("gemma:2b")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_reads_hit_cache_inside_ttl() {
        let stub = StubBackend::classifying();
        let client = client_over(&stub).await;
        assert_eq!(stub.list_calls(), 1); // eager warm-up on connect

        client.list_models().await;
        client.list_models().await;
        assert_eq!(stub.list_calls(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        client.list_models().await;
        assert_eq!(stub.list_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_read_observes_new_models() {
        let stub = StubBackend::classifying().with_models(vec!["gemma:2b".to_string()]);
        let client = client_over(&stub).await;
        assert_eq!(client.list_models().await, vec!["gemma:2b".to_string()]);

        stub.set_models(vec!["gemma:2b".to_string(), "phi3:mini".to_string()]);
        // Inside the TTL the old snapshot still answers.
        assert_eq!(client.list_models().await.len(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(client.list_models().await.len(), 2);
    }

    #[tokio::test]
    async fn generate_without_selection_is_rejected() {
        let stub = StubBackend::classifying();
        let client = client_over(&stub).await;
        let err = client.generate("hello", None).await.unwrap_err();
        assert!(matches!(err, LlmError::NoModelSelected));
    }

    #[tokio::test]
    async fn generate_uses_remembered_model() {
        let stub = StubBackend::classifying().with_response("hi there");
        let client = client_over(&stub).await;
        assert!(client.is_available(Some("gemma:2b")).await);
        let reply = client.generate("hello", None).await.unwrap();
        assert_eq!(reply, "hi there");
        assert_eq!(stub.generate_calls(), 1);
    }
}
