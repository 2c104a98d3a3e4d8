use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Which model backend to talk to.
    pub backend: BackendKind,
    pub ollama: OllamaConfig,
    pub models: ModelsConfig,
    pub reports: ReportsConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            backend: BackendKind::from_env(),
            ollama: OllamaConfig::from_env(),
            models: ModelsConfig::from_env(),
            reports: ReportsConfig::from_env(),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  backend:  {}", self.backend);
        tracing::info!(
            "  ollama:   url={}, timeouts={}s/{}s, registry_ttl={}s",
            self.ollama.url,
            self.ollama.list_timeout_secs,
            self.ollama.generate_timeout_secs,
            self.ollama.registry_ttl_secs
        );
        tracing::info!(
            "  models:   interpret={}, mapping={}",
            self.models.interpret_model,
            self.models.mapping_model
        );
        tracing::info!("  reports:  dir={}", self.reports.dir.display());
    }

    /// Structured view of the resolved settings.
    pub fn summary_json(&self) -> serde_json::Value {
        serde_json::json!({
            "backend": self.backend,
            "ollama": {
                "url": self.ollama.url,
                "list_timeout_secs": self.ollama.list_timeout_secs,
                "generate_timeout_secs": self.ollama.generate_timeout_secs,
                "registry_ttl_secs": self.ollama.registry_ttl_secs,
            },
            "models": {
                "interpret": self.models.interpret_model,
                "mapping": self.models.mapping_model,
            },
            "reports": { "dir": self.reports.dir },
        })
    }
}

// ── Backend selection ─────────────────────────────────────────

/// Model backend implementations the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Live Ollama endpoint.
    Ollama,
    /// Deterministic in-process stand-in (offline runs, tests).
    Stub,
}

impl BackendKind {
    fn from_env() -> Self {
        Self::parse_or_default(&env_or("WEICHE_BACKEND", "ollama"))
    }

    /// Parse a backend name, warning and defaulting to Ollama on junk.
    pub fn parse_or_default(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "ollama" => BackendKind::Ollama,
            "stub" => BackendKind::Stub,
            other => {
                tracing::warn!("unknown backend '{}', defaulting to ollama", other);
                BackendKind::Ollama
            }
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Ollama => f.write_str("ollama"),
            BackendKind::Stub => f.write_str("stub"),
        }
    }
}

// ── Ollama endpoint ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    /// Timeout for `/api/tags` listing calls.
    pub list_timeout_secs: u64,
    /// Timeout for `/api/generate` completion calls.
    pub generate_timeout_secs: u64,
    /// How long a fetched model registry snapshot stays fresh.
    pub registry_ttl_secs: u64,
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_or("OLLAMA_URL", "http://localhost:11434"),
            list_timeout_secs: env_u64("OLLAMA_LIST_TIMEOUT_SECS", 5),
            generate_timeout_secs: env_u64("OLLAMA_GENERATE_TIMEOUT_SECS", 30),
            registry_ttl_secs: env_u64("MODEL_REGISTRY_TTL_SECS", 60),
        }
    }
}

// ── Designated models ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Model designated for use-case interpretation.
    pub interpret_model: String,
    /// Model designated for field-mapping suggestions.
    pub mapping_model: String,
}

impl ModelsConfig {
    pub fn from_env() -> Self {
        Self {
            interpret_model: env_or("INTERPRET_MODEL", "gemma:2b"),
            mapping_model: env_or("MAPPING_MODEL", "phi3:mini"),
        }
    }
}

// ── Report output ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    pub dir: PathBuf,
}

impl ReportsConfig {
    pub fn from_env() -> Self {
        Self {
            dir: PathBuf::from(env_or("REPORTS_DIR", "reports")),
        }
    }
}
