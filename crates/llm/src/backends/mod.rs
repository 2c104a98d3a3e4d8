pub mod ollama;
pub mod stub;

use weiche_core::config::{BackendKind, Config};

use crate::backend::ModelBackend;

/// Create the configured model backend.
pub fn create_backend(config: &Config) -> Box<dyn ModelBackend> {
    match config.backend {
        BackendKind::Ollama => Box::new(ollama::OllamaBackend::new(&config.ollama)),
        BackendKind::Stub => Box::new(stub::StubBackend::classifying()),
    }
}
