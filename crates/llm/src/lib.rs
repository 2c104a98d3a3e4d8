pub mod backend;
pub mod backends;
pub mod client;

pub use backend::{LlmError, ModelBackend};
pub use backends::create_backend;
pub use backends::ollama::OllamaBackend;
pub use backends::stub::StubBackend;
pub use client::{names_equivalent, ModelClient, DEFAULT_REGISTRY_TTL};
