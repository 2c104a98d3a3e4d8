use thiserror::Error;

/// Caller-input rejections. These surface to the caller unchanged; the
/// fallback tiers exist for endpoint trouble, not for bad requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("no use case provided")]
    EmptyUseCase,
    #[error("no source fields provided")]
    NoSourceFields,
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("sample size must be greater than zero")]
    ZeroSampleSize,
}
