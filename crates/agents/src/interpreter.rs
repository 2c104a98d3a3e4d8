//! Use-case interpretation pipeline.
//!
//! Tiers run strongest-first:
//! 1. business rules (deterministic, no network round trip)
//! 2. model availability probe with first-listed fallback
//! 3. model invocation
//! 4. extraction and validation of the verdict, plus the KYC override
//! 5. rescue: a rules rescan, then the KYC guard, then a sampled mock
//!    verdict
//!
//! Any tier failure degrades to the next, so callers always get a
//! verdict back. Only an empty use case is rejected outright.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};
use weiche_core::{DataProduct, Interpretation, Provenance, RuleSet, Sampler};
use weiche_llm::ModelClient;

use crate::error::RequestError;
use crate::extract::{extract_json, require_keys};
use crate::prompt::interpretation_prompt;
use crate::routing::{pick_model, StageFailure};

/// Keywords that force customer_360 even against the model's verdict.
/// This guard is regulatory and deliberately independent of whatever
/// rule set was injected.
const KYC_KEYWORDS: &[&str] = &["kyc", "know your customer"];

const KYC_OVERRIDE_REASONING: &str = "KYC (Know Your Customer) is specifically for customer identity verification and profiling, which aligns with customer_360.";

const KYC_FALLBACK_REASONING: &str = "KYC (Know Your Customer) is part of customer identity verification and profiling, which aligns with customer_360.";

const REQUIRED_KEYS: &[&'static str] = &["data_product", "confidence", "reasoning"];

/// Shape the model is asked to reply with.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    data_product: DataProduct,
    confidence: f64,
    reasoning: String,
}

pub struct UseCaseInterpreter {
    client: Arc<ModelClient>,
    rules: RuleSet,
    model: String,
    sampler: Arc<Sampler>,
}

impl UseCaseInterpreter {
    pub fn new(
        client: Arc<ModelClient>,
        rules: RuleSet,
        model: impl Into<String>,
        sampler: Arc<Sampler>,
    ) -> Self {
        Self {
            client,
            rules,
            model: model.into(),
            sampler,
        }
    }

    /// Classify a use case onto a data product.
    pub async fn interpret(&self, use_case: &str) -> Result<Interpretation, RequestError> {
        let use_case = use_case.trim();
        if use_case.is_empty() {
            warn!("empty use case rejected");
            return Err(RequestError::EmptyUseCase);
        }
        info!(use_case, "interpreting use case");

        // Tier 1: a matching rule answers directly.
        if let Some((rule, keyword)) = self.rules.first_match(use_case) {
            info!(
                keyword,
                product = rule.data_product.as_str(),
                "applied business rule"
            );
            return Ok(rule.interpretation(Provenance::BusinessRule));
        }

        match self.classify_with_model(use_case).await {
            Ok(verdict) => Ok(verdict),
            Err(failure) => {
                warn!(error = %failure, "model path failed, falling back");
                Ok(self.rescue(use_case, &failure))
            }
        }
    }

    /// Tiers 2 through 4: pick a model, ask it, validate the reply.
    async fn classify_with_model(&self, use_case: &str) -> Result<Interpretation, StageFailure> {
        let model = pick_model(&self.client, &self.model)
            .await
            .ok_or(StageFailure::NoModels)?;

        let prompt = interpretation_prompt(use_case);
        let raw = self.client.generate(&prompt, Some(&model)).await?;

        let value = extract_json(&raw)?;
        require_keys(&value, REQUIRED_KEYS)?;
        let verdict: ModelVerdict =
            serde_json::from_value(value).map_err(|e| StageFailure::Verdict(e.to_string()))?;

        let mut result = Interpretation {
            data_product: verdict.data_product,
            confidence: verdict.confidence,
            reasoning: verdict.reasoning,
            provenance: Provenance::Model,
            model: Some(model),
        };

        // KYC use cases must land on customer_360 no matter what the
        // model answered.
        if mentions_kyc(use_case) && result.data_product != DataProduct::Customer360 {
            warn!(
                chosen = result.data_product.as_str(),
                "overriding model verdict to customer_360 for KYC use case"
            );
            result.data_product = DataProduct::Customer360;
            result.confidence = 0.95;
            result.reasoning = KYC_OVERRIDE_REASONING.to_string();
        }

        Ok(result)
    }

    /// Tier 5: rules rescan, KYC guard, then a sampled mock verdict.
    fn rescue(&self, use_case: &str, failure: &StageFailure) -> Interpretation {
        if let Some((rule, keyword)) = self.rules.first_match(use_case) {
            info!(keyword, "fallback to business rule after failure");
            return rule.interpretation(Provenance::FallbackRule);
        }

        if mentions_kyc(use_case) {
            info!("falling back to KYC guard");
            return Interpretation {
                data_product: DataProduct::Customer360,
                confidence: 0.95,
                reasoning: KYC_FALLBACK_REASONING.to_string(),
                provenance: Provenance::FallbackRule,
                model: None,
            };
        }

        info!("falling back to sampled mock verdict");
        let product = *self.sampler.pick(&DataProduct::ALL);
        let prefix = match failure {
            StageFailure::NoModels => "No LLM available",
            _ => "Error processing with LLM",
        };
        Interpretation {
            data_product: product,
            confidence: self.sampler.uniform(0.7, 0.98),
            reasoning: format!("{prefix}. Mock reasoning for: {}...", head(use_case, 30)),
            provenance: Provenance::ErrorFallback,
            model: None,
        }
    }
}

fn mentions_kyc(use_case: &str) -> bool {
    let lower = use_case.to_lowercase();
    KYC_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// First `max_chars` characters, safe on multi-byte input.
fn head(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
