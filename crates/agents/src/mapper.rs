//! Field-mapping pipeline.
//!
//! Same shape as interpretation: model path first, deterministic
//! fallback when anything in it fails. The output key set is always
//! exactly the requested source fields, in request order.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};
use weiche_core::{FieldMappings, Provenance};
use weiche_llm::ModelClient;

use crate::error::RequestError;
use crate::extract::{extract_json, ExtractError};
use crate::prompt::mapping_prompt;
use crate::routing::{pick_model, StageFailure};

pub struct FieldMapper {
    client: Arc<ModelClient>,
    model: String,
}

impl FieldMapper {
    pub fn new(client: Arc<ModelClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Suggest a target for every source field.
    pub async fn suggest_mappings(
        &self,
        source_fields: &[String],
        target_schema: &IndexMap<String, String>,
    ) -> Result<FieldMappings, RequestError> {
        if source_fields.is_empty() {
            warn!("mapping request without source fields rejected");
            return Err(RequestError::NoSourceFields);
        }
        info!(fields = source_fields.len(), "suggesting field mappings");

        match self.map_with_model(source_fields, target_schema).await {
            Ok(mappings) => Ok(mappings),
            Err(failure) => {
                warn!(error = %failure, "mapping model path failed, using identity fallback");
                Ok(identity_fallback(source_fields, target_schema))
            }
        }
    }

    async fn map_with_model(
        &self,
        source_fields: &[String],
        target_schema: &IndexMap<String, String>,
    ) -> Result<FieldMappings, StageFailure> {
        let model = pick_model(&self.client, &self.model)
            .await
            .ok_or(StageFailure::NoModels)?;

        let prompt = mapping_prompt(source_fields, target_schema);
        let raw = self.client.generate(&prompt, Some(&model)).await?;

        let value = extract_json(&raw)?;
        let object = value.as_object().ok_or(ExtractError::NotAnObject)?;

        let mut mappings = IndexMap::with_capacity(source_fields.len());
        for field in source_fields {
            let target = match object.get(field) {
                Some(Value::String(target)) => Some(target.clone()),
                Some(Value::Null) => None,
                None => {
                    warn!(field = field.as_str(), "field absent from model reply, unmapped");
                    None
                }
                Some(other) => {
                    warn!(
                        field = field.as_str(),
                        value = %other,
                        "non-string mapping target treated as unmapped"
                    );
                    None
                }
            };
            mappings.insert(field.clone(), target);
        }

        Ok(FieldMappings {
            mappings,
            provenance: Provenance::Model,
            model: Some(model),
        })
    }
}

/// Deterministic fallback: a field maps to itself exactly when the
/// target schema carries that name, otherwise to nothing.
fn identity_fallback(
    source_fields: &[String],
    target_schema: &IndexMap<String, String>,
) -> FieldMappings {
    let mappings = source_fields
        .iter()
        .map(|field| {
            let target = target_schema.contains_key(field).then(|| field.clone());
            (field.clone(), target)
        })
        .collect();
    FieldMappings {
        mappings,
        provenance: Provenance::ErrorFallback,
        model: None,
    }
}
