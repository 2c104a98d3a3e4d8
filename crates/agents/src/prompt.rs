//! Prompt builders for the two model-backed agents.
//!
//! The interpretation prompt enumerates every product with its blurb and
//! spells out the KYC rule, so even a small local model lands on the
//! right vocabulary. Wording changes here shift classification quality;
//! edit with care.

use indexmap::IndexMap;
use weiche_core::DataProduct;

/// Prompt asking the model to classify one use case.
pub fn interpretation_prompt(use_case: &str) -> String {
    let mut options = String::new();
    for product in DataProduct::ALL {
        options.push_str(&format!("- {}: {}\n", product, product.description()));
    }

    format!(
        "You are a banking data product specialist. Interpret the following banking use case \
and identify the most appropriate data product from the following options:\n\
{options}\n\
Use case: {use_case}\n\n\
Special rules:\n\
- If the use case mentions \"KYC\" or \"Know Your Customer\", always choose customer_360 as this is specifically for identity verification\n\
- If the use case is very short or ambiguous, choose the most logical option based on banking domain knowledge\n\n\
Respond in JSON format with the following structure:\n\
{{\n\
    \"data_product\": \"the_chosen_data_product\",\n\
    \"confidence\": confidence_score_between_0_and_1,\n\
    \"reasoning\": \"brief explanation of your choice\"\n\
}}"
    )
}

/// Prompt asking the model to map source fields onto a target schema.
pub fn mapping_prompt(source_fields: &[String], target_schema: &IndexMap<String, String>) -> String {
    let source_list = source_fields
        .iter()
        .map(|field| format!("- {field}"))
        .collect::<Vec<_>>()
        .join("\n");
    let target_list = target_schema
        .iter()
        .map(|(field, details)| format!("- {field}: {details}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a data mapping expert. Suggest the best field mappings from source to target.\n\n\
Source fields:\n\
{source_list}\n\n\
Target schema:\n\
{target_list}\n\n\
For each source field, map it to the most appropriate target field based on semantic similarity.\n\
Respond in JSON format with source field names as keys and target field names as values.\n\
If a source field has no appropriate mapping, map it to null.\n\n\
Example response format:\n\
{{\n\
    \"source_field1\": \"target_field1\",\n\
    \"source_field2\": \"target_field2\",\n\
    \"source_field3\": null\n\
}}"
    )
}
