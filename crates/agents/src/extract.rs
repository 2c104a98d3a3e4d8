//! Structured-response extraction.
//!
//! Models wrap their JSON in markdown fences, preambles and sign-offs.
//! Extraction runs three locator attempts in order (```json fence,
//! generic fence, outermost brace span) and parses whatever the first
//! hit yields. Prose with no JSON at all is a typed failure, never a
//! silently forwarded string.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no JSON object found in model output")]
    NoJsonFound,
    #[error("invalid JSON in model output: {0}")]
    InvalidJson(String),
    #[error("model output is not a JSON object")]
    NotAnObject,
    #[error("model output is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Locate and parse the JSON object embedded in raw model output.
pub fn extract_json(response: &str) -> Result<Value, ExtractError> {
    let candidate = locate_candidate(response).ok_or(ExtractError::NoJsonFound)?;
    serde_json::from_str(candidate).map_err(|e| ExtractError::InvalidJson(e.to_string()))
}

/// Ensure a parsed reply is an object carrying every required field.
pub fn require_keys(value: &Value, keys: &[&'static str]) -> Result<(), ExtractError> {
    let object = value.as_object().ok_or(ExtractError::NotAnObject)?;
    for key in keys {
        if !object.contains_key(*key) {
            return Err(ExtractError::MissingField(key));
        }
    }
    Ok(())
}

fn locate_candidate(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return Some(trimmed[json_start..json_start + end].trim());
        }
    }

    // Handle ``` ... ``` blocks, skipping any language tag on the fence line
    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return Some(after_tick[content_start..content_start + end].trim());
        }
    }

    // Raw JSON: outermost brace span
    let open = trimmed.find('{')?;
    let close = trimmed.rfind('}')?;
    if close > open {
        return Some(&trimmed[open..=close]);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_raw() {
        let value = extract_json(r#"{"data_product": "fraud_detection"}"#).unwrap();
        assert_eq!(value["data_product"], "fraud_detection");
    }

    #[test]
    fn extract_json_code_block() {
        let input = "Here is the answer:\n```json\n{\"data_product\": \"fraud_detection\", \"confidence\": 0.8, \"reasoning\": \"x\"}\n```\nThanks";
        let value = extract_json(input).unwrap();
        assert_eq!(value["confidence"], 0.8);
    }

    #[test]
    fn extract_json_generic_fence_with_language_tag() {
        let input = "```javascript\n{\"confidence\": 0.5}\n```";
        let value = extract_json(input).unwrap();
        assert_eq!(value["confidence"], 0.5);
    }

    #[test]
    fn extract_json_with_prefix() {
        let input = "Sure! Here's my verdict: {\"data_product\": \"churn_prediction\"} hope it helps";
        let value = extract_json(input).unwrap();
        assert_eq!(value["data_product"], "churn_prediction");
    }

    #[test]
    fn unclosed_json_fence_falls_back_to_braces() {
        let input = "```json\n{\"confidence\": 0.9}";
        let value = extract_json(input).unwrap();
        assert_eq!(value["confidence"], 0.9);
    }

    #[test]
    fn prose_without_json_is_a_typed_failure() {
        let err = extract_json("I cannot help with that request.").unwrap_err();
        assert!(matches!(err, ExtractError::NoJsonFound));
    }

    #[test]
    fn reversed_braces_do_not_panic() {
        let err = extract_json("} malformed {").unwrap_err();
        assert!(matches!(err, ExtractError::NoJsonFound));
    }

    #[test]
    fn invalid_json_inside_fence_is_reported() {
        let err = extract_json("```json\n{not json}\n```").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidJson(_)));
    }

    #[test]
    fn require_keys_flags_missing_field() {
        let value = extract_json(r#"{"data_product": "customer_360", "confidence": 1.0}"#).unwrap();
        assert!(require_keys(&value, &["data_product", "confidence"]).is_ok());
        let err = require_keys(&value, &["data_product", "confidence", "reasoning"]).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField("reasoning")));
    }

    #[test]
    fn require_keys_rejects_non_objects() {
        let value = extract_json(r#"{"a": 1}"#).unwrap();
        assert!(require_keys(&value["a"], &[]).is_err());
    }
}
