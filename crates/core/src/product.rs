use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The four data products a banking use case can land on.
///
/// Wire names are the snake_case strings models are prompted with
/// (`customer_360`, `loan_eligibility`, ...), so serde renames and
/// `Display` must stay in lockstep with the prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataProduct {
    #[serde(rename = "customer_360")]
    Customer360,
    LoanEligibility,
    FraudDetection,
    ChurnPrediction,
}

impl DataProduct {
    /// Every product, in the order they are offered to the model.
    pub const ALL: [DataProduct; 4] = [
        DataProduct::Customer360,
        DataProduct::LoanEligibility,
        DataProduct::FraudDetection,
        DataProduct::ChurnPrediction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataProduct::Customer360 => "customer_360",
            DataProduct::LoanEligibility => "loan_eligibility",
            DataProduct::FraudDetection => "fraud_detection",
            DataProduct::ChurnPrediction => "churn_prediction",
        }
    }

    /// One-line purpose blurb used when enumerating options in prompts.
    pub fn description(&self) -> &'static str {
        match self {
            DataProduct::Customer360 => {
                "For comprehensive customer profiling, identity verification (including KYC), and personalization"
            }
            DataProduct::LoanEligibility => {
                "For determining loan approval and terms based on customer financial data"
            }
            DataProduct::FraudDetection => {
                "For identifying suspicious activity and preventing fraud"
            }
            DataProduct::ChurnPrediction => {
                "For predicting and preventing customer attrition"
            }
        }
    }
}

impl fmt::Display for DataProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data product: {0}")]
pub struct ParseProductError(String);

impl FromStr for DataProduct {
    type Err = ParseProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer_360" => Ok(DataProduct::Customer360),
            "loan_eligibility" => Ok(DataProduct::LoanEligibility),
            "fraud_detection" => Ok(DataProduct::FraudDetection),
            "churn_prediction" => Ok(DataProduct::ChurnPrediction),
            other => Err(ParseProductError(other.to_string())),
        }
    }
}

/// Which tier of the pipeline produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A business rule matched before the model was consulted.
    BusinessRule,
    /// The model answered and its verdict survived validation.
    Model,
    /// The model path failed but a rule rescued the verdict afterwards.
    FallbackRule,
    /// Nothing matched and the verdict was sampled.
    ErrorFallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::BusinessRule => "business_rule",
            Provenance::Model => "model",
            Provenance::FallbackRule => "fallback_rule",
            Provenance::ErrorFallback => "error_fallback",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one use case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    pub data_product: DataProduct,
    pub confidence: f64,
    pub reasoning: String,
    pub provenance: Provenance,
    /// Model that actually answered, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Suggested source-to-target field mappings for one data product.
///
/// Keys are exactly the requested source fields, in request order;
/// `None` marks a field with no suitable target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMappings {
    pub mappings: IndexMap<String, Option<String>>,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl FieldMappings {
    /// Count of fields that found a target.
    pub fn mapped_count(&self) -> usize {
        self.mappings.values().filter(|v| v.is_some()).count()
    }
}
