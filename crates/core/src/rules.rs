//! Keyword-triggered business rules.
//!
//! Rules outrank the model: a matching rule answers a use case directly,
//! deterministically, and without a network round trip. The default
//! banking set is ordered by regulatory weight, and matching is
//! first-match-wins in that order.

use serde::{Deserialize, Serialize};

use crate::product::{DataProduct, Interpretation, Provenance};

/// One keyword-triggered classification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessRule {
    /// Lowercase keywords; any substring hit fires the rule.
    pub keywords: Vec<String>,
    pub data_product: DataProduct,
    pub confidence: f64,
    pub reasoning: String,
}

impl BusinessRule {
    pub fn new(
        keywords: &[&str],
        data_product: DataProduct,
        confidence: f64,
        reasoning: &str,
    ) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            data_product,
            confidence,
            reasoning: reasoning.to_string(),
        }
    }

    /// First keyword found in the (already lowercased) use case, if any.
    fn matched_keyword(&self, use_case_lower: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| use_case_lower.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Turn this rule into a verdict with the given provenance tag.
    pub fn interpretation(&self, provenance: Provenance) -> Interpretation {
        Interpretation {
            data_product: self.data_product,
            confidence: self.confidence,
            reasoning: self.reasoning.clone(),
            provenance,
            model: None,
        }
    }
}

/// An ordered, immutable-after-construction set of business rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<BusinessRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<BusinessRule>) -> Self {
        Self { rules }
    }

    /// The stock banking rules, highest regulatory weight first.
    pub fn banking() -> Self {
        Self::new(vec![
            BusinessRule::new(
                &["kyc", "know your customer"],
                DataProduct::Customer360,
                0.95,
                "KYC (Know Your Customer) is part of customer identity verification and profiling, making customer_360 the most appropriate choice.",
            ),
            BusinessRule::new(
                &["fraud"],
                DataProduct::FraudDetection,
                0.90,
                "Use cases mentioning fraud, suspicious activity, or security threats are best handled by the fraud_detection data product.",
            ),
            BusinessRule::new(
                &["loan"],
                DataProduct::LoanEligibility,
                0.85,
                "Loan-related use cases including approvals, terms, risk assessment, and lending decisions align with the loan_eligibility data product.",
            ),
            BusinessRule::new(
                &["churn"],
                DataProduct::ChurnPrediction,
                0.85,
                "Customer retention, attrition, and loyalty use cases are best addressed by the churn_prediction data product.",
            ),
        ])
    }

    /// Scan rules in order; return the first that fires plus the keyword
    /// that fired it (for logging). Matching is case-insensitive.
    pub fn first_match(&self, use_case: &str) -> Option<(&BusinessRule, &str)> {
        let lower = use_case.to_lowercase();
        self.rules
            .iter()
            .find_map(|rule| rule.matched_keyword(&lower).map(|kw| (rule, kw)))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
