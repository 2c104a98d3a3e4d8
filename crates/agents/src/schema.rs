//! Canonical target schemas, one per data product.
//!
//! Field order matters: it is the order fields are listed in mapping
//! prompts and reports, so the maps are ordered.

use indexmap::IndexMap;
use weiche_core::DataProduct;

/// Target schema for a data product: field name to description.
pub fn target_schema(product: DataProduct) -> IndexMap<String, String> {
    let fields: &[(&str, &str)] = match product {
        DataProduct::Customer360 => &[
            ("customer_id", "Unique customer identifier"),
            ("full_name", "Customer legal name"),
            ("email", "Primary email address"),
            ("phone", "Primary phone number"),
            ("date_of_birth", "Date of birth, ISO 8601"),
            ("kyc_status", "KYC verification state (verified, pending, failed)"),
            ("risk_level", "Assessed risk level (low, medium, high)"),
            ("verification_method", "How identity was verified (document, biometric, two-factor)"),
            ("segment", "Marketing segment label"),
        ],
        DataProduct::LoanEligibility => &[
            ("customer_id", "Unique customer identifier"),
            ("annual_income", "Declared annual income"),
            ("credit_score", "Bureau credit score"),
            ("existing_debt", "Total outstanding debt"),
            ("employment_status", "Current employment status"),
            ("requested_amount", "Requested loan amount"),
            ("loan_term_months", "Requested term in months"),
        ],
        DataProduct::FraudDetection => &[
            ("customer_id", "Unique customer identifier"),
            ("transaction_id", "Transaction identifier"),
            ("transaction_amount", "Transaction amount"),
            ("merchant_category", "Merchant category code"),
            ("transaction_country", "Country where the transaction occurred"),
            ("device_fingerprint", "Device fingerprint hash"),
            ("fraud_score", "Assigned fraud score"),
        ],
        DataProduct::ChurnPrediction => &[
            ("customer_id", "Unique customer identifier"),
            ("tenure_months", "Months since account opening"),
            ("product_count", "Number of active products"),
            ("last_login_days", "Days since last login"),
            ("complaint_count", "Complaints in the last 12 months"),
            ("balance_trend", "Balance trajectory over the last 6 months"),
            ("churn_score", "Assigned churn likelihood"),
        ],
    };
    fields
        .iter()
        .map(|(field, details)| (field.to_string(), details.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_product_has_a_schema_keyed_by_customer_id() {
        for product in DataProduct::ALL {
            let schema = target_schema(product);
            assert!(!schema.is_empty());
            assert_eq!(schema.keys().next().map(String::as_str), Some("customer_id"));
        }
    }

    #[test]
    fn customer_360_carries_the_kyc_fields() {
        let schema = target_schema(DataProduct::Customer360);
        assert!(schema.contains_key("kyc_status"));
        assert!(schema.contains_key("risk_level"));
        assert!(schema.contains_key("verification_method"));
    }
}
