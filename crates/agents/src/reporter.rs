//! Flat-file report export.
//!
//! Each run writes a JSON rendition and a `field,value` CSV next to it,
//! named `<product>_<customer>_<timestamp>`. Reports carry a 30-day
//! expiration; customer_360 reports additionally carry the KYC fields.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use weiche_core::{DataProduct, Sampler};

use crate::error::RequestError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Approved,
    Rejected,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationMethod {
    Document,
    Biometric,
    TwoFactor,
}

/// Report payload. The three KYC fields are set together, and only for
/// customer_360.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub data_product: DataProduct,
    pub customer_id: String,
    pub generated_at: DateTime<Utc>,
    pub score: f64,
    pub status: ReportStatus,
    pub expiration: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyc_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<VerificationMethod>,
}

impl Report {
    pub fn has_kyc_block(&self) -> bool {
        self.kyc_status.is_some()
    }
}

/// Where one export landed.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
}

pub struct ReportWriter {
    dir: PathBuf,
    sampler: Arc<Sampler>,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>, sampler: Arc<Sampler>) -> Self {
        Self {
            dir: dir.into(),
            sampler,
        }
    }

    /// Assemble the report payload for one processed customer.
    pub fn build(
        &self,
        product: DataProduct,
        customer_id: &str,
        model_used: Option<&str>,
    ) -> Result<Report, RequestError> {
        let customer_id = customer_id.trim();
        if customer_id.is_empty() {
            return Err(RequestError::MissingField("customer_id"));
        }

        let now = Utc::now();
        let is_kyc_product = product == DataProduct::Customer360;

        Ok(Report {
            data_product: product,
            customer_id: customer_id.to_string(),
            generated_at: now,
            score: self.sampler.uniform(0.0, 1.0),
            status: *self.sampler.pick(&[
                ReportStatus::Approved,
                ReportStatus::Rejected,
                ReportStatus::Pending,
            ]),
            expiration: now + Duration::days(30),
            model_used: model_used.map(|m| m.to_string()),
            kyc_status: is_kyc_product.then(|| "verified".to_string()),
            risk_level: is_kyc_product.then(|| {
                *self
                    .sampler
                    .pick(&[RiskLevel::Low, RiskLevel::Medium, RiskLevel::High])
            }),
            verification_method: is_kyc_product.then(|| {
                *self.sampler.pick(&[
                    VerificationMethod::Document,
                    VerificationMethod::Biometric,
                    VerificationMethod::TwoFactor,
                ])
            }),
        })
    }

    /// Write the JSON and CSV renditions, returning both paths.
    pub async fn export(&self, report: &Report) -> Result<ReportPaths, ReportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let stamp = report.generated_at.format("%Y%m%d_%H%M%S");
        let base = format!("{}_{}_{}", report.data_product, report.customer_id, stamp);
        let json_path = self.dir.join(format!("{base}.json"));
        let csv_path = self.dir.join(format!("{base}.csv"));

        tokio::fs::write(&json_path, serde_json::to_string_pretty(report)?).await?;
        tokio::fs::write(&csv_path, render_csv(report)?).await?;

        info!(
            json = %json_path.display(),
            csv = %csv_path.display(),
            "reports written"
        );
        Ok(ReportPaths {
            json: json_path,
            csv: csv_path,
        })
    }
}

/// `field,value` rows for every scalar field of the JSON rendition.
fn render_csv(report: &Report) -> Result<String, ReportError> {
    let value = serde_json::to_value(report)?;
    let mut out = String::from("field,value\n");
    if let Some(object) = value.as_object() {
        for (key, field) in object {
            match field {
                Value::Object(_) | Value::Array(_) => continue,
                Value::String(s) => out.push_str(&format!("{key},{s}\n")),
                other => out.push_str(&format!("{key},{other}\n")),
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(dir: &std::path::Path) -> ReportWriter {
        ReportWriter::new(dir, Arc::new(Sampler::seeded(11)))
    }

    #[test]
    fn blank_customer_id_is_rejected() {
        let writer = writer(std::path::Path::new("unused"));
        let err = writer
            .build(DataProduct::FraudDetection, "", None)
            .unwrap_err();
        assert_eq!(err, RequestError::MissingField("customer_id"));
    }

    #[test]
    fn kyc_block_only_on_customer_360() {
        let writer = writer(std::path::Path::new("unused"));
        let c360 = writer
            .build(DataProduct::Customer360, "CUST_1", Some("gemma:2b"))
            .unwrap();
        assert!(c360.has_kyc_block());
        assert_eq!(c360.kyc_status.as_deref(), Some("verified"));
        assert!(c360.risk_level.is_some());
        assert!(c360.verification_method.is_some());

        let loan = writer
            .build(DataProduct::LoanEligibility, "CUST_1", None)
            .unwrap();
        assert!(!loan.has_kyc_block());
        assert!(loan.risk_level.is_none());
    }

    #[test]
    fn report_expires_thirty_days_out() {
        let writer = writer(std::path::Path::new("unused"));
        let report = writer
            .build(DataProduct::ChurnPrediction, "CUST_2", None)
            .unwrap();
        assert_eq!(report.expiration - report.generated_at, Duration::days(30));
        assert!((0.0..1.0).contains(&report.score));
    }

    #[test]
    fn verification_method_uses_kebab_names() {
        assert_eq!(
            serde_json::to_string(&VerificationMethod::TwoFactor).unwrap(),
            "\"two-factor\""
        );
    }

    #[test]
    fn absent_kyc_fields_round_trip() {
        let writer = writer(std::path::Path::new("unused"));
        let report = writer
            .build(DataProduct::FraudDetection, "CUST_9", None)
            .unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("kyc_status"));
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert!(!parsed.has_kyc_block());
    }

    #[tokio::test]
    async fn export_writes_json_and_csv_renditions() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let report = writer
            .build(DataProduct::Customer360, "CUST_77", Some("gemma:2b"))
            .unwrap();

        let paths = writer.export(&report).await.unwrap();
        assert!(paths.json.exists());
        assert!(paths.csv.exists());

        let file_name = paths.json.file_name().unwrap().to_string_lossy().into_owned();
        assert!(file_name.starts_with("customer_360_CUST_77_"));
        assert!(file_name.ends_with(".json"));

        let parsed: Report =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(parsed.customer_id, "CUST_77");
        assert!(parsed.has_kyc_block());

        let csv = std::fs::read_to_string(&paths.csv).unwrap();
        assert!(csv.starts_with("field,value\n"));
        assert!(csv.contains("customer_id,CUST_77"));
        assert!(csv.contains("kyc_status,verified"));
        assert!(csv.contains("model_used,gemma:2b"));
    }

    #[tokio::test]
    async fn non_kyc_report_has_no_kyc_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let report = writer
            .build(DataProduct::FraudDetection, "CUST_5", None)
            .unwrap();
        let paths = writer.export(&report).await.unwrap();

        let csv = std::fs::read_to_string(&paths.csv).unwrap();
        assert!(!csv.contains("kyc_status"));
        assert!(!csv.contains("model_used"));
    }
}
