//! Synthetic sample-data batches for exercising a data product
//! end to end before real sources are wired up.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use weiche_core::{DataProduct, Sampler};

use crate::error::RequestError;

/// One generated batch of sample customers.
#[derive(Debug, Clone, Serialize)]
pub struct SampleBatch {
    pub data_product: DataProduct,
    pub records_generated: usize,
    pub customer_ids: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub struct SampleDataGenerator {
    sampler: Arc<Sampler>,
}

impl SampleDataGenerator {
    pub fn new(sampler: Arc<Sampler>) -> Self {
        Self { sampler }
    }

    pub fn generate(
        &self,
        product: DataProduct,
        sample_size: usize,
    ) -> Result<SampleBatch, RequestError> {
        if sample_size == 0 {
            return Err(RequestError::ZeroSampleSize);
        }
        info!(
            product = product.as_str(),
            sample_size, "generating sample batch"
        );

        let customer_ids = (0..sample_size)
            .map(|_| format!("CUST_{}", self.sampler.int_in(10_000, 99_999)))
            .collect();

        Ok(SampleBatch {
            data_product: product,
            records_generated: sample_size,
            customer_ids,
            generated_at: Utc::now(),
        })
    }
}
