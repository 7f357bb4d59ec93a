use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("🚀 Starting ETL process");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::debug!("Extracted {} records", raw_data.records.len());

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        let row_count = transformed.rows.len();
        tracing::debug!(
            "Transformed into {} rows, dropped {}",
            row_count,
            transformed.stats.dropped()
        );

        // Load
        let output_path = self.pipeline.load(transformed).await?;

        tracing::info!("✅ ETL process completed in {:?}", started.elapsed());
        Ok(RunSummary {
            row_count,
            output_path,
        })
    }
}
