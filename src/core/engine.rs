use crate::domain::model::ImportSummary;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// Drives a pipeline through its three stages and reports progress.
pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<(ImportSummary, String)> {
        tracing::info!("starting import");

        let raw = self.pipeline.extract().await?;
        tracing::info!(bytes = raw.len(), "input loaded");

        let summary = self.pipeline.transform(raw).await?;
        tracing::info!(
            total = summary.total,
            accepted = summary.accepted,
            filtered = summary.filtered,
            duplicates = summary.duplicates,
            "records processed"
        );

        let output_path = self.pipeline.load(summary.clone()).await?;
        tracing::info!(%output_path, "output written");

        Ok((summary, output_path))
    }
}
