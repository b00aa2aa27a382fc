//! JSON report output.
//!
//! Serializes the whole [`ExportReport`] — records plus run metadata — to
//! `{output_dir}/records.json` for API-style consumers.

use crate::error::Result;
use crate::models::ExportReport;
use crate::outputs::RecordSink;
use tokio::fs;
use tracing::{info, instrument};

/// Writes the serialized report under `output_dir`.
pub struct JsonSink {
    pub output_dir: String,
}

impl RecordSink for JsonSink {
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir))]
    async fn accept(&mut self, report: &ExportReport) -> Result<()> {
        let json = serde_json::to_string(report)?;

        fs::create_dir_all(&self.output_dir).await?;
        let path = format!("{}/records.json", self.output_dir.trim_end_matches('/'));
        fs::write(&path, json).await?;

        info!(path = %path, records = report.records.len(), "Wrote JSON report");
        Ok(())
    }
}
