//! Record sinks for the finished report.
//!
//! The engine produces one [`ExportReport`](crate::models::ExportReport)
//! per run; everything after that is a sink concern. Two sinks ship:
//!
//! - [`csv::CsvSink`]: a spreadsheet-ready sheet in the fixed column order
//! - [`json::JsonSink`]: the full report serialized for API consumption
//!
//! Sink failures are logged by the caller and do not abort the run; the
//! records have already been gathered at that point.

use crate::error::Result;
use crate::models::ExportReport;

pub mod csv;
pub mod json;

/// Accepts one finished record set for persistence.
pub trait RecordSink {
    async fn accept(&mut self, report: &ExportReport) -> Result<()>;
}
