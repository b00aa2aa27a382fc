//! Spreadsheet-ready CSV output.
//!
//! One header row in the fixed column order, one row per record, RFC-4180
//! quoting for fields that embed delimiters. The file lands at
//! `{output_dir}/records.csv`.

use crate::error::Result;
use crate::models::{ArticleRecord, COLUMNS, ExportReport};
use crate::outputs::RecordSink;
use itertools::Itertools;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// Writes the record sheet under `output_dir`.
pub struct CsvSink {
    pub output_dir: String,
}

impl RecordSink for CsvSink {
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir))]
    async fn accept(&mut self, report: &ExportReport) -> Result<()> {
        let mut sheet = String::new();
        writeln!(sheet, "{}", COLUMNS.iter().join(",")).unwrap();
        for record in &report.records {
            writeln!(sheet, "{}", record_row(record)).unwrap();
        }

        fs::create_dir_all(&self.output_dir).await?;
        let path = format!("{}/records.csv", self.output_dir.trim_end_matches('/'));
        fs::write(&path, sheet).await?;

        info!(path = %path, rows = report.records.len(), "Wrote CSV record sheet");
        Ok(())
    }
}

fn record_row(record: &ArticleRecord) -> String {
    [
        csv_field(&record.title),
        csv_field(&record.description),
        csv_field(&record.date),
        record.has_money.to_string(),
        record.phrase_in_title.to_string(),
        record.phrase_in_description.to_string(),
        csv_field(record.picture_src.as_deref().unwrap_or_default()),
    ]
    .iter()
    .join(",")
}

/// Quote a field when it embeds a delimiter, doubling any inner quotes.
fn csv_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_plain_passthrough() {
        assert_eq!(csv_field("plain title"), "plain title");
    }

    #[test]
    fn test_csv_field_quotes_delimiters() {
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
    }

    #[test]
    fn test_record_row_order_matches_columns() {
        let record = ArticleRecord {
            title: "Fed, again".to_string(),
            description: "steady".to_string(),
            date: "Oct. 14".to_string(),
            has_money: false,
            phrase_in_title: 1,
            phrase_in_description: 0,
            picture_src: None,
        };

        assert_eq!(record_row(&record), "\"Fed, again\",steady,Oct. 14,false,1,0,");
    }
}
