//! Data models for extracted teasers and the export report.
//!
//! This module defines the core data structures used throughout the
//! application:
//! - [`ArticleRecord`]: one validated teaser row with its derived fields
//! - [`ExportReport`]: the finished record set plus run metadata, handed to
//!   the record sinks
//!
//! Field names follow the column names of the exported sheet, so the serde
//! representation and the tabular output stay aligned.

use serde::{Deserialize, Serialize};

/// Fixed column order for tabular output.
pub const COLUMNS: [&str; 7] = [
    "title",
    "description",
    "date",
    "has_money",
    "phrase_in_title",
    "phrase_in_description",
    "picture_src",
];

/// One extracted news-article teaser.
///
/// Every record that reaches the report has a non-empty title; teasers
/// without one are skipped during the walk. The derived fields (`has_money`
/// and the two phrase counts) are pure functions of the title, the
/// description, and the configured search phrase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The teaser headline.
    pub title: String,
    /// The teaser summary paragraph. May be empty.
    pub description: String,
    /// The raw locale date label as rendered by the feed, e.g. `Sept. 14`.
    pub date: String,
    /// Whether title or description mentions a money amount.
    pub has_money: bool,
    /// Case-insensitive occurrences of the search phrase in the title.
    pub phrase_in_title: usize,
    /// Case-insensitive occurrences of the search phrase in the description.
    pub phrase_in_description: usize,
    /// Image reference for the teaser, when one was rendered.
    pub picture_src: Option<String>,
}

/// The finished record set for one run, in feed display order
/// (newest first), plus the metadata the run was executed with.
#[derive(Debug, Deserialize, Serialize)]
pub struct ExportReport {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local wall-clock time of the run.
    pub local_time: String,
    /// The phrase that was searched and counted.
    pub search_phrase: String,
    /// The section filter applied before pagination.
    pub section: String,
    /// The resolved stop-boundary month abbreviation.
    pub cutoff_month: String,
    /// The extracted records.
    pub records: Vec<ArticleRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ArticleRecord {
        ArticleRecord {
            title: "Fed weighs rate cut".to_string(),
            description: "Markets expect a $1,200 swing".to_string(),
            date: "Oct. 14".to_string(),
            has_money: true,
            phrase_in_title: 1,
            phrase_in_description: 0,
            picture_src: Some("https://example.com/thumb.jpg".to_string()),
        }
    }

    #[test]
    fn test_record_serialization_round_trip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_report_serialization() {
        let report = ExportReport {
            local_date: "2025-10-14".to_string(),
            local_time: "08:30:00".to_string(),
            search_phrase: "fed".to_string(),
            section: "Business".to_string(),
            cutoff_month: "Sep".to_string(),
            records: vec![sample_record()],
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("2025-10-14"));
        assert!(json.contains("\"cutoff_month\":\"Sep\""));
        assert!(json.contains("Fed weighs rate cut"));
    }

    #[test]
    fn test_columns_match_record_fields() {
        // Keep the header row in lockstep with the serde field names.
        let json = serde_json::to_value(sample_record()).unwrap();
        for column in COLUMNS {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
    }
}
