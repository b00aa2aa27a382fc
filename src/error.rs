//! Crate-wide error type.
//!
//! Only conditions that abort the whole run surface here. Per-item problems
//! (a missing teaser, a label that will not parse as a month) are recovered
//! locally in the engine and never become an [`ExportError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// The search session could not be opened, or a required search/filter
    /// action failed before pagination began. Fatal for the run.
    #[error("search session unavailable: {0}")]
    SessionUnavailable(String),

    /// A page request failed mid-session.
    #[error("feed request failed: {0}")]
    Feed(#[from] reqwest::Error),

    /// Rejected configuration, e.g. an empty search phrase.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Writing a record sink failed.
    #[error("output write failed: {0}")]
    Output(#[from] std::io::Error),

    /// Serializing the report failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was cancelled externally before completion.
    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ExportError>;
