//! Command-line interface definitions.
//!
//! All options can be provided as flags or environment variables; the env
//! names match what the deployment environment already sets
//! (`PHRASE_TO_SEARCH`, `SECTION_TO_SELECT`, `MONTHS_BEFORE`).

use crate::error::{ExportError, Result};
use clap::Parser;

/// Command-line arguments for one extraction run.
///
/// # Examples
///
/// ```sh
/// news_search_export -p "fed" -s Business -m 2
///
/// # Or entirely from the environment
/// PHRASE_TO_SEARCH=fed SECTION_TO_SELECT=Business MONTHS_BEFORE=2 news_search_export
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Phrase searched in the feed and counted in each teaser's title and description
    #[arg(short, long, env = "PHRASE_TO_SEARCH")]
    pub phrase: String,

    /// Section filter applied before pagination begins
    #[arg(short, long, env = "SECTION_TO_SELECT")]
    pub section: String,

    /// Look-back window in months; 0 is treated as 1
    #[arg(short, long, env = "MONTHS_BEFORE", default_value_t = 1)]
    pub months: u32,

    /// Output directory for the record sheet and the JSON report
    #[arg(short, long, default_value = "./output")]
    pub output_dir: String,

    /// Hard cap on "load more" rounds before giving up on the cutoff month
    #[arg(long, default_value_t = 120)]
    pub max_expansions: usize,

    /// Per-call timeout for one "load more" round, in seconds
    #[arg(long, default_value_t = 45)]
    pub expand_timeout_secs: u64,
}

impl Cli {
    /// Reject configurations the run could not execute meaningfully.
    ///
    /// An empty phrase would match at every character boundary, and a
    /// window over 12 months cannot be expressed as a single month
    /// abbreviation without wrapping the calendar more than once.
    pub fn validate(&self) -> Result<()> {
        if self.phrase.trim().is_empty() {
            return Err(ExportError::Config(
                "search phrase must not be empty".to_string(),
            ));
        }
        if self.section.trim().is_empty() {
            return Err(ExportError::Config(
                "section filter must not be empty".to_string(),
            ));
        }
        if self.months > 12 {
            return Err(ExportError::Config(format!(
                "look-back window of {} months exceeds the 12-month maximum",
                self.months
            )));
        }
        Ok(())
    }
}
