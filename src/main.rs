//! # News Search Export
//!
//! Retrieves a bounded window of news-article teasers from a paginated
//! search results feed, classifies each teaser's text, and writes the
//! results as a spreadsheet-ready CSV sheet plus a JSON report.
//!
//! ## Usage
//!
//! ```sh
//! news_search_export -p "fed" -s Business -m 2 -o ./output
//! ```
//!
//! Every option can also come from the environment (`PHRASE_TO_SEARCH`,
//! `SECTION_TO_SELECT`, `MONTHS_BEFORE`).
//!
//! ## Architecture
//!
//! The application is a single sequential pipeline over one feed session:
//! 1. **Open**: search the feed with the section filter and newest-first
//!    ordering applied once
//! 2. **Expand**: click "load more" until the look-back window's cutoff
//!    month becomes visible
//! 3. **Walk**: convert every in-window teaser into a classified record,
//!    stopping at the cutoff boundary
//! 4. **Output**: hand the record set to the CSV and JSON sinks

use chrono::{Datelike, Local};
use clap::Parser;
use std::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classify;
mod cli;
mod cutoff;
mod engine;
mod error;
mod feed;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use engine::{ExtractionSession, FeedExtractionEngine};
use feed::nyt::NytSearchFeed;
use feed::{PageCursor, TeaserFeed};
use outputs::RecordSink;
use outputs::csv::CsvSink;
use outputs::json::JsonSink;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_search_export starting up");

    // Parse and validate configuration before touching anything external.
    let args = Cli::parse();
    if let Err(e) = args.validate() {
        error!(error = %e, "Rejected configuration");
        return Err(e.into());
    }

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let cutoff = cutoff::cutoff_month(Local::now().month(), args.months);
    info!(cutoff, months_back = args.months, "Resolved extraction window");

    // Ctrl-C flips the token; the engine checks it between steps.
    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling run");
            watcher.cancel();
        }
    });

    // ---- Open the search session and run the crawl ----
    let mut feed = NytSearchFeed::open(&args.phrase, &args.section).await?;

    let session = ExtractionSession::new(&args.phrase, &args.section, args.months, cutoff);
    let run_result = FeedExtractionEngine::new(PageCursor::new(&mut feed), session)
        .with_limits(
            args.max_expansions,
            std::time::Duration::from_secs(args.expand_timeout_secs),
        )
        .run(&cancel)
        .await;

    // The session is released no matter how the run ended.
    feed.close().await;

    let report = run_result?;
    info!(records = report.records.len(), "Extraction finished");

    // ---- Hand the report to the sinks ----
    let mut csv_sink = CsvSink {
        output_dir: args.output_dir.clone(),
    };
    if let Err(e) = csv_sink.accept(&report).await {
        error!(error = %e, "Failed to write CSV records");
    }

    let mut json_sink = JsonSink {
        output_dir: args.output_dir.clone(),
    };
    if let Err(e) = json_sink.accept(&report).await {
        error!(error = %e, "Failed to write JSON report");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        records = report.records.len(),
        "Execution complete"
    );

    Ok(())
}
