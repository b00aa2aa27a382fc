//! The three-phase extraction state machine.
//!
//! One run = one [`ExtractionSession`] driven over one feed session:
//!
//! 1. **Expand**: grow the rendered list until the last visible item's
//!    month reaches the cutoff. The check is deliberately coarse; it only
//!    decides when to stop clicking "load more".
//! 2. **Walk & classify**: iterate every rendered item newest-first, stop
//!    at the first item whose month equals the cutoff (the authoritative,
//!    exclusive boundary), and convert everything before it into
//!    [`ArticleRecord`]s. Items that fail to render are skipped without
//!    ending the walk.
//! 3. **Handoff**: consume the session into an [`ExportReport`] for the
//!    record sinks.
//!
//! # Termination
//!
//! The expansion loop carries three guards the walk does not need: a hard
//! iteration cap, a per-call timeout on `expand`, and a stall check for a
//! feed that stops growing before the cutoff month ever appears. All three
//! end expansion early and let the walk run over whatever is loaded; a
//! partial window is an acceptable result.
//!
//! # Known limitation
//!
//! The walk's early stop is only sound because the feed is ordered
//! newest-first (selected once when the session is opened). If the feed
//! interleaves months, items older than the window can slip in ahead of the
//! boundary and items inside it can be cut off.

use crate::classify::{count_phrase, mentions_money};
use crate::cutoff::normalize_month;
use crate::error::{ExportError, Result};
use crate::feed::{PageCursor, TeaserFeed};
use crate::models::{ArticleRecord, ExportReport};
use chrono::Local;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Hard cap on "load more" rounds per session.
const MAX_EXPANSIONS: usize = 120;

/// Time allowed for a single expansion round, network and render included.
const EXPAND_TIMEOUT: Duration = Duration::from_secs(45);

/// Run-scoped state: the search inputs, the resolved cutoff, and the
/// records accumulated so far in feed display order.
pub struct ExtractionSession {
    search_phrase: String,
    section: String,
    months_back: u32,
    cutoff: &'static str,
    records: Vec<ArticleRecord>,
}

impl ExtractionSession {
    pub fn new(
        search_phrase: &str,
        section: &str,
        months_back: u32,
        cutoff: &'static str,
    ) -> Self {
        Self {
            search_phrase: search_phrase.to_string(),
            section: section.to_string(),
            months_back,
            cutoff,
            records: Vec::new(),
        }
    }

    fn into_report(self) -> ExportReport {
        ExportReport {
            local_date: Local::now().date_naive().to_string(),
            local_time: Local::now().time().to_string(),
            search_phrase: self.search_phrase,
            section: self.section,
            cutoff_month: self.cutoff.to_string(),
            records: self.records,
        }
    }
}

/// Drives one [`ExtractionSession`] over one feed cursor.
pub struct FeedExtractionEngine<'a, F: TeaserFeed> {
    cursor: PageCursor<'a, F>,
    session: ExtractionSession,
    max_expansions: usize,
    expand_timeout: Duration,
}

impl<'a, F: TeaserFeed> FeedExtractionEngine<'a, F> {
    pub fn new(cursor: PageCursor<'a, F>, session: ExtractionSession) -> Self {
        Self {
            cursor,
            session,
            max_expansions: MAX_EXPANSIONS,
            expand_timeout: EXPAND_TIMEOUT,
        }
    }

    /// Override the expansion guards.
    pub fn with_limits(mut self, max_expansions: usize, expand_timeout: Duration) -> Self {
        self.max_expansions = max_expansions;
        self.expand_timeout = expand_timeout;
        self
    }

    /// Execute all three phases and return the finished report.
    ///
    /// `cancel` is honored between expansion rounds and between walked
    /// items; a cancelled run yields [`ExportError::Cancelled`] and the
    /// caller releases the feed session.
    #[instrument(level = "info", skip_all, fields(cutoff = self.session.cutoff))]
    pub async fn run(mut self, cancel: &CancellationToken) -> Result<ExportReport> {
        info!(
            phrase = %self.session.search_phrase,
            section = %self.session.section,
            months_back = self.session.months_back,
            cutoff = self.session.cutoff,
            "Starting extraction run"
        );

        self.expand_to_window(cancel).await?;
        self.walk_items(cancel)?;

        Ok(self.session.into_report())
    }

    /// Expansion: click "load more" until the last visible item lands on
    /// the cutoff month, the feed stalls, or a guard trips.
    async fn expand_to_window(&mut self, cancel: &CancellationToken) -> Result<()> {
        let cutoff = self.session.cutoff;
        let mut expansions = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }

            let count = self.cursor.item_count();
            if count > 0 {
                let last_month = self
                    .cursor
                    .month_label_at(count)
                    .and_then(|label| normalize_month(&label));
                if last_month == Some(cutoff) {
                    debug!(items = count, expansions, "Cutoff month visible; expansion done");
                    return Ok(());
                }
            }

            if expansions >= self.max_expansions {
                warn!(
                    expansions,
                    items = count,
                    "Expansion cap reached before the cutoff month; proceeding with what is loaded"
                );
                return Ok(());
            }

            match timeout(self.expand_timeout, self.cursor.expand()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(error = %e, items = count, "Expansion failed; proceeding with what is loaded");
                    return Ok(());
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.expand_timeout.as_secs(),
                        items = count,
                        "Expansion timed out; proceeding with what is loaded"
                    );
                    return Ok(());
                }
            }
            expansions += 1;

            if self.cursor.item_count() == count {
                warn!(
                    items = count,
                    expansions,
                    "Feed stopped growing before the cutoff month; proceeding with what is loaded"
                );
                return Ok(());
            }
        }
    }

    /// Walk: visit every rendered item up to, but not past, the first one
    /// whose month equals the cutoff.
    fn walk_items(&mut self, cancel: &CancellationToken) -> Result<()> {
        let cutoff = self.session.cutoff;
        let total = self.cursor.item_count();
        info!(items = total, cutoff, "Walking rendered items");

        for index in 1..=total {
            if cancel.is_cancelled() {
                return Err(ExportError::Cancelled);
            }

            if let Some(label) = self.cursor.month_label_at(index) {
                match normalize_month(&label) {
                    Some(month) if month == cutoff => {
                        debug!(index, %label, "Reached cutoff month; stopping walk");
                        break;
                    }
                    Some(_) => {}
                    // An unreadable month cannot prove the item is out of
                    // window, so it stays in.
                    None => warn!(index, %label, "Unrecognized month label; keeping item"),
                }
            }

            let Some(teaser) = self.cursor.teaser_at(index) else {
                debug!(index, "Missing item; skipped");
                continue;
            };
            let (Some(title), Some(date)) = (teaser.title.as_deref(), teaser.date_label.as_deref())
            else {
                debug!(index, "Item without title or date; skipped");
                continue;
            };

            let description = teaser.description.clone().unwrap_or_default();
            let phrase = self.session.search_phrase.as_str();
            let record = ArticleRecord {
                title: title.to_string(),
                date: date.to_string(),
                has_money: mentions_money(title) || mentions_money(&description),
                phrase_in_title: count_phrase(title, phrase),
                phrase_in_description: count_phrase(&description, phrase),
                picture_src: teaser.image_src.clone(),
                description,
            };
            self.session.records.push(record);
        }

        info!(records = self.session.records.len(), "Walk complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::RawTeaser;
    use std::collections::VecDeque;

    /// Scripted feed: starts with some items and appends one pre-planned
    /// batch per `expand` call. An exhausted script leaves the count
    /// unchanged, like a feed with no more results.
    struct ScriptFeed {
        items: Vec<RawTeaser>,
        batches: VecDeque<Vec<RawTeaser>>,
        expands: usize,
    }

    impl ScriptFeed {
        fn new(items: Vec<RawTeaser>, batches: Vec<Vec<RawTeaser>>) -> Self {
            Self {
                items,
                batches: batches.into(),
                expands: 0,
            }
        }
    }

    impl TeaserFeed for ScriptFeed {
        fn item_count(&self) -> usize {
            self.items.len()
        }

        async fn expand(&mut self) -> Result<()> {
            self.expands += 1;
            if let Some(batch) = self.batches.pop_front() {
                self.items.extend(batch);
            }
            Ok(())
        }

        fn teaser_at(&self, index: usize) -> Option<&RawTeaser> {
            let teaser = self.items.get(index.checked_sub(1)?)?;
            if teaser.title.is_none() && teaser.date_label.is_none() {
                // Unrenderable entry.
                return None;
            }
            Some(teaser)
        }

        async fn close(&mut self) {}
    }

    fn teaser(title: &str, date: &str) -> RawTeaser {
        RawTeaser {
            title: Some(title.to_string()),
            description: Some(format!("About {title}")),
            date_label: Some(date.to_string()),
            image_src: None,
        }
    }

    fn session(cutoff: &'static str) -> ExtractionSession {
        ExtractionSession::new("fed", "Business", 1, cutoff)
    }

    async fn run_engine(feed: &mut ScriptFeed, cutoff: &'static str) -> ExportReport {
        FeedExtractionEngine::new(PageCursor::new(feed), session(cutoff))
            .run(&CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_expands_until_cutoff_visible() {
        let mut feed = ScriptFeed::new(
            vec![teaser("a", "Oct. 20"), teaser("b", "Oct. 14")],
            vec![vec![teaser("c", "Sep. 30"), teaser("d", "Sep. 12")]],
        );

        let report = run_engine(&mut feed, "Sep").await;

        assert_eq!(feed.expands, 1);
        let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_walk_stops_before_cutoff_month() {
        // The canonical window scenario: two Oct items survive, nothing at
        // or past the first Sep item does.
        let mut feed = ScriptFeed::new(
            vec![
                teaser("a", "Oct. 20"),
                teaser("b", "Oct. 14"),
                teaser("c", "Sep. 30"),
                teaser("d", "Sep. 12"),
                teaser("e", "Aug. 2"),
            ],
            vec![],
        );

        let report = run_engine(&mut feed, "Sep").await;

        assert_eq!(report.records.len(), 2);
        assert!(report.records.iter().all(|r| r.date.starts_with("Oct")));
    }

    #[tokio::test]
    async fn test_stalled_feed_terminates_and_walk_still_runs() {
        // The cutoff month never appears and the feed never grows.
        let mut feed = ScriptFeed::new(
            vec![teaser("a", "Oct. 20"), teaser("b", "Oct. 14")],
            vec![],
        );

        let report = run_engine(&mut feed, "Sep").await;

        assert_eq!(feed.expands, 1);
        assert_eq!(report.records.len(), 2);
    }

    #[tokio::test]
    async fn test_expansion_cap_bounds_growing_feed() {
        // A feed that keeps producing in-window items forever.
        let batches: Vec<Vec<RawTeaser>> =
            (0..500).map(|i| vec![teaser(&format!("t{i}"), "Oct. 1")]).collect();
        let mut feed = ScriptFeed::new(vec![teaser("t", "Oct. 2")], batches);

        let report = FeedExtractionEngine::new(PageCursor::new(&mut feed), session("Sep"))
            .with_limits(5, EXPAND_TIMEOUT)
            .run(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(feed.expands, 5);
        assert_eq!(report.records.len(), 6);
    }

    #[tokio::test]
    async fn test_expand_timeout_is_transient() {
        struct HangingFeed {
            items: Vec<RawTeaser>,
        }
        impl TeaserFeed for HangingFeed {
            fn item_count(&self) -> usize {
                self.items.len()
            }
            async fn expand(&mut self) -> Result<()> {
                std::future::pending::<()>().await;
                Ok(())
            }
            fn teaser_at(&self, index: usize) -> Option<&RawTeaser> {
                self.items.get(index.checked_sub(1)?)
            }
            async fn close(&mut self) {}
        }

        let mut feed = HangingFeed {
            items: vec![teaser("a", "Oct. 20")],
        };
        let report = FeedExtractionEngine::new(
            PageCursor::new(&mut feed),
            session("Sep"),
        )
        .with_limits(MAX_EXPANSIONS, Duration::from_millis(20))
        .run(&CancellationToken::new())
        .await
        .unwrap();

        assert_eq!(report.records.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_item_does_not_end_walk() {
        let mut feed = ScriptFeed::new(
            vec![
                teaser("a", "Oct. 20"),
                RawTeaser::default(),
                teaser("b", "Oct. 10"),
            ],
            vec![],
        );

        let report = run_engine(&mut feed, "Sep").await;

        let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_item_without_date_is_skipped() {
        let mut no_date = teaser("b", "Oct. 10");
        no_date.date_label = None;
        let mut feed = ScriptFeed::new(vec![teaser("a", "Oct. 20"), no_date], vec![]);

        let report = run_engine(&mut feed, "Sep").await;

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].title, "a");
    }

    #[tokio::test]
    async fn test_malformed_label_is_kept() {
        let mut feed = ScriptFeed::new(
            vec![teaser("a", "Oct. 20"), teaser("b", "Yesterday")],
            vec![],
        );

        let report = run_engine(&mut feed, "Sep").await;

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[1].date, "Yesterday");
    }

    #[tokio::test]
    async fn test_cutoff_on_first_item_yields_nothing() {
        let mut feed = ScriptFeed::new(vec![teaser("a", "Sep. 30")], vec![]);

        let report = run_engine(&mut feed, "Sep").await;

        assert_eq!(feed.expands, 0);
        assert!(report.records.is_empty());
    }

    #[tokio::test]
    async fn test_classification_flows_into_records() {
        let mut rich = teaser("Fed eyes rate cut", "Oct. 20");
        rich.description = Some("The fed move could cost $1,250.50 overall".to_string());
        rich.image_src = Some("https://example.com/a.jpg".to_string());
        let mut feed = ScriptFeed::new(vec![rich], vec![]);

        let report = run_engine(&mut feed, "Sep").await;

        let record = &report.records[0];
        assert!(record.has_money);
        assert_eq!(record.phrase_in_title, 1);
        assert_eq!(record.phrase_in_description, 1);
        assert_eq!(record.picture_src.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(report.cutoff_month, "Sep");
        assert_eq!(report.search_phrase, "fed");
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let mut feed = ScriptFeed::new(vec![teaser("a", "Oct. 20")], vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = FeedExtractionEngine::new(PageCursor::new(&mut feed), session("Sep"))
            .run(&cancel)
            .await;

        assert!(matches!(result, Err(ExportError::Cancelled)));
        assert_eq!(feed.expands, 0);
    }
}
