//! New York Times search-feed session.
//!
//! Drives the NYT search results page over plain HTTP. The search phrase,
//! section filter, and newest-first ordering are applied as query
//! parameters when the session is opened; "load more" re-requests the
//! results list with a higher `page` number, which renders everything up to
//! that page, and keeps whatever extends the current list.
//!
//! The markup is minimal and consistent: results are `li` entries inside an
//! ordered list, each carrying a headline, a summary paragraph, a date
//! span, and usually a thumbnail.

use crate::error::{ExportError, Result};
use crate::feed::{RawTeaser, TeaserFeed};
use crate::utils::truncate_for_log;
use rand::{rng, Rng};
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Search endpoint. Fixed; the phrase and section arrive as query params.
const SEARCH_URL: &str = "https://www.nytimes.com/search";

/// Browser-like user agent; the search page serves a degraded shell to
/// unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0";

/// Base delay between page requests. A little jitter is added per request.
const PAGE_DELAY_MS: u64 = 400;

/// A live search session against the NYT results feed.
pub struct NytSearchFeed {
    client: reqwest::Client,
    phrase: String,
    section: String,
    items: Vec<RawTeaser>,
    pages_fetched: usize,
}

impl NytSearchFeed {
    /// Open a session: build the client, perform the search with the
    /// section filter and newest-first ordering, and parse the first page.
    ///
    /// Any failure here is fatal for the run; nothing is left half-open
    /// because the session holds no resources beyond the client itself.
    #[instrument(level = "info", skip_all, fields(%phrase, %section))]
    pub async fn open(phrase: &str, section: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ExportError::SessionUnavailable(e.to_string()))?;

        let mut feed = Self {
            client,
            phrase: phrase.to_string(),
            section: section.to_string(),
            items: Vec::new(),
            pages_fetched: 0,
        };

        feed.fetch_page(0)
            .await
            .map_err(|e| ExportError::SessionUnavailable(e.to_string()))?;

        info!(count = feed.items.len(), "Opened search session");
        Ok(feed)
    }

    /// Fetch the results list rendered up to `page` and keep whatever
    /// extends the current list. Returns the number of items added.
    async fn fetch_page(&mut self, page: usize) -> Result<usize> {
        let page_param = page.to_string();
        let html = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("query", self.phrase.as_str()),
                ("sections", self.section.as_str()),
                ("sort", "newest"),
                ("page", page_param.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let parsed = parse_teasers(&html);
        let before = self.items.len();
        if parsed.len() > before {
            self.items = parsed;
        }
        self.pages_fetched = self.pages_fetched.max(page + 1);

        let added = self.items.len() - before;
        debug!(page, added, total = self.items.len(), "Fetched results page");
        Ok(added)
    }
}

impl TeaserFeed for NytSearchFeed {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    #[instrument(level = "debug", skip_all)]
    async fn expand(&mut self) -> Result<()> {
        // Stay polite to the feed; the original paced its UI clicks too.
        let jitter_ms: u64 = rng().random_range(0..=250);
        sleep(Duration::from_millis(PAGE_DELAY_MS + jitter_ms)).await;

        self.fetch_page(self.pages_fetched).await?;
        Ok(())
    }

    fn teaser_at(&self, index: usize) -> Option<&RawTeaser> {
        self.items.get(index.checked_sub(1)?)
    }

    async fn close(&mut self) {
        info!(items = self.items.len(), "Closing search session");
        self.items.clear();
    }
}

/// Parse the rendered results list into teasers, best-effort per field.
///
/// A `li` entry with nothing readable still occupies its index so that the
/// list stays aligned with what the feed displays.
fn parse_teasers(html: &str) -> Vec<RawTeaser> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("ol[data-testid=search-results] li[data-testid=search-bodega-result]").unwrap();
    let title_selector = Selector::parse("h4").unwrap();
    let description_selector = Selector::parse("a p").unwrap();
    let date_selector = Selector::parse("span[data-testid=todays-date], div > span").unwrap();
    let image_selector = Selector::parse("img[src]").unwrap();

    let base = Url::parse(SEARCH_URL).expect("static URL");

    let mut teasers = Vec::new();
    for item in document.select(&item_selector) {
        let title = item
            .select(&title_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
            .filter(|t| !t.is_empty());

        let description = item
            .select(&description_selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string());

        let date_label = item
            .select(&date_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|d| !d.is_empty());

        let image_src = item
            .select(&image_selector)
            .next()
            .and_then(|el| el.value().attr("src"))
            .and_then(|src| base.join(src).ok())
            .map(|resolved| resolved.to_string());

        if title.is_none() {
            warn!(
                snippet = %truncate_for_log(&item.html(), 120),
                "Result item without a readable headline"
            );
        }

        teasers.push(RawTeaser {
            title,
            description,
            date_label,
            image_src,
        });
    }

    teasers
}
