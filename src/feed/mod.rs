//! The paginated search-feed boundary.
//!
//! Everything the extraction engine knows about the outside world goes
//! through [`TeaserFeed`]: a stateful, non-reentrant session over one search
//! results list that can only grow. The production implementation lives in
//! [`nyt`]; tests script the trait directly.
//!
//! [`PageCursor`] wraps an exclusive borrow of a feed session and is the
//! only view the engine composes against. The borrow serializes access by
//! construction — no two expand/read operations can be in flight at once,
//! and there is no process-wide session handle.

use crate::error::Result;

pub mod nyt;

/// One rendered search-result item, fields all best-effort.
///
/// A list entry that failed to render still occupies its index so that
/// sibling items keep theirs; whatever could not be read is `None`.
#[derive(Debug, Clone, Default)]
pub struct RawTeaser {
    /// Headline text.
    pub title: Option<String>,
    /// Summary paragraph.
    pub description: Option<String>,
    /// Raw date label as displayed, e.g. `Sept. 14`.
    pub date_label: Option<String>,
    /// Image reference for this item.
    pub image_src: Option<String>,
}

/// A live session over the paginated search results list.
///
/// Implementations must keep `item_count` monotonically non-decreasing
/// within a session and must not panic on out-of-range lookups.
pub trait TeaserFeed {
    /// Number of items currently rendered in the feed list.
    fn item_count(&self) -> usize;

    /// Load additional items. The count may be unchanged afterwards when
    /// the feed is exhausted; callers must re-query [`TeaserFeed::item_count`]
    /// and guard against looping forever.
    async fn expand(&mut self) -> Result<()>;

    /// The item at the 1-based `index`, or `None` when it is missing or
    /// unrenderable.
    fn teaser_at(&self, index: usize) -> Option<&RawTeaser>;

    /// Release the session. Called unconditionally when the run ends.
    async fn close(&mut self);
}

/// Cursor over one feed session, holding the session borrow for the
/// duration of a run.
pub struct PageCursor<'a, F: TeaserFeed> {
    feed: &'a mut F,
}

impl<'a, F: TeaserFeed> PageCursor<'a, F> {
    pub fn new(feed: &'a mut F) -> Self {
        Self { feed }
    }

    /// Current number of rendered items.
    pub fn item_count(&self) -> usize {
        self.feed.item_count()
    }

    /// Trigger loading of additional items.
    pub async fn expand(&mut self) -> Result<()> {
        self.feed.expand().await
    }

    /// The month portion of the date label at the 1-based `index`.
    ///
    /// The feed renders labels like `Oct. 14` or `June 2`; the month
    /// portion is the leading token before the first `.` or space. Returns
    /// `None` when the item or its label is absent.
    pub fn month_label_at(&self, index: usize) -> Option<String> {
        let label = self.feed.teaser_at(index)?.date_label.as_deref()?;
        label
            .split(['.', ' '])
            .find(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// The raw teaser at the 1-based `index`.
    pub fn teaser_at(&self, index: usize) -> Option<&RawTeaser> {
        self.feed.teaser_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedFeed {
        items: Vec<RawTeaser>,
    }

    impl TeaserFeed for FixedFeed {
        fn item_count(&self) -> usize {
            self.items.len()
        }

        async fn expand(&mut self) -> Result<()> {
            Ok(())
        }

        fn teaser_at(&self, index: usize) -> Option<&RawTeaser> {
            self.items.get(index.checked_sub(1)?)
        }

        async fn close(&mut self) {}
    }

    fn teaser(date_label: Option<&str>) -> RawTeaser {
        RawTeaser {
            title: Some("headline".to_string()),
            description: None,
            date_label: date_label.map(str::to_string),
            image_src: None,
        }
    }

    #[test]
    fn test_month_label_strips_day() {
        let mut feed = FixedFeed {
            items: vec![teaser(Some("Oct. 14")), teaser(Some("June 2"))],
        };
        let cursor = PageCursor::new(&mut feed);

        assert_eq!(cursor.month_label_at(1).as_deref(), Some("Oct"));
        assert_eq!(cursor.month_label_at(2).as_deref(), Some("June"));
    }

    #[test]
    fn test_month_label_absent_cases() {
        let mut feed = FixedFeed {
            items: vec![teaser(None)],
        };
        let cursor = PageCursor::new(&mut feed);

        // No label on the item, and indexes outside the list.
        assert_eq!(cursor.month_label_at(1), None);
        assert_eq!(cursor.month_label_at(2), None);
        assert_eq!(cursor.month_label_at(0), None);
    }
}
