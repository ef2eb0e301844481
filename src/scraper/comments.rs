use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::{normalize_date, parse_like_label, CommentRecord};
use crate::scraper::config::ScraperConfig;
use crate::scraper::scripts::PageScripts;
use crate::scraper::BrowserPage;

/// States of the comment panel scroll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollState {
    /// The "no comments" banner was shown on entry
    NoComments,
    Scrolling,
    /// The end marker rendered
    ReachedEnd,
    /// The iteration ceiling was hit before the end marker rendered
    MaxScrollReached,
}

impl ScrollState {
    /// Whether the rows read in this state are the whole list
    pub fn is_complete(self) -> bool {
        matches!(self, ScrollState::NoComments | ScrollState::ReachedEnd)
    }
}

/// Comments read from one detail page plus how the scroll loop ended
#[derive(Debug, Clone)]
pub struct CommentHarvest {
    pub state: ScrollState,
    pub scrolls: u32,
    pub comments: Vec<CommentRecord>,
}

impl CommentHarvest {
    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawComment {
    text: Option<String>,
    date: Option<String>,
    like: Option<String>,
}

/// Scrolls the comment panel until everything is rendered, then reads it.
///
/// The panel renders rows lazily as its own scroll offset grows, so the
/// only way to load the full list is to keep nudging that container and
/// give the page time to render between nudges.
pub struct CommentExtractor<'a> {
    config: &'a ScraperConfig,
    today: NaiveDate,
}

impl<'a> CommentExtractor<'a> {
    pub fn new(config: &'a ScraperConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    pub async fn extract<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<CommentHarvest> {
        let selectors = &self.config.selectors;

        if page.is_visible(&selectors.no_comments).await? {
            info!("Note has no comments");
            return Ok(CommentHarvest {
                state: ScrollState::NoComments,
                scrolls: 0,
                comments: Vec::new(),
            });
        }

        let (state, scrolls) = self.scroll_to_end(page).await?;

        if let Err(e) = page
            .wait_until_visible(
                &selectors.end_marker,
                self.config.end_recheck_timeout(),
                self.config.poll_interval(),
            )
            .await
        {
            warn!("End of comments not confirmed, comments possibly incomplete: {}", e);
        }

        let comments = self.read_rows(page).await?;
        info!("Found {} comments", comments.len());

        Ok(CommentHarvest {
            state,
            scrolls,
            comments,
        })
    }

    async fn scroll_to_end<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<(ScrollState, u32)> {
        let selectors = &self.config.selectors;
        let mut state = ScrollState::Scrolling;
        let mut scrolls = 0;

        while state == ScrollState::Scrolling {
            if page.is_visible(&selectors.end_marker).await? {
                info!("Reached end of comments after {} scrolls", scrolls);
                state = ScrollState::ReachedEnd;
            } else if scrolls >= self.config.max_scroll_times {
                warn!(
                    "Stopped after {} scrolls without reaching the end of comments",
                    self.config.max_scroll_times
                );
                state = ScrollState::MaxScrollReached;
            } else {
                page.scroll_by(&selectors.comment_scroller, self.config.scroll_step_px)
                    .await?;
                tokio::time::sleep(self.config.scroll_interval()).await;
                scrolls += 1;
                debug!("Comment scroll {}", scrolls);
            }
        }

        Ok((state, scrolls))
    }

    async fn read_rows<P: BrowserPage + ?Sized>(&self, page: &P) -> Result<Vec<CommentRecord>> {
        let script = PageScripts::new(&self.config.selectors).comments();
        let rows: Vec<RawComment> = serde_json::from_value(page.evaluate(&script).await?)?;
        Ok(self.to_records(rows))
    }

    fn to_records(&self, rows: Vec<RawComment>) -> Vec<CommentRecord> {
        let placeholder = &self.config.selectors.like_placeholder;

        rows.into_iter()
            .map(|row| {
                let like_label = row.like.unwrap_or_default();
                let like_count = parse_like_label(&like_label, placeholder);
                if like_count.is_none() {
                    warn!("Unrecognized like label {:?}", like_label);
                }

                CommentRecord {
                    date: row
                        .date
                        .as_deref()
                        .and_then(|text| normalize_date(text, self.today)),
                    like_count,
                    text: row.text.unwrap_or_default(),
                }
            })
            .collect()
    }
}
