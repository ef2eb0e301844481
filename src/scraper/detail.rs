use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};

use crate::app::Result;
use crate::domain::{normalize_date, PostRecord};
use crate::scraper::comments::CommentExtractor;
use crate::scraper::config::ScraperConfig;
use crate::scraper::scripts::PageScripts;
use crate::scraper::BrowserPage;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDetail {
    media: Vec<String>,
    content: Option<String>,
    tags: Vec<String>,
    date: Option<String>,
    likes: Option<String>,
    collects: Option<String>,
    comments: Option<String>,
}

/// Extracts one [`PostRecord`] from a detail page.
///
/// Only the main content region and the comment panel are required. The
/// remaining fields are read best-effort: a field that cannot be read is
/// left `None` (or empty for collections) and never fails the record.
pub struct DetailExtractor<'a> {
    config: &'a ScraperConfig,
    today: NaiveDate,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(config: &'a ScraperConfig) -> Self {
        Self {
            config,
            today: Local::now().date_naive(),
        }
    }

    /// Resolve relative dates against a fixed day instead of the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub async fn extract<P: BrowserPage + ?Sized>(&self, page: &P, url: &str) -> Result<PostRecord> {
        let selectors = &self.config.selectors;

        page.goto(url).await?;
        page.wait_for(&selectors.note_content, self.config.timeout())
            .await?;

        let id = PostRecord::id_from_url(url)?;

        let script = PageScripts::new(selectors).detail();
        let raw = match page.evaluate(&script).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Unexpected detail snapshot for {}: {}", id, e);
                RawDetail::default()
            }),
            Err(e) => {
                warn!("Failed to read fields of note {}: {}", id, e);
                RawDetail::default()
            }
        };

        let harvest = CommentExtractor::new(self.config, self.today)
            .extract(page)
            .await?;

        let media: BTreeSet<String> = raw
            .media
            .into_iter()
            .filter(|src| !src.trim().is_empty())
            .collect();

        let publish_date = raw
            .date
            .as_deref()
            .and_then(|text| normalize_date(text, self.today));
        if publish_date.is_none() {
            warn!("Unrecognized publish date {:?} on note {}", raw.date, id);
        }

        info!(
            "Extracted note {}: {} media, {} tags, {} comments",
            id,
            media.len(),
            raw.tags.len(),
            harvest.comments.len()
        );

        Ok(PostRecord {
            id,
            media,
            content: raw.content.unwrap_or_default(),
            like_count: raw.likes,
            collect_count: raw.collects,
            comment_count: raw.comments,
            comments_complete: harvest.is_complete(),
            comments: harvest.comments,
            tags: raw.tags,
            publish_date,
        })
    }
}
