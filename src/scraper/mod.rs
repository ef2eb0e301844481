//! Browser-driven note crawling.
//!
//! The crawler attaches to a browser the operator already started with a
//! remote debugging port, then drives a single tab through the site.
//!
//! # Architecture
//!
//! ```text
//! search → result cards → detail page → comment scroll → PostRecord
//! ```
//!
//! All page interaction goes through [`BrowserPage`], implemented for a
//! real tab by [`ChromePage`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use notecrawl::scraper::{ChromeConnector, NoteCrawler, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let session = ChromeConnector::new(&config)?.connect().await?;
//! let page = session.new_page(&config.base_url, config.poll_interval()).await?;
//!
//! let crawler = NoteCrawler::new(page, config);
//! let results = crawler.search("打铁花", 20).await?;
//! let record = crawler.catch_note(&results[0].url).await?;
//!
//! crawler.close().await;
//! session.detach().await;
//! ```

mod chrome;
mod comments;
mod config;
mod crawler;
mod detail;
mod scripts;
mod search;

#[cfg(test)]
pub(crate) mod fake;

pub use chrome::{BrowserVersion, ChromeConnector, ChromePage, ChromeSession};
pub use comments::{CommentExtractor, CommentHarvest, ScrollState};
pub use config::{ScraperConfig, SelectorConfig};
pub use crawler::{CrawlSummary, NoteCrawler};
pub use detail::DetailExtractor;
pub use scripts::PageScripts;
pub use search::SearchCollector;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::{NotecrawlError, Result};

/// Operations the crawler needs from a browser tab
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate the tab to a URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until at least one element matches `selector`
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Whether the first element matching `selector` is currently rendered
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Add `delta_px` to the scroll offset of the element matching `selector`
    async fn scroll_by(&self, selector: &str, delta_px: i64) -> Result<()>;

    /// Replace the value of an input, type `text` and press Enter
    async fn submit_text(&self, selector: &str, text: &str) -> Result<()>;

    /// Evaluate a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Close the tab
    async fn close(&self) -> Result<()>;

    /// Poll [`is_visible`](BrowserPage::is_visible) until it holds or `timeout` elapses
    async fn wait_until_visible(
        &self,
        selector: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<()> {
        let poll = async {
            loop {
                if self.is_visible(selector).await? {
                    return Ok::<(), NotecrawlError>(());
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(NotecrawlError::Timeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}
