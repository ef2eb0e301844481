use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::app::Result;
use crate::domain::{PostRecord, SearchResultItem};
use crate::scraper::config::ScraperConfig;
use crate::scraper::detail::DetailExtractor;
use crate::scraper::search::SearchCollector;
use crate::scraper::BrowserPage;
use crate::store::Store;

/// Outcome counts of one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub found: usize,
    pub saved: usize,
    pub failed: usize,
}

/// Drives one browser tab through search and detail pages, one at a time
pub struct NoteCrawler<P: BrowserPage> {
    page: P,
    config: ScraperConfig,
    today: Option<NaiveDate>,
}

impl<P: BrowserPage> NoteCrawler<P> {
    pub fn new(page: P, config: ScraperConfig) -> Self {
        Self {
            page,
            config,
            today: None,
        }
    }

    /// Resolve relative dates against a fixed day instead of the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    /// Open the site's front page, where the search field lives
    pub async fn start(&self) -> Result<()> {
        self.page.goto(&self.config.base_url).await
    }

    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResultItem>> {
        SearchCollector::new(&self.config)
            .collect(&self.page, query, max_results)
            .await
    }

    pub async fn catch_note(&self, url: &str) -> Result<PostRecord> {
        let mut extractor = DetailExtractor::new(&self.config);
        if let Some(today) = self.today {
            extractor = extractor.with_today(today);
        }
        extractor.extract(&self.page, url).await
    }

    /// Search for `keyword` and append a record per result to `store`.
    ///
    /// A note that fails is logged and counted; the crawl moves on.
    pub async fn crawl<S: Store + ?Sized>(
        &self,
        keyword: &str,
        max_results: usize,
        store: &S,
    ) -> Result<CrawlSummary> {
        let results = self.search(keyword, max_results).await?;
        let mut summary = CrawlSummary {
            found: results.len(),
            ..Default::default()
        };

        for (idx, item) in results.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.config.visit_delay()).await;
            }

            info!("Scraping note {}/{}: {}", idx + 1, results.len(), item.url);
            let record = match self.catch_note(&item.url).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to scrape {}: {}", item.url, e);
                    summary.failed += 1;
                    continue;
                }
            };

            match store.append(&record) {
                Ok(()) => summary.saved += 1,
                Err(e) => {
                    error!("Failed to save note {}: {}", record.id, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Crawl of {:?} complete: {} found, {} saved, {} failed",
            keyword, summary.found, summary.saved, summary.failed
        );
        Ok(summary)
    }

    /// Close the tab. Failures are logged, never returned.
    pub async fn close(self) {
        match self.page.close().await {
            Ok(()) => info!("Page closed"),
            Err(e) => warn!("Failed to close page: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fake::FakePage;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<PostRecord>>,
    }

    impl Store for MemoryStore {
        fn append(&self, record: &PostRecord) -> Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn quick_config() -> ScraperConfig {
        ScraperConfig {
            search_settle_ms: 0,
            scroll_interval_ms: 0,
            end_recheck_timeout_ms: 20,
            visit_delay_ms: 0,
            poll_interval_ms: 1,
            ..Default::default()
        }
    }

    fn page() -> FakePage {
        FakePage::new()
            .with_cards(json!([
                { "href": "/explore/first", "author": "a", "date": "昨天" },
                { "href": "/explore/broken", "author": "b", "date": "昨天" },
                { "href": "/explore/bundle", "bundle": true },
                { "href": "/explore/third", "author": "c", "date": "昨天" }
            ]))
            .with_detail(json!({ "content": "内容", "media": ["m.jpg", "m.jpg"] }))
            .with_comments(json!([{ "text": "评论", "like": "赞" }]))
            .with_failing_url("https://www.xiaohongshu.com/explore/broken")
    }

    #[tokio::test]
    async fn test_crawl_continues_past_failing_note() {
        let crawler = NoteCrawler::new(page(), quick_config())
            .with_today(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        let store = MemoryStore::default();

        let summary = crawler.crawl("打铁花", 50, &store).await.unwrap();

        assert_eq!(
            summary,
            CrawlSummary {
                found: 3,
                saved: 2,
                failed: 1
            }
        );
        let ids: Vec<String> = store
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, vec!["first", "third"]);
    }

    #[tokio::test]
    async fn test_crawl_visits_in_search_order() {
        let crawler = NoteCrawler::new(page(), quick_config());
        let store = MemoryStore::default();

        crawler.crawl("打铁花", 50, &store).await.unwrap();

        assert_eq!(
            crawler.page().visited(),
            vec![
                "https://www.xiaohongshu.com/explore/first",
                "https://www.xiaohongshu.com/explore/broken",
                "https://www.xiaohongshu.com/explore/third",
            ]
        );
    }

    #[tokio::test]
    async fn test_start_opens_base_url() {
        let crawler = NoteCrawler::new(FakePage::new(), quick_config());
        crawler.start().await.unwrap();
        assert_eq!(crawler.page().visited(), vec!["https://www.xiaohongshu.com"]);
    }

    #[tokio::test]
    async fn test_close_swallows_failures() {
        let crawler = NoteCrawler::new(FakePage::new().with_failing_close(), quick_config());
        // Must not panic or return an error
        crawler.close().await;
    }

    #[test]
    fn test_catch_note_resolves_dates_against_fixed_day() {
        let page = FakePage::new()
            .with_detail(json!({ "content": "内容", "media": ["m.jpg", "m.jpg"], "date": "3天前 河南" }))
            .with_comments(json!([{ "text": "评论", "date": "昨天", "like": "赞" }]));
        let crawler = NoteCrawler::new(page, quick_config())
            .with_today(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());

        let record = tokio_test::block_on(
            crawler.catch_note("https://www.xiaohongshu.com/explore/first"),
        )
        .unwrap();

        assert_eq!(record.publish_date, NaiveDate::from_ymd_opt(2024, 6, 7));
        assert_eq!(record.comments[0].date, NaiveDate::from_ymd_opt(2024, 6, 9));
        assert_eq!(record.media.len(), 1);
    }
}
