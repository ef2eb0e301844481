use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::app::Result;
use crate::domain::SearchResultItem;
use crate::scraper::config::ScraperConfig;
use crate::scraper::scripts::PageScripts;
use crate::scraper::BrowserPage;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCard {
    href: Option<String>,
    author: Option<String>,
    date: Option<String>,
    bundle: bool,
}

impl RawCard {
    fn is_unlinked(&self) -> bool {
        !self.bundle && self.href.as_deref().is_none_or(|h| h.trim().is_empty())
    }
}

/// Runs a keyword search and collects the result cards of the first render.
///
/// `max_results` is only a hint: everything a single render produces is
/// returned, and the collector never scrolls for more.
pub struct SearchCollector<'a> {
    config: &'a ScraperConfig,
}

impl<'a> SearchCollector<'a> {
    pub fn new(config: &'a ScraperConfig) -> Self {
        Self { config }
    }

    pub async fn collect<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResultItem>> {
        let selectors = &self.config.selectors;

        page.submit_text(&selectors.search_input, query).await?;
        page.wait_for(&selectors.result_card, self.config.timeout())
            .await?;

        // Cards keep rendering for a while after the first one appears
        tokio::time::sleep(self.config.search_settle()).await;

        let script = PageScripts::new(selectors).search_cards();
        let mut cards: Vec<RawCard> = serde_json::from_value(page.evaluate(&script).await?)?;

        // Links are filled in lazily; give unlinked cards one more chance
        if cards.iter().any(RawCard::is_unlinked) {
            debug!("Some result cards have no link yet, reading them again");
            tokio::time::sleep(self.config.link_wait()).await;
            cards = serde_json::from_value(page.evaluate(&script).await?)?;
        }
        info!("Found {} result cards for {:?}", cards.len(), query);

        let results = self.to_results(cards);
        if results.len() > max_results {
            info!(
                "Search rendered {} results, more than the requested {}",
                results.len(),
                max_results
            );
        }
        Ok(results)
    }

    fn to_results(&self, cards: Vec<RawCard>) -> Vec<SearchResultItem> {
        let genuine: Vec<RawCard> = cards.into_iter().filter(|card| !card.bundle).collect();
        info!("{} cards left after dropping recommendation bundles", genuine.len());

        let mut results = Vec::new();
        for (idx, card) in genuine.into_iter().enumerate() {
            let Some(href) = card.href.filter(|h| !h.trim().is_empty()) else {
                warn!("Result {} has no detail link, skipping", idx + 1);
                continue;
            };

            let item = SearchResultItem {
                url: self.config.absolute_url(&href),
                author: card.author.unwrap_or_default(),
                raw_date_text: card.date.unwrap_or_default(),
            };
            info!(
                "Result {}: {} by {} ({})",
                idx + 1,
                item.url,
                item.author,
                item.raw_date_text
            );
            results.push(item);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::fake::FakePage;
    use crate::scraper::scripts::CARDS_TAG;
    use serde_json::{json, Value};

    fn quick_config() -> ScraperConfig {
        ScraperConfig {
            search_settle_ms: 0,
            link_wait_ms: 0,
            ..Default::default()
        }
    }

    fn card(n: usize, bundle: bool) -> Value {
        json!({
            "href": format!("/search_result/note{n}?xsec_token=t{n}"),
            "author": format!("author{n}"),
            "date": "3天前",
            "bundle": bundle
        })
    }

    #[tokio::test]
    async fn test_recommendation_bundles_are_dropped_in_order() {
        let config = quick_config();
        let bundles = [2, 5, 9];
        let cards: Vec<Value> = (0..10).map(|n| card(n, bundles.contains(&n))).collect();
        let page = FakePage::new().with_cards(Value::Array(cards));

        let results = SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await
            .unwrap();

        assert_eq!(results.len(), 7);
        let authors: Vec<&str> = results.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(
            authors,
            ["author0", "author1", "author3", "author4", "author6", "author7", "author8"]
        );
    }

    #[tokio::test]
    async fn test_urls_are_absolute() {
        let config = quick_config();
        let page = FakePage::new().with_cards(json!([card(1, false)]));

        let results = SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await
            .unwrap();

        assert_eq!(
            results[0].url,
            "https://www.xiaohongshu.com/search_result/note1?xsec_token=t1"
        );
        assert_eq!(results[0].raw_date_text, "3天前");
    }

    #[tokio::test]
    async fn test_query_is_submitted_to_search_input() {
        let config = quick_config();
        let page = FakePage::new().with_cards(json!([]));

        SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await
            .unwrap();

        assert_eq!(
            page.submitted(),
            vec![("input#search-input".to_string(), "打铁花".to_string())]
        );
    }

    #[tokio::test]
    async fn test_cards_without_link_are_skipped() {
        let config = quick_config();
        let page = FakePage::new().with_cards(json!([
            card(0, false),
            { "href": null, "author": "ghost", "date": null, "bundle": false },
            { "author": "nolink" },
            card(3, false)
        ]));

        let results = SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].author, "author3");
    }

    #[tokio::test]
    async fn test_max_results_does_not_truncate_render() {
        let config = quick_config();
        let cards: Vec<Value> = (0..10).map(|n| card(n, false)).collect();
        let page = FakePage::new().with_cards(Value::Array(cards));

        let results = SearchCollector::new(&config)
            .collect(&page, "打铁花", 4)
            .await
            .unwrap();

        assert_eq!(results.len(), 10);
        assert_eq!(results[9].author, "author9");
    }

    #[tokio::test]
    async fn test_unlinked_cards_are_read_again() {
        let config = quick_config();
        let page = FakePage::new()
            .with_cards(json!([card(0, false), { "author": "late", "bundle": false }]))
            .with_cards(json!([
                card(0, false),
                { "href": "/explore/late", "author": "late", "bundle": false }
            ]));

        let results = SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].url, "https://www.xiaohongshu.com/explore/late");
        assert_eq!(page.evaluations(CARDS_TAG), 2);
    }

    #[tokio::test]
    async fn test_linked_cards_are_read_once() {
        let config = quick_config();
        let page = FakePage::new().with_cards(json!([card(0, false), card(1, true)]));

        SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await
            .unwrap();

        assert_eq!(page.evaluations(CARDS_TAG), 1);
    }

    #[tokio::test]
    async fn test_no_results_rendered_is_an_error() {
        let config = quick_config();
        let page = FakePage::new().with_missing("section.note-item");

        let result = SearchCollector::new(&config)
            .collect(&page, "打铁花", 50)
            .await;

        assert!(result.is_err());
    }
}
