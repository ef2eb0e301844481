//! In-process stand-in for a browser tab.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::{NotecrawlError, Result};
use crate::scraper::scripts::{CARDS_TAG, COMMENTS_TAG, DETAIL_TAG};
use crate::scraper::{BrowserPage, SelectorConfig};

pub(crate) struct FakePage {
    selectors: SelectorConfig,
    /// Canned snapshots per script tag; the last one repeats
    responses: HashMap<&'static str, Vec<Value>>,
    evaluations: Mutex<HashMap<&'static str, usize>>,
    no_comments: bool,
    /// Scrolls needed before the end marker shows; `None` keeps it hidden forever
    end_after: Option<u32>,
    missing: Vec<String>,
    failing_urls: Vec<String>,
    fail_close: bool,
    scrolls: AtomicU32,
    scroll_targets: Mutex<Vec<String>>,
    visited: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, String)>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            selectors: SelectorConfig::default(),
            responses: HashMap::new(),
            evaluations: Mutex::new(HashMap::new()),
            no_comments: false,
            end_after: Some(0),
            missing: Vec::new(),
            failing_urls: Vec::new(),
            fail_close: false,
            scrolls: AtomicU32::new(0),
            scroll_targets: Mutex::new(Vec::new()),
            visited: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_cards(mut self, cards: Value) -> Self {
        self.responses.entry(CARDS_TAG).or_default().push(cards);
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.responses.entry(DETAIL_TAG).or_default().push(detail);
        self
    }

    pub fn with_comments(mut self, rows: Value) -> Self {
        self.responses.entry(COMMENTS_TAG).or_default().push(rows);
        self
    }

    pub fn with_no_comments_banner(mut self) -> Self {
        self.no_comments = true;
        self
    }

    pub fn with_end_after(mut self, scrolls: Option<u32>) -> Self {
        self.end_after = scrolls;
        self
    }

    pub fn with_missing(mut self, selector: &str) -> Self {
        self.missing.push(selector.to_string());
        self
    }

    pub fn with_failing_url(mut self, url: &str) -> Self {
        self.failing_urls.push(url.to_string());
        self
    }

    pub fn with_failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn scrolls(&self) -> u32 {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn scroll_targets(&self) -> Vec<String> {
        self.scroll_targets.lock().unwrap().clone()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().unwrap().clone()
    }

    /// How many times a script with `tag` has been evaluated
    pub fn evaluations(&self, tag: &str) -> usize {
        self.evaluations
            .lock()
            .unwrap()
            .get(tag)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        if self.failing_urls.iter().any(|u| u == url) {
            return Err(NotecrawlError::Scraper(format!("Navigation failed: {}", url)));
        }
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.missing.iter().any(|s| s == selector) {
            return Err(NotecrawlError::Timeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        if selector == self.selectors.no_comments {
            return Ok(self.no_comments);
        }
        if selector == self.selectors.end_marker {
            return Ok(self.end_after.is_some_and(|n| self.scrolls() >= n));
        }
        Ok(!self.missing.iter().any(|s| s == selector))
    }

    async fn scroll_by(&self, selector: &str, _delta_px: i64) -> Result<()> {
        self.scroll_targets.lock().unwrap().push(selector.to_string());
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn submit_text(&self, selector: &str, text: &str) -> Result<()> {
        self.submitted
            .lock()
            .unwrap()
            .push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let failed = || NotecrawlError::Scraper("Script execution failed".to_string());
        let tag = [CARDS_TAG, DETAIL_TAG, COMMENTS_TAG]
            .into_iter()
            .find(|tag| script.starts_with(tag))
            .ok_or_else(failed)?;

        let call = {
            let mut evaluations = self.evaluations.lock().unwrap();
            let count = evaluations.entry(tag).or_insert(0);
            *count += 1;
            *count - 1
        };

        let responses = self.responses.get(tag).ok_or_else(failed)?;
        responses
            .get(call)
            .or_else(|| responses.last())
            .cloned()
            .ok_or_else(failed)
    }

    async fn close(&self) -> Result<()> {
        if self.fail_close {
            return Err(NotecrawlError::Scraper("Failed to close page".to_string()));
        }
        Ok(())
    }
}
