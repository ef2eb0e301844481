use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the note crawler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root; relative result links are appended to it
    pub base_url: String,

    /// Host the browser's debug endpoint listens on (default: 127.0.0.1)
    pub debug_host: String,

    /// Remote debugging port of the already-running browser (default: 9222)
    pub debug_port: u16,

    /// Timeout for hard-required element waits in seconds (default: 30)
    pub timeout_secs: u64,

    /// Timeout for the debug endpoint probe in milliseconds (default: 3000)
    pub probe_timeout_ms: u64,

    /// Pause after the first search result renders in milliseconds (default: 3000)
    pub search_settle_ms: u64,

    /// Extra wait before re-reading result cards whose link has not rendered,
    /// in milliseconds (default: 2000)
    pub link_wait_ms: u64,

    /// Pixels added to the comment scroller per iteration (default: 500)
    pub scroll_step_px: i64,

    /// Pause after each scroll for lazy rendering in milliseconds (default: 500)
    pub scroll_interval_ms: u64,

    /// Scroll iterations before giving up on the end marker (default: 50)
    pub max_scroll_times: u32,

    /// Bounded re-check for the end marker after scrolling, in milliseconds (default: 3000)
    pub end_recheck_timeout_ms: u64,

    /// Pause between detail page visits in milliseconds (default: 2000)
    pub visit_delay_ms: u64,

    /// Interval between element polls in milliseconds (default: 100)
    pub poll_interval_ms: u64,

    /// Script installed in every new tab before any page script runs,
    /// typically one that hides automation fingerprints
    pub stealth_script: Option<PathBuf>,

    /// CSS selectors and labels for the site's markup
    pub selectors: SelectorConfig,
}

/// Selectors for every element the crawler reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub search_input: String,
    pub result_card: String,
    /// Present inside cards that are really an injected recommendation carousel
    pub bundle_marker: String,
    pub card_link: String,
    pub card_author: String,
    pub card_date: String,
    pub note_content: String,
    pub media_slide: String,
    pub tag_link: String,
    pub publish_date: String,
    pub like_count: String,
    pub collect_count: String,
    pub comment_count: String,
    /// The container whose scrollTop drives comment lazy-loading
    pub comment_scroller: String,
    pub comment_container: String,
    pub comment_item: String,
    pub comment_text: String,
    pub comment_date: String,
    pub comment_like: String,
    pub no_comments: String,
    pub end_marker: String,
    /// Label shown instead of a number when a comment has no likes
    pub like_placeholder: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.xiaohongshu.com".to_string(),
            debug_host: "127.0.0.1".to_string(),
            debug_port: 9222,
            timeout_secs: 30,
            probe_timeout_ms: 3000,
            search_settle_ms: 3000,
            link_wait_ms: 2000,
            scroll_step_px: 500,
            scroll_interval_ms: 500,
            max_scroll_times: 50,
            end_recheck_timeout_ms: 3000,
            visit_delay_ms: 2000,
            poll_interval_ms: 100,
            stealth_script: None,
            selectors: SelectorConfig::default(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_input: "input#search-input".to_string(),
            result_card: "section.note-item".to_string(),
            bundle_marker: "div.query-note-list".to_string(),
            card_link: "a.cover.mask".to_string(),
            card_author: "div.footer div.name".to_string(),
            card_date: "div.footer div.time".to_string(),
            note_content: "div.note-content".to_string(),
            media_slide: "div.swiper-slide".to_string(),
            tag_link: "div.note-content a.tag".to_string(),
            publish_date: "div.note-content span.date".to_string(),
            like_count: "div.engage-bar span.like-wrapper span.count".to_string(),
            collect_count: "div.engage-bar span.collect-wrapper span.count".to_string(),
            comment_count: "div.engage-bar span.chat-wrapper span.count".to_string(),
            comment_scroller: "div.note-scroller".to_string(),
            comment_container: ".comments-container".to_string(),
            comment_item: "div.comment-item".to_string(),
            comment_text: "div.content".to_string(),
            comment_date: "div.date span".to_string(),
            comment_like: "span.like span.count".to_string(),
            no_comments: "div.no-comments".to_string(),
            end_marker: ".end-container".to_string(),
            like_placeholder: "赞".to_string(),
        }
    }
}

impl ScraperConfig {
    /// Get the element wait timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn search_settle(&self) -> Duration {
        Duration::from_millis(self.search_settle_ms)
    }

    pub fn link_wait(&self) -> Duration {
        Duration::from_millis(self.link_wait_ms)
    }

    pub fn scroll_interval(&self) -> Duration {
        Duration::from_millis(self.scroll_interval_ms)
    }

    pub fn end_recheck_timeout(&self) -> Duration {
        Duration::from_millis(self.end_recheck_timeout_ms)
    }

    pub fn visit_delay(&self) -> Duration {
        Duration::from_millis(self.visit_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Join a relative link from the page onto the site root
    pub fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        format!("{}{}", self.base_url.trim_end_matches('/'), href)
    }
}
