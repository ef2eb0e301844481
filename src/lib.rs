//! # notecrawl
//!
//! A crawler for note-style social feeds that drives a browser the
//! operator has already started with a remote debugging port.
//!
//! ## Architecture
//!
//! ```text
//! Search → Result cards → Detail page → Comment scroll → JSONL
//! ```
//!
//! - [`scraper`]: browser attachment and the search/detail/comment extractors
//! - [`domain`]: records and date normalization
//! - [`store`]: line-delimited JSON output
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the browser yourself and log in to the site
//! chrome --remote-debugging-port=9222
//!
//! # Verify the crawler can see it
//! notecrawl check
//!
//! # Scrape every result for a keyword into data/xhs_<keyword>.jsonl
//! notecrawl search 打铁花
//!
//! # Scrape one note and print it
//! notecrawl note https://www.xiaohongshu.com/explore/<id>
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires configuration to the
/// browser connector and crawler.
pub mod app;

/// Command-line interface using clap.
///
/// - `search <keyword>` - Search and scrape every result
/// - `note <url>` - Scrape a single note
/// - `check` - Verify the browser debug endpoint
pub mod cli;

/// Configuration loaded from `~/.config/notecrawl/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`PostRecord`](domain::PostRecord): One scraped note
/// - [`CommentRecord`](domain::CommentRecord): One comment row
/// - [`SearchResultItem`](domain::SearchResultItem): One search hit
/// - [`normalize_date`](domain::normalize_date): Relative/absolute date labels to calendar days
pub mod domain;

/// Browser-driven scraping.
///
/// - [`ChromeConnector`](scraper::ChromeConnector): Debug port check and CDP attachment
/// - [`NoteCrawler`](scraper::NoteCrawler): Search, detail and comment extraction
/// - [`BrowserPage`](scraper::BrowserPage): Async trait over a browser tab
pub mod scraper;

/// Output sinks for scraped records.
///
/// - [`Store`](store::Store): Trait for record destinations
/// - [`JsonlStore`](store::JsonlStore): Line-delimited JSON file
pub mod store;
