//! Configuration management for notecrawl.
//!
//! Configuration is read from `~/.config/notecrawl/config.toml` unless a
//! path is given. If the default file doesn't exist, it is created with
//! commented defaults.

use crate::scraper::ScraperConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// A missing default file is created with comments. A missing explicit
    /// file or an invalid file is an error. Missing fields use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::parse(&content, config_path)
    }

    fn parse(content: &str, path: PathBuf) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse { path, source: e })
    }

    /// Get the default config file path: `~/.config/notecrawl/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("notecrawl").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# notecrawl configuration
#
# The crawler attaches to a browser you start yourself, e.g.
#   chrome --remote-debugging-port=9222
# and log in to the site in that browser before crawling.

[scraper]
# Site root; relative result links are appended to it
base_url = "https://www.xiaohongshu.com"

# Where the browser's remote debugging endpoint listens
debug_host = "127.0.0.1"
debug_port = 9222

# Timeout for required elements (seconds)
timeout_secs = 30

# Timeout for the debug endpoint check (milliseconds)
probe_timeout_ms = 3000

# Pause after the first search result appears (milliseconds)
search_settle_ms = 3000

# Extra wait before re-reading cards whose link has not rendered (milliseconds)
link_wait_ms = 2000

# Comment panel scrolling
scroll_step_px = 500
scroll_interval_ms = 500
max_scroll_times = 50
end_recheck_timeout_ms = 3000

# Pause between note visits (milliseconds)
visit_delay_ms = 2000

# Interval between element polls (milliseconds)
poll_interval_ms = 100

# Script installed in every new tab before page scripts run (optional)
# stealth_script = "/path/to/stealth.min.js"

[scraper.selectors]
search_input = "input#search-input"
result_card = "section.note-item"
bundle_marker = "div.query-note-list"
card_link = "a.cover.mask"
card_author = "div.footer div.name"
card_date = "div.footer div.time"
note_content = "div.note-content"
media_slide = "div.swiper-slide"
tag_link = "div.note-content a.tag"
publish_date = "div.note-content span.date"
like_count = "div.engage-bar span.like-wrapper span.count"
collect_count = "div.engage-bar span.collect-wrapper span.count"
comment_count = "div.engage-bar span.chat-wrapper span.count"
comment_scroller = "div.note-scroller"
comment_container = ".comments-container"
comment_item = "div.comment-item"
comment_text = "div.content"
comment_date = "div.date span"
comment_like = "span.like span.count"
no_comments = "div.no-comments"
end_marker = ".end-container"

# Shown instead of a number when a comment has no likes
like_placeholder = "赞"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
