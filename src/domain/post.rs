use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{NotecrawlError, Result};

/// A search hit, kept only until its detail page has been visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub url: String,
    pub author: String,
    pub raw_date_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub date: Option<NaiveDate>,
    /// `None` when the label is neither a number nor the zero-likes placeholder.
    pub like_count: Option<u64>,
    pub text: String,
}

/// Everything extracted from one detail page.
///
/// Counters stay as the strings the page displays. `None` means the
/// field could not be read, which is distinct from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub media: BTreeSet<String>,
    pub content: String,
    pub like_count: Option<String>,
    pub collect_count: Option<String>,
    pub comment_count: Option<String>,
    pub comments: Vec<CommentRecord>,
    /// False when the comment scroll stopped at its ceiling before the end marker.
    pub comments_complete: bool,
    pub tags: Vec<String>,
    pub publish_date: Option<NaiveDate>,
}

impl PostRecord {
    /// Parse the note id from the last non-empty path segment of a detail URL.
    pub fn id_from_url(url: &str) -> Result<String> {
        let parsed = Url::parse(url)?;
        parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(String::from)
            .ok_or_else(|| NotecrawlError::Other(format!("No note id in URL: {}", url)))
    }

    /// Serialize as a single JSON line, non-ASCII left as-is.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Map a comment's like label to a count.
///
/// The placeholder word (shown when a comment has no likes) and an empty
/// label both map to zero. Plain numbers parse directly, a trailing `+`
/// is ignored and the `万` suffix scales by ten thousand. Anything else is
/// unknown.
pub fn parse_like_label(label: &str, placeholder: &str) -> Option<u64> {
    let label = label.trim();
    if label.is_empty() || label == placeholder {
        return Some(0);
    }

    let label = label.trim_end_matches('+');
    if let Some(tens_of_thousands) = label.strip_suffix('万') {
        let value: f64 = tens_of_thousands.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        return Some((value * 10_000.0).round() as u64);
    }

    label.parse().ok()
}
