//! Normalization of the date labels the site renders.
//!
//! The UI mixes absolute dates with relative phrases ("3天前", "昨天",
//! "刚刚"), often padded with an edit marker or a region name. Every label
//! is collapsed to a calendar day, or `None` when nothing is recognized.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

static ABSOLUTE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());

static DAYS_AGO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*天前").unwrap());

static HOURS_AGO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*小时前").unwrap());

static MINUTES_AGO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*分钟前").unwrap());

static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\d-])(\d{2})-(\d{2})(?:$|[^\d-])").unwrap());

const JUST_NOW: &str = "刚刚";
const YESTERDAY: &str = "昨天";

/// Normalize a date label relative to `today`.
///
/// Patterns are tried in a fixed order and the first match wins, so an
/// absolute date embedded in noisy text beats any relative phrase.
pub fn normalize_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(date) = ABSOLUTE_DATE.captures_iter(text).find_map(|caps| {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }) {
        return Some(date);
    }

    if let Some(caps) = DAYS_AGO.captures(text) {
        let days: u64 = caps[1].parse().ok()?;
        return today.checked_sub_days(Days::new(days));
    }

    if HOURS_AGO.is_match(text) || text.contains(JUST_NOW) {
        return Some(today);
    }

    if text.contains(YESTERDAY) {
        return today.checked_sub_days(Days::new(1));
    }

    if MINUTES_AGO.is_match(text) {
        return Some(today);
    }

    MONTH_DAY.captures_iter(text).find_map(|caps| {
        let month = caps[1].parse().ok()?;
        let day = caps[2].parse().ok()?;
        NaiveDate::from_ymd_opt(today.year(), month, day)
    })
}
