//! Date Normalizer and year-window checks.

use crate::domain::model::ReleaseDate;
use crate::utils::literal;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

pub const YEAR_MIN: i32 = 2015;
pub const YEAR_MAX: i32 = 2025;

const OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Human-formatted patterns, tried in order. First successful parse wins.
const TEXT_FORMATS: [&str; 4] = ["%d %b, %Y", "%b %d, %Y", "%d %B, %Y", "%B %d, %Y"];

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// Inclusive range of accepted release years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl Default for YearWindow {
    fn default() -> Self {
        Self {
            min: YEAR_MIN,
            max: YEAR_MAX,
        }
    }
}

impl YearWindow {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }
}

/// How the year filter reads a normalized date value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearRule {
    /// Accept when the first standalone 4-digit number anywhere in the text is
    /// inside the window. Unparsed dates such as "Released 2020 Edition" pass.
    Substring,
    /// Accept only a canonical `YYYY-MM-DD` date whose year is inside the window.
    Parsed,
}

impl YearRule {
    pub fn accepts(&self, date: &str, window: YearWindow) -> bool {
        let year = match self {
            YearRule::Substring => find_year(date),
            YearRule::Parsed => NaiveDate::parse_from_str(date, OUTPUT_FORMAT)
                .ok()
                .map(|d| chrono::Datelike::year(&d)),
        };
        year.is_some_and(|y| window.contains(y))
    }
}

/// First standalone 4-digit number in `text`.
pub fn find_year(text: &str) -> Option<i32> {
    YEAR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Normalizes a raw date cell to `YYYY-MM-DD`.
///
/// Structures flagged `coming_soon: true` yield `None`. Text that matches no
/// known pattern is returned trimmed but otherwise unmodified.
pub fn normalize_date(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => {
            let release: ReleaseDate = match serde_json::from_value(value.clone()) {
                Ok(release) => release,
                Err(e) => {
                    tracing::trace!("Unreadable release date structure: {}", e);
                    return None;
                }
            };
            if release.coming_soon == Some(true) {
                return None;
            }
            normalize_date_text(release.date.as_deref().unwrap_or_default())
        }
        Value::String(s) => match literal::decode(s) {
            Some(decoded @ Value::Object(_)) => normalize_date(&decoded),
            _ => normalize_date_text(s),
        },
        _ => None,
    }
}

pub fn normalize_date_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse_date_text(trimmed) {
        Some(date) => Some(date.format(OUTPUT_FORMAT).to_string()),
        None => Some(trimmed.to_string()),
    }
}

/// Parses the human-formatted patterns, then ISO-8601 dates and datetimes.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    TEXT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| parse_iso(text))
}

fn parse_iso(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    let text = text.strip_suffix('Z').unwrap_or(text);
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(text, OUTPUT_FORMAT))
        .ok()
}

/// Converts a Unix timestamp in seconds (number or numeric string) to its UTC date.
pub fn unix_to_date(value: &Value) -> Option<String> {
    let seconds = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive().format(OUTPUT_FORMAT).to_string())
}
