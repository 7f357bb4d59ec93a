use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// One input row or object, with nested cells already decoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
    /// Cell text as read, for table inputs only.
    #[serde(default)]
    pub raw: HashMap<String, String>,
}

impl Record {
    pub fn new(data: HashMap<String, Value>) -> Self {
        Self {
            data,
            raw: HashMap::new(),
        }
    }

    pub fn with_raw(data: HashMap<String, Value>, raw: HashMap<String, String>) -> Self {
        Self { data, raw }
    }

    pub fn raw_cell(&self, column: &str) -> Option<&str> {
        self.raw.get(column).map(String::as_str)
    }

    /// Looks up a dot-separated path such as `price.totalPrice.currencyCode`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Everything the loader read from one input file.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Column names in input order. Empty for JSON sources.
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

/// A scalar output value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(i64),
    /// Monetary amount, always rendered with two decimals.
    Amount(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::text).unwrap_or(Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Amount(a) => write!(f, "{:.2}", a),
        }
    }
}

/// Flat, fixed-schema row. Cells are positional against `TransformResult::columns`.
pub type NormalizedRow = Vec<Cell>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub input_rows: usize,
    pub missing_required: usize,
    pub outside_year_window: usize,
}

impl FilterStats {
    pub fn dropped(&self) -> usize {
        self.missing_required + self.outside_year_window
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub columns: Vec<String>,
    pub rows: Vec<NormalizedRow>,
    pub stats: FilterStats,
}

impl TransformResult {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub row_count: usize,
    pub output_path: String,
}

// Typed views over the nested storefront structures. They are deserialized
// from the decoded `Value` on demand; unknown fields are ignored.

/// Steam `release_date` cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDate {
    #[serde(default)]
    pub coming_soon: Option<bool>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Steam `price_overview` cell.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceOverview {
    #[serde(default)]
    pub currency: Option<Value>,
    #[serde(default)]
    pub discount_percent: Option<Value>,
    #[serde(default)]
    pub final_formatted: Option<Value>,
}

/// Epic `customAttributes[]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomAttribute {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}
