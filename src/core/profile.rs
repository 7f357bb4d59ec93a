//! Per-source field maps that drive the generic pipeline.

use crate::core::date::{self, YearRule};
use crate::core::flatten::{self, LabelTable};
use crate::core::price::{self, RateTable};
use crate::domain::model::{Cell, Record};
use serde_json::Value;
use std::fmt;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SourceKind {
    /// Steam catalog CSV dump
    Steam,
    /// Epic Games Store JSON dump, compact columns
    Epic,
    /// Epic Games Store JSON dump, every extracted column
    EpicFull,
    /// IGDB JSON dump with a top-level `games` list
    Igdb,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Steam => "steam",
            SourceKind::Epic => "epic",
            SourceKind::EpicFull => "epic-full",
            SourceKind::Igdb => "igdb",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    /// Delimited table with a header row; every cell is read as text.
    Csv,
    /// JSON document holding one object or a list of objects.
    JsonRecords,
    /// JSON object whose `key` member is the list of records.
    JsonKeyed { key: String },
}

/// Reads one output cell from a record. Paths are dot-separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    Text(String),
    Date(String),
    UnixDate(String),
    JoinDescriptions { path: String, field: String },
    JoinLabels { path: String, id_field: String },
    TrueKeys(String),
    Currency(String),
    Discount(String),
    FinalPrice(String),
    FinalPriceUsd(String),
    StrippedPrice(String),
}

impl Extractor {
    pub fn extract(&self, record: &Record, labels: &LabelTable, rates: &RateTable) -> Cell {
        let at = |path: &str| record.lookup(path).unwrap_or(&NULL);
        match self {
            Extractor::Text(path) => render_value(at(path)),
            Extractor::Date(path) => date::normalize_date(at(path)).into(),
            Extractor::UnixDate(path) => date::unix_to_date(at(path)).into(),
            Extractor::JoinDescriptions { path, field } => {
                Cell::text(flatten::join_descriptions(at(path), field))
            }
            Extractor::JoinLabels { path, id_field } => {
                Cell::text(flatten::join_labels(at(path), id_field, labels))
            }
            Extractor::TrueKeys(path) => Cell::text(flatten::join_true_keys(at(path))),
            Extractor::Currency(path) => Cell::text(price::extract_price(at(path)).currency_code),
            Extractor::Discount(path) => price::extract_price(at(path))
                .discount_percent
                .map(Cell::Integer)
                .unwrap_or(Cell::Empty),
            Extractor::FinalPrice(path) => Cell::text(price::extract_price(at(path)).final_price),
            Extractor::FinalPriceUsd(path) => price::extract_price(at(path)).final_price_usd(rates),
            Extractor::StrippedPrice(path) => match at(path) {
                Value::String(s) => Cell::text(price::strip_price(s)),
                Value::Number(n) => Cell::Text(n.to_string()),
                _ => Cell::Empty,
            },
        }
    }
}

/// Renders a decoded value as a flat cell. Nested values become JSON text.
pub fn render_value(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::String(s) => Cell::text(s.trim()),
        Value::Bool(b) => Cell::Text(b.to_string()),
        Value::Number(n) => Cell::Text(n.to_string()),
        nested => Cell::Text(nested.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: String,
    pub extractor: Extractor,
}

impl FieldSpec {
    pub fn new(column: &str, extractor: Extractor) -> Self {
        Self {
            column: column.to_string(),
            extractor,
        }
    }
}

/// Where an output column's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    Passthrough(String),
    Field(usize),
}

/// Configuration record for one storefront export.
#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub kind: SourceKind,
    pub format: InputFormat,
    pub default_input: &'static str,
    pub default_output: &'static str,
    /// Keep unmapped input columns (CSV sources only).
    pub passthrough: bool,
    pub drop_columns: Vec<String>,
    pub fields: Vec<FieldSpec>,
    pub required_field: Option<String>,
    /// Output column inspected by the year filter.
    pub date_column: String,
    pub year_rule: YearRule,
}

fn text(path: &str) -> Extractor {
    Extractor::Text(path.to_string())
}

impl SourceProfile {
    pub fn for_source(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Steam => Self::steam(),
            SourceKind::Epic => Self::epic(),
            SourceKind::EpicFull => Self::epic_full(),
            SourceKind::Igdb => Self::igdb(),
        }
    }

    pub fn steam() -> Self {
        let descriptions = |path: &str| Extractor::JoinDescriptions {
            path: path.to_string(),
            field: "description".to_string(),
        };
        let price = "price_overview".to_string();
        Self {
            kind: SourceKind::Steam,
            format: InputFormat::Csv,
            default_input: "steam_raw.csv",
            default_output: "steam_clean.csv",
            passthrough: true,
            drop_columns: ["release_date", "recommendations", "platforms", "price_overview"]
                .map(String::from)
                .to_vec(),
            fields: vec![
                FieldSpec::new("genres", descriptions("genres")),
                FieldSpec::new("categories", descriptions("categories")),
                FieldSpec::new("effective_date", Extractor::Date("release_date".to_string())),
                FieldSpec::new("currency_code", Extractor::Currency(price.clone())),
                FieldSpec::new("discount_percent", Extractor::Discount(price.clone())),
                FieldSpec::new("final_price", Extractor::FinalPrice(price.clone())),
                FieldSpec::new("final_price_usd", Extractor::FinalPriceUsd(price)),
            ],
            required_field: Some("is_free".to_string()),
            date_column: "effective_date".to_string(),
            year_rule: YearRule::Substring,
        }
    }

    pub fn epic() -> Self {
        let stripped =
            |name: &str| Extractor::StrippedPrice(format!("price.totalPrice.fmtPrice.{}", name));
        Self {
            kind: SourceKind::Epic,
            format: InputFormat::JsonRecords,
            default_input: "epic_games_all.json",
            default_output: "epic_games_clean.csv",
            passthrough: false,
            drop_columns: Vec::new(),
            fields: vec![
                FieldSpec::new("title", text("title")),
                FieldSpec::new("effective_date", Extractor::Date("effectiveDate".to_string())),
                FieldSpec::new("seller_name", text("seller.name")),
                FieldSpec::new("tags_joined", Self::epic_tags()),
                FieldSpec::new("original_price", stripped("originalPrice")),
                FieldSpec::new("discount_price", stripped("discountPrice")),
                FieldSpec::new("intermediate_price", stripped("intermediatePrice")),
                FieldSpec::new("currency_code", text("price.totalPrice.currencyCode")),
            ],
            required_field: None,
            date_column: "effective_date".to_string(),
            year_rule: YearRule::Parsed,
        }
    }

    pub fn epic_full() -> Self {
        let formatted = |name: &str| text(&format!("price.totalPrice.fmtPrice.{}", name));
        Self {
            kind: SourceKind::EpicFull,
            default_output: "epic_games_full.csv",
            fields: vec![
                FieldSpec::new("title", text("title")),
                FieldSpec::new("id", text("id")),
                FieldSpec::new("effective_date", Extractor::Date("effectiveDate".to_string())),
                FieldSpec::new("description", text("description")),
                FieldSpec::new("seller_id", text("seller.id")),
                FieldSpec::new("seller_name", text("seller.name")),
                FieldSpec::new("tags_joined", Self::epic_tags()),
                FieldSpec::new(
                    "custom_attributes",
                    Extractor::TrueKeys("customAttributes".to_string()),
                ),
                FieldSpec::new("original_price", formatted("originalPrice")),
                FieldSpec::new("discount_price", formatted("discountPrice")),
                FieldSpec::new("intermediate_price", formatted("intermediatePrice")),
                FieldSpec::new("currency_code", text("price.totalPrice.currencyCode")),
            ],
            ..Self::epic()
        }
    }

    pub fn igdb() -> Self {
        Self {
            kind: SourceKind::Igdb,
            format: InputFormat::JsonKeyed {
                key: "games".to_string(),
            },
            default_input: "igdb_pc_games.json",
            default_output: "igdb_clean.csv",
            passthrough: false,
            drop_columns: Vec::new(),
            fields: vec![
                FieldSpec::new("name", text("name")),
                FieldSpec::new(
                    "genres",
                    Extractor::JoinDescriptions {
                        path: "genres".to_string(),
                        field: "name".to_string(),
                    },
                ),
                FieldSpec::new(
                    "release_date",
                    Extractor::UnixDate("first_release_date".to_string()),
                ),
            ],
            required_field: None,
            date_column: "release_date".to_string(),
            year_rule: YearRule::Parsed,
        }
    }

    fn epic_tags() -> Extractor {
        Extractor::JoinLabels {
            path: "tags".to_string(),
            id_field: "id".to_string(),
        }
    }

    /// Output column order for a dataset with the given input columns.
    ///
    /// Passthrough columns keep input order; a field whose name matches an
    /// input column replaces it in place, the remaining fields are appended.
    pub fn column_plan(&self, input_columns: &[String]) -> Vec<(String, ColumnSource)> {
        let field_index = |name: &str| self.fields.iter().position(|f| f.column == name);
        let mut plan = Vec::with_capacity(input_columns.len() + self.fields.len());
        let mut placed = vec![false; self.fields.len()];

        if self.passthrough {
            for column in input_columns {
                if self.drop_columns.contains(column) {
                    continue;
                }
                match field_index(column) {
                    Some(idx) if !placed[idx] => {
                        placed[idx] = true;
                        plan.push((column.clone(), ColumnSource::Field(idx)));
                    }
                    Some(_) => {}
                    None => plan.push((column.clone(), ColumnSource::Passthrough(column.clone()))),
                }
            }
        }

        for (idx, field) in self.fields.iter().enumerate() {
            if !placed[idx] {
                plan.push((field.column.clone(), ColumnSource::Field(idx)));
            }
        }
        plan
    }

    pub fn date_field_index(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.column == self.date_column)
    }
}
