//! Loader stage: turns raw input bytes into a `Dataset`.

use crate::core::profile::InputFormat;
use crate::domain::model::{Dataset, Record};
use crate::utils::error::{EtlError, Result};
use crate::utils::literal;
use serde_json::Value;
use std::collections::HashMap;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub fn load(format: &InputFormat, bytes: &[u8], source_name: &str) -> Result<Dataset> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match format {
        InputFormat::Csv => load_csv(bytes),
        InputFormat::JsonRecords => {
            let document: Value = serde_json::from_slice(bytes)?;
            let items = match document {
                Value::Array(items) => items,
                object @ Value::Object(_) => vec![object],
                other => {
                    return Err(EtlError::InvalidInput {
                        message: format!(
                            "{} input must be a JSON object or a list of objects, found {}",
                            source_name,
                            json_kind(&other)
                        ),
                    })
                }
            };
            Ok(records_from_items(items, source_name))
        }
        InputFormat::JsonKeyed { key } => {
            let document: Value = serde_json::from_slice(bytes)?;
            let Value::Object(mut object) = document else {
                return Err(EtlError::InvalidInput {
                    message: format!("{} input must be a JSON object", source_name),
                });
            };
            match object.remove(key) {
                Some(Value::Array(items)) => Ok(records_from_items(items, source_name)),
                Some(other) => Err(EtlError::InvalidInput {
                    message: format!(
                        "'{}' in {} input must be a list, found {}",
                        key,
                        source_name,
                        json_kind(&other)
                    ),
                }),
                None => Err(EtlError::MissingKey {
                    source_name: source_name.to_string(),
                    key: key.clone(),
                }),
            }
        }
    }
}

/// Reads a header-first table. Every cell stays text unless it holds a
/// dict/list literal, which is decoded here once. The cell text is kept too,
/// for columns that are written back unchanged.
///
/// Short rows are accepted; their missing trailing cells are absent.
fn load_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() < columns.len() {
            tracing::trace!(
                "Row at line {} has {} of {} cells",
                row.position().map(|p| p.line()).unwrap_or_default(),
                row.len(),
                columns.len()
            );
        }

        let mut data = HashMap::with_capacity(columns.len());
        let mut raw = HashMap::with_capacity(columns.len());
        for (column, cell) in columns.iter().zip(row.iter()) {
            let value = literal::decode(cell).unwrap_or_else(|| Value::String(cell.to_string()));
            data.insert(column.clone(), value);
            raw.insert(column.clone(), cell.to_string());
        }
        records.push(Record::with_raw(data, raw));
    }

    tracing::debug!("Read {} CSV rows with {} columns", records.len(), columns.len());
    Ok(Dataset { columns, records })
}

fn records_from_items(items: Vec<Value>, source_name: &str) -> Dataset {
    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(Record::new(map.into_iter().collect())),
            _ => None,
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            "Skipped {} non-object entries in {} input",
            total - records.len(),
            source_name
        );
    }

    Dataset {
        columns: Vec::new(),
        records,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
