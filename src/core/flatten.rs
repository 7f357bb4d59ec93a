//! Flattens lists of tagged objects into a single pipe-delimited cell.

use crate::domain::model::CustomAttribute;
use crate::utils::literal;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

pub const SEPARATOR: &str = "|";

/// Epic Games Store tag ids and their human-readable labels.
const EPIC_TAG_LABELS: [(&str, &str); 13] = [
    ("1216", "Action games"),
    ("1117", "Adventure games"),
    ("9559", "Editors for games"),
    ("1203", "Multiplayer games"),
    ("9548", "Games for OSX (Mac OS)"),
    ("1298", "Puzzle games"),
    ("1212", "Racing games"),
    ("1367", "RPG games"),
    ("1210", "Shooter games"),
    ("1370", "Single-player games"),
    ("1115", "Strategy games"),
    ("1080", "Survival games"),
    ("9547", "Games for Windows"),
];

/// Immutable id → label lookup, built once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    labels: HashMap<String, String>,
}

impl LabelTable {
    pub fn epic_defaults() -> Self {
        EPIC_TAG_LABELS
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.labels.iter()
    }
}

impl FromIterator<(String, String)> for LabelTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().collect(),
        }
    }
}

/// Accepts either a decoded array or a cell that still holds a list literal.
fn as_items(value: &Value) -> Cow<'_, [Value]> {
    match value {
        Value::Array(items) => Cow::Borrowed(items.as_slice()),
        Value::String(s) => match literal::decode(s) {
            Some(Value::Array(items)) => Cow::Owned(items),
            _ => Cow::Borrowed(&[][..]),
        },
        _ => Cow::Borrowed(&[][..]),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

/// `[{"id":"1","description":"Action"},{"id":"2","description":"Adventure"}]`
/// with `field = "description"` becomes `Action|Adventure`.
pub fn join_descriptions(value: &Value, field: &str) -> String {
    as_items(value)
        .iter()
        .filter_map(|item| item.get(field).and_then(scalar_text))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Maps each item's id through `table`; ids without a label are skipped.
pub fn join_labels(value: &Value, id_field: &str, table: &LabelTable) -> String {
    as_items(value)
        .iter()
        .filter_map(|item| item.get(id_field).and_then(scalar_text))
        .filter_map(|id| table.get(&id))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Keys of attribute entries whose value is `true` or the string "true".
pub fn join_true_keys(value: &Value) -> String {
    as_items(value)
        .iter()
        .filter_map(|item| serde_json::from_value::<CustomAttribute>(item.clone()).ok())
        .filter(|attr| match &attr.value {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        })
        .filter_map(|attr| attr.key.filter(|k| !k.is_empty()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_descriptions_preserves_order() {
        let genres = json!([
            {"id": "1", "description": "Action"},
            {"id": "2", "description": "Adventure"}
        ]);
        assert_eq!(join_descriptions(&genres, "description"), "Action|Adventure");
    }

    #[test]
    fn test_join_descriptions_keeps_duplicates_and_skips_blanks() {
        let genres = json!([
            {"description": " Indie "},
            {"description": ""},
            {"id": "9"},
            "not an object",
            {"description": "Indie"}
        ]);
        assert_eq!(join_descriptions(&genres, "description"), "Indie|Indie");
    }

    #[test]
    fn test_join_descriptions_empty_or_malformed() {
        assert_eq!(join_descriptions(&json!([]), "description"), "");
        assert_eq!(join_descriptions(&json!("[{'description': 'Act"), "description"), "");
        assert_eq!(join_descriptions(&json!({"description": "Action"}), "description"), "");
        assert_eq!(join_descriptions(&Value::Null, "description"), "");
    }

    #[test]
    fn test_join_descriptions_from_literal_text() {
        let cell = json!("[{'id': '1', 'description': 'Action'}, {'id': '37', 'description': 'Free to Play'}]");
        assert_eq!(join_descriptions(&cell, "description"), "Action|Free to Play");
    }

    #[test]
    fn test_join_labels_drops_unknown_ids() {
        let tags = json!([{"id": "1216"}, {"id": "4242"}, {"id": 1370}, {"name": "x"}]);
        let table = LabelTable::epic_defaults();
        assert_eq!(join_labels(&tags, "id", &table), "Action games|Single-player games");
    }

    #[test]
    fn test_join_labels_uses_injected_table() {
        let table: LabelTable = [("7".to_string(), "Seven".to_string())].into_iter().collect();
        assert_eq!(join_labels(&json!([{"id": "7"}, {"id": "1216"}]), "id", &table), "Seven");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_join_true_keys() {
        let attrs = json!([
            {"key": "com.epicgames.app.blacklist", "value": "[]"},
            {"key": "isManuallySetPCReleaseDate", "value": "TRUE"},
            {"key": "canRunOffline", "value": true},
            {"key": "hasAchievements", "value": false},
            {"value": "true"}
        ]);
        assert_eq!(join_true_keys(&attrs), "isManuallySetPCReleaseDate|canRunOffline");
    }
}
