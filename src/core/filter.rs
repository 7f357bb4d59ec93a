//! Row Filter: required-field and year-window checks. Purely row-local.

use crate::core::date::{YearRule, YearWindow};
use crate::domain::model::Record;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    MissingRequired,
    OutsideYearWindow,
}

/// True for absent values, JSON null, and blank or "none"/"null" text (any case).
pub fn is_null_like(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.is_empty() || s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("null")
        }
        Some(_) => false,
    }
}

#[derive(Debug, Clone)]
pub struct RowFilter {
    required_field: Option<String>,
    year_rule: YearRule,
    window: YearWindow,
}

impl RowFilter {
    pub fn new(required_field: Option<String>, year_rule: YearRule, window: YearWindow) -> Self {
        Self {
            required_field,
            year_rule,
            window,
        }
    }

    pub fn check(&self, record: &Record, date: Option<&str>) -> Verdict {
        if let Some(field) = &self.required_field {
            if is_null_like(record.lookup(field)) {
                return Verdict::MissingRequired;
            }
        }
        match date {
            Some(date) if self.year_rule.accepts(date, self.window) => Verdict::Keep,
            _ => Verdict::OutsideYearWindow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn record_with_is_free(value: Value) -> Record {
        Record::new(HashMap::from([("is_free".to_string(), value)]))
    }

    fn steam_filter() -> RowFilter {
        RowFilter::new(
            Some("is_free".to_string()),
            YearRule::Substring,
            YearWindow::default(),
        )
    }

    #[test]
    fn test_null_like_sentinels() {
        assert!(is_null_like(None));
        assert!(is_null_like(Some(&Value::Null)));
        assert!(is_null_like(Some(&json!(""))));
        assert!(is_null_like(Some(&json!("  "))));
        assert!(is_null_like(Some(&json!("None"))));
        assert!(is_null_like(Some(&json!("NONE"))));
        assert!(is_null_like(Some(&json!("null"))));
        assert!(!is_null_like(Some(&json!("False"))));
        assert!(!is_null_like(Some(&json!(false))));
        assert!(!is_null_like(Some(&json!(0))));
    }

    #[test]
    fn test_required_field_checked_before_year() {
        let filter = steam_filter();
        assert_eq!(
            filter.check(&record_with_is_free(json!("None")), Some("2019-01-01")),
            Verdict::MissingRequired
        );
        assert_eq!(
            filter.check(&record_with_is_free(json!("")), Some("2030-01-01")),
            Verdict::MissingRequired
        );
        assert_eq!(
            filter.check(&record_with_is_free(json!("False")), Some("2019-01-01")),
            Verdict::Keep
        );
    }

    #[test]
    fn test_year_window() {
        let filter = steam_filter();
        let record = record_with_is_free(json!("True"));
        assert_eq!(filter.check(&record, Some("2030-05-01")), Verdict::OutsideYearWindow);
        assert_eq!(filter.check(&record, None), Verdict::OutsideYearWindow);
        assert_eq!(filter.check(&record, Some("Q1 2016")), Verdict::Keep);
    }

    #[test]
    fn test_no_required_field() {
        let filter = RowFilter::new(None, YearRule::Parsed, YearWindow::new(2020, 2020));
        let record = Record::default();
        assert_eq!(filter.check(&record, Some("2020-02-02")), Verdict::Keep);
        assert_eq!(filter.check(&record, Some("2021-02-02")), Verdict::OutsideYearWindow);
    }
}
