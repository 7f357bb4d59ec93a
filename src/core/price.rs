//! Price Extractor & Currency Converter.

use crate::domain::model::{Cell, PriceOverview};
use crate::utils::literal;
use serde_json::Value;
use std::collections::HashMap;

pub const USD: &str = "USD";
const BASE: &str = "EUR";

/// ECB euro foreign exchange reference rates (units per 1 EUR), end of 2024.
const ECB_REFERENCE_RATES: [(&str, f64); 30] = [
    ("USD", 1.0389),
    ("JPY", 163.06),
    ("BGN", 1.9558),
    ("CZK", 25.185),
    ("DKK", 7.4578),
    ("GBP", 0.82918),
    ("HUF", 411.35),
    ("PLN", 4.2750),
    ("RON", 4.9743),
    ("SEK", 11.4590),
    ("CHF", 0.9412),
    ("ISK", 143.90),
    ("NOK", 11.7950),
    ("TRY", 36.7372),
    ("AUD", 1.6772),
    ("BRL", 6.4253),
    ("CAD", 1.4948),
    ("CNY", 7.5833),
    ("HKD", 8.0686),
    ("IDR", 16820.88),
    ("ILS", 3.7890),
    ("INR", 88.9335),
    ("KRW", 1532.15),
    ("MXN", 21.5504),
    ("MYR", 4.6454),
    ("NZD", 1.8532),
    ("PHP", 60.195),
    ("SGD", 1.4164),
    ("THB", 35.676),
    ("ZAR", 19.6188),
];

/// Static, read-only currency table. Rates are expressed per 1 EUR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn ecb_snapshot() -> Self {
        ECB_REFERENCE_RATES
            .iter()
            .map(|(code, rate)| (code.to_string(), *rate))
            .collect()
    }

    pub fn rate(&self, code: &str) -> Option<f64> {
        let code = code.trim().to_ascii_uppercase();
        if code == BASE {
            return Some(1.0);
        }
        self.rates.get(&code).copied()
    }

    /// Converts `amount` between two currencies, or `None` when either rate is unknown.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        Some(amount / from_rate * to_rate)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn extend(&mut self, rates: impl IntoIterator<Item = (String, f64)>) {
        self.rates.extend(
            rates
                .into_iter()
                .map(|(code, rate)| (code.trim().to_ascii_uppercase(), rate)),
        );
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

/// The three independent fields read from a price structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFields {
    pub currency_code: String,
    pub discount_percent: Option<i64>,
    pub final_price: String,
}

impl PriceFields {
    /// `final_price` in USD. Prices already in USD (or without a currency)
    /// are returned as they are; failed conversions are empty.
    pub fn final_price_usd(&self, rates: &RateTable) -> Cell {
        if self.currency_code.is_empty() || self.currency_code.eq_ignore_ascii_case(USD) {
            return Cell::text(self.final_price.clone());
        }
        let Ok(amount) = self.final_price.parse::<f64>() else {
            tracing::trace!("Non-numeric price '{}' left unconverted", self.final_price);
            return Cell::Empty;
        };
        match rates.convert(amount, &self.currency_code, USD) {
            Some(usd) => Cell::Amount(round_cents(usd)),
            None => {
                tracing::trace!("No rate for currency '{}'", self.currency_code);
                Cell::Empty
            }
        }
    }
}

/// Reads currency, discount and final price from a Steam-style price structure.
pub fn extract_price(value: &Value) -> PriceFields {
    let overview = match value {
        Value::Object(_) => serde_json::from_value::<PriceOverview>(value.clone()).ok(),
        Value::String(s) => literal::decode(s)
            .and_then(|decoded| serde_json::from_value::<PriceOverview>(decoded).ok()),
        _ => None,
    };
    let Some(overview) = overview else {
        return PriceFields::default();
    };

    PriceFields {
        currency_code: overview
            .currency
            .as_ref()
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        discount_percent: overview.discount_percent.as_ref().and_then(coerce_int),
        final_price: overview
            .final_formatted
            .as_ref()
            .and_then(Value::as_str)
            .map(strip_price)
            .unwrap_or_default(),
    }
}

/// Integer coercion that never fails loudly: non-numeric input is `None`.
pub fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reduces a formatted price to digits and at most one decimal point.
///
/// The last `,` or `.` is the decimal separator when one or two digits follow
/// it; every other separator is treated as digit grouping. This reads
/// `€9,99` as `9.99` on purpose, rather than dropping the comma to get `999`.
pub fn strip_price(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let digits = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();

    match kept.rfind(['.', ',']) {
        Some(pos) if (1..=2).contains(&(kept.len() - pos - 1)) => {
            format!("{}.{}", digits(&kept[..pos]), &kept[pos + 1..])
        }
        _ => digits(&kept),
    }
}

/// Rounds half away from zero to two decimals.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
