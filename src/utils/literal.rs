//! Decoder for dict/list literals stored as text inside table cells.
//!
//! Storefront CSV dumps serialise nested values with Python-style syntax
//! (`{'coming_soon': False, 'date': '10 Jun, 2021'}`). The cell is rewritten
//! into JSON text and handed to `serde_json`, so the rest of the pipeline only
//! ever sees `serde_json::Value`.

use serde_json::Value;

/// Decodes a cell that holds a dict or list literal.
///
/// Returns `None` for anything that is not a dict/list, or that fails to parse.
pub fn decode(cell: &str) -> Option<Value> {
    let trimmed = cell.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let json = to_json_text(trimmed)?;
    match serde_json::from_str::<Value>(&json) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

fn to_json_text(src: &str) -> Option<String> {
    let mut out = String::with_capacity(src.len() + 8);
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                out.push('"');
                read_string(c, &mut chars, &mut out)?;
                out.push('"');
            }
            '(' => out.push('['),
            ')' => out.push(']'),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        word.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.as_str() {
                    "True" | "true" => out.push_str("true"),
                    "False" | "false" => out.push_str("false"),
                    "None" | "null" | "nan" | "NaN" => out.push_str("null"),
                    _ => return None,
                }
            }
            c => out.push(c),
        }
    }

    Some(out)
}

fn read_string(
    quote: char,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
) -> Option<()> {
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next()?;
                match escaped {
                    '\'' => out.push('\''),
                    '"' => out.push_str("\\\""),
                    'x' => {
                        let hex: String = chars.by_ref().take(2).collect();
                        let code = u32::from_str_radix(&hex, 16).ok()?;
                        out.push_str(&format!("\\u{:04x}", code));
                    }
                    'n' | 't' | 'r' | 'b' | 'f' | 'u' | '\\' | '/' => {
                        out.push('\\');
                        out.push(escaped);
                    }
                    other => out.push(other),
                }
            }
            c if c == quote => return Some(()),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    // unterminated string
    None
}
