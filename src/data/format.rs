//! Display types and value formatting.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use super::duration::format_hms;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// How a statistic's value should be interpreted for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum StatType {
    #[default]
    #[serde(rename = "plain")]
    Plain,
    /// Byte count, shown in megabytes.
    #[serde(rename = "mb")]
    Bytes,
    /// Millisecond duration, shown as `1d 2h 3m 4s`.
    #[serde(rename = "hms")]
    DurationMs,
    /// Epoch milliseconds, shown as a calendar date.
    #[serde(rename = "time")]
    Timestamp,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "map")]
    Map,
}

/// How a namespace of compound keys is laid out in the stats table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    /// Compound keys render as ordinary flat rows.
    #[default]
    None,
    /// The namespace renders as a titled sub-table of nested rows.
    Tab,
}

/// A formatted value ready for a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Text(String),
    /// Enumerated entries.
    List(Vec<String>),
    /// Key/value pairs.
    Map(Vec<(String, String)>),
}

impl DisplayValue {
    /// Lines to draw, one per list entry or map pair.
    pub fn lines(&self) -> Vec<String> {
        match self {
            DisplayValue::Text(text) => vec![text.clone()],
            DisplayValue::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item))
                .collect(),
            DisplayValue::Map(pairs) => pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect(),
        }
    }

    /// Number of terminal lines the value occupies.
    pub fn height(&self) -> u16 {
        match self {
            DisplayValue::Text(_) => 1,
            DisplayValue::List(items) => items.len().max(1) as u16,
            DisplayValue::Map(pairs) => pairs.len().max(1) as u16,
        }
    }
}

/// Axis tick formatter attached to chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormatter {
    /// Bytes as whole megabytes, rounded down.
    Megabytes,
}

impl TickFormatter {
    pub fn format(&self, value: f64) -> String {
        match self {
            TickFormatter::Megabytes => format!("{}mb", (value / BYTES_PER_MB).floor()),
        }
    }
}

impl StatType {
    /// Render a raw value according to this type.
    ///
    /// A value of the wrong shape falls back to its raw rendering.
    pub fn format(&self, value: &Value) -> DisplayValue {
        match self {
            StatType::Plain => DisplayValue::Text(raw_text(value)),
            StatType::Bytes => match value.as_f64() {
                Some(bytes) => DisplayValue::Text(format_megabytes(bytes)),
                None => DisplayValue::Text(raw_text(value)),
            },
            StatType::DurationMs => match value.as_f64() {
                Some(ms) => DisplayValue::Text(format_hms(ms.max(0.0) as u64)),
                None => DisplayValue::Text(raw_text(value)),
            },
            StatType::Timestamp => match value.as_i64() {
                Some(ms) => DisplayValue::Text(format_timestamp(ms)),
                None => DisplayValue::Text(raw_text(value)),
            },
            StatType::List => match value {
                Value::Array(items) => DisplayValue::List(items.iter().map(raw_text).collect()),
                _ => DisplayValue::Text(raw_text(value)),
            },
            StatType::Map => match value {
                Value::Object(map) => DisplayValue::Map(
                    map.iter().map(|(k, v)| (k.clone(), raw_text(v))).collect(),
                ),
                _ => DisplayValue::Text(raw_text(value)),
            },
        }
    }

    /// The chart tick formatter for this type, if it has one.
    pub fn tick_formatter(&self) -> Option<TickFormatter> {
        match self {
            StatType::Bytes => Some(TickFormatter::Megabytes),
            _ => None,
        }
    }
}

/// Bytes to megabytes, rounded to three decimals: 1572864 -> "1.5mb".
pub fn format_megabytes(bytes: f64) -> String {
    let mb = (bytes / BYTES_PER_MB * 1000.0).round() / 1000.0;
    format!("{}mb", format_number(mb))
}

/// Epoch milliseconds as a UTC calendar date.
pub fn format_timestamp(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => ms.to_string(),
    }
}

/// Shortest decimal rendering, without a trailing `.0` for whole numbers.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Raw rendering of an unformatted value.
pub fn raw_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() => format_number(f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
