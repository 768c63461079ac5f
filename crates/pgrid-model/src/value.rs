//! Cell values and rows.
//!
//! Rows arrive from the backend as flat JSON objects, so a [`Row`] is a map
//! from field name to [`CellValue`]. Dates travel as ISO-8601 text and are
//! parsed on demand by the columns that need them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single cell value as delivered by the row source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null or the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view of the value; numeric text is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Date/time view of the value; see [`parse_datetime`].
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Text(text) => parse_datetime(text),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(number) => f.write_str(&format_number(*number)),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Integral numbers print without a trailing `.0`.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 date or date-time.
///
/// Plain dates resolve to midnight. Offsets (`Z`, `+02:00`) are accepted and
/// dropped in favour of the wall-clock time they were written with.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// One record from the row source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.get(field)
    }

    /// The `id` cell rendered as text, when present.
    pub fn id(&self) -> Option<String> {
        self.cells
            .get("id")
            .filter(|value| !value.is_null())
            .map(ToString::to_string)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_date_as_midnight() {
        let parsed = parse_datetime("2024-03-01").unwrap();
        assert_eq!(parsed.to_string(), "2024-03-01 00:00:00");
    }

    #[test]
    fn parses_offset_datetime_as_wall_clock() {
        let parsed = parse_datetime("2024-03-01T15:30:00+02:00").unwrap();
        assert_eq!(parsed.to_string(), "2024-03-01 15:30:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("").is_none());
    }

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn row_deserializes_from_flat_object() {
        let row: Row =
            serde_json::from_str(r#"{"id": 7, "name": "Ada", "active": true, "manager": null}"#)
                .unwrap();
        assert_eq!(row.id().as_deref(), Some("7"));
        assert_eq!(row.get("name"), Some(&CellValue::text("Ada")));
        assert_eq!(row.get("active"), Some(&CellValue::Bool(true)));
        assert_eq!(row.get("manager"), Some(&CellValue::Null));
    }
}
