use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Serialize, Serializer};

/// Wire and display format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Supported data kinds for form leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Choice,
}

/// A scalar held at a leaf of the record tree.
///
/// Number and date leaves may hold [`Value::Text`] while an edit is in
/// progress; validation decides whether that text is acceptable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    /// Converts a raw input string into the natural value for `kind`,
    /// keeping unparseable input as text.
    pub fn from_input(kind: FieldKind, raw: &str) -> Self {
        match kind {
            FieldKind::Number => parse_number(raw)
                .map(Value::Number)
                .unwrap_or_else(|| Value::text(raw)),
            FieldKind::Date => parse_date(raw)
                .map(Value::Date)
                .unwrap_or_else(|| Value::text(raw)),
            FieldKind::Text | FieldKind::Choice => Value::text(raw),
        }
    }

    /// Brings a value of any variant into the shape `kind` stores: parseable
    /// text becomes a number or date, anything else on a text or choice leaf
    /// becomes its display text.
    pub fn coerce(self, kind: FieldKind) -> Self {
        match (kind, self) {
            (FieldKind::Number, Value::Number(number)) => Value::Number(number),
            (FieldKind::Date, Value::Date(date)) => Value::Date(date),
            (FieldKind::Number | FieldKind::Date, Value::Text(text)) => {
                Value::from_input(kind, &text)
            }
            (_, other @ Value::Text(_)) => other,
            (_, other) => Value::Text(other.to_string()),
        }
    }

    /// Text that is empty once trimmed. Numbers and dates are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Text(text) if text.trim().is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric reading of the value, accepting numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) if number.is_finite() => Some(*number),
            Value::Number(_) => None,
            Value::Text(text) => parse_number(text),
            Value::Date(_) => None,
        }
    }

    /// Calendar-date reading of the value, accepting ISO date text.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(date) => Some(*date),
            Value::Text(text) => parse_date(text),
            Value::Number(_) => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Number(number) => write!(f, "{}", number),
            Value::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(text) => serializer.serialize_str(text),
            Value::Number(number) => {
                // Whole amounts go out as integers so `100` stays `100` on the wire.
                if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
                    serializer.serialize_i64(*number as i64)
                } else {
                    serializer.serialize_f64(*number)
                }
            }
            Value::Date(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
        }
    }
}

pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp truncated to its date.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_coercion_follows_field_kind() {
        assert_eq!(Value::from_input(FieldKind::Number, " 42.5 "), Value::Number(42.5));
        assert_eq!(
            Value::from_input(FieldKind::Date, "2024-03-01"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(Value::from_input(FieldKind::Number, "12a"), Value::text("12a"));
        assert_eq!(Value::from_input(FieldKind::Text, "42"), Value::text("42"));
    }

    #[test]
    fn coerce_normalises_to_the_field_kind() {
        let day = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
        assert_eq!(Value::text("100").coerce(FieldKind::Number), Value::Number(100.0));
        assert_eq!(
            Value::text("1990-05-01T10:00:00Z").coerce(FieldKind::Date),
            Value::Date(day)
        );
        assert_eq!(Value::text("soon").coerce(FieldKind::Date), Value::text("soon"));
        assert_eq!(Value::Number(7.0).coerce(FieldKind::Text), Value::text("7"));
        assert_eq!(Value::Date(day).coerce(FieldKind::Choice), Value::text("1990-05-01"));
        assert_eq!(Value::Date(day).coerce(FieldKind::Number), Value::text("1990-05-01"));
        assert_eq!(Value::Number(2.5).coerce(FieldKind::Number), Value::Number(2.5));
    }

    #[test]
    fn blank_only_applies_to_text() {
        assert!(Value::text("   ").is_blank());
        assert!(!Value::Number(0.0).is_blank());
        assert!(!Value::text("x").is_blank());
    }

    #[test]
    fn timestamps_truncate_to_calendar_date() {
        assert_eq!(
            parse_date("2024-02-10T00:00:00.000Z"),
            NaiveDate::from_ymd_opt(2024, 2, 10)
        );
        assert_eq!(parse_date("10/02/2024"), None);
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        let json = serde_json::to_value(Value::Number(100.0)).unwrap();
        assert_eq!(json, serde_json::json!(100));
        let json = serde_json::to_value(Value::Number(12.5)).unwrap();
        assert_eq!(json, serde_json::json!(12.5));
        let json = serde_json::to_value(Value::Date(NaiveDate::from_ymd_opt(1990, 5, 4).unwrap()))
            .unwrap();
        assert_eq!(json, serde_json::json!("1990-05-04"));
    }

    #[test]
    fn nan_is_not_a_number() {
        assert_eq!(Value::Number(f64::NAN).as_number(), None);
    }
}
