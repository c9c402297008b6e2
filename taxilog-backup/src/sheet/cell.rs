//! The closed cell model every grid is made of.
//!
//! A spreadsheet API only moves strings, numbers, booleans and blanks, so a
//! cell is exactly one of those plus the two taxilog encodings layered on
//! top: dates rendered as ISO strings and embedded structures rendered as
//! compact JSON text. Whatever typed a value was on the way out, it comes
//! back as one of these variants and the record models re-type it.

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize;

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
    Date(DateTime<Utc>),
    Json(Value),
}

/// Rows of cells; the first row of an entity grid is the header.
pub type Grid = Vec<Vec<Cell>>;

impl Cell {
    /// Cell for a field of a normalized (JSON-safe) record. Strings are
    /// taken literally; only composite values become [`Cell::Json`].
    pub fn from_value(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => Cell::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => Cell::Text(s.clone()),
            composite => Cell::Json(composite.clone()),
        }
    }

    /// Cell read back from the wire. Strings that look like JSON are parsed;
    /// a string that merely starts with `{` or `[` but fails to parse stays
    /// text. That sniff is the price of grids having no type column, and it
    /// can mistype a hand-edited note that happens to be valid JSON.
    pub fn from_wire(value: &Value) -> Cell {
        match value {
            Value::String(s) => sniff_text(s),
            other => Cell::from_value(other),
        }
    }

    /// Plain value used when assembling a record object from a row.
    pub fn to_value(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Date(dt) => Value::String(normalize::iso(dt)),
            Cell::Json(v) => v.clone(),
        }
    }

    pub fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

fn sniff_text(s: &str) -> Cell {
    if s.starts_with('{') || s.starts_with('[') {
        if let Ok(parsed) = serde_json::from_str(s) {
            return Cell::Json(parsed);
        }
    }
    Cell::Text(s.to_string())
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Empty => serializer.serialize_unit(),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Date(dt) => serializer.serialize_str(&normalize::iso(dt)),
            Cell::Json(v) => {
                let compact = serde_json::to_string(v).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&compact)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Cell::from_wire(&value))
    }
}
