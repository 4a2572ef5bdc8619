/// GridState Column Implementation
///
/// Records are opaque to the engine. Every read goes through the `Record`
/// trait, which turns a field key into a `ColumnValue`. A `ColumnDescriptor`
/// names a field and carries the per-column options the pipeline honours:
/// sortability, searchability and an optional custom comparator.

use crate::sort::SortDirection;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{self, Debug};

/// A single field value read out of a record.
///
/// `Null` stands for both an explicit null and a missing field.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Date(DateTime<Utc>),
    /// A JSON array or object. Opaque to search and filters: it has no text
    /// form and is never equal to anything, itself included.
    Nested(JsonValue),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int(v) => Some(*v as f64),
            ColumnValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            ColumnValue::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnValue::Int(_) | ColumnValue::Float(_))
    }

    fn is_nan(&self) -> bool {
        matches!(self, ColumnValue::Float(v) if v.is_nan())
    }

    /// Numeric ordering of two numbers, `None` unless both are numeric.
    ///
    /// Integers compare exactly, including across `Float`. NaN is placed
    /// after every other number and ties with NaN.
    pub fn numeric_cmp(&self, other: &ColumnValue) -> Option<Ordering> {
        let ordering = match (self, other) {
            (ColumnValue::Int(a), ColumnValue::Int(b)) => a.cmp(b),
            (ColumnValue::Float(a), ColumnValue::Float(b)) => float_cmp(*a, *b),
            (ColumnValue::Int(a), ColumnValue::Float(b)) => int_float_cmp(*a, *b),
            (ColumnValue::Float(a), ColumnValue::Int(b)) => int_float_cmp(*b, *a).reverse(),
            _ => return None,
        };
        Some(ordering)
    }

    /// String form used by search and the text filters.
    ///
    /// Returns `None` for `Null` and nested values, which never match a text
    /// test.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ColumnValue::Int(v) => Some(v.to_string()),
            ColumnValue::Float(v) => Some(format_float(*v)),
            ColumnValue::String(v) => Some(v.clone()),
            ColumnValue::Bool(v) => Some(v.to_string()),
            ColumnValue::Date(v) => Some(v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ColumnValue::Nested(_) | ColumnValue::Null => None,
        }
    }

    /// Strict equality: same kind and same value.
    ///
    /// Integers and floats are both numbers and compare numerically. NaN is
    /// never equal, and neither are nested values.
    pub fn strict_eq(&self, other: &ColumnValue) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => {
                !a.is_nan() && !b.is_nan() && a.numeric_cmp(b) == Some(Ordering::Equal)
            }
            (ColumnValue::String(a), ColumnValue::String(b)) => a == b,
            (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a == b,
            (ColumnValue::Date(a), ColumnValue::Date(b)) => a == b,
            (ColumnValue::Null, ColumnValue::Null) => true,
            _ => false,
        }
    }

    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => ColumnValue::Null,
            JsonValue::Bool(b) => ColumnValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ColumnValue::Int(i)
                } else {
                    n.as_f64().map(ColumnValue::Float).unwrap_or(ColumnValue::Null)
                }
            }
            JsonValue::String(s) => ColumnValue::String(s.clone()),
            nested => ColumnValue::Nested(nested.clone()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            ColumnValue::Int(v) => JsonValue::Number((*v).into()),
            ColumnValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ColumnValue::String(v) => JsonValue::String(v.clone()),
            ColumnValue::Bool(v) => JsonValue::Bool(*v),
            ColumnValue::Date(v) => {
                JsonValue::String(v.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            ColumnValue::Nested(v) => v.clone(),
            ColumnValue::Null => JsonValue::Null,
        }
    }
}

fn float_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn int_float_cmp(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        return Ordering::Less;
    }
    // Widening rounds to the nearest float, so a strict result is exact.
    // On a tie `b` is integral and fits an i128.
    match (a as f64).partial_cmp(&b) {
        Some(Ordering::Equal) | None => (a as i128).cmp(&(b as i128)),
        Some(ordering) => ordering,
    }
}

fn format_float(v: f64) -> String {
    if v.is_infinite() {
        if v > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else {
        // Display already drops the fractional part of integral floats
        v.to_string()
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int(v)
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Int(v as i64)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Float(v)
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Bool(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::String(v)
    }
}

impl From<DateTime<Utc>> for ColumnValue {
    fn from(v: DateTime<Utc>) -> Self {
        ColumnValue::Date(v)
    }
}

impl<V: Into<ColumnValue>> From<Option<V>> for ColumnValue {
    fn from(v: Option<V>) -> Self {
        v.map(Into::into).unwrap_or(ColumnValue::Null)
    }
}

/// Read access to the fields of a row.
///
/// The engine never looks at a record any other way, so any row type can be
/// driven by the pipeline once it maps field keys to values. Unknown keys
/// must return `ColumnValue::Null`.
pub trait Record {
    fn field(&self, key: &str) -> ColumnValue;
}

impl Record for HashMap<String, ColumnValue> {
    fn field(&self, key: &str) -> ColumnValue {
        self.get(key).cloned().unwrap_or(ColumnValue::Null)
    }
}

impl Record for JsonValue {
    fn field(&self, key: &str) -> ColumnValue {
        self.get(key).map(ColumnValue::from_json).unwrap_or(ColumnValue::Null)
    }
}

/// Custom ordering for a column. The result is used as-is for both
/// directions, so the comparator must honour `SortDirection` itself.
pub type Comparator<T> = Box<dyn Fn(&T, &T, SortDirection) -> Ordering>;

/// Describes one column of the table: which field it reads and how the
/// pipeline may use it.
pub struct ColumnDescriptor<T> {
    accessor_key: String,
    header: Option<String>,
    sortable: bool,
    searchable: bool,
    comparator: Option<Comparator<T>>,
}

impl<T> ColumnDescriptor<T> {
    /// Create a sortable, searchable column reading `accessor_key`.
    pub fn new(accessor_key: impl Into<String>) -> Self {
        ColumnDescriptor {
            accessor_key: accessor_key.into(),
            header: None,
            sortable: true,
            searchable: true,
            comparator: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Whether the column takes part in search when no explicit search
    /// keys are configured.
    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&T, &T, SortDirection) -> Ordering + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self
    }

    pub fn accessor_key(&self) -> &str {
        &self.accessor_key
    }

    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.accessor_key)
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn has_comparator(&self) -> bool {
        self.comparator.is_some()
    }

    /// Run the custom comparator, if the column has one.
    pub fn compare(&self, a: &T, b: &T, direction: SortDirection) -> Option<Ordering> {
        self.comparator.as_ref().map(|cmp| cmp(a, b, direction))
    }
}

impl<T> Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("accessor_key", &self.accessor_key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}
