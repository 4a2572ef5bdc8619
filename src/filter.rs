//! Filter stage of the table pipeline.
//!
//! Filters are keyed by column: at most one filter per key is active, and a
//! row survives only if it satisfies every active filter.
//!
//! Supported operators:
//! - `equals`: strict equality of the raw value
//! - `contains`, `startsWith`, `endsWith`: case-insensitive text tests
//! - `in`: membership in a list of values
//!
//! Operators this version does not know decode to `Unknown` and let every
//! row through.

use crate::column::{ColumnValue, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    In,
    /// Any operator name not listed above. Never excludes a row.
    #[serde(other)]
    Unknown,
}

/// Right-hand side of a filter: one value, or a list for `in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonValue", into = "JsonValue")]
pub enum FilterValue {
    Single(ColumnValue),
    List(Vec<ColumnValue>),
}

impl FilterValue {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ColumnValue>,
    {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Text form for the text operators; lists join with commas.
    fn to_text(&self) -> String {
        match self {
            FilterValue::Single(v) => v.to_text().unwrap_or_default(),
            FilterValue::List(values) => values
                .iter()
                .map(|v| v.to_text().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    fn contains_value(&self, value: &ColumnValue) -> bool {
        match self {
            FilterValue::Single(v) => v.strict_eq(value),
            FilterValue::List(values) => values.iter().any(|v| v.strict_eq(value)),
        }
    }
}

impl From<ColumnValue> for FilterValue {
    fn from(value: ColumnValue) -> Self {
        FilterValue::Single(value)
    }
}

impl From<JsonValue> for FilterValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => {
                FilterValue::List(items.iter().map(ColumnValue::from_json).collect())
            }
            other => FilterValue::Single(ColumnValue::from_json(&other)),
        }
    }
}

impl From<FilterValue> for JsonValue {
    fn from(value: FilterValue) -> Self {
        match value {
            FilterValue::Single(v) => v.to_json(),
            FilterValue::List(values) => {
                JsonValue::Array(values.iter().map(ColumnValue::to_json).collect())
            }
        }
    }
}

/// A single active filter on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub key: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterSpec {
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        FilterSpec {
            key: key.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self::new(key, FilterOperator::Equals, FilterValue::Single(value.into()))
    }

    pub fn contains(key: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self::new(key, FilterOperator::Contains, FilterValue::Single(value.into()))
    }

    pub fn starts_with(key: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self::new(key, FilterOperator::StartsWith, FilterValue::Single(value.into()))
    }

    pub fn ends_with(key: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self::new(key, FilterOperator::EndsWith, FilterValue::Single(value.into()))
    }

    pub fn one_of<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ColumnValue>,
    {
        Self::new(key, FilterOperator::In, FilterValue::list(values))
    }

    pub fn from_json(input: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Evaluate this filter against one record.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        let field = record.field(&self.key);
        match self.operator {
            FilterOperator::Equals => match &self.value {
                FilterValue::Single(v) => field.strict_eq(v),
                FilterValue::List(_) => false,
            },
            FilterOperator::Contains => {
                text_test(&field, &self.value, |text, needle| text.contains(needle))
            }
            FilterOperator::StartsWith => {
                text_test(&field, &self.value, |text, needle| text.starts_with(needle))
            }
            FilterOperator::EndsWith => {
                text_test(&field, &self.value, |text, needle| text.ends_with(needle))
            }
            FilterOperator::In => self.value.contains_value(&field),
            FilterOperator::Unknown => true,
        }
    }
}

fn text_test<F>(field: &ColumnValue, value: &FilterValue, test: F) -> bool
where
    F: Fn(&str, &str) -> bool,
{
    match field.to_text() {
        Some(text) => test(&text.to_lowercase(), &value.to_text().to_lowercase()),
        None => false,
    }
}

/// The active filters, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: Vec<FilterSpec>,
}

impl FilterSet {
    pub fn new() -> Self {
        FilterSet { filters: Vec::new() }
    }

    /// Build a set from a list, later filters replacing earlier ones on the
    /// same key.
    pub fn from_specs(specs: impl IntoIterator<Item = FilterSpec>) -> Self {
        let mut set = FilterSet::new();
        for spec in specs {
            set.upsert(spec);
        }
        set
    }

    /// Replace the filter on `spec.key` in place, or append it.
    pub fn upsert(&mut self, spec: FilterSpec) {
        match self.filters.iter_mut().find(|f| f.key == spec.key) {
            Some(existing) => *existing = spec,
            None => self.filters.push(spec),
        }
    }

    /// Remove the filter on `key`. Returns the removed filter, if any.
    pub fn remove(&mut self, key: &str) -> Option<FilterSpec> {
        let pos = self.filters.iter().position(|f| f.key == key)?;
        Some(self.filters.remove(pos))
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    pub fn get(&self, key: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|f| f.key == key)
    }

    pub fn as_slice(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// True when `record` satisfies every filter.
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}

/// Keep the positions in `indices` whose records pass every filter.
pub fn filter_indices<T: Record>(data: &[T], indices: Vec<usize>, filters: &FilterSet) -> Vec<usize> {
    if filters.is_empty() {
        return indices;
    }
    indices.into_iter().filter(|&i| filters.matches(&data[i])).collect()
}
