/// Sort stage of the table pipeline.
///
/// Only one column is sorted at a time. A column may provide its own
/// comparator; otherwise values are ordered by kind (strings by Unicode
/// collation, numbers numerically, dates by timestamp) with missing values
/// always placed last.

use crate::column::{ColumnDescriptor, ColumnValue, Record};
use feruca::Collator;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::cmp::Ordering;

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Sort direction for the active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (smallest first)
    Asc,
    /// Descending order (largest first)
    Desc,
}

/// The active sort: one column key and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        SortSpec {
            key: key.into(),
            direction,
        }
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Asc)
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Desc)
    }

    pub fn from_json(input: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Next sort after the user toggles `key`.
///
/// The same key cycles `asc -> desc -> unsorted`; any other key starts at
/// `asc`.
pub fn toggled(current: Option<&SortSpec>, key: &str) -> Option<SortSpec> {
    match current {
        Some(spec) if spec.key == key => match spec.direction {
            SortDirection::Asc => Some(SortSpec::descending(key)),
            SortDirection::Desc => None,
        },
        _ => Some(SortSpec::ascending(key)),
    }
}

/// Locale-aware string ordering, using the CLDR root collation.
///
/// Base letters decide first, so case and accents only break ties:
/// `ann < Bob < Cara` and `élan < zebra`. Among otherwise equal strings
/// lowercase sorts first, and strings that still tie compare by their
/// bytes, so only identical strings are `Equal`.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| collator.borrow_mut().collate(a, b))
}

/// Position of a value's kind when two different kinds meet.
fn kind_rank(value: &ColumnValue) -> u8 {
    match value {
        ColumnValue::Int(_) | ColumnValue::Float(_) => 0,
        ColumnValue::Bool(_) => 1,
        ColumnValue::Date(_) => 2,
        ColumnValue::String(_) => 3,
        ColumnValue::Nested(_) => 4,
        ColumnValue::Null => 5,
    }
}

/// Default ordering of two field values in the given direction.
///
/// `Null` is greater than every present value in both directions. Values of
/// different kinds are grouped by kind (numbers, booleans, dates, strings,
/// nested values) so the order stays total over mixed columns.
pub fn compare_values(a: &ColumnValue, b: &ColumnValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let base = match (a, b) {
        (ColumnValue::String(a), ColumnValue::String(b)) => locale_compare(a, b),
        (ColumnValue::Date(a), ColumnValue::Date(b)) => {
            a.timestamp_millis().cmp(&b.timestamp_millis())
        }
        (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a.cmp(b),
        (ColumnValue::Nested(a), ColumnValue::Nested(b)) => {
            locale_compare(&a.to_string(), &b.to_string())
        }
        (a, b) => a
            .numeric_cmp(b)
            .unwrap_or_else(|| kind_rank(a).cmp(&kind_rank(b))),
    };

    match direction {
        SortDirection::Asc => base,
        SortDirection::Desc => base.reverse(),
    }
}

/// Order `indices` (positions into `data`) by `spec`.
///
/// The sort is stable, so rows that compare equal keep their incoming order.
pub fn sort_indices<T: Record>(
    data: &[T],
    indices: &mut [usize],
    spec: &SortSpec,
    column: Option<&ColumnDescriptor<T>>,
) {
    match column.filter(|c| c.has_comparator()) {
        Some(column) => {
            indices.sort_by(|&a, &b| {
                column
                    .compare(&data[a], &data[b], spec.direction)
                    .unwrap_or(Ordering::Equal)
            });
        }
        None => {
            // Read each key once rather than on every comparison
            let keys: Vec<ColumnValue> = indices.iter().map(|&i| data[i].field(&spec.key)).collect();
            let mut order: Vec<usize> = (0..indices.len()).collect();
            order.sort_by(|&a, &b| compare_values(&keys[a], &keys[b], spec.direction));

            let sorted: Vec<usize> = order.iter().map(|&pos| indices[pos]).collect();
            indices.copy_from_slice(&sorted);
        }
    }
}
