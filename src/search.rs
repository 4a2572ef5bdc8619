/// Search stage of the table pipeline.
///
/// A row matches when any searched field, in its text form, contains the
/// query ignoring case. Blank queries and empty key lists let every row
/// through.

use crate::column::{ColumnDescriptor, Record};
use serde::{Deserialize, Serialize};

/// Which fields the search box looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SearchConfigRepr", into = "SearchConfigRepr")]
pub enum SearchConfig {
    /// Search is switched off; queries are kept but never applied.
    Disabled,
    /// Every searchable column descriptor.
    #[default]
    AllColumns,
    /// Exactly these field keys.
    Keys(Vec<String>),
}

/// Wire form: either a bare boolean or `{ "searchKeys": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum SearchConfigRepr {
    Enabled(bool),
    Options {
        #[serde(rename = "searchKeys", default, skip_serializing_if = "Option::is_none")]
        search_keys: Option<Vec<String>>,
    },
}

impl From<SearchConfigRepr> for SearchConfig {
    fn from(repr: SearchConfigRepr) -> Self {
        match repr {
            SearchConfigRepr::Enabled(false) => SearchConfig::Disabled,
            SearchConfigRepr::Enabled(true) => SearchConfig::AllColumns,
            SearchConfigRepr::Options { search_keys: None } => SearchConfig::AllColumns,
            SearchConfigRepr::Options { search_keys: Some(keys) } => SearchConfig::Keys(keys),
        }
    }
}

impl From<SearchConfig> for SearchConfigRepr {
    fn from(config: SearchConfig) -> Self {
        match config {
            SearchConfig::Disabled => SearchConfigRepr::Enabled(false),
            SearchConfig::AllColumns => SearchConfigRepr::Enabled(true),
            SearchConfig::Keys(keys) => SearchConfigRepr::Options { search_keys: Some(keys) },
        }
    }
}

impl SearchConfig {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SearchConfig::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// The concrete field keys to search for the given columns.
    pub fn resolve_keys<T>(&self, columns: &[ColumnDescriptor<T>]) -> Vec<String> {
        match self {
            SearchConfig::Disabled => Vec::new(),
            SearchConfig::AllColumns => columns
                .iter()
                .filter(|c| c.is_searchable())
                .map(|c| c.accessor_key().to_string())
                .collect(),
            SearchConfig::Keys(keys) => keys.clone(),
        }
    }
}

/// True when the query would let every row through.
pub fn is_blank_query(query: &str) -> bool {
    query.trim().is_empty()
}

/// Does any of `keys` on `record` contain `needle` (already lowercased)?
fn record_matches<T: Record>(record: &T, keys: &[String], needle: &str) -> bool {
    keys.iter().any(|key| {
        record
            .field(key)
            .to_text()
            .map(|text| text.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Keep the positions in `indices` whose records match `query`.
pub fn search_indices<T: Record>(
    data: &[T],
    indices: Vec<usize>,
    keys: &[String],
    query: &str,
) -> Vec<usize> {
    if is_blank_query(query) || keys.is_empty() {
        return indices;
    }

    let needle = query.to_lowercase();
    indices
        .into_iter()
        .filter(|&i| record_matches(&data[i], keys, &needle))
        .collect()
}
