/// Serializable read model handed to the presentation layer.
use crate::filter::FilterSpec;
use crate::pagination::PageInfo;
use crate::sort::SortSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The visible page plus everything a grid needs to draw its controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    /// Accessor keys of the table columns, in declaration order
    pub columns: Vec<String>,
    /// Rows of the current page, keyed by accessor key
    pub rows: Vec<Map<String, JsonValue>>,
    pub search_query: String,
    pub filters: Vec<FilterSpec>,
    pub sort: Option<SortSpec>,
    pub page: PageInfo,
}

impl TableSnapshot {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
