//! GridState table engine.
//!
//! `TableEngine` owns the records, the column descriptors and the current
//! `TableState`, and keeps the derived rows in step with them. Derivation
//! runs in four stages, each working on positions into the record list so
//! the records themselves are never copied or mutated:
//!
//! 1. search: keep rows where any searched field contains the query
//! 2. filter: keep rows that satisfy every active filter
//! 3. sort: order by the active sort column, if any
//! 4. paginate: slice out the current page
//!
//! Stages 1 to 3 are cached and only rerun when the query, filters, sort or
//! records change. Page moves only reslice.
//!
//! # Examples
//!
//! ```
//! use gridstate::{ColumnDescriptor, TableConfig, TableEngine};
//! use serde_json::json;
//!
//! let data = vec![
//!     json!({"id": 1, "name": "Bob"}),
//!     json!({"id": 2, "name": "ann"}),
//!     json!({"id": 3, "name": "Cara"}),
//! ];
//! let columns = vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("name")];
//! let mut table = TableEngine::new(data, columns, TableConfig::default()).unwrap();
//!
//! table.toggle_sort("name");
//! let names: Vec<&str> = table
//!     .processed_data()
//!     .iter()
//!     .map(|row| row["name"].as_str().unwrap())
//!     .collect();
//! assert_eq!(names, vec!["ann", "Bob", "Cara"]);
//! ```

use crate::column::{ColumnDescriptor, Record};
use crate::error::{Result, TableError};
use crate::filter::{self, FilterSet, FilterSpec};
use crate::pagination::{self, PageInfo, DEFAULT_PAGE_SIZE};
use crate::search::{self, SearchConfig};
use crate::snapshot::TableSnapshot;
use crate::sort::{self, SortSpec};
use crate::state::{TableAction, TableState};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::fmt::{self, Debug};

/// Construction-time configuration of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    pub default_sort: Option<SortSpec>,
    pub default_filters: Vec<FilterSpec>,
    #[serde(rename = "searchConfig")]
    pub search: SearchConfig,
    pub page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            default_sort: None,
            default_filters: Vec::new(),
            search: SearchConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableConfig {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = Some(sort);
        self
    }

    pub fn with_default_filter(mut self, filter: FilterSpec) -> Self {
        self.default_filters.push(filter);
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

pub struct TableEngine<T> {
    data: Vec<T>,
    columns: Vec<ColumnDescriptor<T>>,
    search: SearchConfig,
    /// Keys the search stage reads, resolved once from `search` and `columns`
    search_keys: Vec<String>,
    /// Last externally supplied page size, see `sync_page_size`
    synced_page_size: usize,
    state: TableState,
    /// Processed rows as positions into `data`
    processed: Vec<usize>,
}

impl<T: Record> TableEngine<T> {
    /// Create an engine over `data`.
    ///
    /// Fails if the page size is zero or a default sort or filter names a
    /// key that has no column descriptor.
    pub fn new(data: Vec<T>, columns: Vec<ColumnDescriptor<T>>, config: TableConfig) -> Result<Self> {
        if config.page_size == 0 {
            return Err(TableError::InvalidPageSize(0));
        }

        let known = |key: &str| columns.iter().any(|c| c.accessor_key() == key);
        if let Some(sort) = &config.default_sort {
            if !known(sort.key.as_str()) {
                return Err(TableError::UnknownColumn(sort.key.clone()));
            }
        }
        if let Some(f) = config.default_filters.iter().find(|f| !known(f.key.as_str())) {
            return Err(TableError::UnknownColumn(f.key.clone()));
        }

        let search_keys = config.search.resolve_keys(&columns);
        let state = TableState::new(
            config.default_sort,
            FilterSet::from_specs(config.default_filters),
            config.page_size,
        );

        let mut engine = TableEngine {
            data,
            columns,
            search: config.search,
            search_keys,
            synced_page_size: config.page_size,
            state,
            processed: Vec::new(),
        };
        engine.rebuild_processed();
        Ok(engine)
    }

    /// Rerun search, filter and sort over the full record list.
    fn rebuild_processed(&mut self) {
        let all: Vec<usize> = (0..self.data.len()).collect();
        let searched = search::search_indices(&self.data, all, &self.search_keys, &self.state.search_query);
        let searched_len = searched.len();
        let mut rows = filter::filter_indices(&self.data, searched, &self.state.filters);

        if let Some(spec) = &self.state.sort {
            let column = self.columns.iter().find(|c| c.accessor_key() == spec.key);
            sort::sort_indices(&self.data, &mut rows, spec, column);
        }

        trace!(
            "rebuilt processed rows: {} records, {} after search, {} after filters",
            self.data.len(),
            searched_len,
            rows.len()
        );
        self.processed = rows;
    }

    /// Apply `action` and bring the derived rows up to date.
    pub fn dispatch(&mut self, action: TableAction) {
        if let TableAction::ToggleSort(key) = &action {
            if self.column(key).is_some_and(|c| !c.is_sortable()) {
                debug!("ignoring sort toggle on non-sortable column '{}'", key);
                return;
            }
        }

        let next = self.state.reduce(&action, self.total_pages());
        if next == self.state {
            debug!("no-op table action: {:?}", action);
            return;
        }

        debug!("table action: {:?}", action);
        let rebuild = action.affects_processed() && next.pipeline_differs(&self.state);
        self.state = next;
        if rebuild {
            self.rebuild_processed();
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.dispatch(TableAction::SetSearchQuery(query.into()));
    }

    /// Add a filter, replacing any existing filter on the same key.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.dispatch(TableAction::SetFilter(filter));
    }

    pub fn remove_filter(&mut self, key: &str) {
        self.dispatch(TableAction::RemoveFilter(key.to_string()));
    }

    pub fn clear_filters(&mut self) {
        self.dispatch(TableAction::ClearFilters);
    }

    /// Cycle the sort on `key`: unsorted, ascending, descending, unsorted.
    pub fn toggle_sort(&mut self, key: &str) {
        self.dispatch(TableAction::ToggleSort(key.to_string()));
    }

    pub fn set_sort_config(&mut self, sort: Option<SortSpec>) {
        self.dispatch(TableAction::SetSortConfig(sort));
    }

    /// Jump to `page`. The page is not clamped to the available pages.
    pub fn set_current_page(&mut self, page: usize) {
        self.dispatch(TableAction::SetCurrentPage(page));
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize(page_size));
        }
        self.dispatch(TableAction::SetPageSize(page_size));
        Ok(())
    }

    /// Follow an externally driven page size setting.
    ///
    /// Only a value different from the last one synced is applied, so
    /// callers can pass their setting on every render without clobbering a
    /// page size the user picked through `set_page_size`.
    pub fn sync_page_size(&mut self, page_size: usize) -> Result<()> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize(page_size));
        }
        if page_size == self.synced_page_size {
            return Ok(());
        }
        self.synced_page_size = page_size;
        self.set_page_size(page_size)
    }

    pub fn next_page(&mut self) {
        self.dispatch(TableAction::NextPage);
    }

    pub fn previous_page(&mut self) {
        self.dispatch(TableAction::PreviousPage);
    }

    /// Replace the records. The current page is kept as is, even if it now
    /// lies past the last page.
    pub fn set_data(&mut self, data: Vec<T>) {
        debug!("replacing table data: {} -> {} records", self.data.len(), data.len());
        self.data = data;
        self.rebuild_processed();
    }

    /// Records after search, filter and sort.
    pub fn processed_data(&self) -> Vec<&T> {
        self.processed.iter().map(|&i| &self.data[i]).collect()
    }

    /// Records on the current page.
    pub fn page_data(&self) -> Vec<&T> {
        self.page_indices().iter().map(|&i| &self.data[i]).collect()
    }

    fn page_indices(&self) -> &[usize] {
        let range = pagination::page_range(self.processed.len(), self.state.current_page, self.state.page_size);
        &self.processed[range]
    }

    /// Processed record at `index`, in processed order.
    pub fn get_row(&self, index: usize) -> Option<&T> {
        self.processed.get(index).map(|&i| &self.data[i])
    }

    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    pub fn sort_config(&self) -> Option<&SortSpec> {
        self.state.sort.as_ref()
    }

    pub fn filter_configs(&self) -> &[FilterSpec] {
        self.state.filters.as_slice()
    }

    pub fn search_query(&self) -> &str {
        &self.state.search_query
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.processed.len(), self.state.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.state.has_next_page(self.total_pages())
    }

    pub fn has_previous_page(&self) -> bool {
        self.state.has_previous_page()
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(self.processed.len(), self.state.current_page, self.state.page_size)
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn columns(&self) -> &[ColumnDescriptor<T>] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.accessor_key() == key)
    }

    /// Serializable view of the current page and table state.
    pub fn snapshot(&self) -> TableSnapshot {
        let rows = self
            .page_indices()
            .iter()
            .map(|&i| {
                let record = &self.data[i];
                self.columns
                    .iter()
                    .map(|c| (c.accessor_key().to_string(), record.field(c.accessor_key()).to_json()))
                    .collect::<Map<_, _>>()
            })
            .collect();

        TableSnapshot {
            columns: self.columns.iter().map(|c| c.accessor_key().to_string()).collect(),
            rows,
            search_query: self.state.search_query.clone(),
            filters: self.state.filters.as_slice().to_vec(),
            sort: self.state.sort.clone(),
            page: self.page_info(),
        }
    }
}

impl<T> Debug for TableEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("records", &self.data.len())
            .field("columns", &self.columns)
            .field("search", &self.search)
            .field("state", &self.state)
            .field("processed", &self.processed.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnValue;
    use crate::filter::FilterOperator;
    use crate::sort::SortDirection;
    use serde_json::{json, Value as JsonValue};
    use std::collections::HashMap;

    fn people() -> Vec<JsonValue> {
        vec![
            json!({"id": 1, "name": "Bob", "status": "active"}),
            json!({"id": 2, "name": "ann", "status": "pending"}),
            json!({"id": 3, "name": "Cara", "status": "archived"}),
        ]
    }

    fn columns() -> Vec<ColumnDescriptor<JsonValue>> {
        vec![
            ColumnDescriptor::new("id"),
            ColumnDescriptor::new("name"),
            ColumnDescriptor::new("status"),
        ]
    }

    fn numbered(n: i64) -> Vec<JsonValue> {
        (1..=n).map(|id| json!({"id": id, "name": format!("row {}", id)})).collect()
    }

    fn names(rows: &[&JsonValue]) -> Vec<String> {
        rows.iter().map(|r| r["name"].as_str().unwrap().to_string()).collect()
    }

    fn ids(rows: &[&JsonValue]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_initial_state() {
        let table = TableEngine::new(people(), columns(), TableConfig::default()).unwrap();
        assert_eq!(table.processed_len(), 3);
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(table.total_pages(), 1);
        assert!(table.sort_config().is_none());
        assert!(table.filter_configs().is_empty());
        assert_eq!(table.search_query(), "");
    }

    #[test]
    fn test_sort_by_name_scenario() {
        let mut table = TableEngine::new(people(), columns(), TableConfig::default()).unwrap();

        table.toggle_sort("name");
        assert_eq!(names(&table.processed_data()), vec!["ann", "Bob", "Cara"]);

        table.toggle_sort("name");
        assert_eq!(names(&table.processed_data()), vec!["Cara", "Bob", "ann"]);

        table.toggle_sort("name");
        assert!(table.sort_config().is_none());
        assert_eq!(names(&table.processed_data()), vec!["Bob", "ann", "Cara"]);
    }

    #[test]
    fn test_toggle_different_key_starts_ascending() {
        let mut table = TableEngine::new(people(), columns(), TableConfig::default()).unwrap();
        table.toggle_sort("name");
        table.toggle_sort("name");
        table.toggle_sort("id");
        assert_eq!(table.sort_config(), Some(&SortSpec::new("id", SortDirection::Asc)));
    }

    #[test]
    fn test_non_sortable_column_ignores_toggle() {
        let columns = vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("name").sortable(false)];
        let mut table = TableEngine::new(people(), columns, TableConfig::default()).unwrap();
        table.toggle_sort("name");
        assert!(table.sort_config().is_none());
    }

    #[test]
    fn test_filter_upsert_scenario() {
        let mut table = TableEngine::new(people(), columns(), TableConfig::default()).unwrap();

        table.set_filter(FilterSpec::one_of("status", ["active", "pending"]));
        assert_eq!(table.processed_len(), 2);

        table.set_filter(FilterSpec::equals("status", "active"));
        assert_eq!(table.filter_configs().len(), 1);
        assert_eq!(table.filter_configs()[0].operator, FilterOperator::Equals);
        assert_eq!(ids(&table.processed_data()), vec![1]);

        table.remove_filter("status");
        assert_eq!(table.processed_len(), 3);
    }

    #[test]
    fn test_pagination_scenario() {
        let config = TableConfig::default().with_page_size(2);
        let mut table = TableEngine::new(numbered(5), columns(), config).unwrap();

        assert_eq!(table.page_data().len(), 2);
        assert_eq!(table.total_pages(), 3);
        assert!(table.has_next_page());
        assert!(!table.has_previous_page());

        table.next_page();
        table.next_page();
        assert_eq!(table.current_page(), 3);
        assert_eq!(ids(&table.page_data()), vec![5]);

        table.next_page();
        assert_eq!(table.current_page(), 3);

        table.previous_page();
        assert_eq!(ids(&table.page_data()), vec![3, 4]);
    }

    #[test]
    fn test_previous_page_on_first_page_is_noop() {
        let mut table = TableEngine::new(numbered(5), columns(), TableConfig::default()).unwrap();
        table.previous_page();
        assert_eq!(table.current_page(), 1);
    }

    #[test]
    fn test_search_nonexistent_scenario() {
        let config = TableConfig::default().with_search(SearchConfig::keys(["name"]));
        let mut table = TableEngine::new(people(), columns(), config).unwrap();

        table.set_search_query("nonexistent");
        assert_eq!(table.processed_len(), 0);
        assert!(table.page_data().is_empty());
        assert_eq!(table.total_pages(), 0);
        assert!(!table.has_next_page());
        assert!(!table.has_previous_page());
    }

    #[test]
    fn test_search_is_idempotent() {
        let config = TableConfig::default().with_search(SearchConfig::keys(["name"]));
        let mut table = TableEngine::new(people(), columns(), config).unwrap();
        table.set_search_query("a");
        let once = ids(&table.processed_data());
        table.set_search_query("a");
        assert_eq!(ids(&table.processed_data()), once);
        assert_eq!(once, vec![2, 3]);
    }

    #[test]
    fn test_disabled_search_ignores_query() {
        let config = TableConfig::default().with_search(SearchConfig::Disabled);
        let mut table = TableEngine::new(people(), columns(), config).unwrap();
        table.set_search_query("nonexistent");
        assert_eq!(table.search_query(), "nonexistent");
        assert_eq!(table.processed_len(), 3);
    }

    #[test]
    fn test_mutators_reset_page() {
        let config = TableConfig::default().with_page_size(1);
        let mut table = TableEngine::new(people(), columns(), config).unwrap();

        let mutators: Vec<Box<dyn Fn(&mut TableEngine<JsonValue>)>> = vec![
            Box::new(|t: &mut TableEngine<JsonValue>| t.set_search_query("")),
            Box::new(|t: &mut TableEngine<JsonValue>| t.set_filter(FilterSpec::contains("name", ""))),
            Box::new(|t: &mut TableEngine<JsonValue>| t.remove_filter("name")),
            Box::new(|t: &mut TableEngine<JsonValue>| t.clear_filters()),
            Box::new(|t: &mut TableEngine<JsonValue>| t.toggle_sort("id")),
            Box::new(|t: &mut TableEngine<JsonValue>| t.set_sort_config(None)),
        ];

        for mutate in mutators {
            table.set_current_page(3);
            assert_eq!(table.current_page(), 3);
            mutate(&mut table);
            assert_eq!(table.current_page(), 1);
        }
    }

    #[test]
    fn test_page_size_changes() {
        let mut table = TableEngine::new(numbered(25), columns(), TableConfig::default()).unwrap();
        table.set_current_page(3);

        table.set_page_size(5).unwrap();
        assert_eq!(table.page_size(), 5);
        assert_eq!(table.current_page(), 1);
        assert_eq!(table.total_pages(), 5);

        assert!(matches!(table.set_page_size(0), Err(TableError::InvalidPageSize(0))));
        assert_eq!(table.page_size(), 5);
    }

    #[test]
    fn test_sync_page_size_only_on_change() {
        let mut table = TableEngine::new(numbered(25), columns(), TableConfig::default()).unwrap();

        table.set_page_size(5).unwrap();
        table.set_current_page(2);

        // same external value as at construction: user choice survives
        table.sync_page_size(DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(table.page_size(), 5);
        assert_eq!(table.current_page(), 2);

        table.sync_page_size(20).unwrap();
        assert_eq!(table.page_size(), 20);
        assert_eq!(table.current_page(), 1);

        assert!(table.sync_page_size(0).is_err());
    }

    #[test]
    fn test_set_current_page_unclamped() {
        let mut table = TableEngine::new(numbered(5), columns(), TableConfig::default()).unwrap();
        table.set_current_page(7);
        assert_eq!(table.current_page(), 7);
        assert!(table.page_data().is_empty());
        assert!(table.has_previous_page());
        assert!(!table.has_next_page());
    }

    #[test]
    fn test_set_data_does_not_clamp_page() {
        let config = TableConfig::default().with_page_size(2);
        let mut table = TableEngine::new(numbered(6), columns(), config).unwrap();
        table.set_current_page(3);
        assert_eq!(ids(&table.page_data()), vec![5, 6]);

        table.set_data(numbered(2));
        assert_eq!(table.current_page(), 3);
        assert_eq!(table.total_pages(), 1);
        assert!(table.page_data().is_empty());
        assert!(!table.has_next_page());

        table.previous_page();
        table.previous_page();
        assert_eq!(ids(&table.page_data()), vec![1, 2]);
    }

    #[test]
    fn test_defaults_applied() {
        let config = TableConfig::default()
            .with_default_sort(SortSpec::descending("id"))
            .with_default_filter(FilterSpec::one_of("status", ["active", "archived"]));
        let table = TableEngine::new(people(), columns(), config).unwrap();
        assert_eq!(ids(&table.processed_data()), vec![3, 1]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = TableEngine::new(people(), columns(), TableConfig::default().with_page_size(0)).unwrap_err();
        assert!(matches!(err, TableError::InvalidPageSize(0)));

        let config = TableConfig::default().with_default_sort(SortSpec::ascending("age"));
        let err = TableEngine::new(people(), columns(), config).unwrap_err();
        assert!(matches!(err, TableError::UnknownColumn(ref key) if key == "age"));

        let config = TableConfig::default().with_default_filter(FilterSpec::equals("age", 3i64));
        assert!(TableEngine::new(people(), columns(), config).is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config = TableConfig::from_json(
            r#"{
                "defaultSort": {"key": "name", "direction": "desc"},
                "defaultFilters": [{"key": "status", "operator": "equals", "value": "active"}],
                "searchConfig": {"searchKeys": ["name"]},
                "pageSize": 25
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_sort, Some(SortSpec::descending("name")));
        assert_eq!(config.default_filters, vec![FilterSpec::equals("status", "active")]);
        assert_eq!(config.search, SearchConfig::keys(["name"]));
        assert_eq!(config.page_size, 25);

        let defaults = TableConfig::from_json("{}").unwrap();
        assert_eq!(defaults, TableConfig::default());
    }

    #[test]
    fn test_custom_comparator_column() {
        let columns = vec![
            ColumnDescriptor::new("id"),
            ColumnDescriptor::new("status").with_comparator(|a: &JsonValue, b: &JsonValue, dir| {
                let rank = |v: &JsonValue| match v["status"].as_str() {
                    Some("active") => 0,
                    Some("pending") => 1,
                    _ => 2,
                };
                let ord = rank(a).cmp(&rank(b));
                if dir == SortDirection::Desc { ord.reverse() } else { ord }
            }),
        ];
        let mut table = TableEngine::new(people(), columns, TableConfig::default()).unwrap();

        table.toggle_sort("status");
        assert_eq!(ids(&table.processed_data()), vec![1, 2, 3]);
        table.toggle_sort("status");
        assert_eq!(ids(&table.processed_data()), vec![3, 2, 1]);
    }

    #[test]
    fn test_hashmap_records() {
        let row = |name: &str, score: Option<i64>| {
            let mut r = HashMap::new();
            r.insert("name".to_string(), ColumnValue::from(name));
            r.insert("score".to_string(), ColumnValue::from(score));
            r
        };
        let data = vec![row("a", Some(3)), row("b", None), row("c", Some(9))];
        let columns = vec![ColumnDescriptor::new("name"), ColumnDescriptor::new("score")];
        let mut table = TableEngine::new(data, columns, TableConfig::default()).unwrap();

        table.set_sort_config(Some(SortSpec::descending("score")));
        let order: Vec<ColumnValue> = table.processed_data().iter().map(|r| r.field("name")).collect();
        assert_eq!(order, vec!["c".into(), "a".into(), "b".into()]);
    }

    #[test]
    fn test_snapshot() {
        let config = TableConfig::default().with_page_size(2);
        let mut table = TableEngine::new(people(), columns(), config).unwrap();
        table.toggle_sort("name");

        let snapshot = table.snapshot();
        assert_eq!(snapshot.columns, vec!["id", "name", "status"]);
        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[0]["name"], json!("ann"));
        assert_eq!(snapshot.sort, Some(SortSpec::ascending("name")));
        assert_eq!(snapshot.page.total_pages, 2);

        let encoded: JsonValue = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(encoded["page"]["hasNextPage"], json!(true));
        assert_eq!(encoded["sort"]["direction"], json!("asc"));
    }
}
