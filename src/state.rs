/// Table state and its transitions.
///
/// All user-controlled inputs of the pipeline live in one `TableState`
/// value. Each mutator is a pure function from the old state to a new one,
/// and the reset of the current page is written into the transitions that
/// need it rather than left to the caller.
///
/// | Action | Effect |
/// |---|---|
/// | `SetSearchQuery` | query updated, page -> 1 |
/// | `SetFilter` / `RemoveFilter` / `ClearFilters` | filters updated, page -> 1 |
/// | `ToggleSort` / `SetSortConfig` | sort updated, page -> 1 |
/// | `SetCurrentPage(n)` | page -> n, unclamped |
/// | `SetPageSize(n)` | page size -> n, page -> 1 |
/// | `NextPage` / `PreviousPage` | page +/- 1 when the guard holds |

use crate::filter::{FilterSet, FilterSpec};
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::sort::{self, SortSpec};
use serde::{Deserialize, Serialize};

/// A state transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    SetSearchQuery(String),
    SetFilter(FilterSpec),
    RemoveFilter(String),
    ClearFilters,
    ToggleSort(String),
    SetSortConfig(Option<SortSpec>),
    SetCurrentPage(usize),
    SetPageSize(usize),
    NextPage,
    PreviousPage,
}

impl TableAction {
    /// Whether applying this action can change the processed rows, as
    /// opposed to only moving the page window.
    pub fn affects_processed(&self) -> bool {
        !matches!(
            self,
            TableAction::SetCurrentPage(_)
                | TableAction::SetPageSize(_)
                | TableAction::NextPage
                | TableAction::PreviousPage
        )
    }
}

/// The inputs of the pipeline that users change at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub search_query: String,
    pub filters: FilterSet,
    pub sort: Option<SortSpec>,
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for TableState {
    fn default() -> Self {
        TableState {
            search_query: String::new(),
            filters: FilterSet::new(),
            sort: None,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableState {
    pub fn new(sort: Option<SortSpec>, filters: FilterSet, page_size: usize) -> Self {
        TableState {
            sort,
            filters,
            page_size,
            ..TableState::default()
        }
    }

    /// Apply `action` and return the resulting state.
    ///
    /// `total_pages` is the page count of the current processed rows; it is
    /// only consulted by the navigation guards.
    pub fn reduce(&self, action: &TableAction, total_pages: usize) -> TableState {
        match action {
            TableAction::SetSearchQuery(query) => self.with_search_query(query),
            TableAction::SetFilter(spec) => self.with_filter(spec.clone()),
            TableAction::RemoveFilter(key) => self.without_filter(key),
            TableAction::ClearFilters => self.without_filters(),
            TableAction::ToggleSort(key) => self.with_toggled_sort(key),
            TableAction::SetSortConfig(spec) => self.with_sort(spec.clone()),
            TableAction::SetCurrentPage(page) => self.with_current_page(*page),
            TableAction::SetPageSize(size) => self.with_page_size(*size),
            TableAction::NextPage => self.with_next_page(total_pages),
            TableAction::PreviousPage => self.with_previous_page(),
        }
    }

    pub fn with_search_query(&self, query: &str) -> TableState {
        TableState {
            search_query: query.to_string(),
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn with_filter(&self, spec: FilterSpec) -> TableState {
        let mut filters = self.filters.clone();
        filters.upsert(spec);
        TableState {
            filters,
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn without_filter(&self, key: &str) -> TableState {
        let mut filters = self.filters.clone();
        filters.remove(key);
        TableState {
            filters,
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn without_filters(&self) -> TableState {
        TableState {
            filters: FilterSet::new(),
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn with_toggled_sort(&self, key: &str) -> TableState {
        self.with_sort(sort::toggled(self.sort.as_ref(), key))
    }

    pub fn with_sort(&self, sort: Option<SortSpec>) -> TableState {
        TableState {
            sort,
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn with_current_page(&self, page: usize) -> TableState {
        TableState {
            current_page: page,
            ..self.clone()
        }
    }

    /// A zero page size is ignored; the engine rejects it before it gets here.
    pub fn with_page_size(&self, size: usize) -> TableState {
        if size == 0 {
            return self.clone();
        }
        TableState {
            page_size: size,
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn with_next_page(&self, total_pages: usize) -> TableState {
        if !self.has_next_page(total_pages) {
            return self.clone();
        }
        self.with_current_page(self.current_page + 1)
    }

    pub fn with_previous_page(&self) -> TableState {
        if !self.has_previous_page() {
            return self.clone();
        }
        self.with_current_page(self.current_page - 1)
    }

    pub fn has_next_page(&self, total_pages: usize) -> bool {
        self.current_page < total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    /// True when `other` would produce different processed rows from the
    /// same data.
    pub fn pipeline_differs(&self, other: &TableState) -> bool {
        self.search_query != other.search_query
            || self.filters != other.filters
            || self.sort != other.sort
    }
}
