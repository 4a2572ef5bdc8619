//! GridState - Table State Engine for Data Grids
//!
//! Takes a set of records plus a declarative configuration (search, filters,
//! sort, pagination) and deterministically derives the rows a data grid
//! should display, together with the transitions (toggle sort, set filter,
//! change page) that drive it. Rendering is left to the caller.

pub mod column;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod search;
pub mod snapshot;
pub mod sort;
pub mod state;

pub use column::{ColumnDescriptor, ColumnValue, Comparator, Record};
pub use engine::{TableConfig, TableEngine};
pub use error::{Result, TableError};
pub use filter::{FilterOperator, FilterSet, FilterSpec, FilterValue};
pub use pagination::{PageInfo, DEFAULT_PAGE_SIZE};
pub use search::SearchConfig;
pub use snapshot::TableSnapshot;
pub use sort::{SortDirection, SortSpec};
pub use state::{TableAction, TableState};
