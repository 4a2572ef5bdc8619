/// Error types for table configuration.
///
/// The pipeline itself never fails: unknown operators, missing values and
/// out-of-range navigation all have silent fallbacks. Errors only surface
/// when a caller hands the engine a configuration it cannot honour.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    /// Page sizes must be at least one row.
    #[error("invalid page size {0}: must be at least 1")]
    InvalidPageSize(usize),

    /// A default sort or filter names a key with no column descriptor.
    #[error("column '{0}' not found in table columns")]
    UnknownColumn(String),

    #[error("failed to decode table configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
