//! Error kinds raised by the order pipeline.
//!
//! Every stage is terminal on failure: nothing is retried, so the variants only
//! need to carry enough context for a readable report.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("data load error: {0}")]
    DataLoad(String),

    #[error("data load error: cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("data load error: malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("shape mismatch: column '{column}' has {got} values but the table has {expected} rows")]
    ShapeMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("column '{0}' already exists")]
    ColumnExists(String),

    #[error("domain error: {0}")]
    Domain(String),
}

impl TransformError {
    /// True for every failure raised while reading or coercing the input file.
    pub fn is_data_load(&self) -> bool {
        matches!(
            self,
            TransformError::DataLoad(_) | TransformError::Io { .. } | TransformError::Csv(_)
        )
    }
}

/// Result type for the library stages.
pub type TransformResult<T> = std::result::Result<T, TransformError>;
