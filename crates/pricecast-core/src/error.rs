use thiserror::Error;

/// Error type shared across the whole modeling pipeline.
#[derive(Debug, Error, Clone)]
pub enum PipelineError {
    #[error("Shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Row index {index} out of bounds for {size} rows")]
    RowOutOfBounds { index: usize, size: usize },

    #[error("Column index {index} out of bounds for {size} columns")]
    ColOutOfBounds { index: usize, size: usize },

    #[error("No column named {0:?}")]
    ColumnNotFound(String),

    #[error("Duplicate column name {0:?}")]
    DuplicateColumn(String),

    #[error("Column {column:?} is not {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: &'static str,
    },

    #[error("Column {column:?} has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Non-positive value {value} in column {column:?} at row {row}: log transform requires strictly positive input")]
    NonPositive {
        column: String,
        row: usize,
        value: f64,
    },

    #[error("{0} has not been fitted")]
    NotFitted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty input: {0}")]
    EmptyData(String),

    #[error("No feasible grid point for family {family}: every candidate fit failed")]
    GridExhausted { family: String },

    #[error("No model family produced a usable tuning result")]
    NoViableFamily,
}

pub type PipelineResult<T> = Result<T, PipelineError>;
