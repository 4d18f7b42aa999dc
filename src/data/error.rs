use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Sample size {k} out of range: accepted values for k are 1 - {max}")]
    OutOfRange { k: usize, max: usize },

    #[error("Table {0} has no rows")]
    EmptyTable(String),

    #[error("Table {0} has no columns")]
    NoColumns(String),

    #[error("Row has {found} values but the schema has {expected} columns")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Column {column} expects a {expected} value")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },

    #[error("Column {column} holds a non-finite number")]
    NonFinite { column: String },

    #[error("Column {column} spans [{min}, {max}], a range too wide to normalize")]
    RangeOverflow { column: String, min: f64, max: f64 },
}
