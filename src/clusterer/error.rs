use thiserror::Error;

use crate::data::DataError;

#[derive(Error, Debug)]
pub enum MiningError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read snapshot archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to encode snapshot: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Corrupt snapshot: {0}")]
    Corrupt(String),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Attribute index {index} out of range (model has {count} attributes)")]
    NoSuchAttribute { index: usize, count: usize },

    #[error("No clustering model: run or restore one first")]
    NoModel,

    #[error("No table attached to the session")]
    NoTable,
}

impl MiningError {
    /// Whether this is the recoverable "k out of range" failure
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, MiningError::Data(DataError::OutOfRange { .. }))
    }
}
