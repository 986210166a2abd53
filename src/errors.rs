use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::StoreId;

/// Error type for sample construction, shard inspection, and result merging.
#[derive(Debug, Error)]
pub enum RerankDataError {
    /// Candidate list, shard, or shard set with nothing in it.
    #[error("empty input: {0}")]
    EmptyInput(String),
    /// Requested column or record field is absent.
    #[error("missing field '{field}' in {context}")]
    MissingField { field: String, context: String },
    /// Field is present but its value cannot be used.
    #[error("field '{field}' has an unusable value: {details}")]
    InvalidField { field: String, details: String },
    /// Group needs padding but the negative pool is empty.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// Lookup past the end of a table store.
    #[error("record {id} not found in store '{store}'")]
    RecordNotFound { store: StoreId, id: usize },
    /// Candidate ids and scores have different lengths.
    #[error("candidate lists differ in length: {ids} ids, {scores} scores")]
    LengthMismatch { ids: usize, scores: usize },
    /// Shard could not be opened or read as parquet.
    #[error("shard '{}' is unavailable: {reason}", path.display())]
    SourceUnavailable { path: PathBuf, reason: String },
    /// Invalid configuration values.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RerankDataError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }
}
