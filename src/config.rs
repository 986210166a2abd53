use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::ranked_list::{
    DEFAULT_PASSAGE_ID_COLUMN, DEFAULT_QUERY_ID_COLUMN, DEFAULT_SCORE_COLUMN,
};
use crate::constants::sampler::{
    DEFAULT_CONTENT_FIELDS, DEFAULT_KEYWORD_FIELD, DEFAULT_PASSAGE_PREFIX, DEFAULT_QUERY_PREFIX,
    DEFAULT_SEED, DEFAULT_SEPARATOR, DEFAULT_TRAIN_GROUP_SIZE,
};
use crate::constants::shards::DEFAULT_ROW_CACHE_CAPACITY;
use crate::errors::RerankDataError;
use crate::types::{FieldName, StoreId};

/// Controls how training groups are built and formatted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// RNG seed that controls shuffling and padding order.
    pub seed: u64,
    /// Number of (text, score) pairs in every training group.
    pub train_group_size: usize,
    /// Prefix placed before the query text.
    pub query_prefix: String,
    /// Prefix placed before the passage content.
    pub passage_prefix: String,
    /// Query record field holding the query text.
    pub keyword_field: FieldName,
    /// Passage record fields joined into the passage text, title-like field first.
    pub content_fields: Vec<FieldName>,
    /// Separator placed between passage content fields.
    pub separator: String,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            train_group_size: DEFAULT_TRAIN_GROUP_SIZE,
            query_prefix: DEFAULT_QUERY_PREFIX.to_string(),
            passage_prefix: DEFAULT_PASSAGE_PREFIX.to_string(),
            keyword_field: DEFAULT_KEYWORD_FIELD.to_string(),
            content_fields: DEFAULT_CONTENT_FIELDS.iter().map(|f| f.to_string()).collect(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl SampleConfig {
    /// Load a config from a JSON file; missing keys fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, RerankDataError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| {
            RerankDataError::Configuration(format!(
                "failed parsing sample config {}: {err}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a training group.
    pub fn validate(&self) -> Result<(), RerankDataError> {
        if self.train_group_size == 0 {
            return Err(RerankDataError::Configuration(
                "train_group_size must be > 0".to_string(),
            ));
        }
        if self.content_fields.is_empty() {
            return Err(RerankDataError::Configuration(
                "content_fields must name at least one passage field".to_string(),
            ));
        }
        Ok(())
    }
}

/// Column names read from inference result shards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultColumns {
    /// Integer query id column.
    pub query_id: FieldName,
    /// Passage id column, integer or text.
    pub passage_id: FieldName,
    /// Numeric score column.
    pub score: FieldName,
}

impl Default for ResultColumns {
    fn default() -> Self {
        Self {
            query_id: DEFAULT_QUERY_ID_COLUMN.to_string(),
            passage_id: DEFAULT_PASSAGE_ID_COLUMN.to_string(),
            score: DEFAULT_SCORE_COLUMN.to_string(),
        }
    }
}

impl ResultColumns {
    pub(crate) fn names(&self) -> [&str; 3] {
        [&self.query_id, &self.passage_id, &self.score]
    }
}

/// Configuration for a table store backed by a folder of parquet shards.
#[derive(Clone, Debug)]
pub struct ParquetStoreConfig {
    /// Stable store id used in logs and errors.
    pub store_id: StoreId,
    /// Folder holding the shard files.
    pub shard_dir: PathBuf,
    /// Column whose first-row value orders the shards. `None` orders by file name.
    pub id_column: Option<FieldName>,
    /// Maximum number of decoded rows cached in memory.
    pub cache_capacity: usize,
}

impl ParquetStoreConfig {
    /// Create a config with the default id column and cache size.
    pub fn new(store_id: impl Into<StoreId>, shard_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_id: store_id.into(),
            shard_dir: shard_dir.into(),
            id_column: Some(crate::constants::shards::DEFAULT_ID_COLUMN.to_string()),
            cache_capacity: DEFAULT_ROW_CACHE_CAPACITY,
        }
    }
}
