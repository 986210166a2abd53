//! Index-addressable record stores for queries and passages.
//!
//! Records are keyed by integer row index. A store built over id-sorted shards
//! therefore resolves the same ids the upstream retriever emitted.

use crate::data::RowView;
use crate::errors::RerankDataError;
use crate::types::StoreId;

mod parquet_store;

pub use self::parquet_store::ParquetTableStore;

/// Index-addressable source of records with field-name access.
pub trait TableStore: Send + Sync {
    /// Stable store identifier.
    fn id(&self) -> &str;
    /// Number of addressable records, when known.
    fn len_hint(&self) -> Option<usize>;
    /// Return the record at index `idx`, or `None` past the end.
    fn record_at(&self, idx: usize) -> Result<Option<RowView>, RerankDataError>;

    /// Return the record at index `idx`, failing when it does not exist.
    fn lookup(&self, idx: usize) -> Result<RowView, RerankDataError> {
        self.record_at(idx)?
            .ok_or_else(|| RerankDataError::RecordNotFound {
                store: self.id().to_string(),
                id: idx,
            })
    }
}

/// Store holding every record in memory.
#[derive(Clone, Debug)]
pub struct InMemoryTableStore {
    id: StoreId,
    records: Vec<RowView>,
}

impl InMemoryTableStore {
    /// Store `records` under `id`; record `n` is addressed by index `n`.
    pub fn new(id: impl Into<StoreId>, records: Vec<RowView>) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TableStore for InMemoryTableStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.records.len())
    }

    fn record_at(&self, idx: usize) -> Result<Option<RowView>, RerankDataError> {
        Ok(self.records.get(idx).cloned())
    }
}
