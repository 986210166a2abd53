use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::reader::RowIter;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::info;

use super::TableStore;
use crate::config::ParquetStoreConfig;
use crate::data::RowView;
use crate::errors::RerankDataError;
use crate::shards::{ParquetShardReader, list_parquet_files, row_view, sorted_shards};

#[derive(Default)]
struct ParquetCache {
    readers: HashMap<PathBuf, Arc<SerializedFileReader<File>>>,
}

impl ParquetCache {
    fn reader_for(&mut self, path: &Path) -> Result<Arc<SerializedFileReader<File>>, RerankDataError> {
        if let Some(reader) = self.readers.get(path) {
            return Ok(reader.clone());
        }
        let reader = Arc::new(ParquetShardReader::open(path)?);
        self.readers.insert(path.to_path_buf(), reader.clone());
        Ok(reader)
    }
}

#[derive(Clone, Debug)]
struct ShardIndex {
    path: PathBuf,
    global_start: usize,
    row_count: usize,
    /// `(first local row, row count)` per non-empty row group.
    row_groups: Vec<(usize, usize)>,
}

#[derive(Default)]
struct RowCache {
    rows: HashMap<usize, RowView>,
    order: VecDeque<usize>,
}

impl RowCache {
    fn get(&self, idx: usize) -> Option<RowView> {
        self.rows.get(&idx).cloned()
    }

    fn insert(&mut self, idx: usize, row: RowView, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if !self.rows.contains_key(&idx) {
            self.order.push_back(idx);
        }
        self.rows.insert(idx, row);
        while self.rows.len() > capacity {
            if let Some(old) = self.order.pop_front() {
                self.rows.remove(&old);
            } else {
                break;
            }
        }
    }
}

/// `TableStore` over a folder of parquet shards.
///
/// Shards are laid end to end in first-row id order, so record `idx` is the
/// `idx`-th row of the concatenated collection. Rows are decoded one at a time
/// from their row group and kept in a bounded FIFO cache.
pub struct ParquetTableStore {
    config: ParquetStoreConfig,
    shards: Vec<ShardIndex>,
    total_rows: usize,
    cache: Mutex<RowCache>,
    parquet_cache: Mutex<ParquetCache>,
}

impl ParquetTableStore {
    /// Index the shards under `config.shard_dir` from their metadata.
    pub fn open(config: ParquetStoreConfig) -> Result<Self, RerankDataError> {
        let start = Instant::now();
        let files = list_parquet_files(&config.shard_dir)?;
        if files.is_empty() {
            return Err(RerankDataError::EmptyInput(format!(
                "no parquet shards found in {}",
                config.shard_dir.display()
            )));
        }
        let ordered = match &config.id_column {
            Some(id_column) => sorted_shards(&files, id_column)?,
            None => files,
        };

        let mut shards = Vec::with_capacity(ordered.len());
        let mut total_rows = 0usize;
        for path in ordered {
            let (row_count, row_groups) = Self::row_group_map(&path)?;
            shards.push(ShardIndex {
                path,
                global_start: total_rows,
                row_count,
                row_groups,
            });
            total_rows = total_rows.checked_add(row_count).ok_or_else(|| {
                RerankDataError::unavailable(&config.shard_dir, "total row count overflow")
            })?;
        }

        info!(
            "[rerank_data:store] '{}' ready in {:.2}s (rows={}, shards={})",
            config.store_id,
            start.elapsed().as_secs_f64(),
            total_rows,
            shards.len()
        );

        Ok(Self {
            config,
            shards,
            total_rows,
            cache: Mutex::new(RowCache::default()),
            parquet_cache: Mutex::new(ParquetCache::default()),
        })
    }

    /// Shard paths in the order their rows are addressed.
    pub fn shard_paths(&self) -> impl Iterator<Item = &Path> {
        self.shards.iter().map(|shard| shard.path.as_path())
    }

    fn row_group_map(path: &Path) -> Result<(usize, Vec<(usize, usize)>), RerankDataError> {
        let reader = ParquetShardReader::open(path)?;
        let mut row_groups = Vec::new();
        let mut running = 0usize;
        for meta in reader.metadata().row_groups() {
            let group_rows = usize::try_from(meta.num_rows())
                .map_err(|_| RerankDataError::unavailable(path, "parquet row group size overflow"))?;
            if group_rows == 0 {
                continue;
            }
            row_groups.push((running, group_rows));
            running = running.saturating_add(group_rows);
        }
        Ok((running, row_groups))
    }

    fn poisoned(&self, what: &str) -> RerankDataError {
        RerankDataError::unavailable(&self.config.shard_dir, format!("{what} lock poisoned"))
    }

    fn read_row(&self, shard: &ShardIndex, local_idx: usize) -> Result<RowView, RerankDataError> {
        let group_pos = shard
            .row_groups
            .binary_search_by(|(start, count)| {
                if local_idx < *start {
                    Ordering::Greater
                } else if local_idx >= start.saturating_add(*count) {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .map_err(|_| {
                RerankDataError::unavailable(
                    &shard.path,
                    format!("row {local_idx} could not be mapped to a row group"),
                )
            })?;
        let (group_start, _) = shard.row_groups[group_pos];

        let reader = self
            .parquet_cache
            .lock()
            .map_err(|_| self.poisoned("parquet reader cache"))?
            .reader_for(&shard.path)?;
        let row_group = reader.get_row_group(group_pos).map_err(|err| {
            RerankDataError::unavailable(
                &shard.path,
                format!("failed opening row group {group_pos}: {err}"),
            )
        })?;
        let mut iter = RowIter::from_row_group(None, row_group.as_ref()).map_err(|err| {
            RerankDataError::unavailable(
                &shard.path,
                format!("failed iterating row group {group_pos}: {err}"),
            )
        })?;

        let row = iter
            .nth(local_idx - group_start)
            .ok_or_else(|| {
                RerankDataError::unavailable(
                    &shard.path,
                    format!("row {local_idx} missing from row group {group_pos}"),
                )
            })?
            .map_err(|err| {
                RerankDataError::unavailable(
                    &shard.path,
                    format!("failed decoding row {local_idx}: {err}"),
                )
            })?;
        Ok(row_view(&row))
    }
}

impl TableStore for ParquetTableStore {
    fn id(&self) -> &str {
        &self.config.store_id
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.total_rows)
    }

    fn record_at(&self, idx: usize) -> Result<Option<RowView>, RerankDataError> {
        if idx >= self.total_rows {
            return Ok(None);
        }
        if let Some(row) = self
            .cache
            .lock()
            .map_err(|_| self.poisoned("row cache"))?
            .get(idx)
        {
            return Ok(Some(row));
        }

        let shard_pos = self
            .shards
            .partition_point(|shard| shard.global_start + shard.row_count <= idx);
        let shard = &self.shards[shard_pos];
        let row = self.read_row(shard, idx - shard.global_start)?;

        self.cache
            .lock()
            .map_err(|_| self.poisoned("row cache"))?
            .insert(idx, row.clone(), self.config.cache_capacity);
        Ok(Some(row))
    }
}
