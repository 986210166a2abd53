#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runners for the bundled binaries.
pub mod cli;
/// Sampling, result-column, and store configuration types.
pub mod config;
/// Centralized constants for the ranked-list format and defaults.
pub mod constants;
/// Record, candidate, training-group, and ranked-line types.
pub mod data;
/// Tracing subscriber setup for binaries.
pub mod logging;
/// Result shard merging and ranked-list output.
pub mod results;
/// Training-group construction.
pub mod sampler;
/// Shard listing, metadata row counts, and first-row ordering.
pub mod shards;
/// Index-addressable query and passage stores.
pub mod store;
/// Shared type aliases.
pub mod types;
/// Sample formatting helpers.
pub mod utils;

mod errors;

pub use config::{ParquetStoreConfig, ResultColumns, SampleConfig};
pub use data::{
    Candidate, FieldValue, RankedLine, ResultRecord, RowField, RowView, TrainingGroup,
};
pub use errors::RerankDataError;
pub use results::{aggregate_and_rank, aggregate_and_rank_with, aggregate_folder};
pub use sampler::{DeterministicRng, GroupSampler, build_sample};
pub use shards::{
    ParquetShardReader, ShardReader, sorted_shards, sorted_shards_with, total_rows,
    total_rows_with,
};
pub use store::{InMemoryTableStore, ParquetTableStore, TableStore};
pub use types::{FieldName, FormattedText, PassageIdx, QueryId, StoreId};
pub use utils::format_sample;
