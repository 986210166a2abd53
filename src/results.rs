//! Merges per-shard inference results into one ranked-list file.
//!
//! Rows from every shard are concatenated in shard order, then stably sorted
//! by query id ascending and score descending. Equal scores within a query
//! therefore keep their shard-read order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::config::ResultColumns;
use crate::data::{RankedLine, ResultRecord};
use crate::errors::RerankDataError;
use crate::shards::{ParquetShardReader, ShardReader, list_shard_files};

/// Read every result row of one shard.
pub fn read_result_shard<R: ShardReader + ?Sized>(
    reader: &R,
    path: &Path,
    columns: &ResultColumns,
) -> Result<Vec<ResultRecord>, RerankDataError> {
    let available = reader.column_names(path)?;
    for required in columns.names() {
        if !available.iter().any(|name| name == required) {
            return Err(RerankDataError::missing_field(
                required,
                format!("result shard {}", path.display()),
            ));
        }
    }

    reader
        .read_rows(path)?
        .into_iter()
        .map(|row| {
            Ok(ResultRecord {
                query_id: row.int(&columns.query_id)?,
                passage_id: row.text(&columns.passage_id)?,
                score: row.float(&columns.score)?,
            })
        })
        .collect()
}

/// Stable sort by `(query_id asc, score desc)`; NaN scores follow a total order.
pub fn sort_results(records: &mut [ResultRecord]) {
    records.sort_by(|a, b| {
        a.query_id
            .cmp(&b.query_id)
            .then_with(|| b.score.total_cmp(&a.score))
    });
}

/// Assign 1-based ranks that restart whenever the query id changes.
///
/// `records` must already be sorted with [`sort_results`].
pub fn rank_results(records: &[ResultRecord]) -> impl Iterator<Item = RankedLine<'_>> {
    let mut current = None;
    let mut rank = 0usize;
    records.iter().map(move |record| {
        if current != Some(record.query_id) {
            current = Some(record.query_id);
            rank = 0;
        }
        rank += 1;
        RankedLine { record, rank }
    })
}

/// Write one ranked-list line per record; returns the number of lines.
pub fn write_ranked_list<W: Write>(
    records: &[ResultRecord],
    writer: &mut W,
) -> Result<usize, RerankDataError> {
    let mut lines = 0usize;
    for line in rank_results(records) {
        writeln!(writer, "{line}")?;
        lines += 1;
    }
    writer.flush()?;
    Ok(lines)
}

/// Load, merge, sort, and rank `shard_paths`, writing the ranked list to `output_path`.
///
/// Every shard is loaded before the output file is created, so a bad shard
/// leaves no output behind.
pub fn aggregate_and_rank_with<R, P>(
    reader: &R,
    shard_paths: &[P],
    output_path: &Path,
    columns: &ResultColumns,
) -> Result<usize, RerankDataError>
where
    R: ShardReader + ?Sized,
    P: AsRef<Path>,
{
    if shard_paths.is_empty() {
        return Err(RerankDataError::EmptyInput(
            "no result shards to aggregate".to_string(),
        ));
    }

    let mut records = Vec::new();
    for path in shard_paths {
        records.extend(read_result_shard(reader, path.as_ref(), columns)?);
    }
    sort_results(&mut records);

    let mut writer = BufWriter::new(File::create(output_path)?);
    let lines = write_ranked_list(&records, &mut writer)?;
    info!(
        "[rerank_data:results] wrote {} ranked lines from {} shards to {}",
        lines,
        shard_paths.len(),
        output_path.display()
    );
    Ok(lines)
}

/// Merge parquet result shards with the default column names.
pub fn aggregate_and_rank<P: AsRef<Path>>(
    shard_paths: &[P],
    output_path: &Path,
) -> Result<usize, RerankDataError> {
    aggregate_and_rank_with(
        &ParquetShardReader,
        shard_paths,
        output_path,
        &ResultColumns::default(),
    )
}

/// Merge every file directly inside `results_dir`, in file-name order.
pub fn aggregate_folder(results_dir: &Path, output_path: &Path) -> Result<usize, RerankDataError> {
    let shards = list_shard_files(results_dir)?;
    info!(
        "[rerank_data:results] found {} result shards in {}",
        shards.len(),
        results_dir.display()
    );
    aggregate_and_rank(&shards, output_path)
}
