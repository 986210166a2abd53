//! Shard discovery, metadata-only row counts, and first-row shard ordering.
//!
//! Every operation here goes through the narrow [`ShardReader`] capability so
//! ordering and counting never require materializing a whole shard.

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::constants::shards::PARQUET_EXTENSION;
use crate::data::{FieldValue, RowView};
use crate::errors::RerankDataError;
use crate::types::QueryId;

/// Tabular shard access needed by the indexer, counter, and aggregator.
pub trait ShardReader {
    /// Row count taken from stored file metadata, without scanning rows.
    fn row_count(&self, path: &Path) -> Result<usize, RerankDataError>;
    /// Top-level column names taken from the stored schema.
    fn column_names(&self, path: &Path) -> Result<Vec<String>, RerankDataError>;
    /// Stream at most `limit` leading rows, then release the shard.
    fn take_rows(&self, path: &Path, limit: usize) -> Result<Vec<RowView>, RerankDataError>;
    /// Read every row of the shard.
    fn read_rows(&self, path: &Path) -> Result<Vec<RowView>, RerankDataError> {
        self.take_rows(path, usize::MAX)
    }
}

/// `ShardReader` over local parquet files.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParquetShardReader;

impl ParquetShardReader {
    pub(crate) fn open(path: &Path) -> Result<SerializedFileReader<File>, RerankDataError> {
        let file = File::open(path)
            .map_err(|err| RerankDataError::unavailable(path, format!("failed opening shard: {err}")))?;
        SerializedFileReader::new(file).map_err(|err| {
            RerankDataError::unavailable(path, format!("failed reading parquet metadata: {err}"))
        })
    }
}

impl ShardReader for ParquetShardReader {
    fn row_count(&self, path: &Path) -> Result<usize, RerankDataError> {
        let reader = Self::open(path)?;
        usize::try_from(reader.metadata().file_metadata().num_rows())
            .map_err(|_| RerankDataError::unavailable(path, "parquet row count overflow"))
    }

    fn column_names(&self, path: &Path) -> Result<Vec<String>, RerankDataError> {
        let reader = Self::open(path)?;
        Ok(reader
            .metadata()
            .file_metadata()
            .schema_descr()
            .root_schema()
            .get_fields()
            .iter()
            .map(|field| field.name().to_string())
            .collect())
    }

    fn take_rows(&self, path: &Path, limit: usize) -> Result<Vec<RowView>, RerankDataError> {
        let reader = Self::open(path)?;
        let iter = reader.get_row_iter(None).map_err(|err| {
            RerankDataError::unavailable(path, format!("failed iterating rows: {err}"))
        })?;

        let mut rows = Vec::new();
        for row in iter.take(limit) {
            let row = row.map_err(|err| {
                RerankDataError::unavailable(path, format!("failed decoding row {}: {err}", rows.len()))
            })?;
            rows.push(row_view(&row));
        }
        Ok(rows)
    }
}

/// Convert a decoded parquet row into a [`RowView`].
pub fn row_view(row: &Row) -> RowView {
    RowView::from_pairs(
        row.get_column_iter()
            .map(|(name, field)| (name.clone(), field_value(field))),
    )
}

/// Convert a parquet cell into a [`FieldValue`]; nested and temporal cells keep their text form.
pub fn field_value(field: &Field) -> FieldValue {
    match field {
        Field::Null => FieldValue::Null,
        Field::Bool(value) => FieldValue::Bool(*value),
        Field::Byte(value) => FieldValue::Int(i64::from(*value)),
        Field::Short(value) => FieldValue::Int(i64::from(*value)),
        Field::Int(value) => FieldValue::Int(i64::from(*value)),
        Field::Long(value) => FieldValue::Int(*value),
        Field::UByte(value) => FieldValue::Int(i64::from(*value)),
        Field::UShort(value) => FieldValue::Int(i64::from(*value)),
        Field::UInt(value) => FieldValue::Int(i64::from(*value)),
        Field::ULong(value) => match i64::try_from(*value) {
            Ok(value) => FieldValue::Int(value),
            Err(_) => FieldValue::Text(value.to_string()),
        },
        // Keep the shortest single-precision decimal so 0.9f32 stays 0.9.
        Field::Float(value) => FieldValue::Float(
            value
                .to_string()
                .parse::<f64>()
                .unwrap_or(f64::from(*value)),
        ),
        Field::Double(value) => FieldValue::Float(*value),
        Field::Str(value) => FieldValue::Text(value.clone()),
        other => FieldValue::Text(other.to_string()),
    }
}

/// Files directly inside `folder`, sorted by file name.
pub fn list_shard_files(folder: &Path) -> Result<Vec<PathBuf>, RerankDataError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        } else {
            debug!(
                "[rerank_data:shards] skipping non-file entry {}",
                entry.path().display()
            );
        }
    }
    Ok(files)
}

/// Parquet files directly inside `folder`, sorted by file name.
pub fn list_parquet_files(folder: &Path) -> Result<Vec<PathBuf>, RerankDataError> {
    Ok(list_shard_files(folder)?
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(PARQUET_EXTENSION))
        })
        .collect())
}

/// Order shards by the `id_column` value of their first row.
///
/// Each shard is opened, peeked for one row, and released before the next one
/// is touched. Shards with equal first ids keep their input order.
pub fn sorted_shards_with<R, P>(
    reader: &R,
    paths: &[P],
    id_column: &str,
) -> Result<Vec<PathBuf>, RerankDataError>
where
    R: ShardReader + ?Sized,
    P: AsRef<Path>,
{
    let mut keyed: Vec<(QueryId, PathBuf)> = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let first = reader
            .take_rows(path, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                RerankDataError::EmptyInput(format!("shard {} has no rows", path.display()))
            })?;
        let first_id = match first.get(id_column) {
            Some(_) => first.int(id_column)?,
            None => {
                return Err(RerankDataError::missing_field(
                    id_column,
                    format!("first row of shard {}", path.display()),
                ));
            }
        };
        debug!(
            "[rerank_data:shards] {} starts at {}={}",
            path.display(),
            id_column,
            first_id
        );
        keyed.push((first_id, path.to_path_buf()));
    }

    keyed.sort_by_key(|(first_id, _)| *first_id);
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

/// Order parquet shards by the `id_column` value of their first row.
pub fn sorted_shards<P: AsRef<Path>>(
    paths: &[P],
    id_column: &str,
) -> Result<Vec<PathBuf>, RerankDataError> {
    sorted_shards_with(&ParquetShardReader, paths, id_column)
}

/// Sum metadata row counts of every file directly inside `folder`.
pub fn total_rows_with<R: ShardReader + ?Sized>(
    reader: &R,
    folder: &Path,
) -> Result<usize, RerankDataError> {
    let files = list_shard_files(folder)?;
    let mut total = 0usize;
    for path in &files {
        let rows = reader.row_count(path)?;
        debug!("[rerank_data:shards] {} reports {} rows", path.display(), rows);
        total = total
            .checked_add(rows)
            .ok_or_else(|| RerankDataError::unavailable(folder, "total row count overflow"))?;
    }
    info!(
        "[rerank_data:shards] {} holds {} rows across {} files",
        folder.display(),
        total,
        files.len()
    );
    Ok(total)
}

/// Sum parquet metadata row counts of every file directly inside `folder`.
pub fn total_rows(folder: &Path) -> Result<usize, RerankDataError> {
    total_rows_with(&ParquetShardReader, folder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    /// In-memory shards keyed by file name; counts every row-level read.
    #[derive(Default)]
    struct FakeReader {
        shards: HashMap<String, (usize, Vec<RowView>)>,
        row_reads: Cell<usize>,
    }

    impl FakeReader {
        fn with_shard(mut self, name: &str, metadata_rows: usize, first_ids: &[i64]) -> Self {
            let rows = first_ids
                .iter()
                .map(|id| RowView::from_pairs([("inp_id", FieldValue::Int(*id))]))
                .collect();
            self.shards.insert(name.to_string(), (metadata_rows, rows));
            self
        }

        fn shard(&self, path: &Path) -> Result<&(usize, Vec<RowView>), RerankDataError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            self.shards
                .get(name)
                .ok_or_else(|| RerankDataError::unavailable(path, "not a tabular file"))
        }
    }

    impl ShardReader for FakeReader {
        fn row_count(&self, path: &Path) -> Result<usize, RerankDataError> {
            Ok(self.shard(path)?.0)
        }

        fn column_names(&self, _path: &Path) -> Result<Vec<String>, RerankDataError> {
            Ok(vec!["inp_id".to_string()])
        }

        fn take_rows(&self, path: &Path, limit: usize) -> Result<Vec<RowView>, RerankDataError> {
            self.row_reads.set(self.row_reads.get() + 1);
            Ok(self.shard(path)?.1.iter().take(limit).cloned().collect())
        }
    }

    #[test]
    fn shards_are_ordered_by_first_row_id() {
        let reader = FakeReader::default()
            .with_shard("a", 2, &[30, 31])
            .with_shard("b", 2, &[10, 11])
            .with_shard("c", 2, &[20, 21]);
        let sorted = sorted_shards_with(&reader, &["a", "b", "c"], "inp_id").unwrap();
        assert_eq!(
            sorted,
            vec![PathBuf::from("b"), PathBuf::from("c"), PathBuf::from("a")]
        );
        assert_eq!(reader.row_reads.get(), 3);
    }

    #[test]
    fn equal_first_ids_keep_input_order() {
        let reader = FakeReader::default()
            .with_shard("x", 1, &[5])
            .with_shard("y", 1, &[1])
            .with_shard("z", 1, &[5]);
        let sorted = sorted_shards_with(&reader, &["z", "y", "x"], "inp_id").unwrap();
        assert_eq!(
            sorted,
            vec![PathBuf::from("y"), PathBuf::from("z"), PathBuf::from("x")]
        );
    }

    #[test]
    fn empty_shard_and_missing_column_fail() {
        let reader = FakeReader::default()
            .with_shard("empty", 0, &[])
            .with_shard("full", 1, &[3]);
        assert!(matches!(
            sorted_shards_with(&reader, &["full", "empty"], "inp_id"),
            Err(RerankDataError::EmptyInput(_))
        ));
        assert!(matches!(
            sorted_shards_with(&reader, &["full"], "lbl_id"),
            Err(RerankDataError::MissingField { ref field, .. }) if field == "lbl_id"
        ));
    }

    #[test]
    fn total_rows_uses_metadata_only() {
        let dir = tempdir().unwrap();
        for name in ["s0", "s1", "s2"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        let reader = FakeReader::default()
            .with_shard("s0", 5, &[])
            .with_shard("s1", 7, &[])
            .with_shard("s2", 3, &[]);

        assert_eq!(total_rows_with(&reader, dir.path()).unwrap(), 15);
        assert_eq!(reader.row_reads.get(), 0);
    }

    #[test]
    fn total_rows_fails_on_unreadable_folder_or_foreign_file() {
        let dir = tempdir().unwrap();
        let reader = FakeReader::default().with_shard("s0", 5, &[]);
        assert!(matches!(
            total_rows_with(&reader, &dir.path().join("missing")),
            Err(RerankDataError::Io(_))
        ));

        fs::write(dir.path().join("s0"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        assert!(matches!(
            total_rows_with(&reader, dir.path()),
            Err(RerankDataError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn list_parquet_files_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.parquet"), b"").unwrap();
        fs::write(dir.path().join("a.PARQUET"), b"").unwrap();
        fs::write(dir.path().join("c.json"), b"").unwrap();
        let files = list_parquet_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.PARQUET", "b.parquet"]);
    }

    #[test]
    fn parquet_reader_reports_invalid_files() {
        let dir = tempdir().unwrap();
        let bogus = dir.path().join("bogus.parquet");
        fs::write(&bogus, b"not parquet").unwrap();
        assert!(ParquetShardReader.row_count(&bogus).is_err());
        assert!(ParquetShardReader.take_rows(&dir.path().join("missing.parquet"), 1).is_err());
    }

    #[test]
    fn parquet_fields_convert_to_scalars() {
        assert_eq!(field_value(&Field::Long(9)), FieldValue::Int(9));
        assert_eq!(field_value(&Field::UInt(4)), FieldValue::Int(4));
        assert_eq!(field_value(&Field::Float(0.9)), FieldValue::Float(0.9));
        assert_eq!(
            field_value(&Field::Str("doc".to_string())),
            FieldValue::Text("doc".to_string())
        );
        assert_eq!(
            field_value(&Field::ULong(u64::MAX)),
            FieldValue::Text(u64::MAX.to_string())
        );
        assert_eq!(field_value(&Field::Null), FieldValue::Null);
    }
}
