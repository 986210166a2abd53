#![allow(dead_code)]

use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, FloatType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// One column's values for a single row group.
pub enum Column<'a> {
    Int64(Vec<i64>),
    Utf8(Vec<&'a str>),
    Double(Vec<f64>),
    Float(Vec<f32>),
}

/// Write a parquet file with `schema`, one entry of `row_groups` per row group.
pub fn write_parquet(path: &Path, schema: &str, row_groups: Vec<Vec<Column<'_>>>) {
    let schema = Arc::new(parse_message_type(schema).unwrap());
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();

    for columns in row_groups {
        let mut row_group = writer.next_row_group().unwrap();
        for column in columns {
            let mut col_writer = row_group.next_column().unwrap().unwrap();
            match column {
                Column::Int64(values) => {
                    col_writer
                        .typed::<Int64Type>()
                        .write_batch(&values, None, None)
                        .unwrap();
                }
                Column::Utf8(values) => {
                    let values = values
                        .into_iter()
                        .map(ByteArray::from)
                        .collect::<Vec<_>>();
                    col_writer
                        .typed::<ByteArrayType>()
                        .write_batch(&values, None, None)
                        .unwrap();
                }
                Column::Double(values) => {
                    col_writer
                        .typed::<DoubleType>()
                        .write_batch(&values, None, None)
                        .unwrap();
                }
                Column::Float(values) => {
                    col_writer
                        .typed::<FloatType>()
                        .write_batch(&values, None, None)
                        .unwrap();
                }
            }
            col_writer.close().unwrap();
        }
        assert!(row_group.next_column().unwrap().is_none());
        row_group.close().unwrap();
    }
    writer.close().unwrap();
}

pub const QUERY_SCHEMA: &str = "message queries {
    REQUIRED INT64 inp_id;
    REQUIRED BINARY keywords (UTF8);
}";

pub const PASSAGE_SCHEMA: &str = "message passages {
    REQUIRED INT64 lbl_id;
    REQUIRED BINARY title (UTF8);
    REQUIRED BINARY contents (UTF8);
}";

pub const RESULT_SCHEMA: &str = "message results {
    REQUIRED INT64 inp_id;
    REQUIRED BINARY lbl_id (UTF8);
    REQUIRED DOUBLE score;
}";

/// Query shard with one row group holding `ids` and generated keywords.
pub fn write_query_shard(path: &Path, ids: &[i64]) {
    let keywords: Vec<String> = ids.iter().map(|id| format!("query {id}")).collect();
    write_parquet(
        path,
        QUERY_SCHEMA,
        vec![vec![
            Column::Int64(ids.to_vec()),
            Column::Utf8(keywords.iter().map(String::as_str).collect()),
        ]],
    );
}

/// Result shard in the default `inp_id`/`lbl_id`/`score` layout.
pub fn write_result_shard(path: &Path, rows: &[(i64, &str, f64)]) {
    write_parquet(
        path,
        RESULT_SCHEMA,
        vec![vec![
            Column::Int64(rows.iter().map(|r| r.0).collect()),
            Column::Utf8(rows.iter().map(|r| r.1).collect()),
            Column::Double(rows.iter().map(|r| r.2).collect()),
        ]],
    );
}
