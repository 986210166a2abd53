/// Query identifier as stored in query shards and result shards.
/// Example: `1042`
pub type QueryId = i64;
/// Row index of a passage in the passage store.
/// Example: `88231`
pub type PassageIdx = usize;
/// Identifier of a table store, used in logs and errors.
/// Examples: `queries`, `passages`
pub type StoreId = String;
/// Column or record field name.
/// Examples: `inp_id`, `keywords`, `title`
pub type FieldName = String;
/// Model-input text produced by the sample formatter.
/// Example: `query: rust parquet document: Apache Parquet. Columnar storage.`
pub type FormattedText = String;
