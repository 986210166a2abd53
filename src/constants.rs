/// Constants used by the ranked-list writer.
pub mod ranked_list {
    /// Literal iteration marker in the second column of every line.
    pub const ITERATION_MARKER: &str = "Q0";
    /// Literal run tag in the last column of every line.
    pub const RUN_TAG: &str = "dense";
    /// Default query id column in result shards.
    pub const DEFAULT_QUERY_ID_COLUMN: &str = "inp_id";
    /// Default passage id column in result shards.
    pub const DEFAULT_PASSAGE_ID_COLUMN: &str = "lbl_id";
    /// Default score column in result shards.
    pub const DEFAULT_SCORE_COLUMN: &str = "score";
}

/// Constants used by training-group construction.
pub mod sampler {
    /// Default RNG seed for `GroupSampler`.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default number of passages per training group.
    pub const DEFAULT_TRAIN_GROUP_SIZE: usize = 8;
    /// Default prefix placed before the query text.
    pub const DEFAULT_QUERY_PREFIX: &str = "query:";
    /// Default prefix placed before the passage content.
    pub const DEFAULT_PASSAGE_PREFIX: &str = "document:";
    /// Default query text field.
    pub const DEFAULT_KEYWORD_FIELD: &str = "keywords";
    /// Default passage content fields, title first.
    pub const DEFAULT_CONTENT_FIELDS: [&str; 2] = ["title", "contents"];
    /// Default separator between passage content fields.
    pub const DEFAULT_SEPARATOR: &str = " ";
}

/// Constants used by shard discovery and parquet-backed stores.
pub mod shards {
    /// File extension accepted as a parquet shard.
    pub const PARQUET_EXTENSION: &str = "parquet";
    /// Default id column used when ordering query shards.
    pub const DEFAULT_ID_COLUMN: &str = "inp_id";
    /// Default number of decoded rows kept by a parquet table store.
    pub const DEFAULT_ROW_CACHE_CAPACITY: usize = 2048;
}
