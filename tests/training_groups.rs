mod common;

use rerank_data::{
    DeterministicRng, GroupSampler, ParquetStoreConfig, ParquetTableStore, RerankDataError,
    SampleConfig, TableStore, build_sample,
};
use tempfile::{TempDir, tempdir};

use common::{Column, PASSAGE_SCHEMA, write_parquet, write_query_shard};

/// Query shards written out of id order plus one passage shard with two row groups.
fn fixture() -> (TempDir, ParquetTableStore, ParquetTableStore) {
    let dir = tempdir().unwrap();
    let queries = dir.path().join("queries");
    let passages = dir.path().join("passages");
    std::fs::create_dir_all(&queries).unwrap();
    std::fs::create_dir_all(&passages).unwrap();

    write_query_shard(&queries.join("part-a.parquet"), &[2, 3]);
    write_query_shard(&queries.join("part-b.parquet"), &[0, 1]);

    let titles: Vec<String> = (0..6).map(|id| format!("Passage-{id}")).collect();
    let bodies: Vec<String> = (0..6).map(|id| format!("body of passage {id}")).collect();
    let row_group = |range: std::ops::Range<usize>| {
        vec![
            Column::Int64(range.clone().map(|id| id as i64).collect()),
            Column::Utf8(titles[range.clone()].iter().map(String::as_str).collect()),
            Column::Utf8(bodies[range].iter().map(String::as_str).collect()),
        ]
    };
    write_parquet(
        &passages.join("passages.parquet"),
        PASSAGE_SCHEMA,
        vec![row_group(0..3), row_group(3..6)],
    );

    let query_store = ParquetTableStore::open(ParquetStoreConfig::new("queries", &queries)).unwrap();
    let mut passage_config = ParquetStoreConfig::new("passages", &passages);
    passage_config.id_column = Some("lbl_id".to_string());
    passage_config.cache_capacity = 2;
    let passage_store = ParquetTableStore::open(passage_config).unwrap();
    (dir, query_store, passage_store)
}

#[test]
fn query_store_follows_first_row_id_order() {
    let (dir, queries, _) = fixture();
    assert_eq!(queries.len_hint(), Some(4));
    for idx in 0..4 {
        let record = queries.lookup(idx).unwrap();
        assert_eq!(record.int("inp_id").unwrap(), idx as i64);
        assert_eq!(record.text("keywords").unwrap(), format!("query {idx}"));
    }

    let mut by_name = ParquetStoreConfig::new("queries", dir.path().join("queries"));
    by_name.id_column = None;
    let by_name = ParquetTableStore::open(by_name).unwrap();
    assert_eq!(by_name.lookup(0).unwrap().int("inp_id").unwrap(), 2);
}

#[test]
fn passage_store_reads_across_row_groups_and_bounds() {
    let (_dir, _, passages) = fixture();
    assert_eq!(passages.len_hint(), Some(6));
    for idx in [5, 0, 3, 2, 5] {
        let record = passages.lookup(idx).unwrap();
        assert_eq!(record.int("lbl_id").unwrap(), idx as i64);
        assert_eq!(record.text("title").unwrap(), format!("Passage-{idx}"));
    }
    assert!(passages.record_at(6).unwrap().is_none());
    assert!(matches!(
        passages.lookup(6),
        Err(RerankDataError::RecordNotFound { id: 6, .. })
    ));
}

#[test]
fn groups_built_from_parquet_stores_have_fixed_size() {
    let (_dir, queries, passages) = fixture();
    let config = SampleConfig {
        train_group_size: 4,
        ..SampleConfig::default()
    };
    let ids = [0, 1, 2, 3, 4, 5];
    let scores = [0.95, 0.1, 0.85, 0.2, 0.05, 0.3];

    let group = build_sample(
        1,
        &ids,
        &scores,
        &queries,
        &passages,
        &config,
        &mut DeterministicRng::new(17),
    )
    .unwrap();

    assert_eq!(group.texts.len(), 4);
    assert_eq!(group.scores.len(), 4);
    assert_eq!(group.positives, 2);
    for (text, score) in group.pairs() {
        let idx = scores.iter().position(|s| *s == score).unwrap();
        assert_eq!(
            text,
            format!("query: query 1 document: Passage {idx} body of passage {idx}")
        );
    }
}

#[test]
fn sampler_handles_tiny_candidate_lists_and_replays_by_seed() {
    let (_dir, queries, passages) = fixture();
    let config = SampleConfig {
        train_group_size: 7,
        seed: 2024,
        ..SampleConfig::default()
    };

    let mut sampler = GroupSampler::new(config.clone()).unwrap();
    let mut replay = GroupSampler::new(config).unwrap();
    for query_idx in 0..4 {
        let ids = [query_idx, query_idx + 1];
        let scores = [0.4, 0.4];
        let group = sampler
            .build(query_idx, &ids, &scores, &queries, &passages)
            .unwrap();
        assert_eq!(group.len(), 7);
        assert_eq!(group.positives, 0);
        assert_eq!(
            group,
            replay
                .build(query_idx, &ids, &scores, &queries, &passages)
                .unwrap()
        );
    }
}

#[test]
fn missing_keyword_field_fails_the_group() {
    let (_dir, queries, passages) = fixture();
    let config = SampleConfig {
        keyword_field: "question".to_string(),
        ..SampleConfig::default()
    };
    let result = build_sample(
        0,
        &[0],
        &[1.0],
        &queries,
        &passages,
        &config,
        &mut DeterministicRng::new(0),
    );
    assert!(matches!(
        result,
        Err(RerankDataError::MissingField { ref field, .. }) if field == "question"
    ));
}
