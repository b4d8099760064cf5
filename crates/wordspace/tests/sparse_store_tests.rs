//! Integration tests for the sparse back-end: store round trip through the
//! writer, lookups, collocations, similarity sentinels, and corruption
//! handling.

mod common;

use wordspace::sparse::SparseSpace;
use wordspace::{Measure, SpaceError, WordSpace};

#[test]
fn test_open_and_load_agree() {
    let dir = tempfile::tempdir().unwrap();
    common::write_house_store(dir.path(), true);

    let mapped = SparseSpace::open(dir.path(), false).unwrap();
    let resident = SparseSpace::open(dir.path(), true).unwrap();
    assert!(!mapped.is_resident());
    assert!(resident.is_resident());

    assert_eq!(mapped.len(), 5);
    assert_eq!(resident.len(), 5);
    for word in ["haus", "gebäude", "hütte", "garten", "wald"] {
        assert_eq!(
            mapped.lookup(word).unwrap(),
            resident.lookup(word).unwrap()
        );
    }
}

#[test]
fn test_frequency_and_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    assert_eq!(space.frequency("haus").unwrap(), 120);
    assert_eq!(space.frequency("wald").unwrap(), 310);
    assert_eq!(space.frequency("schloss").unwrap(), 0);
}

#[test]
fn test_multi_token_query_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    assert!(space.word_vector("haus garten").unwrap().is_none());
    assert_eq!(space.frequency("haus garten").unwrap(), 0);
}

#[test]
fn test_word_vector_idempotent_and_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    let first = space.word_vector("haus").unwrap().unwrap();
    let second = space.word_vector("haus").unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.nnz(), 4);
    assert_eq!(first.get("garten"), 1.5);
    assert_eq!(first.get("tür\u{F8FF}OBJ"), 2.0);
}

#[test]
fn test_collocations_strip_sum_and_sort() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    let cols = space.collocations("haus").unwrap().unwrap();
    // tür appears twice with different relations: 2.0 + 0.5 summed;
    // sorted by significance descending, no duplicate keys
    assert_eq!(cols[0], ("tür".to_string(), 2.5));
    assert_eq!(cols[1], ("garten".to_string(), 1.5));
    assert_eq!(cols[2], ("42".to_string(), 0.25));
    assert_eq!(cols.len(), 3);

    let mut seen = std::collections::HashSet::new();
    for (word, _) in &cols {
        assert!(seen.insert(word.clone()), "duplicate key {}", word);
    }

    assert!(space.collocations("schloss").unwrap().is_none());
}

#[test]
fn test_similar_words_and_termination() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    let neighbours = space.similar_words("haus").unwrap().unwrap();
    assert_eq!(
        neighbours,
        vec![("gebäude".to_string(), 0.9), ("hütte".to_string(), 0.7)]
    );
    for pair in neighbours.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    assert!(space.similar_words("schloss").unwrap().is_none());
}

#[test]
fn test_col_store_rejects_neighbour_queries() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), false, true);

    assert!(matches!(
        space.similar_words("haus"),
        Err(SpaceError::WrongSpaceType { .. })
    ));
    assert!(matches!(
        space.second_order_similarity("haus", "garten", Measure::Cosine),
        Err(SpaceError::WrongSpaceType { .. })
    ));
}

#[test]
fn test_semantic_similarity_matches_hand_computation() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    // haus and gebäude share "garten" (1.5 * 0.5) and "tür<rel>OBJ" (2.0 * 1.0)
    let dot = 1.5 * 0.5 + 2.0 * 1.0;
    let norm_haus = (2.0f32 * 2.0 + 1.5 * 1.5 + 0.5 * 0.5 + 0.25 * 0.25).sqrt();
    let norm_gebaeude = (0.5f32 * 0.5 + 1.0 * 1.0).sqrt();
    let expected = dot / (norm_haus * norm_gebaeude);

    let sim = space
        .semantic_similarity("haus", "gebäude", Measure::Cosine)
        .unwrap();
    assert!((sim - expected).abs() < 1e-6);
}

#[test]
fn test_semantic_similarity_sentinel_for_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    assert_eq!(
        space.semantic_similarity("haus", "schloss", Measure::Cosine).unwrap(),
        -2.0
    );
    assert_eq!(
        space.semantic_similarity("burg", "schloss", Measure::Kolb).unwrap(),
        -2.0
    );
}

#[test]
fn test_kolb_on_records() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    // hütte: {garten: 2.5, wald: 1.0}; wald: {garten: 0.5}
    // shared mass: garten on both sides -> 2 * (2.5 + 0.5) / (3.5 + 0.5)
    let sim = space
        .semantic_similarity("hütte", "wald", Measure::Kolb)
        .unwrap();
    assert!((sim - 2.0 * 3.0 / 4.0).abs() < 1e-6);
}

#[test]
fn test_second_order_similarity_over_neighbour_lists() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    // haus neighbours: {gebäude: 0.9, hütte: 0.7}
    // gebäude neighbours: {haus: 0.9, hütte: 0.5}
    // shared key "hütte": 0.7 * 0.5
    let expected = (0.7f32 * 0.5)
        / ((0.9f32 * 0.9 + 0.7 * 0.7).sqrt() * (0.9f32 * 0.9 + 0.5 * 0.5).sqrt());
    let sim = space
        .second_order_similarity("haus", "gebäude", Measure::Cosine)
        .unwrap();
    assert!((sim - expected).abs() < 1e-6);
}

#[test]
fn test_vocabulary_iteration_and_random_access() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    let words: Vec<String> = space.vocabulary().map(|w| w.unwrap()).collect();
    assert_eq!(words.len(), 5);
    for word in ["haus", "gebäude", "hütte", "garten", "wald"] {
        assert!(words.iter().any(|w| w == word));
        let id = space.id_of(word).unwrap();
        assert_eq!(space.word_by_id(id).unwrap().as_deref(), Some(word));
    }
}

#[test]
fn test_corrupt_records_rejected_at_open() {
    let dir = tempfile::tempdir().unwrap();
    common::write_house_store(dir.path(), true);

    let records = dir.path().join("records.bin");
    let mut bytes = std::fs::read(&records).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xff;
    std::fs::write(&records, &bytes).unwrap();

    assert!(matches!(
        SparseSpace::open(dir.path(), false),
        Err(SpaceError::CorruptIndex { .. })
    ));
}

#[test]
fn test_missing_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    common::write_house_store(dir.path(), true);
    std::fs::remove_file(dir.path().join("disco.config")).unwrap();

    assert!(matches!(
        SparseSpace::open(dir.path(), false),
        Err(SpaceError::Io(_))
    ));
}

#[test]
fn test_unified_handle_open_detects_sparse() {
    let dir = tempfile::tempdir().unwrap();
    common::write_house_store(dir.path(), true);

    let handle = WordSpace::open(dir.path(), false).unwrap();
    assert!(handle.as_sparse().is_some());
    assert!(!handle.is_resident());
    assert_eq!(handle.number_of_words(), 5);

    let resident = WordSpace::load(dir.path()).unwrap();
    assert!(resident.is_resident());
}

#[test]
fn test_stopwords_exposed() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);

    assert!(space.is_stopword("der"));
    assert!(!space.is_stopword("haus"));
    assert_eq!(space.stopwords().len(), 3);
}
