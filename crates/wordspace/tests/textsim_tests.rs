//! Integration tests for alignment-weighted short-text similarity.

mod common;

use wordspace::prelude::*;
use wordspace::textsim;

use wordspace::dense::{DenseSpace, DenseSpaceBuilder};

/// A tiny animal space with distinct frequencies so the icf weighting has
/// something to work with.
fn animal_space() -> DenseSpace {
    let mut config = common::col_config();
    config.stopwords = vec!["the".to_string(), "a".to_string(), "of".to_string()];
    config.min_freq = 10;
    config.max_freq = 500;
    config.token_count = 10_000;
    let mut builder = DenseSpaceBuilder::new(config);
    builder.add_word("dog", 500, vec![1.0, 0.1, 0.0]);
    builder.add_word("hound", 10, vec![0.9, 0.2, 0.0]);
    builder.add_word("cat", 300, vec![0.2, 1.0, 0.0]);
    builder.add_word("barks", 50, vec![0.5, 0.0, 0.5]);
    builder.build().unwrap()
}

#[test]
fn test_empty_sides_yield_zero() {
    let space = WordSpace::Dense(animal_space());
    assert_eq!(
        textsim::directed_similarity(&space, "", "dog barks", Measure::Cosine).unwrap(),
        0.0
    );
    assert_eq!(
        textsim::directed_similarity(&space, "dog barks", "", Measure::Cosine).unwrap(),
        0.0
    );
}

#[test]
fn test_all_stopword_text_yields_zero() {
    let space = WordSpace::Dense(animal_space());
    assert_eq!(
        textsim::directed_similarity(&space, "the a of", "dog", Measure::Cosine).unwrap(),
        0.0
    );
    assert_eq!(
        textsim::directed_similarity(&space, "dog", "the of the", Measure::Cosine).unwrap(),
        0.0
    );
}

#[test]
fn test_identical_text_scores_one() {
    let space = WordSpace::Dense(animal_space());
    let sim = textsim::directed_similarity(&space, "dog barks", "dog barks", Measure::Cosine)
        .unwrap();
    assert!((sim - 1.0).abs() < 1e-6);
}

#[test]
fn test_case_insensitive_identity() {
    let space = WordSpace::Dense(animal_space());
    let sim = textsim::directed_similarity(&space, "Hound", "hound", Measure::Cosine).unwrap();
    assert!((sim - 1.0).abs() < 1e-6);
}

#[test]
fn test_aligned_synonym_beats_unrelated() {
    let space = WordSpace::Dense(animal_space());
    let close = textsim::directed_similarity(&space, "dog", "hound", Measure::Cosine).unwrap();
    let far = textsim::directed_similarity(&space, "cat", "hound", Measure::Cosine).unwrap();
    assert!(close > far);
    // remapped cosine stays within [0, 1]
    assert!((0.0..=1.0).contains(&close));
}

#[test]
fn test_symmetric_is_mean_of_directed() {
    let space = WordSpace::Dense(animal_space());
    let forward =
        textsim::directed_similarity(&space, "dog barks", "the hound", Measure::Cosine).unwrap();
    let backward =
        textsim::directed_similarity(&space, "the hound", "dog barks", Measure::Cosine).unwrap();
    let symmetric =
        textsim::text_similarity(&space, "dog barks", "the hound", Measure::Cosine).unwrap();
    assert!((symmetric - (forward + backward) / 2.0).abs() < 1e-6);
}

#[test]
fn test_unalignable_token_pulls_score_down() {
    let space = WordSpace::Dense(animal_space());
    // "zebra" is out of vocabulary: it cannot align and contributes -1
    let with_oov =
        textsim::directed_similarity(&space, "dog", "dog zebra", Measure::Cosine).unwrap();
    let without =
        textsim::directed_similarity(&space, "dog", "dog", Measure::Cosine).unwrap();
    assert!(with_oov < without);
}

#[test]
fn test_works_on_sparse_store_with_kolb() {
    let dir = tempfile::tempdir().unwrap();
    let space = common::open_house_space(dir.path(), true, true);
    let sim =
        textsim::text_similarity(&space, "haus garten", "hütte garten", Measure::Kolb).unwrap();
    assert!(sim > 0.0);
}
