//! Alignment-weighted short-text similarity.
//!
//! Directed similarity of a hypothesis against a text: each hypothesis
//! token is greedily aligned to the most similar remaining text token, and
//! the aligned similarities are averaged under inverse-corpus-frequency
//! weights, so rare words count more than frequent ones. Stopwords from the
//! word space's list are dropped before alignment.

use wordspace_vectors::Measure;

use crate::error::SpaceResult;
use crate::space::WordSpace;

/// Directed similarity of `hypothesis` against `text`.
///
/// Tokenizes both sides on whitespace, drops stopwords, then for each
/// hypothesis token greedily picks the not-yet-aligned text token with the
/// highest word similarity (an unalignable token contributes -1). Each
/// contribution is weighted by `1 - (icf - icf_min) / (icf_max - icf_min)`
/// where `icf(x) = freq(x) / tokenCount`. Returns 0.0 when either side is
/// empty after stopword removal.
pub fn directed_similarity(
    space: &WordSpace,
    text: &str,
    hypothesis: &str,
    measure: Measure,
) -> SpaceResult<f32> {
    let mut text_tokens = content_tokens(space, text);
    let hypothesis_tokens = content_tokens(space, hypothesis);
    if text_tokens.is_empty() || hypothesis_tokens.is_empty() {
        return Ok(0.0);
    }

    let token_count = space.token_count().max(1) as f64;
    let icf_min = space.min_freq() as f64 / token_count;
    let icf_max = space.max_freq() as f64 / token_count;
    let icf_span = icf_max - icf_min;

    let mut weighted_sum = 0.0f64;
    let mut weight_sum = 0.0f64;

    for h in &hypothesis_tokens {
        let mut best = -1.0f64;
        let mut best_index = None;
        for (k, t) in text_tokens.iter().enumerate() {
            let sim = word_similarity(space, h, t, measure)? as f64;
            if sim > best {
                best = sim;
                best_index = Some(k);
            }
        }
        // A chosen text token is consumed; further hypothesis tokens
        // cannot align to it again.
        if best > -1.0 {
            if let Some(k) = best_index {
                text_tokens.remove(k);
            }
        }

        let icf = space.frequency(h)? as f64 / token_count;
        let weight = if icf_span == 0.0 {
            1.0
        } else {
            1.0 - (icf - icf_min) / icf_span
        };

        weighted_sum += best * weight;
        weight_sum += weight;
    }

    if weight_sum == 0.0 {
        return Ok(0.0);
    }
    Ok((weighted_sum / weight_sum) as f32)
}

/// Symmetric short-text similarity: the arithmetic mean of the two
/// directed similarities.
pub fn text_similarity(
    space: &WordSpace,
    text1: &str,
    text2: &str,
    measure: Measure,
) -> SpaceResult<f32> {
    let forward = directed_similarity(space, text1, text2, measure)?;
    let backward = directed_similarity(space, text2, text1, measure)?;
    Ok((forward + backward) / 2.0)
}

/// Word-level similarity used by the alignment.
///
/// Identical strings (case-insensitive) score 1.0. Otherwise the measure
/// decides, with cosine linearly remapped from [-1, 1] to [0, 1]; the
/// unknown-word sentinel stays below every valid score so it never wins an
/// alignment.
fn word_similarity(space: &WordSpace, a: &str, b: &str, measure: Measure) -> SpaceResult<f32> {
    if a.to_lowercase() == b.to_lowercase() {
        return Ok(1.0);
    }
    let sim = space.semantic_similarity(a, b, measure)?;
    if sim == WordSpace::unknown_similarity() {
        return Ok(sim);
    }
    Ok(match measure {
        Measure::Cosine => (sim + 1.0) / 2.0,
        Measure::Kolb => sim,
    })
}

fn content_tokens<'a>(space: &WordSpace, text: &'a str) -> Vec<&'a str> {
    text.split_whitespace()
        .filter(|token| !space.is_stopword(token))
        .collect()
}
