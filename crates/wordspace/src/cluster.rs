//! Clustering and rank utilities over neighbour sets.
//!
//! Everything here runs `O(V)` or `O(n^2)` store lookups; the rank-product
//! routines iterate the whole vocabulary and should be run against
//! memory-resident spaces (a warning is logged otherwise).

use std::collections::HashSet;

use crate::compose::{self, Composition};
use crate::error::{SpaceError, SpaceResult};
use crate::search;
use crate::space::WordSpace;

/// Filter outliers from a word's neighbour set.
///
/// Takes the top `n` similar words of `word` and keeps only those that
/// also appear in the top-`n` similar list of at least one *other* member
/// of that set. Original order and scores are preserved. `None` when the
/// word is unknown. Rejects COL spaces.
pub fn filter_outliers(
    space: &WordSpace,
    word: &str,
    n: usize,
) -> SpaceResult<Option<Vec<(String, f32)>>> {
    let Some(mut members) = space.similar_words(word)? else {
        return Ok(None);
    };
    members.truncate(n);

    // Top-n neighbour sets of every member, computed once.
    let mut member_neighbours: Vec<HashSet<String>> = Vec::with_capacity(members.len());
    for (member, _) in &members {
        let neighbours = space
            .similar_words(member)?
            .unwrap_or_default()
            .into_iter()
            .take(n)
            .map(|(w, _)| w)
            .collect();
        member_neighbours.push(neighbours);
    }

    let kept = members
        .iter()
        .enumerate()
        .filter(|(i, (candidate, _))| {
            member_neighbours
                .iter()
                .enumerate()
                .any(|(j, neighbours)| j != *i && neighbours.contains(candidate))
        })
        .map(|(_, pair)| pair.clone())
        .collect();
    Ok(Some(kept))
}

/// Grow a word set: sum the input words' vectors and return the nearest
/// words to the combined vector, excluding the inputs, truncated to `n`.
///
/// Uses the measure the space was built with. `None` when the input list
/// is empty or any input word is unknown.
pub fn grow_set(
    space: &WordSpace,
    words: &[&str],
    n: usize,
) -> SpaceResult<Option<Vec<(String, f32)>>> {
    if words.is_empty() {
        return Ok(None);
    }

    let mut vectors = Vec::with_capacity(words.len());
    for word in words {
        let Some(id) = space.id_of(word) else {
            return Ok(None);
        };
        let Some(vector) = space.vector_of_id(id)? else {
            return Ok(None);
        };
        vectors.push(vector);
    }
    let mut iter = vectors.into_iter();
    let Some(mut combined) = iter.next() else {
        return Ok(None);
    };
    for vector in iter {
        combined = compose::compose(Composition::Addition, &combined, &vector)?;
    }

    let inputs: HashSet<&str> = words.iter().copied().collect();
    let neighbours = search::nearest_neighbours(
        space,
        &combined,
        space.similarity_measure(),
        n + words.len(),
    )?;
    let mut grown: Vec<(String, f32)> = neighbours
        .into_iter()
        .filter(|(w, _)| !inputs.contains(w.as_str()))
        .collect();
    grown.truncate(n);
    Ok(Some(grown))
}

/// Rank products over the neighbourhood graph.
///
/// For every vocabulary word `v` not in the input set, multiplies the
/// 1-based ranks at which each input word appears in `v`'s top-`n_sim`
/// neighbour list (inputs not present contribute no factor). Words with a
/// rank product greater than 1 are returned sorted ascending, best (i.e.
/// smallest product) first. Rejects COL spaces.
pub fn highest_ranking_similarity(
    space: &WordSpace,
    inputs: &[&str],
    n_sim: usize,
) -> SpaceResult<Vec<(String, u64)>> {
    space.require_sim("highest_ranking_similarity")?;
    warn_if_not_resident(space, "highest_ranking_similarity");

    let input_set: HashSet<&str> = inputs.iter().copied().collect();
    let mut ranked: Vec<(String, u64)> = Vec::new();

    for id in 0..space.number_of_words() {
        let Some(word) = space.word_by_id(id)? else {
            continue;
        };
        if input_set.contains(word.as_str()) {
            continue;
        }

        let neighbour_words: Vec<String> = {
            let mut out = Vec::new();
            for (nid, _) in space.neighbours_by_id(id)?.into_iter().take(n_sim) {
                if let Some(w) = space.word_by_id(nid as usize)? {
                    out.push(w);
                }
            }
            out
        };

        let product = rank_product(&neighbour_words, inputs);
        if product > 1 {
            ranked.push((word, product));
        }
    }

    ranked.sort_by_key(|(_, product)| *product);
    Ok(ranked)
}

/// Rank products over collocation lists (sparse back-end only).
///
/// Like [`highest_ranking_similarity`], but ranks are positions within each
/// word's top-`n_col` collocations.
pub fn highest_ranking_collocation(
    space: &WordSpace,
    inputs: &[&str],
    n_col: usize,
) -> SpaceResult<Vec<(String, u64)>> {
    let Some(sparse) = space.as_sparse() else {
        return Err(SpaceError::WrongSpaceType {
            operation: "highest_ranking_collocation",
            kind: space.kind(),
        });
    };
    warn_if_not_resident(space, "highest_ranking_collocation");

    let input_set: HashSet<&str> = inputs.iter().copied().collect();
    let mut ranked: Vec<(String, u64)> = Vec::new();

    for id in 0..sparse.len() {
        let Some(record) = sparse.record_by_id(id)? else {
            continue;
        };
        if input_set.contains(record.word.as_str()) {
            continue;
        }

        let collocates: Vec<String> = sparse
            .collocations(&record.word)?
            .unwrap_or_default()
            .into_iter()
            .take(n_col)
            .map(|(w, _)| w)
            .collect();

        let product = rank_product(&collocates, inputs);
        if product > 1 {
            ranked.push((record.word, product));
        }
    }

    ranked.sort_by_key(|(_, product)| *product);
    Ok(ranked)
}

fn rank_product(ranked_words: &[String], inputs: &[&str]) -> u64 {
    let mut product = 1u64;
    for input in inputs {
        if let Some(pos) = ranked_words.iter().position(|w| w == input) {
            product = product.saturating_mul(pos as u64 + 1);
        }
    }
    product
}

fn warn_if_not_resident(space: &WordSpace, operation: &str) {
    if !space.is_resident() {
        log::warn!(
            "{} iterates the whole vocabulary; load the store into memory first",
            operation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_product() {
        let ranked: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        // "a" at rank 1, "c" at rank 3, "x" absent
        assert_eq!(rank_product(&ranked, &["a", "c", "x"]), 3);
        // only rank-1 hit: product stays 1
        assert_eq!(rank_product(&ranked, &["a"]), 1);
        assert_eq!(rank_product(&ranked, &["x"]), 1);
    }
}
