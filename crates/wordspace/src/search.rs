//! Exact and approximate nearest-neighbour search.
//!
//! Two strategies over the same contract:
//!
//! - **Exhaustive scan**: compare the query against every vocabulary
//!   vector. `O(V·D)` on dense stores; exact.
//! - **Graph search**: best-first walk over the stored neighbourhood graph
//!   (SIM spaces only). Samples random start words, then follows stored
//!   neighbours while the similarity to the query improves.
//!
//! The graph walk draws its start set from a caller-supplied RNG, so tests
//! seed it for deterministic traversals.
//!
//! Also here: breadth-first shortest path between two words in the
//! neighbourhood graph.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wordspace_vectors::Measure;

use crate::error::SpaceResult;
use crate::space::{QueryVector, WordSpace};

/// Number of random start words the graph search samples.
pub const INIT_SET_SIZE: usize = 100;

/// Exhaustive nearest-neighbour scan.
///
/// Computes the similarity between the query and every vocabulary entry,
/// keeps the strictly positive ones, and returns them sorted descending,
/// truncated to `max_n`. Entries that fail to decode are skipped and
/// counted in the log.
pub fn nearest_neighbours(
    space: &WordSpace,
    query: &QueryVector,
    measure: Measure,
    max_n: usize,
) -> SpaceResult<Vec<(String, f32)>> {
    let mut scored: Vec<(usize, f32)> = Vec::new();
    let mut skipped = 0u64;

    for id in 0..space.number_of_words() {
        let entry = match space.vector_of_id(id) {
            Ok(Some(vector)) => vector,
            Ok(None) => continue,
            Err(e) => {
                skipped += 1;
                log::warn!("entry {} skipped during scan: {}", id, e);
                continue;
            }
        };
        let sim = match query.similarity(&entry, measure) {
            Ok(sim) => sim,
            Err(e) => {
                skipped += 1;
                log::warn!("entry {} skipped during scan: {}", id, e);
                continue;
            }
        };
        if sim > 0.0 {
            scored.push((id, sim));
        }
    }

    if skipped > 0 {
        log::warn!("nearest-neighbour scan skipped {} entries", skipped);
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(max_n);
    resolve_words(space, scored)
}

/// Best-first nearest-neighbour walk over the stored neighbourhood graph.
///
/// Draws [`INIT_SET_SIZE`] vocabulary ids uniformly from `rng` and starts
/// at the sampled word most similar to the query. Each step examines the
/// current word's stored neighbours (up to the store's neighbour width) and
/// moves to the best one as long as it improves on the current similarity;
/// every improvement is recorded. The recorded words are returned sorted
/// descending, truncated to `n_max`.
///
/// With a fixed-seed RNG the traversal is deterministic. Rejects COL
/// spaces.
pub fn graph_search<R: Rng>(
    space: &WordSpace,
    query: &QueryVector,
    measure: Measure,
    n_max: usize,
    rng: &mut R,
) -> SpaceResult<Vec<(String, f32)>> {
    space.require_sim("graph_search")?;
    let v = space.number_of_words();
    if v == 0 {
        return Ok(Vec::new());
    }

    let mut current: Option<(usize, f32)> = None;
    for _ in 0..INIT_SET_SIZE {
        let id = rng.gen_range(0..v);
        let Some(sim) = similarity_to_entry(space, query, id, measure)? else {
            continue;
        };
        if current.map(|(_, s)| sim > s).unwrap_or(true) {
            current = Some((id, sim));
        }
    }
    let Some((mut current_id, mut current_sim)) = current else {
        return Ok(Vec::new());
    };

    let mut found: Vec<(usize, f32)> = Vec::new();
    loop {
        let neighbours = space.neighbours_by_id(current_id)?;
        let mut step_best: Option<(usize, f32)> = None;
        for (nid, _) in neighbours {
            let Some(sim) = similarity_to_entry(space, query, nid as usize, measure)? else {
                continue;
            };
            if step_best.map(|(_, s)| sim > s).unwrap_or(true) {
                step_best = Some((nid as usize, sim));
            }
        }
        match step_best {
            Some((next_id, next_sim)) if next_sim > current_sim => {
                found.push((next_id, next_sim));
                current_id = next_id;
                current_sim = next_sim;
            }
            _ => break,
        }
    }

    found.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    found.truncate(n_max);
    resolve_words(space, found)
}

/// [`graph_search`] with a seeded RNG; same seed, same traversal.
pub fn graph_search_seeded(
    space: &WordSpace,
    query: &QueryVector,
    measure: Measure,
    n_max: usize,
    seed: u64,
) -> SpaceResult<Vec<(String, f32)>> {
    let mut rng = StdRng::seed_from_u64(seed);
    graph_search(space, query, measure, n_max, &mut rng)
}

/// Breadth-first shortest path between two entries of the neighbourhood
/// graph.
///
/// Returns the path in reverse order (target first, source last), or `None`
/// when the target is unreachable. Rejects COL spaces.
pub fn shortest_path(space: &WordSpace, from: usize, to: usize) -> SpaceResult<Option<Vec<u32>>> {
    space.require_sim("shortest_path")?;
    let v = space.number_of_words();
    if from >= v || to >= v {
        return Ok(None);
    }
    if from == to {
        return Ok(Some(vec![to as u32]));
    }

    const UNVISITED: u32 = u32::MAX;
    let mut predecessor = vec![UNVISITED; v];
    let mut queue = VecDeque::new();
    predecessor[from] = from as u32;
    queue.push_back(from);

    while let Some(id) = queue.pop_front() {
        for (nid, _) in space.neighbours_by_id(id)? {
            let nid = nid as usize;
            if predecessor[nid] != UNVISITED {
                continue;
            }
            predecessor[nid] = id as u32;
            if nid == to {
                let mut path = Vec::new();
                let mut step = to as u32;
                while step != from as u32 {
                    path.push(step);
                    step = predecessor[step as usize];
                }
                path.push(from as u32);
                return Ok(Some(path));
            }
            queue.push_back(nid);
        }
    }
    Ok(None)
}

fn similarity_to_entry(
    space: &WordSpace,
    query: &QueryVector,
    id: usize,
    measure: Measure,
) -> SpaceResult<Option<f32>> {
    match space.vector_of_id(id) {
        Ok(Some(entry)) => Ok(Some(query.similarity(&entry, measure)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            log::warn!("entry {} skipped during graph search: {}", id, e);
            Ok(None)
        }
    }
}

fn resolve_words(
    space: &WordSpace,
    scored: Vec<(usize, f32)>,
) -> SpaceResult<Vec<(String, f32)>> {
    let mut out = Vec::with_capacity(scored.len());
    for (id, sim) in scored {
        if let Some(word) = space.word_by_id(id)? {
            out.push((word, sim));
        }
    }
    Ok(out)
}
