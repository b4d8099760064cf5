//! Compositional operators over word vectors.
//!
//! A [`Composition`] turns two vectors into one; list composition folds a
//! sequence of word vectors left-to-right; on top of that sit phrase
//! similarity and analogy solving. All operators work on either back-end's
//! representation through [`QueryVector`].

use rand::Rng;

use wordspace_vectors::sparse::{self, SparseVector};
use wordspace_vectors::{dense, Measure, VectorError};

use crate::error::SpaceResult;
use crate::search;
use crate::space::{QueryVector, WordSpace};

/// Number of ranked candidates an analogy query returns.
pub const ANALOGY_RESULTS: usize = 12;

const COMBINED_DEFAULTS: (f32, f32, f32) = (0.95, 0.0, 0.05);
const DILATION_DEFAULT_LAMBDA: f32 = 2.0;

/// A compositional operator over two vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Composition {
    /// `u + v`
    Addition,
    /// `u - v`
    Subtraction,
    /// `u ⊙ v` (element-wise)
    Multiplication,
    /// Per-coordinate pick of the operand with the larger absolute value.
    Extrema,
    /// `a·u + b·v + c·(u ⊙ v)`
    Combined { a: f32, b: f32, c: f32 },
    /// `(u·u)·v + (λ-1)·(u·v)·u`
    Dilation { lambda: f32 },
}

impl Composition {
    /// The combined operator. When any coefficient is unset, the default
    /// triple `(0.95, 0, 0.05)` is used.
    pub fn combined(a: Option<f32>, b: Option<f32>, c: Option<f32>) -> Composition {
        match (a, b, c) {
            (Some(a), Some(b), Some(c)) => Composition::Combined { a, b, c },
            _ => {
                let (a, b, c) = COMBINED_DEFAULTS;
                Composition::Combined { a, b, c }
            }
        }
    }

    /// The dilation operator; `lambda` defaults to 2.0.
    pub fn dilation(lambda: Option<f32>) -> Composition {
        Composition::Dilation {
            lambda: lambda.unwrap_or(DILATION_DEFAULT_LAMBDA),
        }
    }
}

/// Apply a compositional operator to two dense vectors.
pub fn compose_dense(op: Composition, u: &[f32], v: &[f32]) -> Result<Vec<f32>, VectorError> {
    match op {
        Composition::Addition => dense::add(u, v),
        Composition::Subtraction => dense::sub(u, v),
        Composition::Multiplication => dense::mul(u, v),
        Composition::Extrema => dense::extrema(u, v),
        Composition::Combined { a, b, c } => {
            let mut out = dense::add(&dense::scale(u, a), &dense::scale(v, b))?;
            let prod = dense::mul(u, v)?;
            for (o, p) in out.iter_mut().zip(prod.iter()) {
                *o += c * p;
            }
            Ok(out)
        }
        Composition::Dilation { lambda } => {
            let uu = dense::dot(u, u)?;
            let uv = dense::dot(u, v)?;
            dense::add(&dense::scale(v, uu), &dense::scale(u, (lambda - 1.0) * uv))
        }
    }
}

/// Apply a compositional operator to two sparse vectors.
pub fn compose_sparse(op: Composition, u: &SparseVector, v: &SparseVector) -> SparseVector {
    match op {
        Composition::Addition => sparse::add(u, v),
        Composition::Subtraction => sparse::sub(u, v),
        Composition::Multiplication => sparse::mul(u, v),
        Composition::Extrema => sparse::extrema(u, v),
        Composition::Combined { a, b, c } => {
            let mut ua = u.clone();
            ua.scale_in_place(a);
            let mut vb = v.clone();
            vb.scale_in_place(b);
            let mut prod = sparse::mul(u, v);
            prod.scale_in_place(c);
            sparse::add(&sparse::add(&ua, &vb), &prod)
        }
        Composition::Dilation { lambda } => {
            let uu = sparse::dot(u, u);
            let uv = sparse::dot(u, v);
            let mut left = v.clone();
            left.scale_in_place(uu);
            let mut right = u.clone();
            right.scale_in_place((lambda - 1.0) * uv);
            sparse::add(&left, &right)
        }
    }
}

/// Apply a compositional operator to two vectors of the same
/// representation.
pub fn compose(op: Composition, u: &QueryVector, v: &QueryVector) -> SpaceResult<QueryVector> {
    match (u, v) {
        (QueryVector::Dense(u), QueryVector::Dense(v)) => {
            Ok(QueryVector::Dense(compose_dense(op, u, v)?))
        }
        (QueryVector::Sparse(u), QueryVector::Sparse(v)) => {
            Ok(QueryVector::Sparse(compose_sparse(op, u, v)))
        }
        _ => Err(crate::error::SpaceError::Parse(
            "cannot compose dense and sparse vector representations".to_string(),
        )),
    }
}

/// Fold the vectors of a word list with the chosen operator.
///
/// Requires at least two words; returns `None` when the list is shorter or
/// either of the first two words has no vector. Later words without a
/// vector are skipped.
pub fn compose_words(
    space: &WordSpace,
    words: &[&str],
    op: Composition,
) -> SpaceResult<Option<QueryVector>> {
    if words.len() < 2 {
        return Ok(None);
    }
    let (Some(first), Some(second)) = (space.vector_of(words[0])?, space.vector_of(words[1])?)
    else {
        return Ok(None);
    };
    let mut acc = compose(op, &first, &second)?;
    for word in &words[2..] {
        if let Some(vector) = space.vector_of(word)? {
            acc = compose(op, &acc, &vector)?;
        }
    }
    Ok(Some(acc))
}

/// Vector rejection of `a` on `b` for dense vectors:
/// `a - b * (a·b / b·b)`. Strips the direction of `b` out of `a`; when `b`
/// is the zero vector, `a` is returned unchanged.
pub fn vector_rejection_dense(a: &[f32], b: &[f32]) -> Result<Vec<f32>, VectorError> {
    let bb = dense::dot(b, b)?;
    if bb == 0.0 {
        return Ok(a.to_vec());
    }
    let factor = dense::dot(a, b)? / bb;
    dense::sub(a, &dense::scale(b, factor))
}

/// Vector rejection of `a` on `b` for sparse vectors.
pub fn vector_rejection_sparse(a: &SparseVector, b: &SparseVector) -> SparseVector {
    let bb = sparse::dot(b, b);
    if bb == 0.0 {
        return a.clone();
    }
    let factor = sparse::dot(a, b) / bb;
    let mut scaled = b.clone();
    scaled.scale_in_place(factor);
    sparse::sub(a, &scaled)
}

/// Compositional similarity of two short texts: tokenize on whitespace,
/// fold each side's word vectors with `op`, then compare the folds under
/// `measure`. `None` when either side cannot be composed.
pub fn text_comparison(
    space: &WordSpace,
    text1: &str,
    text2: &str,
    op: Composition,
    measure: Measure,
) -> SpaceResult<Option<f32>> {
    let words1: Vec<&str> = text1.split_whitespace().collect();
    let words2: Vec<&str> = text2.split_whitespace().collect();
    let (Some(u), Some(v)) = (
        compose_words(space, &words1, op)?,
        compose_words(space, &words2, op)?,
    ) else {
        return Ok(None);
    };
    Ok(Some(u.similarity(&v, measure)?))
}

/// Vector of a word that must be in the vocabulary; no subword synthesis.
fn known_vector(space: &WordSpace, word: &str) -> SpaceResult<Option<QueryVector>> {
    match space.id_of(word) {
        Some(id) => space.vector_of_id(id),
        None => Ok(None),
    }
}

fn analogy_target(
    space: &WordSpace,
    b1: &str,
    a2: &str,
    b2: &str,
) -> SpaceResult<Option<QueryVector>> {
    let (Some(vb1), Some(va2), Some(vb2)) = (
        known_vector(space, b1)?,
        known_vector(space, a2)?,
        known_vector(space, b2)?,
    ) else {
        return Ok(None);
    };
    let offset = compose(Composition::Subtraction, &va2, &vb2)?;
    Ok(Some(compose(Composition::Addition, &vb1, &offset)?))
}

/// Solve the proportional analogy `a1 : b1 = a2 : b2` for `a1`.
///
/// Computes the offset `a2 - b2`, adds it to `b1` and returns the nearest
/// neighbours of the result by exhaustive cosine scan, up to
/// [`ANALOGY_RESULTS`] candidates. `None` when any of the three words is
/// out of vocabulary.
pub fn solve_analogy(
    space: &WordSpace,
    b1: &str,
    a2: &str,
    b2: &str,
) -> SpaceResult<Option<Vec<(String, f32)>>> {
    let Some(target) = analogy_target(space, b1, a2, b2)? else {
        return Ok(None);
    };
    search::nearest_neighbours(space, &target, Measure::Cosine, ANALOGY_RESULTS).map(Some)
}

/// Like [`solve_analogy`], but ranks candidates with the graph-based
/// nearest-neighbour search instead of the exhaustive scan. SIM spaces
/// only.
pub fn solve_analogy_approx<R: Rng>(
    space: &WordSpace,
    b1: &str,
    a2: &str,
    b2: &str,
    rng: &mut R,
) -> SpaceResult<Option<Vec<(String, f32)>>> {
    let Some(target) = analogy_target(space, b1, a2, b2)? else {
        return Ok(None);
    };
    search::graph_search(space, &target, Measure::Cosine, ANALOGY_RESULTS, rng).map(Some)
}

/// Analogy with an averaged offset: the mean of `a_i - b_i` over all
/// supplied pairs is added to `b1`. `None` when `b1`, any pair member, or
/// the pair list itself is missing.
pub fn solve_analogy_average_offset(
    space: &WordSpace,
    pairs: &[(&str, &str)],
    b1: &str,
) -> SpaceResult<Option<Vec<(String, f32)>>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let Some(vb1) = known_vector(space, b1)? else {
        return Ok(None);
    };

    let mut offsets = Vec::with_capacity(pairs.len());
    for (a, b) in pairs {
        let (Some(va), Some(vb)) = (known_vector(space, a)?, known_vector(space, b)?) else {
            return Ok(None);
        };
        offsets.push(compose(Composition::Subtraction, &va, &vb)?);
    }

    let offset = average_queries(&offsets)?;
    let target = compose(Composition::Addition, &vb1, &offset)?;
    search::nearest_neighbours(space, &target, Measure::Cosine, ANALOGY_RESULTS).map(Some)
}

fn average_queries(vectors: &[QueryVector]) -> SpaceResult<QueryVector> {
    match vectors.first() {
        Some(QueryVector::Dense(_)) => {
            let rows: Vec<Vec<f32>> = vectors
                .iter()
                .filter_map(|v| match v {
                    QueryVector::Dense(row) => Some(row.clone()),
                    QueryVector::Sparse(_) => None,
                })
                .collect();
            Ok(QueryVector::Dense(dense::average(&rows)?))
        }
        Some(QueryVector::Sparse(_)) => {
            let rows: Vec<SparseVector> = vectors
                .iter()
                .filter_map(|v| match v {
                    QueryVector::Sparse(s) => Some(s.clone()),
                    QueryVector::Dense(_) => None,
                })
                .collect();
            Ok(QueryVector::Sparse(sparse::average(&rows)))
        }
        None => Err(VectorError::Empty.into()),
    }
}
