//! Sparse vector representation and operations.
//!
//! Sparse vectors use parallel arrays of feature keys and values, where:
//! - Keys are sorted and unique (feature strings: a word, a
//!   word-plus-relation pair, or a stringified integer id)
//! - Values are feature weights (significance scores)
//!
//! Features absent from a vector read as zero. Binary operations merge the
//! two key sequences with a two-pointer walk, so they run in
//! O(|a| + |b|) regardless of the feature space size.

use std::cmp::Ordering;

/// A sparse vector as parallel arrays of sorted, unique string keys and
/// their values.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseVector {
    pub keys: Vec<String>,
    pub values: Vec<f32>,
}

impl SparseVector {
    /// Create a new SparseVector from sorted keys and values.
    /// Returns None if lengths don't match or keys are not sorted/unique.
    pub fn new(keys: Vec<String>, values: Vec<f32>) -> Option<Self> {
        if keys.len() != values.len() {
            return None;
        }

        // Verify sorted and unique
        for i in 1..keys.len() {
            if keys[i] <= keys[i - 1] {
                return None;
            }
        }

        Some(Self { keys, values })
    }

    /// Create a new SparseVector without validation.
    ///
    /// The caller must ensure `keys.len() == values.len()` and that `keys`
    /// are sorted and unique; operations on a malformed vector produce
    /// meaningless results.
    pub fn new_unchecked(keys: Vec<String>, values: Vec<f32>) -> Self {
        Self { keys, values }
    }

    /// An empty sparse vector (the zero vector).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a sparse vector from arbitrary `(key, value)` pairs.
    ///
    /// Pairs are sorted by key; values of duplicate keys are summed.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f32)>,
    {
        let mut pairs: Vec<(String, f32)> = entries.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut keys = Vec::with_capacity(pairs.len());
        let mut values: Vec<f32> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            if keys.last() == Some(&key) {
                *values.last_mut().unwrap() += value;
            } else {
                keys.push(key);
                values.push(value);
            }
        }
        Self { keys, values }
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.keys.len()
    }

    /// Whether the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value stored for `key`, or 0.0 if the feature is absent.
    pub fn get(&self, key: &str) -> f32 {
        match self.keys.binary_search_by(|k| k.as_str().cmp(key)) {
            Ok(i) => self.values[i],
            Err(_) => 0.0,
        }
    }

    /// Iterate over `(key, value)` entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.keys
            .iter()
            .map(|k| k.as_str())
            .zip(self.values.iter().copied())
    }

    /// Sum of all values (used by the Dice-style measure denominator).
    pub fn value_sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// L2 norm of the sparse vector.
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Multiply every value by `s`, in place.
    ///
    /// Destructive: do not apply to vectors shared with a store handle
    /// without cloning first.
    pub fn scale_in_place(&mut self, s: f32) {
        for v in self.values.iter_mut() {
            *v *= s;
        }
    }

    /// Normalize to unit L2 length, in place. A zero vector is left unchanged.
    ///
    /// Destructive: do not apply to vectors shared with a store handle
    /// without cloning first.
    pub fn normalize_in_place(&mut self) {
        let norm = self.norm();
        if norm < 1e-9 {
            return;
        }
        for v in self.values.iter_mut() {
            *v /= norm;
        }
    }
}

/// Merge two sparse vectors with per-side combination rules.
///
/// `both` combines values present on both sides; `left_only` and
/// `right_only` map values exclusive to one side. A mapping returning
/// `None` drops the entry from the result.
fn merge<FB, FL, FR>(
    a: &SparseVector,
    b: &SparseVector,
    mut both: FB,
    mut left_only: FL,
    mut right_only: FR,
) -> SparseVector
where
    FB: FnMut(f32, f32) -> Option<f32>,
    FL: FnMut(f32) -> Option<f32>,
    FR: FnMut(f32) -> Option<f32>,
{
    let mut keys = Vec::with_capacity(a.nnz() + b.nnz());
    let mut values = Vec::with_capacity(a.nnz() + b.nnz());
    let mut i = 0;
    let mut j = 0;

    while i < a.keys.len() && j < b.keys.len() {
        match a.keys[i].cmp(&b.keys[j]) {
            Ordering::Less => {
                if let Some(v) = left_only(a.values[i]) {
                    keys.push(a.keys[i].clone());
                    values.push(v);
                }
                i += 1;
            }
            Ordering::Greater => {
                if let Some(v) = right_only(b.values[j]) {
                    keys.push(b.keys[j].clone());
                    values.push(v);
                }
                j += 1;
            }
            Ordering::Equal => {
                if let Some(v) = both(a.values[i], b.values[j]) {
                    keys.push(a.keys[i].clone());
                    values.push(v);
                }
                i += 1;
                j += 1;
            }
        }
    }
    while i < a.keys.len() {
        if let Some(v) = left_only(a.values[i]) {
            keys.push(a.keys[i].clone());
            values.push(v);
        }
        i += 1;
    }
    while j < b.keys.len() {
        if let Some(v) = right_only(b.values[j]) {
            keys.push(b.keys[j].clone());
            values.push(v);
        }
        j += 1;
    }

    SparseVector { keys, values }
}

/// Sum of two sparse vectors (union of keys; a missing side reads as zero).
pub fn add(a: &SparseVector, b: &SparseVector) -> SparseVector {
    merge(a, b, |x, y| Some(x + y), Some, Some)
}

/// Difference `a - b` (keys exclusive to `b` are negated).
pub fn sub(a: &SparseVector, b: &SparseVector) -> SparseVector {
    merge(a, b, |x, y| Some(x - y), Some, |y| Some(-y))
}

/// Element-wise product (intersection of keys).
pub fn mul(a: &SparseVector, b: &SparseVector) -> SparseVector {
    merge(a, b, |x, y| Some(x * y), |_| None, |_| None)
}

/// Per-key extrema: picks the side with the larger absolute value, ties
/// keeping the first operand. Keys exclusive to one side keep their value.
pub fn extrema(a: &SparseVector, b: &SparseVector) -> SparseVector {
    merge(
        a,
        b,
        |x, y| Some(if x.abs() >= y.abs() { x } else { y }),
        Some,
        Some,
    )
}

/// Dot product of two sparse vectors (intersection of keys).
///
/// Uses a two-pointer merge: O(|a| + |b|).
pub fn dot(a: &SparseVector, b: &SparseVector) -> f32 {
    let mut i = 0;
    let mut j = 0;
    let mut result = 0.0;

    while i < a.keys.len() && j < b.keys.len() {
        match a.keys[i].cmp(&b.keys[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                result += a.values[i] * b.values[j];
                i += 1;
                j += 1;
            }
        }
    }

    result
}

/// Arithmetic mean of a list of sparse vectors: the key-wise sum divided by
/// the number of vectors. An empty list yields the zero vector.
pub fn average(vectors: &[SparseVector]) -> SparseVector {
    if vectors.is_empty() {
        return SparseVector::empty();
    }
    let mut sum = vectors[0].clone();
    for v in &vectors[1..] {
        sum = add(&sum, v);
    }
    sum.scale_in_place(1.0 / vectors.len() as f32);
    sum
}
