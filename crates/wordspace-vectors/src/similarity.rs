//! Similarity measures over dense and sparse vectors.
//!
//! Two measures are supported:
//! - **Cosine**: `dot(u,v) / (|u| * |v|)`, range [-1, 1].
//! - **Kolb** (Dice-style): `2 * sum of co-occurring weights / sum of all
//!   weights`; 0 when the supports are disjoint, growing with the shared
//!   mass. Only meaningful for vectors with non-negative components;
//!   feeding it cosine-space vectors with negative entries is the caller's
//!   mistake and the result is unspecified.
//!
//! Dense entry points shape-check their inputs; sparse entry points treat
//! missing features as zero.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::str::FromStr;

use crate::sparse::{self, SparseVector};
use crate::{dense, VectorError};

/// A similarity measure, selectable at query time and recorded in the
/// word-space config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Measure {
    /// Cosine similarity, range [-1, 1].
    Cosine,
    /// Dice-style similarity over positive weights; 0 for disjoint
    /// supports.
    Kolb,
}

impl Default for Measure {
    fn default() -> Self {
        Measure::Cosine
    }
}

impl Measure {
    /// Apply the measure to two dense vectors of equal length.
    pub fn dense(&self, u: &[f32], v: &[f32]) -> Result<f32, VectorError> {
        match self {
            Measure::Cosine => cosine(u, v),
            Measure::Kolb => kolb(u, v),
        }
    }

    /// Apply the measure to two sparse vectors.
    pub fn sparse(&self, a: &SparseVector, b: &SparseVector) -> f32 {
        match self {
            Measure::Cosine => cosine_sparse(a, b),
            Measure::Kolb => kolb_sparse(a, b),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Cosine => write!(f, "COSINE"),
            Measure::Kolb => write!(f, "KOLB"),
        }
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COSINE" => Ok(Measure::Cosine),
            "KOLB" => Ok(Measure::Kolb),
            other => Err(format!("unknown similarity measure: {}", other)),
        }
    }
}

/// Cosine similarity of two dense vectors.
///
/// Returns 0.0 when either vector has zero norm.
pub fn cosine(u: &[f32], v: &[f32]) -> Result<f32, VectorError> {
    let dot = dense::dot(u, v)?;
    let denom = (dense::dot(u, u)? * dense::dot(v, v)?).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / denom)
}

/// Dice-style similarity of two dense vectors:
/// `2 * sum[u_i + v_i where u_i > 0 and v_i > 0] / sum(u_i + v_i)`.
pub fn kolb(u: &[f32], v: &[f32]) -> Result<f32, VectorError> {
    if u.len() != v.len() {
        return Err(VectorError::DimensionMismatch {
            left: u.len(),
            right: v.len(),
        });
    }
    let mut shared = 0.0;
    let mut total = 0.0;
    for (&a, &b) in u.iter().zip(v.iter()) {
        if a > 0.0 && b > 0.0 {
            shared += a + b;
        }
        total += a + b;
    }
    if total == 0.0 {
        return Ok(0.0);
    }
    Ok(2.0 * shared / total)
}

/// Cosine similarity of two sparse vectors. Missing features read as zero.
///
/// Returns 0.0 when either vector has zero norm.
pub fn cosine_sparse(a: &SparseVector, b: &SparseVector) -> f32 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    sparse::dot(a, b) / denom
}

/// Dice-style similarity of two sparse vectors:
/// `2 * sum over shared keys of (a_k + b_k) / (sum(a) + sum(b))`.
pub fn kolb_sparse(a: &SparseVector, b: &SparseVector) -> f32 {
    let mut shared = 0.0;
    let mut i = 0;
    let mut j = 0;
    while i < a.keys.len() && j < b.keys.len() {
        match a.keys[i].cmp(&b.keys[j]) {
            CmpOrdering::Less => i += 1,
            CmpOrdering::Greater => j += 1,
            CmpOrdering::Equal => {
                shared += a.values[i] + b.values[j];
                i += 1;
                j += 1;
            }
        }
    }
    let total = a.value_sum() + b.value_sum();
    if total == 0.0 {
        return 0.0;
    }
    2.0 * shared / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(entries: &[(&str, f32)]) -> SparseVector {
        SparseVector::from_entries(entries.iter().map(|(k, v)| (k.to_string(), *v)))
    }

    #[test]
    fn test_cosine_identical() {
        let u = vec![1.0, 2.0, 3.0];
        assert!((cosine(&u, &u).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let u = vec![1.0, 0.0];
        let v = vec![0.0, 1.0];
        assert!(cosine(&u, &v).unwrap().abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm() {
        let u = vec![0.0, 0.0];
        let v = vec![1.0, 2.0];
        assert_eq!(cosine(&u, &v).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_shape_error() {
        assert!(cosine(&[1.0], &[1.0, 2.0]).is_err());
        assert!(kolb(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_kolb_dense() {
        // shared mass at index 0 only: 2*(1+2) / (1+2+3+0) = 1.0
        let u = vec![1.0, 3.0];
        let v = vec![2.0, 0.0];
        assert!((kolb(&u, &v).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kolb_full_overlap() {
        // every coordinate shared: numerator equals twice the denominator
        let u = vec![1.0, 3.0];
        let v = vec![2.0, 6.0];
        assert!((kolb(&u, &v).unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_kolb_sparse_matches_dense_layout() {
        let a = sv(&[("w1", 1.0), ("w2", 3.0)]);
        let b = sv(&[("w1", 2.0)]);
        assert!((kolb_sparse(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_kolb_sparse_disjoint() {
        let a = sv(&[("x", 1.0)]);
        let b = sv(&[("y", 1.0)]);
        assert_eq!(kolb_sparse(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_sparse_symmetry() {
        let a = sv(&[("x", 1.0), ("y", 2.0)]);
        let b = sv(&[("y", 3.0), ("z", 1.0)]);
        let ab = cosine_sparse(&a, &b);
        let ba = cosine_sparse(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab <= 1.0 + 1e-6);
    }

    #[test]
    fn test_measure_parse_roundtrip() {
        assert_eq!("COSINE".parse::<Measure>().unwrap(), Measure::Cosine);
        assert_eq!("KOLB".parse::<Measure>().unwrap(), Measure::Kolb);
        assert_eq!(Measure::Kolb.to_string(), "KOLB");
        assert!("dice".parse::<Measure>().is_err());
    }
}
