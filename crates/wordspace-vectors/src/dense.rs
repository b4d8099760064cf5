//! Dense vector algebra.
//!
//! All operations work on `&[f32]` slices and allocate fresh result vectors;
//! binary operations require both operands to have the same length and fail
//! with [`VectorError::DimensionMismatch`] otherwise.

use crate::VectorError;

fn check_dims(left: &[f32], right: &[f32]) -> Result<(), VectorError> {
    if left.len() != right.len() {
        return Err(VectorError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}

/// Element-wise sum of two dense vectors.
pub fn add(u: &[f32], v: &[f32]) -> Result<Vec<f32>, VectorError> {
    check_dims(u, v)?;
    Ok(u.iter().zip(v.iter()).map(|(a, b)| a + b).collect())
}

/// Element-wise difference `u - v`.
pub fn sub(u: &[f32], v: &[f32]) -> Result<Vec<f32>, VectorError> {
    check_dims(u, v)?;
    Ok(u.iter().zip(v.iter()).map(|(a, b)| a - b).collect())
}

/// Element-wise (Hadamard) product.
pub fn mul(u: &[f32], v: &[f32]) -> Result<Vec<f32>, VectorError> {
    check_dims(u, v)?;
    Ok(u.iter().zip(v.iter()).map(|(a, b)| a * b).collect())
}

/// Scalar multiple of a dense vector.
pub fn scale(u: &[f32], s: f32) -> Vec<f32> {
    u.iter().map(|a| a * s).collect()
}

/// Dot product of two dense vectors.
pub fn dot(u: &[f32], v: &[f32]) -> Result<f32, VectorError> {
    check_dims(u, v)?;
    Ok(u.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
}

/// Per-dimension extrema: picks the operand with the larger absolute value.
///
/// Ties keep the first operand's component.
pub fn extrema(u: &[f32], v: &[f32]) -> Result<Vec<f32>, VectorError> {
    check_dims(u, v)?;
    Ok(u.iter()
        .zip(v.iter())
        .map(|(&a, &b)| if a.abs() >= b.abs() { a } else { b })
        .collect())
}

/// Arithmetic mean of a list of dense vectors.
///
/// Returns [`VectorError::Empty`] for an empty list and
/// [`VectorError::DimensionMismatch`] when the vectors disagree in length.
pub fn average(vectors: &[Vec<f32>]) -> Result<Vec<f32>, VectorError> {
    let first = vectors.first().ok_or(VectorError::Empty)?;
    let mut sum = first.clone();
    for v in &vectors[1..] {
        check_dims(&sum, v)?;
        for (s, x) in sum.iter_mut().zip(v.iter()) {
            *s += x;
        }
    }
    let n = vectors.len() as f32;
    for s in sum.iter_mut() {
        *s /= n;
    }
    Ok(sum)
}

/// L2 norm of a dense vector.
pub fn norm(u: &[f32]) -> f32 {
    u.iter().map(|a| a * a).sum::<f32>().sqrt()
}
