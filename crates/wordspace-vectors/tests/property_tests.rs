//! Property-based tests for vector algebra and similarity measures.
//!
//! Verifies the algebraic laws the query engine relies on: symmetry and
//! boundedness of cosine, linearity of dense operations, and consistency
//! between the dense and sparse forms of the Kolb measure.

use proptest::prelude::*;
use wordspace_vectors::sparse::{self, SparseVector};
use wordspace_vectors::{dense, similarity};

fn finite_f32() -> impl Strategy<Value = f32> {
    (-1e3f32..1e3f32).prop_filter("finite", |x| x.is_finite())
}

fn dense_pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1usize..64).prop_flat_map(|len| {
        (
            prop::collection::vec(finite_f32(), len),
            prop::collection::vec(finite_f32(), len),
        )
    })
}

fn sparse_vector() -> impl Strategy<Value = SparseVector> {
    prop::collection::vec((0u32..50, finite_f32()), 0..20).prop_map(|pairs| {
        SparseVector::from_entries(pairs.into_iter().map(|(k, v)| (format!("f{:03}", k), v)))
    })
}

proptest! {
    #[test]
    fn test_cosine_symmetry_and_bound((u, v) in dense_pair()) {
        let uv = similarity::cosine(&u, &v).unwrap();
        let vu = similarity::cosine(&v, &u).unwrap();
        prop_assert!((uv - vu).abs() < 1e-4, "cosine not symmetric: {} vs {}", uv, vu);
        prop_assert!(uv.abs() <= 1.0 + 1e-4, "cosine out of range: {}", uv);
    }

    #[test]
    fn test_add_twice_equals_scale_two(v in prop::collection::vec(finite_f32(), 1..64)) {
        let doubled = dense::add(&v, &v).unwrap();
        let scaled = dense::scale(&v, 2.0);
        for (a, b) in doubled.iter().zip(scaled.iter()) {
            prop_assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_average_of_two((u, v) in dense_pair()) {
        let avg = dense::average(&[u.clone(), v.clone()]).unwrap();
        for i in 0..u.len() {
            let expected = (u[i] + v[i]) / 2.0;
            prop_assert!((avg[i] - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_sub_then_add_roundtrip((u, v) in dense_pair()) {
        let diff = dense::sub(&u, &v).unwrap();
        let back = dense::add(&diff, &v).unwrap();
        for (a, b) in back.iter().zip(u.iter()) {
            prop_assert!((a - b).abs() < 1e-2);
        }
    }

    #[test]
    fn test_sparse_add_commutes(a in sparse_vector(), b in sparse_vector()) {
        let ab = sparse::add(&a, &b);
        let ba = sparse::add(&b, &a);
        prop_assert_eq!(ab.keys.clone(), ba.keys.clone());
        for (x, y) in ab.values.iter().zip(ba.values.iter()) {
            prop_assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sparse_dot_commutes(a in sparse_vector(), b in sparse_vector()) {
        let ab = sparse::dot(&a, &b);
        let ba = sparse::dot(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-2);
    }

    #[test]
    fn test_sparse_sub_self_is_zero(a in sparse_vector()) {
        let diff = sparse::sub(&a, &a);
        for v in diff.values.iter() {
            prop_assert!(v.abs() < 1e-6);
        }
    }

    #[test]
    fn test_sparse_results_stay_sorted(a in sparse_vector(), b in sparse_vector()) {
        for result in [sparse::add(&a, &b), sparse::sub(&a, &b), sparse::mul(&a, &b), sparse::extrema(&a, &b)] {
            for i in 1..result.keys.len() {
                prop_assert!(result.keys[i - 1] < result.keys[i], "result keys not sorted/unique");
            }
            prop_assert_eq!(result.keys.len(), result.values.len());
        }
    }

    #[test]
    fn test_kolb_bounds_and_symmetry_on_positive_vectors(
        pairs in prop::collection::vec((0u32..30, 0.01f32..100.0), 1..15),
        other in prop::collection::vec((0u32..30, 0.01f32..100.0), 1..15),
    ) {
        let a = SparseVector::from_entries(pairs.into_iter().map(|(k, v)| (format!("f{:02}", k), v)));
        let b = SparseVector::from_entries(other.into_iter().map(|(k, v)| (format!("f{:02}", k), v)));
        let ab = similarity::kolb_sparse(&a, &b);
        let ba = similarity::kolb_sparse(&b, &a);
        // non-negative, bounded by twice the shared-mass ratio, symmetric
        prop_assert!((0.0..=2.0 + 1e-4).contains(&ab), "kolb out of range: {}", ab);
        prop_assert!((ab - ba).abs() < 1e-3, "kolb not symmetric: {} vs {}", ab, ba);
    }

    #[test]
    fn test_normalize_unit_norm(a in sparse_vector()) {
        let mut v = a;
        if v.norm() > 1e-3 {
            v.normalize_in_place();
            prop_assert!((v.norm() - 1.0).abs() < 1e-3);
        }
    }
}
