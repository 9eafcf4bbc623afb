// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine similarity between embedding vectors.

/// Compute cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Embeddings from the hosted model are not guaranteed to be normalized, so
/// both norms are computed. Returns NaN when either vector is all zeros.
/// Mismatched lengths are compared over the shorter prefix; callers that
/// need a meaningful answer use [`checked_similarity`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Cosine similarity, or `None` when the score is undefined.
///
/// Undefined covers empty or mismatched vectors and zero-norm vectors (NaN).
/// A `None` score means "no similarity": the fact is never retained.
pub fn checked_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }
    let score = cosine_similarity(a, b);
    score.is_finite().then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![3.0, -4.0, 12.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6, "got {sim}");
    }

    #[test]
    fn unnormalized_parallel_vectors_score_one() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![10.0, 20.0, 30.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < f32::EPSILON);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let a = vec![2.0, 0.0];
        let b = vec![-5.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_vector_is_nan_and_unchecked() {
        let zero = vec![0.0, 0.0];
        let v = vec![1.0, 1.0];
        assert!(cosine_similarity(&zero, &v).is_nan());
        assert_eq!(checked_similarity(&zero, &v), None);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert_eq!(checked_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), None);
        assert_eq!(checked_similarity(&[], &[]), None);
    }

    proptest! {
        #[test]
        fn similarity_is_symmetric(
            pair in (1usize..32).prop_flat_map(|n| (
                prop::collection::vec(-100.0f32..100.0, n),
                prop::collection::vec(-100.0f32..100.0, n),
            ))
        ) {
            let (a, b) = pair;
            let ab = checked_similarity(&a, &b);
            let ba = checked_similarity(&b, &a);
            match (ab, ba) {
                (Some(x), Some(y)) => prop_assert!((x - y).abs() < 1e-5),
                (None, None) => {}
                other => prop_assert!(false, "asymmetric definedness: {other:?}"),
            }
        }

        #[test]
        fn self_similarity_is_one(v in prop::collection::vec(0.5f32..100.0, 1..32)) {
            let s = checked_similarity(&v, &v).expect("non-zero vector");
            prop_assert!((s - 1.0).abs() < 1e-4);
        }
    }
}
