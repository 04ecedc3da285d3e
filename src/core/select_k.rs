// select_k.rs - Silhouette-based selection of the optimal cluster count

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::distance::DistanceMatrix;
use crate::core::error::ClusterError;
use crate::core::kmeans;
use crate::core::silhouette::silhouette_score;

/// One candidate cluster count and its average silhouette width.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub k: usize,
    pub silhouette: f64,
}

/// Outcome of the k-selection sweep: the winning count plus the full score
/// curve (sorted by k) for inspection and curve rendering.
#[derive(Debug, Clone, Serialize)]
pub struct KSelection {
    pub best_k: usize,
    pub scores: Vec<CandidateScore>,
}

/// Score every candidate k in `[k_min, min(k_max, n−1)]` by the average
/// silhouette width of a seeded centroid partition, and pick the maximum.
///
/// Candidates are scored in parallel; the curve is reassembled in ascending-k
/// order before selection, and ties go to the smallest k. The same seed is
/// passed to every candidate's clustering run, so repeated sweeps are
/// identical.
pub fn select_k(
    matrix: &DistanceMatrix,
    k_min: usize,
    k_max: usize,
    seed: u64,
) -> Result<KSelection, ClusterError> {
    let n = matrix.n();
    let k_min = k_min.max(2);
    if n < k_min + 1 {
        return Err(ClusterError::DegenerateInput {
            n_sequences: n,
            k_min,
        });
    }

    let k_cap = k_max.min(n - 1);
    if k_cap < k_min {
        return Err(ClusterError::DegenerateInput {
            n_sequences: n,
            k_min,
        });
    }
    if k_cap < k_max {
        println!(
            "ℹ️  Candidate range capped at k={} ({} sequences)",
            k_cap, n
        );
    }

    println!(
        "🔎 Scoring candidate cluster counts k={}..{} (seed {})...",
        k_min, k_cap, seed
    );
    let start = Instant::now();

    let mut scores = (k_min..=k_cap)
        .into_par_iter()
        .map(|k| {
            let partition = kmeans::cluster(matrix, k, seed)?;
            let silhouette = silhouette_score(matrix.rows(), &partition.assignments);
            Ok(CandidateScore { k, silhouette })
        })
        .collect::<Result<Vec<_>, ClusterError>>()?;
    scores.sort_by_key(|s| s.k);

    // Maximum score; ties broken by the smallest k (simpler model preferred).
    let mut best = &scores[0];
    for candidate in &scores[1..] {
        if candidate.silhouette > best.silhouette {
            best = candidate;
        }
    }
    let best_k = best.k;

    println!(
        "✅ Best k = {} (mean silhouette {:.4}) selected in {:.2}s",
        best_k,
        best.silhouette,
        start.elapsed().as_secs_f64()
    );

    Ok(KSelection { best_k, scores })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_from(labels: &[&str], values: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::new(labels.iter().map(|s| s.to_string()).collect(), values).unwrap()
    }

    fn two_group_matrix() -> DistanceMatrix {
        let labels = ["A", "B", "C", "D", "E", "F"];
        let n = labels.len();
        let mut values = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let same_group = (i < 3) == (j < 3);
                values[i][j] = if same_group { 0.01 } else { 0.6 };
            }
        }
        matrix_from(&labels, values)
    }

    #[test]
    fn test_selects_two_groups() {
        let m = two_group_matrix();
        let selection = select_k(&m, 2, 4, 42).unwrap();
        assert_eq!(selection.best_k, 2);
        let winner = &selection.scores[0];
        assert_eq!(winner.k, 2);
        assert!(
            winner.silhouette > 0.9,
            "expected silhouette > 0.9, got {}",
            winner.silhouette
        );
    }

    #[test]
    fn test_full_curve_recorded_in_k_order() {
        let m = two_group_matrix();
        let selection = select_k(&m, 2, 4, 42).unwrap();
        let ks: Vec<usize> = selection.scores.iter().map(|s| s.k).collect();
        assert_eq!(ks, vec![2, 3, 4]);
    }

    #[test]
    fn test_stable_across_repeats() {
        let m = two_group_matrix();
        let s1 = select_k(&m, 2, 4, 7).unwrap();
        let s2 = select_k(&m, 2, 4, 7).unwrap();
        assert_eq!(s1.best_k, s2.best_k);
        for (a, b) in s1.scores.iter().zip(&s2.scores) {
            assert_eq!(a.k, b.k);
            assert_eq!(a.silhouette, b.silhouette);
        }
    }

    #[test]
    fn test_k_max_capped_at_n_minus_one() {
        let m = two_group_matrix();
        let selection = select_k(&m, 2, 50, 42).unwrap();
        assert_eq!(selection.scores.last().unwrap().k, 5);
    }

    #[test]
    fn test_degenerate_input() {
        let m = matrix_from(&["a", "b"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let err = select_k(&m, 2, 4, 42).unwrap_err();
        assert!(matches!(err, ClusterError::DegenerateInput { .. }));
    }

    #[test]
    fn test_tie_prefers_smallest_k() {
        // Four coincident points: every candidate scores 0, so the smallest
        // k must win.
        let m = matrix_from(
            &["a", "b", "c", "d"],
            vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.0, 0.0, 0.0],
            ],
        );
        let selection = select_k(&m, 2, 3, 42).unwrap();
        assert_eq!(selection.best_k, 2);
        assert!(selection.scores.iter().all(|s| s.silhouette == 0.0));
    }
}
