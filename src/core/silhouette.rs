// silhouette.rs - Silhouette widths over distance-row coordinates

use rayon::prelude::*;

/// Euclidean distance between two coordinate rows.
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Per-point silhouette widths for a partition.
///
/// For point p in cluster C: a(p) is the mean distance to the other members
/// of C, b(p) the minimum over other clusters of the mean distance to their
/// members, and silhouette(p) = (b − a) / max(a, b) — defined as 0 when p is
/// alone in its cluster or the denominator is 0. Every value lies in [−1, 1].
///
/// `points` are raw distance-matrix rows treated as Euclidean coordinates,
/// the same representation the centroid step partitions. `assignments` may
/// use any cluster id scheme as long as ids are consistent.
pub fn silhouette_samples(points: &[Vec<f64>], assignments: &[usize]) -> Vec<f64> {
    let n = points.len();
    let mut unique: Vec<usize> = assignments.to_vec();
    unique.sort_unstable();
    unique.dedup();

    if unique.len() < 2 {
        // A single cluster has no "nearest other cluster"; every point is 0.
        return vec![0.0; n];
    }

    (0..n)
        .into_par_iter()
        .map(|i| {
            let mut same_sum = 0.0;
            let mut same_count = 0usize;
            for j in 0..n {
                if j != i && assignments[j] == assignments[i] {
                    same_sum += euclidean(&points[i], &points[j]);
                    same_count += 1;
                }
            }
            if same_count == 0 {
                return 0.0;
            }
            let a = same_sum / same_count as f64;

            let mut b = f64::INFINITY;
            for &cluster in &unique {
                if cluster == assignments[i] {
                    continue;
                }
                let mut other_sum = 0.0;
                let mut other_count = 0usize;
                for j in 0..n {
                    if assignments[j] == cluster {
                        other_sum += euclidean(&points[i], &points[j]);
                        other_count += 1;
                    }
                }
                if other_count > 0 {
                    let mean = other_sum / other_count as f64;
                    if mean < b {
                        b = mean;
                    }
                }
            }

            let max_ab = a.max(b);
            if max_ab == 0.0 {
                0.0
            } else {
                (b - a) / max_ab
            }
        })
        .collect()
}

/// Mean silhouette width over all points.
pub fn silhouette_score(points: &[Vec<f64>], assignments: &[usize]) -> f64 {
    let samples = silhouette_samples(points, assignments);
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_separation_scores_high() {
        let points = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ];
        let assignments = vec![1, 1, 1, 2, 2, 2];
        let score = silhouette_score(&points, &assignments);
        assert!(score > 0.9, "expected high score, got {}", score);
    }

    #[test]
    fn test_values_bounded() {
        let points = vec![vec![0.0], vec![1.0], vec![5.0], vec![6.0], vec![3.0]];
        let assignments = vec![1, 1, 2, 2, 1];
        for &s in &silhouette_samples(&points, &assignments) {
            assert!((-1.0..=1.0).contains(&s), "silhouette {} out of range", s);
        }
    }

    #[test]
    fn test_singleton_cluster_scores_zero() {
        let points = vec![vec![0.0], vec![0.1], vec![9.0]];
        let assignments = vec![1, 1, 2];
        let samples = silhouette_samples(&points, &assignments);
        assert_eq!(samples[2], 0.0);
    }

    #[test]
    fn test_single_cluster_all_zero() {
        let points = vec![vec![0.0], vec![1.0], vec![2.0]];
        let assignments = vec![1, 1, 1];
        assert!(silhouette_samples(&points, &assignments)
            .iter()
            .all(|&s| s == 0.0));
    }

    #[test]
    fn test_coincident_points_zero_denominator() {
        // a = b = 0 for every point: defined as 0, not NaN.
        let points = vec![vec![0.0], vec![0.0], vec![0.0], vec![0.0]];
        let assignments = vec![1, 1, 2, 2];
        for &s in &silhouette_samples(&points, &assignments) {
            assert_eq!(s, 0.0);
        }
    }

    #[test]
    fn test_misassigned_point_scores_negative() {
        // The point at 5.9 labeled with the far cluster sits much closer to
        // the other one.
        let points = vec![vec![0.0], vec![0.2], vec![6.0], vec![6.2], vec![5.9]];
        let assignments = vec![1, 1, 2, 2, 1];
        let samples = silhouette_samples(&points, &assignments);
        assert!(samples[4] < 0.0, "expected negative, got {}", samples[4]);
    }
}
