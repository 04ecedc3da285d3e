// kmeans.rs - Seeded centroid partitioning over distance-row coordinates

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::core::distance::DistanceMatrix;
use crate::core::error::ClusterError;

const MAX_ITERATIONS: usize = 300;

/// Result of centroid-based partitioning: label → cluster id (1..k), the
/// centroid of each cluster in the row-coordinate space, and the total
/// within-cluster sum of squared distances (reported for quality inspection,
/// never used for k-selection).
#[derive(Debug, Clone, Serialize)]
pub struct CentroidPartition {
    pub labels: Vec<String>,
    /// Cluster ids in 1..=k, parallel to `labels`.
    pub assignments: Vec<usize>,
    pub k: usize,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub n_iter: usize,
}

/// Squared Euclidean distance (no sqrt; only used for comparisons and sums).
fn sq_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Partition the points of a distance matrix into `k` clusters.
///
/// Each point's coordinates are its row of distances to all points — the same
/// representation the silhouette scoring uses. Fully deterministic given the
/// seed: same seed, same matrix, same k always yields the same partition.
pub fn cluster(
    matrix: &DistanceMatrix,
    k: usize,
    seed: u64,
) -> Result<CentroidPartition, ClusterError> {
    let n = matrix.n();
    if k == 0 || k > n {
        return Err(ClusterError::DegenerateInput {
            n_sequences: n,
            k_min: k,
        });
    }

    let centroids = initial_centroids(matrix, k, seed);
    lloyd(matrix, centroids)
}

/// Seeded initialization: the first centroid is a uniformly random point, the
/// rest are chosen by farthest-point refinement (maximum squared distance to
/// the nearest already-chosen centroid). The refinement is deterministic, so
/// the whole initialization is a pure function of the seed.
fn initial_centroids(matrix: &DistanceMatrix, k: usize, seed: u64) -> Vec<Vec<f64>> {
    let n = matrix.n();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    while chosen.len() < k {
        let mut best_idx = usize::MAX;
        let mut best_dist = -1.0_f64;
        for i in 0..n {
            if chosen.contains(&i) {
                continue;
            }
            let nearest = chosen
                .iter()
                .map(|&c| sq_euclidean(matrix.row(i), matrix.row(c)))
                .fold(f64::INFINITY, f64::min);
            if nearest > best_dist {
                best_dist = nearest;
                best_idx = i;
            }
        }
        // best_idx is always set: k <= n guarantees an unchosen point exists.
        chosen.push(best_idx);
    }

    chosen.into_iter().map(|i| matrix.row(i).to_vec()).collect()
}

/// Lloyd iterations from explicit starting centroids.
///
/// Assignment ties go to the lowest centroid index. An update that leaves a
/// centroid with no members raises the internal `EmptyCluster` signal, which
/// is recovered here by re-seeding that centroid from the point farthest from
/// its currently assigned centroid; the signal never escapes this function.
fn lloyd(
    matrix: &DistanceMatrix,
    mut centroids: Vec<Vec<f64>>,
) -> Result<CentroidPartition, ClusterError> {
    let n = matrix.n();
    let k = centroids.len();
    let mut assignments = vec![0usize; n];
    let mut n_iter = 0;

    for _ in 0..MAX_ITERATIONS {
        n_iter += 1;

        // Assignment step.
        let mut new_assignments = vec![0usize; n];
        for i in 0..n {
            let mut best_c = 0;
            let mut best_d = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = sq_euclidean(matrix.row(i), centroid);
                if d < best_d {
                    best_d = d;
                    best_c = c;
                }
            }
            new_assignments[i] = best_c;
        }

        // Empty-cluster remedy: re-seed the starved centroid from the point
        // farthest from its assigned centroid, taken from a cluster that can
        // spare a member. Each repair fills one empty cluster without
        // starving another, so the loop always terminates.
        let mut counts = vec![0usize; k];
        for &c in &new_assignments {
            counts[c] += 1;
        }
        while let Err(ClusterError::EmptyCluster { cluster }) = check_occupancy(&new_assignments, k)
        {
            let farthest = (0..n)
                .filter(|&i| counts[new_assignments[i]] > 1)
                .max_by(|&a, &b| {
                    let da = sq_euclidean(matrix.row(a), &centroids[new_assignments[a]]);
                    let db = sq_euclidean(matrix.row(b), &centroids[new_assignments[b]]);
                    da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap();
            counts[new_assignments[farthest]] -= 1;
            counts[cluster] += 1;
            new_assignments[farthest] = cluster;
            centroids[cluster] = matrix.row(farthest).to_vec();
        }

        let converged = new_assignments == assignments && n_iter > 1;
        assignments = new_assignments;
        if converged {
            break;
        }

        // Update step: centroid = mean of assigned points.
        let dim = n;
        let mut sums = vec![vec![0.0; dim]; k];
        let mut counts = vec![0usize; k];
        for i in 0..n {
            let c = assignments[i];
            counts[c] += 1;
            for (d, &value) in matrix.row(i).iter().enumerate() {
                sums[c][d] += value;
            }
        }
        for c in 0..k {
            // Occupancy was just repaired, so every count is positive.
            let count = counts[c] as f64;
            for d in 0..dim {
                sums[c][d] /= count;
            }
        }
        centroids = sums;
    }

    let inertia = (0..n)
        .map(|i| sq_euclidean(matrix.row(i), &centroids[assignments[i]]))
        .sum();

    Ok(CentroidPartition {
        labels: matrix.labels().to_vec(),
        assignments: assignments.iter().map(|&c| c + 1).collect(),
        k,
        centroids,
        inertia,
        n_iter,
    })
}

/// Internal occupancy check used by the Lloyd loop.
fn check_occupancy(assignments: &[usize], k: usize) -> Result<(), ClusterError> {
    let mut counts = vec![0usize; k];
    for &c in assignments {
        counts[c] += 1;
    }
    for (cluster, &count) in counts.iter().enumerate() {
        if count == 0 {
            return Err(ClusterError::EmptyCluster { cluster });
        }
    }
    Ok(())
}

/// Entry point for tests that need adversarial starting centroids.
#[cfg(test)]
pub(crate) fn cluster_with_centroids(
    matrix: &DistanceMatrix,
    centroids: Vec<Vec<f64>>,
) -> Result<CentroidPartition, ClusterError> {
    lloyd(matrix, centroids)
}
