// distance.rs - Pairwise distance matrix computation

use std::collections::HashSet;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use crate::core::error::ClusterError;
use crate::core::model::{pair_distance, SubstitutionModel};
use crate::data::SequenceSet;

/// Square, symmetric, zero-diagonal distance matrix with an ordered label
/// list matching its rows and columns.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceMatrix {
    labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build a matrix from labels and a full square value grid.
    ///
    /// Labels must already be unique; passing duplicates means deduplication
    /// was bypassed upstream and is rejected rather than silently merged.
    pub fn new(labels: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self, ClusterError> {
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(ClusterError::DuplicateLabel {
                    label: label.clone(),
                });
            }
        }
        Ok(Self { labels, values })
    }

    pub fn n(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Row of distances from point `i` to every point, in label order. This
    /// row doubles as the point's coordinates for the centroid step.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Largest off-diagonal entry (0 for a 1x1 matrix).
    pub fn max_distance(&self) -> f64 {
        let mut max = 0.0_f64;
        for i in 0..self.n() {
            for j in (i + 1)..self.n() {
                if self.values[i][j] > max {
                    max = self.values[i][j];
                }
            }
        }
        max
    }
}

/// Compute the pairwise distance matrix for one gene's aligned sequences.
///
/// The upper triangle is computed in parallel and mirrored; the diagonal is
/// exactly 0. Any pair that cannot be estimated (insufficient overlap or
/// model saturation) fails the whole gene — no NaN is ever written.
pub fn compute_distance_matrix(
    set: &SequenceSet,
    model: SubstitutionModel,
    min_sites: usize,
) -> Result<DistanceMatrix, ClusterError> {
    let n = set.len();
    let labels = set.labels();
    let total_comparisons = n * (n - 1) / 2;

    println!(
        "🔄 Computing {} distances for gene '{}' ({} × {} = {} comparisons)...",
        model.description(),
        set.gene,
        n,
        n,
        total_comparisons
    );

    let pb = ProgressBar::new(total_comparisons as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let update_interval = std::cmp::max(1, total_comparisons / 100);
    let progress_counter = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let start = Instant::now();
    let upper_triangle: Vec<(usize, usize, f64)> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            let progress_clone = progress_counter.clone();
            let pb_clone = pb.clone();
            (i + 1..n).into_par_iter().map(move |j| {
                let d = pair_distance(
                    &set.sequences[i].id,
                    &set.sequences[j].id,
                    &set.sequences[i].bases,
                    &set.sequences[j].bases,
                    model,
                    min_sites,
                )?;

                let count = progress_clone.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
                if count % update_interval == 0 {
                    pb_clone.set_position(count as u64);
                }

                Ok((i, j, d))
            })
        })
        .collect::<Result<Vec<_>, ClusterError>>()?;

    pb.finish_and_clear();

    let mut values = vec![vec![0.0; n]; n];
    for (i, j, d) in upper_triangle {
        values[i][j] = d;
        values[j][i] = d;
    }

    let elapsed = start.elapsed();
    println!(
        "✅ Distance matrix for '{}' computed in {:.2}s",
        set.gene,
        elapsed.as_secs_f64()
    );

    DistanceMatrix::new(labels, values)
}
