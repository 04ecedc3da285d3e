// error.rs - Pipeline error taxonomy

use thiserror::Error;

/// Errors raised by the distance/clustering pipeline.
///
/// `InsufficientOverlap`, `ModelSaturation` and `DegenerateInput` are fatal to
/// the current gene's run but must not abort sibling genes. `EmptyCluster` is
/// an internal signal of the centroid clusterer and is always recovered before
/// `cluster()` returns. `DuplicateLabel` only escapes when a matrix is built
/// from labels that bypassed deduplication.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    #[error("sequences '{label_a}' and '{label_b}' share only {shared_sites} comparable sites (minimum {min_sites})")]
    InsufficientOverlap {
        label_a: String,
        label_b: String,
        shared_sites: usize,
        min_sites: usize,
    },

    #[error("sequences '{label_a}' and '{label_b}' are too divergent for the {model} model")]
    ModelSaturation {
        label_a: String,
        label_b: String,
        model: String,
    },

    #[error("{n_sequences} sequences cannot support a candidate range starting at k={k_min} (need at least {})", .k_min + 1)]
    DegenerateInput { n_sequences: usize, k_min: usize },

    #[error("duplicate label '{label}' in distance matrix (deduplication was bypassed)")]
    DuplicateLabel { label: String },

    #[error("centroid {cluster} lost all assigned points")]
    EmptyCluster { cluster: usize },
}

impl From<ClusterError> for String {
    fn from(e: ClusterError) -> Self {
        e.to_string()
    }
}
