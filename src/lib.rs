// lib.rs - taxoclust library root

//! # taxoclust - Genetic distance and cluster analysis for aligned gene sequences
//!
//! This library computes pairwise genetic distances between aligned DNA
//! sequences under a nucleotide substitution model, groups sequences by
//! hierarchical agglomerative clustering, selects a statistically justified
//! cluster count via average silhouette width, and produces a seeded
//! centroid-based partition with that count.
//!
//! ## Features
//!
//! - **Substitution models**: p-distance, Jukes-Cantor 1969, Kimura 2-parameter
//! - **Pairwise deletion**: missing data excluded per sequence pair, not globally
//! - **Hierarchical clustering**: single/complete/average linkage with exact
//!   recomputation, deterministic tie-breaking, threshold cuts
//! - **Optimal k selection**: per-candidate silhouette sweep with a full
//!   reported score curve
//! - **Reproducibility**: every randomized step takes an explicit seed
//! - **Multiple formats**: TSV, CSV, PHYLIP, NEXUS matrix output plus JSON
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use taxoclust::prelude::*;
//!
//! // Load one gene's aligned sequences
//! let set = SequenceSet::from_fasta(std::path::Path::new("coi.aligned.fasta"))?;
//!
//! // Run the whole chain: matrix, dendrogram + cut, k sweep, partition
//! let analysis = analyze_gene(&set, &AnalysisOptions::default())
//!     .map_err(|e| e.to_string())?;
//!
//! println!("best k = {}", analysis.selection.best_k);
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{analyze_gene, AnalysisOptions, GeneAnalysis};
    pub use crate::core::{compute_distance_matrix, DistanceMatrix};
    pub use crate::core::{select_k, CandidateScore, ClusterError, KSelection};
    pub use crate::core::{CentroidPartition, Dendrogram, FlatClustering};
    pub use crate::core::{LinkageMethod, SubstitutionModel};
    pub use crate::data::{AlignedSequence, SequenceSet};
    pub use crate::output::write_matrix;
}

// Re-export main types at the root level for convenience
pub use crate::cli::{Args, ValidationResult};
pub use crate::core::{AnalysisOptions, ClusterError, GeneAnalysis};
pub use crate::core::{DistanceMatrix, LinkageMethod, SubstitutionModel};
pub use crate::data::{AlignedSequence, SequenceSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "taxoclust v{} - Genetic distance and cluster analysis for aligned sequences",
        VERSION
    )
}
