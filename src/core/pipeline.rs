// pipeline.rs - Per-gene analysis orchestration

use std::time::Instant;

use serde::Serialize;

use crate::core::distance::{compute_distance_matrix, DistanceMatrix};
use crate::core::error::ClusterError;
use crate::core::hierarchy::{Dendrogram, FlatClustering, LinkageMethod};
use crate::core::kmeans::{self, CentroidPartition};
use crate::core::model::SubstitutionModel;
use crate::core::select_k::{select_k, KSelection};
use crate::data::SequenceSet;

/// Tunables for one gene's analysis chain.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub model: SubstitutionModel,
    pub linkage: LinkageMethod,
    pub cut_threshold: f64,
    pub k_min: usize,
    pub k_max: usize,
    pub seed: u64,
    pub min_sites: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            model: SubstitutionModel::Kimura2P,
            linkage: LinkageMethod::Average,
            cut_threshold: 0.03,
            k_min: 2,
            k_max: 8,
            seed: 42,
            min_sites: 1,
        }
    }
}

/// Every artifact one gene's run produces, returned explicitly so callers
/// (reporting, plotting, persistence) never depend on intermediate state.
#[derive(Debug, Clone, Serialize)]
pub struct GeneAnalysis {
    pub gene: String,
    pub matrix: DistanceMatrix,
    pub dendrogram: Dendrogram,
    pub flat: FlatClustering,
    pub selection: KSelection,
    pub partition: CentroidPartition,
}

/// Run the full chain for one gene: distance matrix, then independently the
/// hierarchical branch (build + cut) and the selection branch (k sweep +
/// final centroid partition at the winning k).
pub fn analyze_gene(
    set: &SequenceSet,
    options: &AnalysisOptions,
) -> Result<GeneAnalysis, ClusterError> {
    let start = Instant::now();
    println!("\n🧪 === Gene '{}' ===", set.gene);

    let matrix = compute_distance_matrix(set, options.model, options.min_sites)?;

    println!(
        "🌳 Hierarchical clustering ({} linkage), cut at {}",
        options.linkage.description(),
        options.cut_threshold
    );
    let dendrogram = Dendrogram::build(&matrix, options.linkage);
    let flat = dendrogram.cut(options.cut_threshold);
    println!(
        "✅ Threshold cut yields {} cluster(s)",
        flat.n_clusters
    );

    let selection = select_k(&matrix, options.k_min, options.k_max, options.seed)?;
    let partition = kmeans::cluster(&matrix, selection.best_k, options.seed)?;
    println!(
        "✅ Centroid partition: k={}, inertia {:.4}, {} iteration(s)",
        partition.k, partition.inertia, partition.n_iter
    );

    println!(
        "🏁 Gene '{}' analyzed in {:.2}s",
        set.gene,
        start.elapsed().as_secs_f64()
    );

    Ok(GeneAnalysis {
        gene: set.gene.clone(),
        matrix,
        dendrogram,
        flat,
        selection,
        partition,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two divergent haplotype groups with a handful of private mutations.
    fn two_group_set() -> SequenceSet {
        let g1 = "ACGTACGTACGTACGTACGTACGTACGTACGT";
        let g2 = "TGCAACGTACGTACGTACGTACGTACGTTGCA";
        let mutate = |s: &str, pos: usize, base: char| {
            let mut chars: Vec<char> = s.chars().collect();
            chars[pos] = base;
            chars.into_iter().collect::<String>()
        };
        SequenceSet::from_records(
            "coi",
            vec![
                ("a1".to_string(), g1.as_bytes().to_vec()),
                ("a2".to_string(), mutate(g1, 5, 'G').into_bytes()),
                ("a3".to_string(), mutate(g1, 9, 'T').into_bytes()),
                ("b1".to_string(), g2.as_bytes().to_vec()),
                ("b2".to_string(), mutate(g2, 6, 'A').into_bytes()),
                ("b3".to_string(), mutate(g2, 11, 'C').into_bytes()),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_two_groups() {
        let set = two_group_set();
        let options = AnalysisOptions {
            cut_threshold: 0.1,
            k_max: 4,
            ..Default::default()
        };
        let analysis = analyze_gene(&set, &options).unwrap();

        assert_eq!(analysis.flat.n_clusters, 2);
        assert_eq!(analysis.selection.best_k, 2);
        assert_eq!(
            analysis.flat.cluster_of("a1"),
            analysis.flat.cluster_of("a3")
        );
        assert_ne!(
            analysis.flat.cluster_of("a1"),
            analysis.flat.cluster_of("b1")
        );
    }

    #[test]
    fn test_pipeline_deterministic() {
        let set = two_group_set();
        let options = AnalysisOptions::default();
        let r1 = analyze_gene(&set, &options).unwrap();
        let r2 = analyze_gene(&set, &options).unwrap();
        assert_eq!(r1.partition.assignments, r2.partition.assignments);
        assert_eq!(r1.selection.best_k, r2.selection.best_k);
        assert_eq!(r1.flat.assignments, r2.flat.assignments);
    }

    #[test]
    fn test_result_serializes() {
        let set = two_group_set();
        let analysis = analyze_gene(&set, &AnalysisOptions::default()).unwrap();
        let json = serde_json::to_string(&analysis).unwrap();
        assert!(json.contains("\"gene\":\"coi\""));
        assert!(json.contains("best_k"));
    }
}
