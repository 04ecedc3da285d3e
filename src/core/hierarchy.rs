// hierarchy.rs - Agglomerative clustering: dendrogram construction and cutting

use std::str::FromStr;

use serde::Serialize;

use crate::core::distance::DistanceMatrix;

/// Rule for the distance between two clusters given their members' pairwise
/// distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageMethod {
    /// Minimum over all member pairs.
    Single,
    /// Maximum over all member pairs.
    Complete,
    /// Unweighted mean over all member pairs (UPGMA).
    Average,
}

impl FromStr for LinkageMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(LinkageMethod::Single),
            "complete" => Ok(LinkageMethod::Complete),
            "average" | "upgma" => Ok(LinkageMethod::Average),
            _ => Err(format!(
                "Invalid linkage method: {}. Use: single, complete, average",
                s
            )),
        }
    }
}

impl LinkageMethod {
    pub fn description(&self) -> &str {
        match self {
            LinkageMethod::Single => "single (minimum)",
            LinkageMethod::Complete => "complete (maximum)",
            LinkageMethod::Average => "average (UPGMA)",
        }
    }
}

/// One agglomerative merge: the members of the two merged clusters and the
/// height (inter-cluster distance) at which they joined.
#[derive(Debug, Clone, Serialize)]
pub struct Merge {
    /// Original point indices of the first merged cluster.
    pub left: Vec<usize>,
    /// Original point indices of the second merged cluster.
    pub right: Vec<usize>,
    /// Inter-cluster distance at merge time, in input-matrix units.
    pub height: f64,
}

/// Binary merge tree over a label set. Heights are in the same units as the
/// input distance matrix, so the tree can be handed to external tree-plot
/// renderers as-is.
#[derive(Debug, Clone, Serialize)]
pub struct Dendrogram {
    pub labels: Vec<String>,
    pub method: String,
    pub merges: Vec<Merge>,
}

/// Flat partition derived from cutting a dendrogram. Cluster ids are
/// contiguous from 0, assigned in first-encounter order over the label list.
#[derive(Debug, Clone, Serialize)]
pub struct FlatClustering {
    pub labels: Vec<String>,
    pub assignments: Vec<usize>,
    pub n_clusters: usize,
}

impl FlatClustering {
    pub fn cluster_of(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.assignments[i])
    }
}

/// Linkage distance between two clusters, recomputed from the original
/// matrix over all member pairs.
fn linkage_distance(
    matrix: &DistanceMatrix,
    a: &[usize],
    b: &[usize],
    method: LinkageMethod,
) -> f64 {
    match method {
        LinkageMethod::Single => {
            let mut min = f64::INFINITY;
            for &i in a {
                for &j in b {
                    let d = matrix.get(i, j);
                    if d < min {
                        min = d;
                    }
                }
            }
            min
        }
        LinkageMethod::Complete => {
            let mut max = f64::NEG_INFINITY;
            for &i in a {
                for &j in b {
                    let d = matrix.get(i, j);
                    if d > max {
                        max = d;
                    }
                }
            }
            max
        }
        LinkageMethod::Average => {
            let mut sum = 0.0;
            for &i in a {
                for &j in b {
                    sum += matrix.get(i, j);
                }
            }
            sum / (a.len() * b.len()) as f64
        }
    }
}

impl Dendrogram {
    /// Agglomerative construction: start from singletons, repeatedly merge
    /// the two clusters at minimum linkage distance until one remains.
    ///
    /// Linkage distances are recomputed from the original matrix after every
    /// merge rather than updated incrementally. Ties are broken by the lowest
    /// combined member index (clusters are scanned in ascending order of
    /// their smallest member, with a strict comparison). No randomness:
    /// identical inputs give a bit-identical tree.
    pub fn build(matrix: &DistanceMatrix, method: LinkageMethod) -> Self {
        let n = matrix.n();
        // Active clusters as sorted member lists, ordered by smallest member.
        let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        let mut merges = Vec::with_capacity(n.saturating_sub(1));

        while clusters.len() > 1 {
            let mut best = f64::INFINITY;
            let mut best_pair = (0, 1);
            for a in 0..clusters.len() {
                for b in (a + 1)..clusters.len() {
                    let d = linkage_distance(matrix, &clusters[a], &clusters[b], method);
                    if d < best {
                        best = d;
                        best_pair = (a, b);
                    }
                }
            }

            let (a, b) = best_pair;
            let right = clusters.remove(b);
            let left = std::mem::take(&mut clusters[a]);

            merges.push(Merge {
                left: left.clone(),
                right: right.clone(),
                height: best,
            });

            let mut merged = left;
            merged.extend(right);
            merged.sort_unstable();
            clusters[a] = merged;
            // Keep the ascending-smallest-member order the tie break relies on.
            clusters.sort_unstable_by_key(|c| c[0]);
        }

        Dendrogram {
            labels: matrix.labels().to_vec(),
            method: method.description().to_string(),
            merges,
        }
    }

    /// Cut the tree at `threshold`: leaves connected through merges of height
    /// ≤ threshold share a cluster. Higher thresholds can only merge more,
    /// never split.
    pub fn cut(&self, threshold: f64) -> FlatClustering {
        let n = self.labels.len();
        // Union-find over the original point indices.
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut Vec<usize>, mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }

        for merge in &self.merges {
            if merge.height > threshold {
                continue;
            }
            let ra = find(&mut parent, merge.left[0]);
            let rb = find(&mut parent, merge.right[0]);
            if ra != rb {
                parent[rb] = ra;
            }
        }

        // Assign contiguous ids in first-encounter order over the label list.
        let mut id_of_root: Vec<Option<usize>> = vec![None; n];
        let mut assignments = vec![0usize; n];
        let mut next_id = 0;
        for i in 0..n {
            let root = find(&mut parent, i);
            let id = match id_of_root[root] {
                Some(id) => id,
                None => {
                    let id = next_id;
                    id_of_root[root] = Some(id);
                    next_id += 1;
                    id
                }
            };
            assignments[i] = id;
        }

        FlatClustering {
            labels: self.labels.clone(),
            assignments,
            n_clusters: next_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::DistanceMatrix;

    fn matrix_from(labels: &[&str], values: Vec<Vec<f64>>) -> DistanceMatrix {
        DistanceMatrix::new(labels.iter().map(|s| s.to_string()).collect(), values).unwrap()
    }

    /// Two tight groups of three, far apart (the six-point reference case).
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
    fn test_build_is_deterministic() {
        let m = two_group_matrix();
        let t1 = Dendrogram::build(&m, LinkageMethod::Average);
        let t2 = Dendrogram::build(&m, LinkageMethod::Average);
        assert_eq!(t1.merges.len(), t2.merges.len());
        for (a, b) in t1.merges.iter().zip(&t2.merges) {
            assert_eq!(a.left, b.left);
            assert_eq!(a.right, b.right);
            assert_eq!(a.height, b.height);
        }
    }

    #[test]
    fn test_merge_count_and_heights() {
        let m = two_group_matrix();
        let tree = Dendrogram::build(&m, LinkageMethod::Average);
        assert_eq!(tree.merges.len(), 5);
        // The final merge joins the two groups at the cross-group distance.
        let last = tree.merges.last().unwrap();
        assert!((last.height - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_tie_break_prefers_lowest_indices() {
        // All within-group distances equal: the first merge must pick the
        // lowest-index pair (0, 1).
        let m = two_group_matrix();
        let tree = Dendrogram::build(&m, LinkageMethod::Average);
        assert_eq!(tree.merges[0].left, vec![0]);
        assert_eq!(tree.merges[0].right, vec![1]);
    }

    #[test]
    fn test_cut_two_groups() {
        let m = two_group_matrix();
        let tree = Dendrogram::build(&m, LinkageMethod::Average);
        let flat = tree.cut(0.2);
        assert_eq!(flat.n_clusters, 2);
        assert_eq!(flat.assignments[0], flat.assignments[1]);
        assert_eq!(flat.assignments[1], flat.assignments[2]);
        assert_eq!(flat.assignments[3], flat.assignments[4]);
        assert_eq!(flat.assignments[4], flat.assignments[5]);
        assert_ne!(flat.assignments[0], flat.assignments[3]);
        // First-encounter ids: A's cluster is 0, D's is 1.
        assert_eq!(flat.assignments[0], 0);
        assert_eq!(flat.assignments[3], 1);
    }

    #[test]
    fn test_cut_monotonicity() {
        let m = two_group_matrix();
        let tree = Dendrogram::build(&m, LinkageMethod::Average);
        let mut previous = usize::MAX;
        for threshold in [0.0, 0.005, 0.01, 0.1, 0.6, 1.0] {
            let k = tree.cut(threshold).n_clusters;
            assert!(
                k <= previous,
                "cut at {} produced {} clusters, more than {}",
                threshold,
                k,
                previous
            );
            previous = k;
        }
    }

    #[test]
    fn test_cut_extremes() {
        let m = two_group_matrix();
        let tree = Dendrogram::build(&m, LinkageMethod::Average);
        // Below every height: all singletons.
        assert_eq!(tree.cut(0.001).n_clusters, 6);
        // Above every height: one cluster.
        assert_eq!(tree.cut(10.0).n_clusters, 1);
    }

    #[test]
    fn test_single_vs_complete_linkage() {
        // Chain: a-b close, b-c close, a-c far. Single linkage chains all
        // three below 1.1; complete linkage does not.
        let m = matrix_from(
            &["a", "b", "c"],
            vec![
                vec![0.0, 1.0, 3.0],
                vec![1.0, 0.0, 1.0],
                vec![3.0, 1.0, 0.0],
            ],
        );
        let single = Dendrogram::build(&m, LinkageMethod::Single);
        assert_eq!(single.cut(1.1).n_clusters, 1);
        let complete = Dendrogram::build(&m, LinkageMethod::Complete);
        assert_eq!(complete.cut(1.1).n_clusters, 2);
    }

    #[test]
    fn test_average_linkage_recomputed_exactly() {
        // After merging {a, b}, the distance to c must be the mean of the
        // original a-c and b-c distances.
        let m = matrix_from(
            &["a", "b", "c"],
            vec![
                vec![0.0, 0.1, 0.4],
                vec![0.1, 0.0, 0.8],
                vec![0.4, 0.8, 0.0],
            ],
        );
        let tree = Dendrogram::build(&m, LinkageMethod::Average);
        assert_eq!(tree.merges.len(), 2);
        assert!((tree.merges[0].height - 0.1).abs() < 1e-12);
        assert!((tree.merges[1].height - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_cluster_of_lookup() {
        let m = two_group_matrix();
        let flat = Dendrogram::build(&m, LinkageMethod::Average).cut(0.2);
        assert_eq!(flat.cluster_of("A"), Some(0));
        assert_eq!(flat.cluster_of("F"), Some(1));
        assert_eq!(flat.cluster_of("missing"), None);
    }
}
