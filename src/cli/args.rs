// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// taxoclust - Genetic distance and cluster analysis for aligned gene sequences
pub struct Args {
    /// aligned FASTA file for one gene (repeat for multiple genes)
    #[argh(option)]
    pub alignment: Vec<String>,

    /// output directory for per-gene result files (default: .)
    #[argh(option, default = "String::from(\".\")")]
    pub output_dir: String,

    /// distance matrix format: tsv, csv, phylip, nexus (default: tsv)
    #[argh(option, default = "String::from(\"tsv\")")]
    pub format: String,

    /// substitution model: p, jc69, k2p (default: k2p)
    #[argh(option, default = "String::from(\"k2p\")")]
    pub model: String,

    /// linkage method: single, complete, average (default: average)
    #[argh(option, default = "String::from(\"average\")")]
    pub linkage: String,

    /// dendrogram cut threshold in model distance units (default: 0.03)
    #[argh(option, default = "0.03")]
    pub cut_threshold: f64,

    /// smallest candidate cluster count (default: 2)
    #[argh(option, default = "2")]
    pub k_min: usize,

    /// largest candidate cluster count, capped at n-1 (default: 8)
    #[argh(option, default = "8")]
    pub k_max: usize,

    /// base random seed; gene i uses seed + i (default: 42)
    #[argh(option, default = "42")]
    pub seed: u64,

    /// minimum comparable sites required per sequence pair (default: 1)
    #[argh(option, default = "1")]
    pub min_sites: usize,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// include only sequences matching regex pattern
    #[argh(option)]
    pub include_samples: Option<String>,

    /// exclude sequences matching regex pattern
    #[argh(option)]
    pub exclude_samples: Option<String>,

    /// include only sequences listed in a file (one label per line)
    #[argh(option)]
    pub include_samples_list: Option<String>,

    /// exclude sequences listed in a file (one label per line)
    #[argh(option)]
    pub exclude_samples_list: Option<String>,

    /// also write the full per-gene analysis as JSON
    #[argh(switch)]
    pub json: bool,

    /// show alignment statistics only, then exit
    #[argh(switch)]
    pub stats_only: bool,

    /// validate inputs without computation (dry run)
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
