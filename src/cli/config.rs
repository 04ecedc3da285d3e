// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub alignment: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub format: Option<String>,

    // Analysis settings
    pub model: Option<String>,
    pub linkage: Option<String>,
    pub cut_threshold: Option<f64>,
    pub k_min: Option<usize>,
    pub k_max: Option<usize>,
    pub seed: Option<u64>,
    pub min_sites: Option<usize>,

    // Performance
    pub threads: Option<usize>,

    // Sample filtering
    pub include_samples: Option<String>,
    pub exclude_samples: Option<String>,
    pub include_samples_list: Option<String>,
    pub exclude_samples_list: Option<String>,

    // Flags
    pub json: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# taxoclust.toml - Configuration file for taxoclust
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Aligned FASTA files, one per gene
alignment = ["/path/to/coi.aligned.fasta", "/path/to/cytb.aligned.fasta"]

# Output directory for per-gene result files
output_dir = "results"

# Distance matrix format: tsv, csv, phylip, nexus
format = "tsv"

# =============================================================================
# ANALYSIS SETTINGS
# =============================================================================

# Substitution model: p, jc69, k2p
model = "k2p"

# Linkage method: single, complete, average
linkage = "average"

# Dendrogram cut threshold in model distance units
cut_threshold = 0.03

# Candidate cluster count range (k_max is capped at n-1)
k_min = 2
k_max = 8

# Base random seed; gene i uses seed + i
seed = 42

# Minimum comparable sites required per sequence pair
min_sites = 1

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8

# =============================================================================
# SAMPLE FILTERING
# =============================================================================

# Include only sequences matching regex pattern
# include_samples = "Felis.*"

# Exclude sequences matching regex pattern
# exclude_samples = "outgroup.*"

# Include only sequences listed in a file (one label per line)
# include_samples_list = "keep.txt"

# Exclude sequences listed in a file (one label per line)
# exclude_samples_list = "drop.txt"

# =============================================================================
# FLAGS
# =============================================================================

# Also write the full per-gene analysis as JSON
json = false

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}
