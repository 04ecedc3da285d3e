// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.alignment.is_empty() {
            if let Some(alignment) = config.alignment {
                self.alignment = alignment;
            }
        }
        if self.output_dir == "." && config.output_dir.is_some() {
            self.output_dir = config.output_dir.unwrap();
        }
        if self.format == "tsv" && config.format.is_some() {
            self.format = config.format.unwrap();
        }

        // Analysis settings (only override defaults, not explicit CLI values)
        if self.model == "k2p" && config.model.is_some() {
            self.model = config.model.unwrap();
        }
        if self.linkage == "average" && config.linkage.is_some() {
            self.linkage = config.linkage.unwrap();
        }
        if self.cut_threshold == 0.03 && config.cut_threshold.is_some() {
            self.cut_threshold = config.cut_threshold.unwrap();
        }
        if self.k_min == 2 && config.k_min.is_some() {
            self.k_min = config.k_min.unwrap();
        }
        if self.k_max == 8 && config.k_max.is_some() {
            self.k_max = config.k_max.unwrap();
        }
        if self.seed == 42 && config.seed.is_some() {
            self.seed = config.seed.unwrap();
        }
        if self.min_sites == 1 && config.min_sites.is_some() {
            self.min_sites = config.min_sites.unwrap();
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Sample filtering
        if self.include_samples.is_none() {
            self.include_samples = config.include_samples;
        }
        if self.exclude_samples.is_none() {
            self.exclude_samples = config.exclude_samples;
        }
        if self.include_samples_list.is_none() {
            self.include_samples_list = config.include_samples_list;
        }
        if self.exclude_samples_list.is_none() {
            self.exclude_samples_list = config.exclude_samples_list;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.json && config.json.unwrap_or(false) {
            self.json = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
