// validation.rs - Input validation utilities

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::str::FromStr;

use regex::Regex;

use crate::cli::args::Args;
use crate::core::{LinkageMethod, SubstitutionModel};

pub struct ValidationResult {
    pub model: SubstitutionModel,
    pub linkage: LinkageMethod,
    pub sample_include_regex: Option<Regex>,
    pub sample_exclude_regex: Option<Regex>,
    pub samples_include_set: Option<HashSet<String>>,
    pub samples_exclude_set: Option<HashSet<String>>,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    if args.alignment.is_empty() {
        return Err("--alignment is required (one aligned FASTA per gene)".to_string());
    }

    // Validate model and linkage strings
    let model = SubstitutionModel::from_str(&args.model)?;
    let linkage = LinkageMethod::from_str(&args.linkage)?;

    // Validate the candidate range
    if args.k_min < 2 {
        return Err(format!(
            "--k-min must be at least 2 (a 1-cluster partition has no silhouette), got {}",
            args.k_min
        ));
    }
    if args.k_max < args.k_min {
        return Err(format!(
            "--k-max ({}) must be >= --k-min ({})",
            args.k_max, args.k_min
        ));
    }

    if args.cut_threshold < 0.0 {
        return Err(format!(
            "--cut-threshold must be non-negative, got {}",
            args.cut_threshold
        ));
    }

    if !args.cut_threshold.is_finite() {
        return Err("--cut-threshold must be finite".to_string());
    }

    // Validate output format early so no time is wasted computing first
    match args.format.to_lowercase().as_str() {
        "tsv" | "csv" | "phylip" | "nexus" => {}
        other => {
            return Err(format!(
                "Unsupported output format: {}. Use: tsv, csv, phylip, nexus",
                other
            ))
        }
    }

    // Compile sample filtering regexes
    let sample_include_regex = compile_regex(args.include_samples.as_deref(), "--include-samples")?;
    let sample_exclude_regex = compile_regex(args.exclude_samples.as_deref(), "--exclude-samples")?;

    // Load sample list files
    let samples_include_set = load_list_file(args.include_samples_list.as_deref())?;
    let samples_exclude_set = load_list_file(args.exclude_samples_list.as_deref())?;

    Ok(ValidationResult {
        model,
        linkage,
        sample_include_regex,
        sample_exclude_regex,
        samples_include_set,
        samples_exclude_set,
    })
}

fn compile_regex(pattern: Option<&str>, flag: &str) -> Result<Option<Regex>, String> {
    match pattern {
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| format!("Invalid regex for {}: {}", flag, e)),
        None => Ok(None),
    }
}

/// Read a one-label-per-line list file, skipping blanks and '#' comments
fn load_list_file(path: Option<&str>) -> Result<Option<HashSet<String>>, String> {
    let path = match path {
        Some(p) => p,
        None => return Ok(None),
    };

    let file = File::open(path).map_err(|e| format!("Failed to open list file '{}': {}", path, e))?;
    let mut set = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| format!("Failed to read list file '{}': {}", path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        set.insert(trimmed.to_string());
    }

    if set.is_empty() {
        return Err(format!("List file '{}' contains no labels", path));
    }
    Ok(Some(set))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_args() -> Args {
        Args {
            alignment: vec!["coi.fasta".to_string()],
            output_dir: ".".to_string(),
            format: "tsv".to_string(),
            model: "k2p".to_string(),
            linkage: "average".to_string(),
            cut_threshold: 0.03,
            k_min: 2,
            k_max: 8,
            seed: 42,
            min_sites: 1,
            threads: None,
            include_samples: None,
            exclude_samples: None,
            include_samples_list: None,
            exclude_samples_list: None,
            json: false,
            stats_only: false,
            dry_run: false,
            config: None,
            generate_config: false,
        }
    }

    #[test]
    fn test_valid_args_pass() {
        let result = validate_args(&valid_args()).unwrap();
        assert_eq!(result.model, SubstitutionModel::Kimura2P);
        assert_eq!(result.linkage, LinkageMethod::Average);
    }

    #[test]
    fn test_missing_alignment_rejected() {
        let mut args = valid_args();
        args.alignment.clear();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_bad_model_rejected() {
        let mut args = valid_args();
        args.model = "gtr".to_string();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_bad_k_range_rejected() {
        let mut args = valid_args();
        args.k_min = 1;
        assert!(validate_args(&args).is_err());

        let mut args = valid_args();
        args.k_min = 5;
        args.k_max = 3;
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_bad_format_rejected() {
        let mut args = valid_args();
        args.format = "xlsx".to_string();
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_bad_regex_rejected() {
        let mut args = valid_args();
        args.include_samples = Some("([unclosed".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut args = valid_args();
        args.cut_threshold = -0.5;
        assert!(validate_args(&args).is_err());
    }
}
