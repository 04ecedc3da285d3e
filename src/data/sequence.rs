// sequence.rs - Aligned sequence set loading and filtering

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bio::io::fasta;
use regex::Regex;
use serde::Serialize;

/// A single aligned nucleotide sequence: an identifier plus bases over
/// {A,C,G,T, gap, ambiguity codes}, uppercased on load.
#[derive(Debug, Clone, Serialize)]
pub struct AlignedSequence {
    pub id: String,
    #[serde(skip)]
    pub bases: Vec<u8>,
}

impl AlignedSequence {
    pub fn new(id: impl Into<String>, bases: impl Into<Vec<u8>>) -> Self {
        let mut bases = bases.into();
        bases.make_ascii_uppercase();
        Self {
            id: id.into(),
            bases,
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Named, ordered collection of equal-length aligned sequences for one gene.
///
/// Insertion order is significant: it fixes the row/column order of the
/// distance matrix built from this set.
#[derive(Debug, Clone)]
pub struct SequenceSet {
    pub gene: String,
    pub sequences: Vec<AlignedSequence>,
}

impl SequenceSet {
    pub fn new(gene: impl Into<String>) -> Self {
        Self {
            gene: gene.into(),
            sequences: Vec::new(),
        }
    }

    /// Build a set from (id, bases) pairs, validating the equal-length
    /// invariant and deduplicating labels.
    pub fn from_records(
        gene: impl Into<String>,
        records: Vec<(String, Vec<u8>)>,
    ) -> Result<Self, String> {
        let mut set = Self::new(gene);
        for (id, bases) in records {
            set.sequences.push(AlignedSequence::new(id, bases));
        }
        set.validate_alignment()?;
        set.dedup_labels();
        Ok(set)
    }

    /// Load an aligned FASTA file. The gene name is taken from the file stem.
    pub fn from_fasta(path: &Path) -> Result<Self, String> {
        let gene = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| format!("Cannot derive gene name from path: {}", path.display()))?
            .to_string();

        println!(
            "🧬 Loading aligned FASTA for gene '{}': {}",
            gene,
            path.display()
        );

        let file = File::open(path)
            .map_err(|e| format!("Failed to open FASTA file {}: {}", path.display(), e))?;
        let reader = fasta::Reader::new(BufReader::new(file));

        let mut set = Self::new(gene);
        for record_result in reader.records() {
            let record = record_result
                .map_err(|e| format!("Invalid FASTA record in {}: {}", path.display(), e))?;
            set.sequences
                .push(AlignedSequence::new(record.id(), record.seq()));
        }

        if set.sequences.is_empty() {
            return Err(format!("No sequences found in {}", path.display()));
        }

        set.validate_alignment()
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let renamed = set.dedup_labels();
        if renamed > 0 {
            println!(
                "⚠️  Renamed {} duplicate label(s) in gene '{}' with numeric suffixes",
                renamed, set.gene
            );
        }

        println!(
            "✅ Gene '{}' loaded: {} sequences × {} aligned columns",
            set.gene,
            set.sequences.len(),
            set.alignment_length()
        );
        Ok(set)
    }

    /// Aligned column count (0 for an empty set).
    pub fn alignment_length(&self) -> usize {
        self.sequences.first().map(|s| s.len()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Labels in row order.
    pub fn labels(&self) -> Vec<String> {
        self.sequences.iter().map(|s| s.id.clone()).collect()
    }

    /// Check the post-alignment invariant: every sequence has the same length.
    fn validate_alignment(&self) -> Result<(), String> {
        let expected = self.alignment_length();
        if expected == 0 {
            return Err("alignment has zero columns".to_string());
        }
        for seq in &self.sequences {
            if seq.len() != expected {
                return Err(format!(
                    "sequence '{}' has length {}, expected {} (input is not an alignment)",
                    seq.id,
                    seq.len(),
                    expected
                ));
            }
        }
        Ok(())
    }

    /// Disambiguate duplicate identifiers by appending a numeric suffix.
    ///
    /// The first occurrence keeps its name; later ones become `name_2`,
    /// `name_3`, ... Duplicates are never silently merged. Returns the number
    /// of renamed sequences.
    pub fn dedup_labels(&mut self) -> usize {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut taken: HashSet<String> = self.sequences.iter().map(|s| s.id.clone()).collect();
        let mut renamed = 0;

        for seq in &mut self.sequences {
            let count = seen.entry(seq.id.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                let mut suffix = *count;
                let mut candidate = format!("{}_{}", seq.id, suffix);
                while taken.contains(&candidate) {
                    suffix += 1;
                    candidate = format!("{}_{}", seq.id, suffix);
                }
                taken.insert(candidate.clone());
                seq.id = candidate;
                renamed += 1;
            }
        }
        renamed
    }

    /// Drop sequences according to include/exclude regexes and explicit
    /// label sets. Include rules are applied before exclude rules.
    pub fn apply_sample_filtering(
        &mut self,
        include: Option<&Regex>,
        exclude: Option<&Regex>,
        include_set: Option<&HashSet<String>>,
        exclude_set: Option<&HashSet<String>>,
    ) -> Result<(), String> {
        if include.is_none() && exclude.is_none() && include_set.is_none() && exclude_set.is_none()
        {
            return Ok(());
        }

        let initial = self.sequences.len();
        self.sequences.retain(|seq| {
            if let Some(re) = include {
                if !re.is_match(&seq.id) {
                    return false;
                }
            }
            if let Some(set) = include_set {
                if !set.contains(&seq.id) {
                    return false;
                }
            }
            if let Some(re) = exclude {
                if re.is_match(&seq.id) {
                    return false;
                }
            }
            if let Some(set) = exclude_set {
                if set.contains(&seq.id) {
                    return false;
                }
            }
            true
        });

        let removed = initial - self.sequences.len();
        if removed > 0 {
            println!(
                "🔍 Sample filtering for gene '{}': {} removed, {} retained",
                self.gene,
                removed,
                self.sequences.len()
            );
        }
        if self.sequences.is_empty() {
            return Err(format!(
                "sample filtering removed every sequence of gene '{}'",
                self.gene
            ));
        }
        Ok(())
    }

    /// Summary statistics printout for a pipeline stage.
    pub fn print_statistics(&self, stage: &str) {
        let n = self.sequences.len();
        let cols = self.alignment_length();
        let total_bases: usize = n * cols;
        let determined: usize = self
            .sequences
            .iter()
            .map(|s| {
                s.bases
                    .iter()
                    .filter(|&&b| crate::core::model::is_determined(b))
                    .count()
            })
            .sum();
        let completeness = if total_bases > 0 {
            determined as f64 / total_bases as f64 * 100.0
        } else {
            0.0
        };
        println!("📊 {} [{}]:", stage, self.gene);
        println!("   • Sequences: {}", n);
        println!("   • Aligned columns: {}", cols);
        println!("   • Determined bases: {:.1}%", completeness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(records: &[(&str, &str)]) -> SequenceSet {
        SequenceSet::from_records(
            "coi",
            records
                .iter()
                .map(|(id, s)| (id.to_string(), s.as_bytes().to_vec()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_equal_length_invariant() {
        let result = SequenceSet::from_records(
            "coi",
            vec![
                ("a".to_string(), b"ACGT".to_vec()),
                ("b".to_string(), b"ACG".to_vec()),
            ],
        );
        let err = result.unwrap_err();
        assert!(err.contains("'b'"));
        assert!(err.contains("not an alignment"));
    }

    #[test]
    fn test_lowercase_input_uppercased() {
        let set = set_of(&[("a", "acgt"), ("b", "ACGT")]);
        assert_eq!(set.sequences[0].bases, b"ACGT");
    }

    #[test]
    fn test_dedup_labels_suffixes() {
        let set = set_of(&[("dup", "ACGT"), ("dup", "ACGA"), ("dup", "ACGC")]);
        assert_eq!(set.labels(), vec!["dup", "dup_2", "dup_3"]);
    }

    #[test]
    fn test_dedup_avoids_existing_names() {
        // A later duplicate must not collide with an id that already exists.
        let set = set_of(&[("s", "ACGT"), ("s_2", "ACGA"), ("s", "ACGC")]);
        let labels = set.labels();
        assert_eq!(labels[0], "s");
        assert_eq!(labels[1], "s_2");
        assert_ne!(labels[2], "s_2");
        assert!(labels[2].starts_with("s_"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let set = set_of(&[("z", "ACGT"), ("a", "ACGT"), ("m", "ACGT")]);
        assert_eq!(set.labels(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_include_regex_filtering() {
        let mut set = set_of(&[("sp1_x", "ACGT"), ("sp2_y", "ACGT"), ("ctl_z", "ACGT")]);
        let include = Regex::new("^sp").unwrap();
        set.apply_sample_filtering(Some(&include), None, None, None)
            .unwrap();
        assert_eq!(set.labels(), vec!["sp1_x", "sp2_y"]);
    }

    #[test]
    fn test_exclude_set_filtering() {
        let mut set = set_of(&[("a", "ACGT"), ("b", "ACGT")]);
        let mut exclude = HashSet::new();
        exclude.insert("b".to_string());
        set.apply_sample_filtering(None, None, None, Some(&exclude))
            .unwrap();
        assert_eq!(set.labels(), vec!["a"]);
    }

    #[test]
    fn test_filtering_everything_is_an_error() {
        let mut set = set_of(&[("a", "ACGT")]);
        let exclude = Regex::new(".").unwrap();
        assert!(set
            .apply_sample_filtering(None, Some(&exclude), None, None)
            .is_err());
    }
}
