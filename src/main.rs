// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;

use taxoclust::cli::Config;
use taxoclust::output;
use taxoclust::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    println!("🚀 taxoclust v{}", env!("CARGO_PKG_VERSION"));

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .expect("Failed to configure thread pool");
        println!("🧵 Threads: {}", n);
    } else {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    }

    // Validate all arguments
    let validation = validate_args(&args)?;

    println!("🧬 Substitution model: {}", validation.model.description());
    println!("🌳 Linkage: {}, cut threshold: {}", validation.linkage.description(), args.cut_threshold);
    println!("🎲 Candidate range: k={}..{}, base seed: {}", args.k_min, args.k_max, args.seed);

    let total_start = Instant::now();

    // Load every gene's alignment up front so input problems surface before
    // any computation starts
    let mut sets = Vec::with_capacity(args.alignment.len());
    for path in &args.alignment {
        let mut set = SequenceSet::from_fasta(Path::new(path))?;
        set.apply_sample_filtering(
            validation.sample_include_regex.as_ref(),
            validation.sample_exclude_regex.as_ref(),
            validation.samples_include_set.as_ref(),
            validation.samples_exclude_set.as_ref(),
        )?;
        set.print_statistics("ALIGNMENT");
        sets.push(set);
    }

    if args.dry_run {
        println!("✅ Dry run completed successfully ({} gene(s) validated)", sets.len());
        return Ok(());
    }

    if args.stats_only {
        println!("\n✅ Statistics analysis completed");
        return Ok(());
    }

    // Each gene's chain is independent: one gene failing (insufficient
    // overlap, saturation, degenerate k-range) must not abort its siblings.
    // Gene i gets seed base+i for independently reproducible results.
    let mut failures: Vec<(String, String)> = Vec::new();
    let mut completed = 0usize;

    for (gene_index, set) in sets.iter().enumerate() {
        let options = AnalysisOptions {
            model: validation.model,
            linkage: validation.linkage,
            cut_threshold: args.cut_threshold,
            k_min: args.k_min,
            k_max: args.k_max,
            seed: args.seed + gene_index as u64,
            min_sites: args.min_sites,
        };

        let analysis = match analyze_gene(set, &options) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("❌ Gene '{}' failed: {}", set.gene, e);
                failures.push((set.gene.clone(), e.to_string()));
                continue;
            }
        };

        if let Err(e) = write_gene_outputs(&args, &analysis, &command_line) {
            eprintln!("❌ Gene '{}' output failed: {}", set.gene, e);
            failures.push((set.gene.clone(), e));
            continue;
        }
        completed += 1;
    }

    println!(
        "\n🏁 {} of {} gene(s) completed in {:.2}s",
        completed,
        sets.len(),
        total_start.elapsed().as_secs_f64()
    );

    if !failures.is_empty() {
        println!("⚠️  Failed genes:");
        for (gene, error) in &failures {
            println!("   • {}: {}", gene, error);
        }
    }

    if completed == 0 {
        return Err("every gene failed".to_string());
    }
    Ok(())
}

/// Write the per-gene artifact files into the output directory
fn write_gene_outputs(
    args: &Args,
    analysis: &taxoclust::GeneAnalysis,
    command_line: &str,
) -> Result<(), String> {
    let extension = match args.format.to_lowercase().as_str() {
        "csv" => "csv",
        "phylip" => "phy",
        "nexus" => "nex",
        _ => "tsv",
    };
    let stem = format!("{}/{}", args.output_dir, analysis.gene);

    output::write_matrix(
        &format!("{}.distances.{}", stem, extension),
        &args.format,
        &analysis.matrix,
        command_line,
    )?;
    output::write_clusters(&format!("{}.clusters.tsv", stem), analysis, command_line)?;
    output::write_score_curve(&format!("{}.silhouette.csv", stem), analysis)?;
    if args.json {
        output::write_json(&format!("{}.json", stem), analysis)?;
    }
    Ok(())
}
