// mod.rs - Output formatters module

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::distance::DistanceMatrix;
use crate::core::pipeline::GeneAnalysis;

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

fn open_writer(file_path: &str) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    Ok(BufWriter::new(file))
}

fn write_comment_header(
    writer: &mut BufWriter<File>,
    command_line: &str,
) -> Result<(), String> {
    writeln!(writer, "# Command: {}", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(
        writer,
        "# Generated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "# taxoclust v{}", env!("CARGO_PKG_VERSION"))
        .map_err(|e| format!("Write error: {}", e))?;
    Ok(())
}

/// Write distance matrix in TSV format
pub fn write_tsv(
    file_path: &str,
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = open_writer(file_path)?;
    write_comment_header(&mut writer, command_line)?;

    // Write header
    write!(writer, "Label").map_err(|e| format!("Write error: {}", e))?;
    for label in matrix.labels() {
        write!(writer, "\t{}", label).map_err(|e| format!("Write error: {}", e))?;
    }
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;

    // Write matrix
    for (i, label) in matrix.labels().iter().enumerate() {
        write!(writer, "{}", label).map_err(|e| format!("Write error: {}", e))?;
        for j in 0..matrix.n() {
            write!(writer, "\t{:.6}", matrix.get(i, j)).map_err(|e| format!("Write error: {}", e))?;
        }
        writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Distance matrix written to: {}", file_path);
    Ok(())
}

/// Write distance matrix in CSV format
pub fn write_csv(
    file_path: &str,
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = open_writer(file_path)?;
    write_comment_header(&mut writer, command_line)?;

    // Write header
    write!(writer, "Label").map_err(|e| format!("Write error: {}", e))?;
    for label in matrix.labels() {
        write!(writer, ",{}", label).map_err(|e| format!("Write error: {}", e))?;
    }
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;

    // Write matrix
    for (i, label) in matrix.labels().iter().enumerate() {
        write!(writer, "{}", label).map_err(|e| format!("Write error: {}", e))?;
        for j in 0..matrix.n() {
            write!(writer, ",{:.6}", matrix.get(i, j)).map_err(|e| format!("Write error: {}", e))?;
        }
        writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Distance matrix written to: {}", file_path);
    Ok(())
}

/// Write distance matrix in PHYLIP format
pub fn write_phylip(
    file_path: &str,
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = open_writer(file_path)?;

    // Write header
    writeln!(writer, "    {}", matrix.n()).map_err(|e| format!("Write error: {}", e))?;

    // Write matrix (lower triangle)
    for (i, label) in matrix.labels().iter().enumerate() {
        write!(writer, "{:<10}", label).map_err(|e| format!("Write error: {}", e))?;
        for j in 0..=i {
            write!(writer, "  {:.6}", matrix.get(i, j)).map_err(|e| format!("Write error: {}", e))?;
        }
        writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    }

    // Add command info as comments at the end (some PHYLIP parsers ignore trailing content)
    writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    write_comment_header(&mut writer, command_line)?;

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Distance matrix written to: {} (PHYLIP format)", file_path);
    Ok(())
}

/// Write distance matrix in NEXUS format
pub fn write_nexus(
    file_path: &str,
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = open_writer(file_path)?;

    // Write NEXUS header with command info
    writeln!(writer, "#NEXUS").map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "[Command: {}]", command_line).map_err(|e| format!("Write error: {}", e))?;
    writeln!(
        writer,
        "[Generated: {}]",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
    .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "[taxoclust v{}]", env!("CARGO_PKG_VERSION"))
        .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "BEGIN DISTANCES;").map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "    DIMENSIONS NTAX={};", matrix.n())
        .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "    FORMAT LABELS LOWER DIAGONAL;")
        .map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "    MATRIX").map_err(|e| format!("Write error: {}", e))?;

    // Write matrix (lower triangle)
    for (i, label) in matrix.labels().iter().enumerate() {
        write!(writer, "        {}", label).map_err(|e| format!("Write error: {}", e))?;
        for j in 0..i {
            write!(writer, " {:.6}", matrix.get(i, j)).map_err(|e| format!("Write error: {}", e))?;
        }
        writeln!(writer).map_err(|e| format!("Write error: {}", e))?;
    }

    writeln!(writer, "    ;").map_err(|e| format!("Write error: {}", e))?;
    writeln!(writer, "END;").map_err(|e| format!("Write error: {}", e))?;

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Distance matrix written to: {} (NEXUS format)", file_path);
    Ok(())
}

/// Write distance matrix in the specified format
pub fn write_matrix(
    file_path: &str,
    format: &str,
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    match format.to_lowercase().as_str() {
        "tsv" => write_tsv(file_path, matrix, command_line),
        "csv" => write_csv(file_path, matrix, command_line),
        "phylip" => write_phylip(file_path, matrix, command_line),
        "nexus" => write_nexus(file_path, matrix, command_line),
        _ => Err(format!(
            "Unsupported output format: {}. Use: tsv, csv, phylip, nexus",
            format
        )),
    }
}

/// Write hierarchical and centroid cluster assignments side by side (TSV)
pub fn write_clusters(
    file_path: &str,
    analysis: &GeneAnalysis,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = open_writer(file_path)?;
    write_comment_header(&mut writer, command_line)?;

    writeln!(writer, "Label\thierarchical_cluster\tcentroid_cluster")
        .map_err(|e| format!("Write error: {}", e))?;
    for (i, label) in analysis.flat.labels.iter().enumerate() {
        writeln!(
            writer,
            "{}\t{}\t{}",
            label, analysis.flat.assignments[i], analysis.partition.assignments[i]
        )
        .map_err(|e| format!("Write error: {}", e))?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Cluster assignments written to: {}", file_path);
    Ok(())
}

/// Write the silhouette score curve as CSV (one row per candidate k)
pub fn write_score_curve(file_path: &str, analysis: &GeneAnalysis) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let mut writer = csv::Writer::from_path(file_path)
        .map_err(|e| format!("Failed to create score curve file '{}': {}", file_path, e))?;

    writer
        .write_record(["k", "mean_silhouette", "selected"])
        .map_err(|e| format!("Write error: {}", e))?;
    for score in &analysis.selection.scores {
        writer
            .write_record([
                score.k.to_string(),
                format!("{:.6}", score.silhouette),
                (score.k == analysis.selection.best_k).to_string(),
            ])
            .map_err(|e| format!("Write error: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Silhouette curve written to: {}", file_path);
    Ok(())
}

/// Serialize the complete per-gene result (matrix, dendrogram, clusterings,
/// score curve) as JSON for downstream reporting tools
pub fn write_json(file_path: &str, analysis: &GeneAnalysis) -> Result<(), String> {
    ensure_parent_dir(file_path)?;
    let json = serde_json::to_vec_pretty(analysis)
        .map_err(|e| format!("Failed to serialize analysis: {}", e))?;
    std::fs::write(file_path, &json)
        .map_err(|e| format!("Failed to write JSON file '{}': {}", file_path, e))?;
    println!(
        "✅ Full analysis written to: {} ({} KB)",
        file_path,
        json.len() / 1024
    );
    Ok(())
}
