use std::path::Path;

use anyhow::{anyhow, Context, Result};
use bindiff_core::db::{load_viewer_config_or_default, DiffLayout, FileRecord, MatchDb};
use bindiff_core::model::{Role, Side};
use bindiff_core::services::LoadedExport;

use crate::{format_timestamp, sha256_file};

/// Show metadata, compared files and export summaries of a match database.
///
/// Exports are reported individually; a missing or malformed export is shown
/// rather than failing the command. With `binary` and a definite `role`, the
/// binary's SHA-256 is checked against that side's recorded hash.
pub fn match_info_command(
    db_path: &str,
    config: Option<&str>,
    binary: Option<&str>,
    role: Role,
) -> Result<()> {
    let config = load_viewer_config_or_default(config.map(Path::new))?;
    let db = MatchDb::open_read_only(Path::new(db_path))
        .with_context(|| format!("Failed to load matches from {db_path}"))?;
    let metadata = db.metadata().context("Failed to read match metadata")?;
    let layout = DiffLayout::new(db_path, config.export_extension.as_str());

    println!("BinDiff Match Info");
    println!("==================");
    println!("Database: {}", layout.match_db_path.display());
    println!("Version: {}", metadata.version.as_deref().unwrap_or("(unknown)"));
    println!("Description: {}", metadata.description.as_deref().unwrap_or("(none)"));
    println!("Created: {}", metadata.created.as_deref().unwrap_or("(unknown)"));
    println!("Similarity: {}", format_score(metadata.similarity));
    println!("Confidence: {}", format_score(metadata.confidence));
    println!("Matches: {}", db.all_matches().context("Failed to read function matches")?.len());
    println!();

    let mut files = Vec::new();
    for side in [Side::Primary, Side::Secondary] {
        let file = db
            .file_record(metadata.file_id(side))
            .with_context(|| format!("Failed to read {} file record", side.as_str()))?;
        print_file(side, &file, &layout);
        files.push(file);
    }

    if let Some(binary) = binary {
        let side = role
            .live_side()
            .ok_or_else(|| anyhow!("--binary requires --role primary or --role secondary"))?;
        check_binary_hash(Path::new(binary), &files[side.index()])?;
    }

    Ok(())
}

fn format_score(score: Option<f64>) -> String {
    score.map(|s| format!("{s:.2}")).unwrap_or_else(|| "(unknown)".to_string())
}

fn print_file(side: Side, file: &FileRecord, layout: &DiffLayout) {
    println!("{} file:", capitalize(side.as_str()));
    println!("  Id: {}", file.id);
    println!("  Filename: {}", file.filename);
    println!("  Executable: {}", file.exe_filename.as_deref().unwrap_or("(unknown)"));
    println!("  Hash: {}", file.hash.as_deref().unwrap_or("(none)"));

    let export_path = layout.export_path(&file.filename);
    match LoadedExport::load(export_path.clone()) {
        Ok(export) => {
            println!("  Export: {}", export_path.display());
            println!(
                "    Executable name: {}",
                export.meta.executable_name.as_deref().unwrap_or("(unknown)")
            );
            println!(
                "    Architecture: {}",
                export.meta.architecture_name.as_deref().unwrap_or("(unknown)")
            );
            println!("    Exported at: {}", format_timestamp(export.meta.timestamp));
            println!(
                "    Call graph: {} functions ({} named), {} calls",
                export.vertex_count,
                export.names.len(),
                export.edge_count
            );
        }
        Err(err) => println!("  Export: unavailable ({:#})", anyhow::Error::from(err)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Compare a binary's SHA-256 with the hash recorded for its side.
pub fn check_binary_hash(binary: &Path, file: &FileRecord) -> Result<()> {
    let actual = sha256_file(binary)?;
    let expected = file
        .hash
        .as_deref()
        .ok_or_else(|| anyhow!("File record {} has no hash to compare against", file.id))?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(anyhow!(
            "Binary {} does not match {} (expected hash {}, got {})",
            binary.display(),
            file.filename,
            expected,
            actual
        ));
    }
    println!("Binary {} matches {} (hash {})", binary.display(), file.filename, actual);
    Ok(())
}
