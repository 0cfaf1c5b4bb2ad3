use std::path::Path;

use anyhow::{anyhow, Context, Result};
use bindiff_core::services::PortReport;

use crate::commands::{open_session, SessionOptions};

/// Port names into the symbol file for the selected rows.
///
/// Each row is decided independently; refusals are reported and the rest of
/// the selection continues. The symbol file is rewritten unless `dry_run`.
pub fn port_symbols_command(
    opts: &SessionOptions,
    rows: &[usize],
    all: bool,
    dry_run: bool,
    json: bool,
) -> Result<Vec<PortReport>> {
    if opts.role.live_side().is_none() {
        println!("Porting disabled: no role selected (use --role primary or --role secondary)");
        return Ok(Vec::new());
    }
    if rows.is_empty() && !all {
        return Err(anyhow!("Specify --rows or use --all"));
    }
    let symbols_path = match (&opts.symbols, dry_run) {
        (Some(p), _) => Some(p.clone()),
        (None, true) => None,
        (None, false) => return Err(anyhow!("--symbols is required unless --dry-run is set")),
    };

    let (_config, mut session) = open_session(opts)?;
    let selection: Vec<usize> =
        if all { (0..session.table().len()).collect() } else { rows.to_vec() };
    let reports = session.port_rows(selection);
    let ported = reports.iter().filter(|r| r.outcome.is_ported()).count();

    if json {
        let body = serde_json::to_string_pretty(&reports)
            .context("Failed to serialize port reports to JSON")?;
        println!("{body}");
    } else {
        for report in &reports {
            println!("[{}] {}", report.row, report.outcome);
        }
        println!("Ported {} of {} rows", ported, reports.len());
    }

    match symbols_path {
        Some(path) if !dry_run => {
            let symbols = session.into_host();
            symbols.save(Path::new(&path))?;
            tracing::info!(path = %path, symbols = symbols.len(), "saved symbol file");
        }
        _ => {
            if !json {
                println!("Dry run: symbol file not written");
            }
        }
    }
    Ok(reports)
}
