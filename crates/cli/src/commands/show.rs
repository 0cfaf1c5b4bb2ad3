use anyhow::{anyhow, Context, Result};
use bindiff_core::model::Side;
use bindiff_core::services::{CellColor, Column, MatchRow, MatchTable};
use serde::Serialize;

use crate::commands::{open_session, SessionOptions};

/// JSON shape of one displayed row.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRowView {
    pub row: usize,
    pub similarity: f64,
    pub confidence: f64,
    pub primary_address: String,
    pub primary_name: String,
    pub secondary_address: String,
    pub secondary_name: String,
    pub algorithm: String,
}

impl MatchRowView {
    pub fn new(row: usize, r: &MatchRow) -> Self {
        Self {
            row,
            similarity: r.matched.record.similarity,
            confidence: r.matched.record.confidence,
            primary_address: r.display(Column::PrimaryAddress),
            primary_name: r.display(Column::PrimaryName),
            secondary_address: r.display(Column::SecondaryAddress),
            secondary_name: r.display(Column::SecondaryName),
            algorithm: r.display(Column::Algorithm),
        }
    }
}

/// Load a match database and print the match table.
pub fn show_matches_command(
    opts: &SessionOptions,
    json: bool,
    color: bool,
    limit: Option<usize>,
) -> Result<()> {
    let (_config, session) = open_session(opts)?;
    let table = session.table();
    let shown = limit.unwrap_or(table.len()).min(table.len());

    if json {
        let rows: Vec<MatchRowView> = table
            .rows()
            .iter()
            .take(shown)
            .enumerate()
            .map(|(i, r)| MatchRowView::new(i, r))
            .collect();
        let body =
            serde_json::to_string_pretty(&rows).context("Failed to serialize matches to JSON")?;
        println!("{body}");
        return Ok(());
    }

    println!(
        "{} matches (role: {}, primary: {}, secondary: {})",
        table.len(),
        session.role(),
        session.file(Side::Primary).filename,
        session.file(Side::Secondary).filename,
    );
    if table.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for line in render_table(table, shown, color) {
        println!("{line}");
    }
    if shown < table.len() {
        println!("... {} more", table.len() - shown);
    }
    Ok(())
}

/// Render the first `limit` rows as aligned text, header first.
///
/// The leading `#` column is the row index used by `port` and `locate`.
pub fn render_table(table: &MatchTable, limit: usize, color: bool) -> Vec<String> {
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| {
            let mut cells = vec![i.to_string()];
            cells.extend(Column::ALL.iter().map(|c| r.display(*c)));
            cells
        })
        .collect();

    let mut headers = vec!["#"];
    headers.extend(Column::ALL.iter().map(|c| c.header()));
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for cells in &rows {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(join_cells(headers.iter().map(|h| h.to_string()), &widths));
    for (i, cells) in rows.into_iter().enumerate() {
        let row = &table.rows()[i];
        let padded = cells.into_iter().enumerate().map(|(col, cell)| {
            let text = format!("{cell:<width$}", width = widths[col]);
            let background = col
                .checked_sub(1)
                .and_then(Column::from_index)
                .filter(|c| c.is_score())
                .and_then(|c| row.background(c));
            match background {
                Some(bg) if color => paint(&text, bg),
                _ => text,
            }
        });
        out.push(padded.collect::<Vec<_>>().join("  ").trim_end().to_string());
    }
    out
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Wrap `text` in a 24-bit ANSI background colour.
fn paint(text: &str, color: CellColor) -> String {
    let (r, g, b) = color.to_rgb();
    format!("\x1b[48;2;{r};{g};{b}m{text}\x1b[0m")
}

/// Print the live-side address of a row (where a host would navigate to).
pub fn locate_command(opts: &SessionOptions, row: usize) -> Result<()> {
    if opts.role.live_side().is_none() {
        return Err(anyhow!("Navigation requires --role primary or --role secondary"));
    }
    let (_config, session) = open_session(opts)?;
    if session.table().row(row).is_none() {
        return Err(anyhow!("Row {} does not exist ({} rows)", row, session.table().len()));
    }
    let address = session
        .live_address(row)
        .ok_or_else(|| anyhow!("Row {} has no {} address", row, session.role()))?;
    println!("{address:x}");
    Ok(())
}
