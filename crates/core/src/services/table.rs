//! Flat, sortable projection of resolved matches.
//!
//! Every row is a top-level leaf; there is no nesting. Columns are a fixed
//! list, each with a typed sort key and a display format. Similarity and
//! confidence cells carry a red-to-green background derived from the score.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{AlgorithmNames, IntegrityError};
use crate::services::resolver::ResolvedMatch;

/// Hue (degrees) of a score of 0.
pub const LOW_HUE: f64 = 14.0;
/// Hue (degrees) of a score of 1.
pub const HIGH_HUE: f64 = 88.0;
/// HSV saturation of score cells, 0..=255.
pub const SCORE_SATURATION: u8 = 204;
/// HSV value of score cells, 0..=255.
pub const SCORE_VALUE: u8 = 153;

/// Table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Similarity,
    Confidence,
    PrimaryAddress,
    PrimaryName,
    SecondaryAddress,
    SecondaryName,
    Algorithm,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Similarity,
        Column::Confidence,
        Column::PrimaryAddress,
        Column::PrimaryName,
        Column::SecondaryAddress,
        Column::SecondaryName,
        Column::Algorithm,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Header label.
    pub fn header(self) -> &'static str {
        match self {
            Column::Similarity => "Similarity",
            Column::Confidence => "Confidence",
            Column::PrimaryAddress => "P Address",
            Column::PrimaryName => "P Name",
            Column::SecondaryAddress => "S Address",
            Column::SecondaryName => "S Name",
            Column::Algorithm => "Algorithm",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Similarity => "similarity",
            Column::Confidence => "confidence",
            Column::PrimaryAddress => "primary_address",
            Column::PrimaryName => "primary_name",
            Column::SecondaryAddress => "secondary_address",
            Column::SecondaryName => "secondary_name",
            Column::Algorithm => "algorithm",
        }
    }

    /// Score columns carry a background colour.
    pub fn is_score(self) -> bool {
        matches!(self, Column::Similarity | Column::Confidence)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error(
    "Invalid column '{0}'. Allowed: similarity, confidence, primary_address, primary_name, \
     secondary_address, secondary_name, algorithm"
)]
pub struct ParseColumnError(String);

impl FromStr for Column {
    type Err = ParseColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "similarity" => Ok(Column::Similarity),
            "confidence" => Ok(Column::Confidence),
            "primary_address" | "p_address" | "address1" => Ok(Column::PrimaryAddress),
            "primary_name" | "p_name" | "name1" => Ok(Column::PrimaryName),
            "secondary_address" | "s_address" | "address2" => Ok(Column::SecondaryAddress),
            "secondary_name" | "s_name" | "name2" => Ok(Column::SecondaryName),
            "algorithm" => Ok(Column::Algorithm),
            _ => Err(ParseColumnError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Column,
    #[serde(default)]
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self { column: Column::Similarity, order: SortOrder::Ascending }
    }
}

/// Map a score in `0..=1` linearly onto the red-orange to green hue ramp.
///
/// Out-of-range input is clamped; NaN maps to the low end.
pub fn score_hue(score: f64) -> f64 {
    let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
    LOW_HUE + score * (HIGH_HUE - LOW_HUE)
}

/// Background colour of a cell, in HSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellColor {
    /// Degrees, `0.0..360.0`.
    pub hue: f64,
    pub saturation: u8,
    pub value: u8,
}

impl CellColor {
    pub fn for_score(score: f64) -> Self {
        Self { hue: score_hue(score), saturation: SCORE_SATURATION, value: SCORE_VALUE }
    }

    /// Convert to 8-bit RGB.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = self.saturation as f64 / 255.0;
        let v = self.value as f64 / 255.0;
        let c = v * s;
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to_byte = |channel: f64| ((channel + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (to_byte(r), to_byte(g), to_byte(b))
    }
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    /// Position in load order; breaks ties so every sort is total.
    pub load_index: usize,
    #[serde(flatten)]
    pub matched: ResolvedMatch,
    /// Algorithm label, resolved when the table is built.
    pub algorithm_name: String,
}

impl MatchRow {
    /// Formatted cell text.
    pub fn display(&self, column: Column) -> String {
        let record = &self.matched.record;
        match column {
            Column::Similarity => format!("{:.2}", record.similarity),
            Column::Confidence => format!("{:.2}", record.confidence),
            Column::PrimaryAddress => format_address(record.address1),
            Column::PrimaryName => self.matched.name1.clone(),
            Column::SecondaryAddress => format_address(record.address2),
            Column::SecondaryName => self.matched.name2.clone(),
            Column::Algorithm => self.algorithm_name.clone(),
        }
    }

    /// Background colour for score columns; `None` elsewhere.
    pub fn background(&self, column: Column) -> Option<CellColor> {
        match column {
            Column::Similarity => Some(CellColor::for_score(self.matched.record.similarity)),
            Column::Confidence => Some(CellColor::for_score(self.matched.record.confidence)),
            _ => None,
        }
    }
}

fn format_address(address: Option<u64>) -> String {
    address.map(|a| format!("{a:x}")).unwrap_or_default()
}

/// Compare on the column's typed value, then on load order.
fn compare_rows(column: Column, a: &MatchRow, b: &MatchRow) -> Ordering {
    let (ra, rb) = (&a.matched.record, &b.matched.record);
    let by_column = match column {
        Column::Similarity => ra.similarity.total_cmp(&rb.similarity),
        Column::Confidence => ra.confidence.total_cmp(&rb.confidence),
        Column::PrimaryAddress => ra.address1.cmp(&rb.address1),
        Column::PrimaryName => a.matched.name1.cmp(&b.matched.name1),
        Column::SecondaryAddress => ra.address2.cmp(&rb.address2),
        Column::SecondaryName => a.matched.name2.cmp(&b.matched.name2),
        Column::Algorithm => a.algorithm_name.cmp(&b.algorithm_name),
    };
    by_column.then(a.load_index.cmp(&b.load_index))
}

/// Ordered table of resolved matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchTable {
    rows: Vec<MatchRow>,
    #[serde(skip)]
    sorted_by: Option<SortSpec>,
}

impl MatchTable {
    /// Build the table, resolving every algorithm id up front.
    ///
    /// An unknown algorithm id means the database is corrupt; the whole table
    /// is rejected rather than rendering partial data.
    pub fn new(
        matches: Vec<ResolvedMatch>,
        algorithms: &AlgorithmNames,
    ) -> Result<Self, IntegrityError> {
        let mut rows = Vec::with_capacity(matches.len());
        for (load_index, matched) in matches.into_iter().enumerate() {
            let algorithm = matched.record.algorithm;
            let algorithm_name = algorithms
                .get(algorithm)
                .ok_or(IntegrityError::UnknownAlgorithm { row: matched.record.id, algorithm })?
                .to_string();
            rows.push(MatchRow { load_index, matched, algorithm_name });
        }
        Ok(Self { rows, sorted_by: None })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        Column::ALL.len()
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        Column::from_index(column).map(Column::header)
    }

    pub fn rows(&self) -> &[MatchRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&MatchRow> {
        self.rows.get(index)
    }

    /// Cell text; `None` outside the table.
    pub fn display(&self, row: usize, column: usize) -> Option<String> {
        let column = Column::from_index(column)?;
        self.row(row).map(|r| r.display(column))
    }

    /// Cell background; `None` outside the table and for non-score columns.
    pub fn background(&self, row: usize, column: usize) -> Option<CellColor> {
        let column = Column::from_index(column)?;
        self.row(row).and_then(|r| r.background(column))
    }

    /// Reorder the rows in place by `column`.
    ///
    /// Always a full re-sort of the current rows. Ties on the column value
    /// fall back to load order, so the result does not depend on the previous
    /// ordering and descending is the exact reverse of ascending.
    pub fn sort(&mut self, column: Column, order: SortOrder) {
        match order {
            SortOrder::Ascending => self.rows.sort_by(|a, b| compare_rows(column, a, b)),
            SortOrder::Descending => self.rows.sort_by(|a, b| compare_rows(column, b, a)),
        }
        self.sorted_by = Some(SortSpec { column, order });
    }

    pub fn sorted_by(&self) -> Option<SortSpec> {
        self.sorted_by
    }
}
