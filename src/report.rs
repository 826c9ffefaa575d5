//! Per-slice correlation summary and its spreadsheet-friendly file format.
//!
//! Supports CSV and TSV; the delimiter is chosen from the file extension.

use crate::error::{EvalError, Result};
use crate::score::CorrelationScores;
use crate::table::{Delimiter, Table, write_rows};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

const HEADERS: [&str; 5] = ["slice", "spearman", "pearson", "kendall", "dropped_rows"];

/// Scores for one evaluation slice (usually a language pair).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub slice: String,
    pub spearman: f64,
    pub pearson: f64,
    pub kendall: f64,
    /// Items whose output had no usable number.
    pub dropped_rows: usize,
}

impl SummaryRow {
    /// Build a row from computed scores.
    pub fn new(slice: impl Into<String>, scores: CorrelationScores, dropped_rows: usize) -> Self {
        Self {
            slice: slice.into(),
            spearman: scores.spearman,
            pearson: scores.pearson,
            kendall: scores.kendall,
            dropped_rows,
        }
    }
}

/// Ordered collection of summary rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row.
    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    /// Find the row for a slice.
    pub fn get(&self, slice: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| row.slice == slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render an aligned plain-text table.
    pub fn format(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|row| row.slice.len())
            .chain(std::iter::once(HEADERS[0].len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {:>8}  {:>8}  {:>7}",
            "slice", "spearman", "pearson", "kendall", "dropped",
        );
        let _ = writeln!(out, "{}", "-".repeat(width + 43));
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<width$}  {:>8.4}  {:>8.4}  {:>8.4}  {:>7}",
                row.slice, row.spearman, row.pearson, row.kendall, row.dropped_rows,
            );
        }
        out
    }
}

/// Write the summary as CSV or TSV. `NaN` coefficients are written as `NaN`.
pub fn write_summary(path: &Path, table: &SummaryTable) -> Result<()> {
    let delimiter = Delimiter::from_path(path)?;
    let rows = table.rows.iter().map(|row| {
        [
            row.slice.clone(),
            row.spearman.to_string(),
            row.pearson.to_string(),
            row.kendall.to_string(),
            row.dropped_rows.to_string(),
        ]
    });
    write_rows(path, delimiter, &HEADERS, rows)
}

/// Read a summary written by [`write_summary`].
pub fn read_summary(path: &Path) -> Result<SummaryTable> {
    let table = Table::read(path)?;
    let slices = table.column(HEADERS[0])?;
    let spearman = table.column(HEADERS[1])?;
    let pearson = table.column(HEADERS[2])?;
    let kendall = table.column(HEADERS[3])?;
    let dropped = table.column(HEADERS[4])?;

    let mut summary = SummaryTable::new();
    for i in 0..table.len() {
        summary.push(SummaryRow {
            slice: slices[i].to_string(),
            spearman: parse_cell(path, HEADERS[1], spearman[i])?,
            pearson: parse_cell(path, HEADERS[2], pearson[i])?,
            kendall: parse_cell(path, HEADERS[3], kendall[i])?,
            dropped_rows: parse_cell(path, HEADERS[4], dropped[i])?,
        });
    }
    Ok(summary)
}

fn parse_cell<T: std::str::FromStr>(path: &Path, column: &str, cell: &str) -> Result<T> {
    cell.trim().parse().map_err(|_| {
        EvalError::Serialization(format!(
            "{}: invalid value '{}' in column '{}'",
            path.display(),
            cell,
            column
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> SummaryTable {
        let mut table = SummaryTable::new();
        table.push(SummaryRow {
            slice: "en-de".to_string(),
            spearman: 0.4123,
            pearson: 0.982,
            kendall: -0.05,
            dropped_rows: 3,
        });
        table.push(SummaryRow {
            slice: "si-en".to_string(),
            spearman: f64::NAN,
            pearson: f64::NAN,
            kendall: f64::NAN,
            dropped_rows: 0,
        });
        table
    }

    #[test]
    fn test_csv_roundtrip_keeps_nan() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/correlation_scores_t03.csv");

        write_summary(&path, &sample()).unwrap();
        let loaded = read_summary(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.rows[0], sample().rows[0]);
        let si = loaded.get("si-en").unwrap();
        assert!(si.spearman.is_nan() && si.pearson.is_nan() && si.kendall.is_nan());
        assert_eq!(si.dropped_rows, 0);
    }

    #[test]
    fn test_tsv_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.tsv");

        write_summary(&path, &sample()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("slice\tspearman\tpearson\tkendall\tdropped_rows"));
        assert_eq!(lines.next(), Some("en-de\t0.4123\t0.982\t-0.05\t3"));
        assert_eq!(lines.next(), Some("si-en\tNaN\tNaN\tNaN\t0"));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.xlsx");
        assert!(matches!(
            write_summary(&path, &sample()),
            Err(EvalError::UnsupportedFileFormat(_))
        ));
    }

    #[test]
    fn test_format_lists_every_slice() {
        let text = sample().format();
        assert!(text.starts_with("slice"));
        assert!(text.contains("en-de"));
        assert!(text.contains("0.9820"));
        assert!(text.contains("NaN"));
    }
}
