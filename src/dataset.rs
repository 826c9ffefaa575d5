//! Translation triples and human judgement labels.
//!
//! The main data file is tab-separated with the columns `src`, `mt`, `ref`,
//! `score` and, optionally, `error_words`.

use crate::error::{EvalError, Result};
use crate::table::{Delimiter, Table};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One source sentence with its machine and human translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTriple {
    /// Source-language sentence.
    pub source: String,
    /// Machine translation under evaluation.
    pub translation: String,
    /// Human reference translation.
    pub reference: String,
    /// Direct assessment score, if the file carries one.
    pub score: Option<f64>,
    /// Annotated erroneous words in the translation.
    pub error_words: Option<String>,
}

/// A language pair's worth of triples, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub items: Vec<TranslationTriple>,
}

impl Dataset {
    /// Load triples from a tab-separated file.
    pub fn load_tsv(path: &Path) -> Result<Self> {
        let table = Table::read_with(path, Delimiter::Tab)?;

        let sources = table.column("src")?;
        let translations = table.column("mt")?;
        let references = table.column("ref")?;
        let scores = table.optional_column("score");
        let error_words = table.optional_column("error_words");

        let mut items = Vec::with_capacity(table.len());
        for i in 0..table.len() {
            let score = match &scores {
                Some(col) => parse_optional_number(col[i], path)?,
                None => None,
            };
            let errors = error_words
                .as_ref()
                .map(|col| col[i].trim())
                .filter(|w| !w.is_empty())
                .map(str::to_string);

            items.push(TranslationTriple {
                source: sources[i].to_string(),
                translation: translations[i].to_string(),
                reference: references[i].to_string(),
                score,
                error_words: errors,
            });
        }

        Ok(Self { items })
    }

    /// Replace error words with the lines of a plain text file, one per row.
    ///
    /// Lines beyond the dataset length are ignored; rows without a line keep
    /// no error words.
    pub fn load_error_words(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        let mut lines = content.lines();
        for item in &mut self.items {
            item.error_words = lines
                .next()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string);
        }
        Ok(())
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read a numeric label column, rounding each value half-to-even to an integer.
///
/// `NaN` and infinite cells cannot be rounded and are rejected.
pub fn read_labels(path: &Path, column: &str) -> Result<Vec<f64>> {
    let table = Table::read_with(path, Delimiter::Tab)?;
    table
        .column(column)?
        .into_iter()
        .map(|cell| parse_label(cell, path))
        .collect()
}

fn parse_label(cell: &str, path: &Path) -> Result<f64> {
    let value = parse_number(cell, path)?;
    if !value.is_finite() {
        return Err(EvalError::Serialization(format!(
            "non-finite label '{}' in '{}'",
            cell,
            path.display()
        )));
    }
    Ok(value.round_ties_even())
}

fn parse_number(cell: &str, path: &Path) -> Result<f64> {
    cell.trim().parse::<f64>().map_err(|e| {
        EvalError::Serialization(format!(
            "invalid number '{}' in '{}': {}",
            cell,
            path.display(),
            e
        ))
    })
}

fn parse_optional_number(cell: &str, path: &Path) -> Result<Option<f64>> {
    if cell.trim().is_empty() {
        Ok(None)
    } else {
        parse_number(cell, path).map(Some)
    }
}
