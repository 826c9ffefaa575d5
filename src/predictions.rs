//! Adapters turning prediction files into `(index, text)` items.
//!
//! Whatever the file layout, the extractor only ever sees an ordered
//! sequence of indexed strings.

use crate::error::{EvalError, Result};
use crate::table::{Delimiter, Table};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Layout a prediction file was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// One column of a TSV/CSV table.
    Tabular,
    /// One field of each JSON object (JSON lines or a JSON array).
    Records,
    /// One prediction per line of a plain text file.
    Lines,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Tabular => "table column",
            SourceKind::Records => "JSON field",
            SourceKind::Lines => "text lines",
        })
    }
}

/// Model outputs loaded from one of the supported file layouts.
#[derive(Debug, Clone)]
pub struct PredictionSource {
    path: PathBuf,
    kind: SourceKind,
    texts: Vec<String>,
}

impl PredictionSource {
    /// Load predictions, dispatching on the file extension.
    ///
    /// `key` names the column (tabular files) or field (JSON files); it is
    /// ignored for `.txt` files.
    pub fn load(path: &Path, key: &str) -> Result<Self> {
        let (kind, texts) = match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") => (SourceKind::Tabular, read_column(path, Delimiter::Tab, key)?),
            Some("csv") => (SourceKind::Tabular, read_column(path, Delimiter::Comma, key)?),
            Some("jsonl") => (SourceKind::Records, read_json_lines(path, key)?),
            Some("json") => (SourceKind::Records, read_json_array(path, key)?),
            Some("txt") => (SourceKind::Lines, read_lines(path)?),
            _ => return Err(EvalError::UnsupportedFileFormat(path.to_path_buf())),
        };
        Ok(Self {
            path: path.to_path_buf(),
            kind,
            texts,
        })
    }

    /// File the predictions came from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Layout the file was read as.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Predictions as `(index, text)` pairs in file order.
    pub fn items(&self) -> impl Iterator<Item = (usize, &str)> {
        self.texts.iter().map(String::as_str).enumerate()
    }

    /// Number of predictions.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if there are no predictions.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

fn read_column(path: &Path, delimiter: Delimiter, column: &str) -> Result<Vec<String>> {
    let table = Table::read_with(path, delimiter)?;
    Ok(table.column(column)?.into_iter().map(str::to_string).collect())
}

fn read_json_lines(path: &Path, key: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let mut texts = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: Value = serde_json::from_str(line).map_err(|e| {
            EvalError::Serialization(format!(
                "{} line {}: {}",
                path.display(),
                line_num + 1,
                e
            ))
        })?;
        texts.push(field(&record, key, path)?);
    }
    Ok(texts)
}

fn read_json_array(path: &Path, key: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    let records: Vec<Value> = serde_json::from_str(&content)
        .map_err(|e| EvalError::Serialization(format!("{}: {}", path.display(), e)))?;
    records
        .iter()
        .map(|record| field(record, key, path))
        .collect()
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

fn field(record: &Value, key: &str, path: &Path) -> Result<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EvalError::missing_column(path, key))
}
