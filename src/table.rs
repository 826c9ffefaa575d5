//! Header-addressed tabular files (TSV and CSV).
//!
//! Rows with more fields than the header are skipped with a warning and
//! short rows are padded with empty cells, so a few malformed lines do not
//! abort a whole evaluation pass.

use crate::error::{EvalError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Field delimiter of a tabular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    /// Determine the delimiter from a file extension (`.tsv` or `.csv`).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") => Ok(Delimiter::Tab),
            Some("csv") => Ok(Delimiter::Comma),
            _ => Err(EvalError::UnsupportedFileFormat(path.to_path_buf())),
        }
    }

    fn byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// An in-memory table with named columns.
#[derive(Debug, Clone)]
pub struct Table {
    /// Where the table was read from.
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a table, choosing the delimiter from the file extension.
    pub fn read(path: &Path) -> Result<Self> {
        let delimiter = Delimiter::from_path(path)?;
        Self::read_with(path, delimiter)
    }

    /// Read a table with an explicit delimiter.
    pub fn read_with(path: &Path, delimiter: Delimiter) -> Result<Self> {
        let file = File::open(path).map_err(|e| EvalError::io(path, e))?;
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > width {
                warn!(
                    path = %path.display(),
                    row = line,
                    fields = record.len(),
                    expected = width,
                    "skipping malformed row"
                );
                continue;
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of a named column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| EvalError::missing_column(&self.path, name))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Values of a named column, or `None` if the table lacks it.
    pub fn optional_column(&self, name: &str) -> Option<Vec<&str>> {
        self.column(name).ok()
    }
}

/// Write rows under a header, creating parent directories as needed.
pub fn write_rows<I, R>(path: &Path, delimiter: Delimiter, headers: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| EvalError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| EvalError::io(path, e))?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.byte())
        .from_writer(file);

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| EvalError::io(path, e))?;

    Ok(())
}
