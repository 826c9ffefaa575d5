//! Error types for the evaluation harness.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while building prompts, running inference or scoring.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed tab- or comma-separated input.
    #[error("Tabular data error: {0}")]
    Tabular(String),

    /// A required column or record field is absent.
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: PathBuf, column: String },

    /// The file extension is not one we know how to read or write.
    #[error("Unsupported file format: '{0}'")]
    UnsupportedFileFormat(PathBuf),

    /// No configuration exists for the requested language pair.
    #[error("Unknown language pair '{0}'")]
    UnknownLanguagePair(String),

    /// The template id does not name a known prompt template.
    #[error("Unknown prompt template '{0}'")]
    UnknownTemplate(String),

    /// The chat format name is not recognized.
    #[error("Unknown chat format '{0}'")]
    UnknownChatFormat(String),

    /// The second chain-of-thought prompt needs the first prompt's outputs.
    #[error("Template {0} requires outputs from the previous prompt")]
    MissingPreviousOutput(String),

    /// Predictions and labels differ in length and no dropped indices were given.
    #[error("Prediction count {values} does not match label count {labels} and no dropped indices were supplied")]
    LengthMismatch { values: usize, labels: usize },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl EvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a missing-column error.
    pub fn missing_column(path: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            path: path.into(),
            column: column.into(),
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        EvalError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::LlmParse(err.to_string())
    }
}

impl From<csv::Error> for EvalError {
    fn from(err: csv::Error) -> Self {
        EvalError::Tabular(err.to_string())
    }
}
