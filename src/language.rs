//! Language pairs covered by the quality estimation data.

use crate::error::{EvalError, Result};
use std::fmt;
use std::path::Path;

/// (code, source language, target language)
const PAIRS: [(&str, &str, &str); 8] = [
    ("en-de", "English", "German"),
    ("en-mr", "English", "Marathi"),
    ("en-zh", "English", "Chinese"),
    ("et-en", "Estonian", "English"),
    ("ne-en", "Nepali", "English"),
    ("ro-en", "Romanian", "English"),
    ("ru-en", "Russian", "English"),
    ("si-en", "Sinhala", "English"),
];

/// A supported translation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    /// Short code, e.g. "en-de".
    pub code: &'static str,
    /// Source language name, e.g. "English".
    pub source: &'static str,
    /// Target language name, e.g. "German".
    pub target: &'static str,
}

impl LanguagePair {
    /// Look up a pair by its short code.
    pub fn from_code(code: &str) -> Result<Self> {
        let code = code.trim().to_lowercase();
        PAIRS
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|&(code, source, target)| Self {
                code,
                source,
                target,
            })
            .ok_or(EvalError::UnknownLanguagePair(code))
    }

    /// Derive the pair from a data file name such as `en-de_overlaps_test.tsv`.
    pub fn from_file_name(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| EvalError::UnknownLanguagePair(path.display().to_string()))?;
        let prefix = name.split('_').next().unwrap_or(name);
        Self::from_code(prefix)
    }

    /// All supported pairs.
    pub fn all() -> Vec<Self> {
        PAIRS
            .iter()
            .map(|&(code, source, target)| Self {
                code,
                source,
                target,
            })
            .collect()
    }

    /// "English-German"
    pub fn display_name(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }

    /// "EN-DE", as used in generation file names.
    pub fn upper_code(&self) -> String {
        self.code.to_uppercase()
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        let pair = LanguagePair::from_code("ne-en").unwrap();
        assert_eq!(pair.source, "Nepali");
        assert_eq!(pair.target, "English");
        assert_eq!(pair.display_name(), "Nepali-English");
        assert_eq!(pair.upper_code(), "NE-EN");
    }

    #[test]
    fn test_from_code_is_case_insensitive() {
        assert_eq!(LanguagePair::from_code("EN-ZH").unwrap().code, "en-zh");
    }

    #[test]
    fn test_unknown_pair() {
        let err = LanguagePair::from_code("fr-en").unwrap_err();
        assert!(matches!(err, EvalError::UnknownLanguagePair(ref c) if c == "fr-en"));
    }

    #[test]
    fn test_from_file_name() {
        let pair = LanguagePair::from_file_name(Path::new("raw_data/ro-en_overlaps_test.tsv")).unwrap();
        assert_eq!(pair.code, "ro-en");

        assert!(LanguagePair::from_file_name(Path::new("data/test.tsv")).is_err());
    }

    #[test]
    fn test_all_pairs() {
        assert_eq!(LanguagePair::all().len(), 8);
    }
}
