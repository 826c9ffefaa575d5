//! Scored exemplars for the few-shot template.

use crate::error::{EvalError, Result};
use crate::language::LanguagePair;
use serde::Deserialize;
use std::collections::HashMap;

const EMBEDDED: &str = include_str!("../../assets/few_shot.yaml");

/// One human-scored example translation.
#[derive(Debug, Clone, Deserialize)]
pub struct Exemplar {
    pub source: String,
    pub translation: String,
    pub reference: String,
    pub score: u32,
}

/// Exemplars for every language pair.
#[derive(Debug, Clone)]
pub struct FewShotBank {
    by_pair: HashMap<String, Vec<Exemplar>>,
}

impl FewShotBank {
    /// The exemplars shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml(EMBEDDED)
    }

    /// Parse a bank from YAML keyed by language pair code.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let by_pair = serde_yaml::from_str(content)
            .map_err(|e| EvalError::Serialization(format!("invalid few-shot exemplars: {}", e)))?;
        Ok(Self { by_pair })
    }

    /// Exemplars for a pair.
    pub fn exemplars(&self, pair: &LanguagePair) -> Result<&[Exemplar]> {
        self.by_pair
            .get(pair.code)
            .map(Vec::as_slice)
            .ok_or_else(|| EvalError::UnknownLanguagePair(pair.code.to_string()))
    }

    /// The rendered "Example 1 ... Example N" block for a pair.
    pub fn render(&self, pair: &LanguagePair) -> Result<String> {
        let block = self
            .exemplars(pair)?
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                format!(
                    "Example {}\nSource: {}\nMachine translation: {}\nReference translation: {}\nScore: {}",
                    i + 1,
                    ex.source,
                    ex.translation,
                    ex.reference,
                    ex.score
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(block)
    }
}
