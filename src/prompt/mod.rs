//! Prompt construction for LLM-based translation scoring.
//!
//! A [`PromptBuilder`] combines a language pair, its translation triples
//! and a [`ChatFormat`] into one prompt per triple for a given
//! [`Template`].

mod few_shot;
mod format;
mod template;

pub use few_shot::{Exemplar, FewShotBank};
pub use format::ChatFormat;
pub use template::Template;

use crate::dataset::Dataset;
use crate::error::{EvalError, Result};
use crate::language::LanguagePair;
use crate::table::{Delimiter, Table, write_rows};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column holding the finished prompt in prompt files.
pub const PROMPT_COLUMN: &str = "final_prompt";

/// Builds prompts for every triple of a dataset.
pub struct PromptBuilder {
    pair: LanguagePair,
    dataset: Dataset,
    format: ChatFormat,
    previous_outputs: Option<Vec<String>>,
}

impl PromptBuilder {
    /// Create a builder for a pair's dataset.
    pub fn new(pair: LanguagePair, dataset: Dataset, format: ChatFormat) -> Self {
        Self {
            pair,
            dataset,
            format,
            previous_outputs: None,
        }
    }

    /// Supply the first chain-of-thought step's generations, in dataset order.
    pub fn with_previous_outputs(mut self, outputs: Vec<String>) -> Self {
        self.previous_outputs = Some(outputs);
        self
    }

    /// Build one formatted prompt per triple.
    pub fn build(&self, template: Template) -> Result<Vec<String>> {
        let previous = if template.needs_previous_output() {
            let outputs = self
                .previous_outputs
                .as_ref()
                .ok_or_else(|| EvalError::MissingPreviousOutput(template.tag().to_string()))?;
            if outputs.len() < self.dataset.len() {
                return Err(EvalError::InvalidConfig(format!(
                    "previous outputs cover {} rows but the dataset has {}",
                    outputs.len(),
                    self.dataset.len()
                )));
            }
            Some(outputs)
        } else {
            None
        };

        let examples = match template {
            Template::FewShot => Some(FewShotBank::embedded()?.render(&self.pair)?),
            _ => None,
        };

        let prompts = self
            .dataset
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let prev = previous.map(|p| p[i].as_str());
                template
                    .instruction(&self.pair, item, prev, examples.as_deref())
                    .map(|text| self.format.apply(&text))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            pair = %self.pair,
            template = %template,
            count = prompts.len(),
            "built prompts"
        );

        Ok(prompts)
    }

    /// Default prompt file name, e.g. `en-de_vllm_t04.tsv`.
    pub fn file_name(&self, template: Template) -> String {
        prompt_file_name(&self.pair, template)
    }

    /// Build and write one prompt file per template under `out_dir`.
    pub fn write_all(&self, templates: &[Template], out_dir: &Path) -> Result<Vec<PathBuf>> {
        templates
            .iter()
            .map(|&template| {
                let prompts = self.build(template)?;
                write_prompts(&out_dir.join(self.file_name(template)), &prompts)
            })
            .collect()
    }
}

/// Main data file of a pair in the flat raw data layout,
/// e.g. `raw_data/en-de_overlaps_test.tsv`.
pub fn main_file_path(raw_data_dir: &Path, pair: &LanguagePair) -> PathBuf {
    raw_data_dir.join(format!("{}_overlaps_test.tsv", pair.code))
}

/// Default prompt file name, e.g. `en-de_vllm_t04.tsv`.
pub fn prompt_file_name(pair: &LanguagePair, template: Template) -> String {
    format!("{}_vllm_{}.tsv", pair.code, template.tag())
}

/// Load the first chain-of-thought step's generations.
///
/// `.tsv` files are read from the `vllm_output` column and `.csv` files
/// from the `prediction` column; anything else is rejected.
pub fn load_previous_outputs(path: &Path) -> Result<Vec<String>> {
    let (delimiter, column) = match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") => (Delimiter::Tab, "vllm_output"),
        Some("csv") => (Delimiter::Comma, "prediction"),
        _ => return Err(EvalError::UnsupportedFileFormat(path.to_path_buf())),
    };

    let table = Table::read_with(path, delimiter)?;
    Ok(table
        .column(column)?
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Write prompts as TSV with a leading row index column.
pub fn write_prompts(path: &Path, prompts: &[String]) -> Result<PathBuf> {
    let rows = prompts
        .iter()
        .enumerate()
        .map(|(i, p)| [i.to_string(), p.clone()]);
    write_rows(path, Delimiter::Tab, &["", PROMPT_COLUMN], rows)?;
    Ok(path.to_path_buf())
}

/// Read prompts back from a prompt file.
pub fn read_prompts(path: &Path) -> Result<Vec<String>> {
    let table = Table::read_with(path, Delimiter::Tab)?;
    Ok(table
        .column(PROMPT_COLUMN)?
        .into_iter()
        .map(str::to_string)
        .collect())
}
