//! mtqe-eval - LLM-based machine translation quality estimation harness.
//!
//! The harness asks a language model to score translations on a 0-100
//! scale and measures how well those scores agree with human judgements.
//!
//! # Overview
//!
//! 1. Build prompts for every translation triple of a language pair
//! 2. Run the prompts through an OpenAI-compatible completion server
//! 3. Pull a numeric score out of each free-text generation
//! 4. Align the scores with human labels and report Spearman, Pearson
//!    and Kendall correlation per language pair
//!
//! # Quick Start
//!
//! ```no_run
//! use mtqe_eval::{
//!     config::Config,
//!     evaluate::Evaluation,
//!     report::write_summary,
//! };
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!
//!     let evaluation = Evaluation::new(config.eval.clone());
//!     let summary = evaluation.run()?;
//!
//!     print!("{}", summary.format());
//!     write_summary(&evaluation.summary_path(), &summary)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Extraction and scoring can also be used directly:
//!
//! ```
//! use mtqe_eval::{compute_correlation, extract_numbers, AlignmentPolicy};
//!
//! let extraction = extract_numbers(&["Score: 1", "no idea", "Score: 2", "3"], 0);
//! assert_eq!(extraction.dropped, vec![1]);
//!
//! let labels = [10.0, 50.0, 20.0, 40.0];
//! let scores = compute_correlation(
//!     &extraction.values,
//!     &labels,
//!     &extraction.dropped,
//!     AlignmentPolicy::Strict,
//! )
//! .unwrap();
//! assert_eq!(scores.spearman, 1.0);
//! ```
//!
//! # Architecture
//!
//! - **PromptBuilder**: Renders templates and chat markup for each triple
//! - **LlmClient** / **Runner**: Sequential completion requests
//! - **NumberExtractor**: Picks the n-th numeric token out of each output
//! - **compute_correlation**: Drop-set alignment and correlation
//! - **Evaluation**: One summary row per language pair

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod language;
pub mod llm;
pub mod predictions;
pub mod prompt;
pub mod report;
pub mod score;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{Dataset, TranslationTriple};
pub use error::{EvalError, Result};
pub use evaluate::Evaluation;
pub use extract::{Extraction, NumberExtractor, extract_numbers};
pub use language::LanguagePair;
pub use llm::{LlmClient, Runner};
pub use predictions::{PredictionSource, SourceKind};
pub use prompt::{ChatFormat, PromptBuilder, Template};
pub use report::{SummaryRow, SummaryTable, read_summary, write_summary};
pub use score::{AlignmentPolicy, CorrelationScores, align_labels, compute_correlation};
