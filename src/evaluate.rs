//! Scoring pass over every configured language pair.
//!
//! Each pair is one slice: its generations file is run through the number
//! extractor, the extracted values are aligned with the human labels, and
//! the resulting correlations become one summary row.

use crate::config::EvalConfig;
use crate::dataset::read_labels;
use crate::error::Result;
use crate::extract::NumberExtractor;
use crate::language::LanguagePair;
use crate::predictions::PredictionSource;
use crate::report::{SummaryRow, SummaryTable};
use crate::score::compute_correlation;
use std::path::PathBuf;
use tracing::{debug, info};

/// Column of the label files holding the human score.
pub const LABEL_COLUMN: &str = "score";

/// Correlation evaluation driven by an [`EvalConfig`].
pub struct Evaluation {
    config: EvalConfig,
}

impl Evaluation {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Score every configured pair, in configuration order.
    pub fn run(&self) -> Result<SummaryTable> {
        let mut summary = SummaryTable::new();
        for code in &self.config.language_pairs {
            let pair = LanguagePair::from_code(code)?;
            summary.push(self.score_pair(&pair)?);
        }
        Ok(summary)
    }

    /// Score a single pair.
    pub fn score_pair(&self, pair: &LanguagePair) -> Result<SummaryRow> {
        let predictions_path = self.predictions_path(pair);
        let labels_path = self.labels_path(pair);

        let source = PredictionSource::load(&predictions_path, &self.config.prediction_column)?;
        debug!(
            pair = pair.code,
            path = %source.path().display(),
            kind = %source.kind(),
            items = source.len(),
            "loaded predictions"
        );
        let extraction = NumberExtractor::new(self.config.number_position).extract(source.items());
        let labels = read_labels(&labels_path, LABEL_COLUMN)?;

        let scores = compute_correlation(
            &extraction.values,
            &labels,
            &extraction.dropped,
            self.config.alignment,
        )?;

        info!(
            pair = pair.code,
            items = extraction.total(),
            dropped = extraction.dropped.len(),
            spearman = scores.spearman,
            "scored"
        );

        Ok(SummaryRow::new(pair.code, scores, extraction.dropped.len()))
    }

    /// `{outputs_dir}/{PAIR}_outputs_t{template}.tsv`
    pub fn predictions_path(&self, pair: &LanguagePair) -> PathBuf {
        self.config.outputs_dir.join(format!(
            "{}_outputs_t{}.tsv",
            pair.upper_code(),
            self.config.template
        ))
    }

    /// `{raw_data_dir}/{pair}/{pair}_overlaps_test.tsv`
    pub fn labels_path(&self, pair: &LanguagePair) -> PathBuf {
        self.config
            .raw_data_dir
            .join(pair.code)
            .join(format!("{}_overlaps_test.tsv", pair.code))
    }

    /// `{outputs_dir}/correlation_scores_t{template}.csv`
    pub fn summary_path(&self) -> PathBuf {
        self.config
            .outputs_dir
            .join(format!("correlation_scores_t{}.csv", self.config.template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::score::AlignmentPolicy;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir, pairs: &[&str]) -> EvalConfig {
        EvalConfig {
            template: "04".to_string(),
            language_pairs: pairs.iter().map(|p| p.to_string()).collect(),
            outputs_dir: dir.path().join("outputs"),
            raw_data_dir: dir.path().join("raw"),
            ..Default::default()
        }
    }

    fn write(path: PathBuf, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_paths() {
        let dir = TempDir::new().unwrap();
        let eval = Evaluation::new(config(&dir, &["en-de"]));
        let pair = LanguagePair::from_code("en-de").unwrap();

        assert!(eval.predictions_path(&pair).ends_with("outputs/EN-DE_outputs_t04.tsv"));
        assert!(eval.labels_path(&pair).ends_with("raw/en-de/en-de_overlaps_test.tsv"));
        assert!(eval.summary_path().ends_with("outputs/correlation_scores_t04.csv"));
    }

    #[test]
    fn test_run_scores_each_pair() {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, &["en-de", "si-en"]);

        write(
            cfg.outputs_dir.join("EN-DE_outputs_t04.tsv"),
            "prompt\tvllm_output\np0\tScore: 1\np1\tScore: 2\np2\tI cannot rate this.\np3\tScore: 3\n",
        );
        write(
            cfg.raw_data_dir.join("en-de/en-de_overlaps_test.tsv"),
            "src\tmt\tref\tscore\na\tb\tc\t10.2\nd\te\tf\t19.5\ng\th\ti\t30\nj\tk\tl\t40.5\n",
        );

        write(
            cfg.outputs_dir.join("SI-EN_outputs_t04.tsv"),
            "prompt\tvllm_output\np0\t70\np1\t20\np2\t45\n",
        );
        write(
            cfg.raw_data_dir.join("si-en/si-en_overlaps_test.tsv"),
            "src\tmt\tref\tscore\na\tb\tc\t50\nd\te\tf\t50\ng\th\ti\t50\n",
        );

        let summary = Evaluation::new(cfg).run().unwrap();
        assert_eq!(summary.len(), 2);

        let en_de = summary.get("en-de").unwrap();
        assert_eq!(en_de.dropped_rows, 1);
        // Labels round to [10, 20, 30, 40]; index 2 is dropped.
        assert_eq!(en_de.spearman, 1.0);
        assert_eq!(en_de.kendall, 1.0);
        assert_eq!(en_de.pearson, 0.982);

        let si_en = summary.get("si-en").unwrap();
        assert_eq!(si_en.dropped_rows, 0);
        assert!(si_en.spearman.is_nan());
    }

    #[test]
    fn test_strict_mismatch_propagates() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir, &["en-de"]);
        cfg.alignment = AlignmentPolicy::Strict;

        write(
            cfg.outputs_dir.join("EN-DE_outputs_t04.tsv"),
            "prompt\tvllm_output\np0\t1\np1\t2\n",
        );
        write(
            cfg.raw_data_dir.join("en-de/en-de_overlaps_test.tsv"),
            "src\tmt\tref\tscore\na\tb\tc\t1\nd\te\tf\t2\ng\th\ti\t3\n",
        );

        let err = Evaluation::new(cfg).run().unwrap_err();
        assert!(matches!(err, EvalError::LengthMismatch { values: 2, labels: 3 }));
    }

    #[test]
    fn test_missing_predictions_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = Evaluation::new(config(&dir, &["ro-en"])).run().unwrap_err();
        assert!(matches!(err, EvalError::Io { .. }));
    }

    #[test]
    fn test_unknown_pair_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = Evaluation::new(config(&dir, &["xx-yy"])).run().unwrap_err();
        assert!(matches!(err, EvalError::UnknownLanguagePair(_)));
    }
}
