//! Instruction templates for scoring a translation.
//!
//! Wording is kept stable across versions: changing a single character
//! changes what the model sees and invalidates earlier correlation runs.

use crate::dataset::TranslationTriple;
use crate::error::{EvalError, Result};
use crate::language::LanguagePair;
use std::fmt;
use std::str::FromStr;

const SCALE: &str = "on a continuous scale from 0 to 100, where score of zero means \"no meaning preserved\" and score of one hundred means \"perfect meaning and grammar\".";

const GUIDELINE_SCALE: &str = "on a continuous scale from 0 to 100, where score of zero means \"no meaning preserved\" in terms of accuracy, contextual understanding, grammar, syntax, overall readability and score of one hundred means \"perfect meaning and grammar\" in terms of accuracy, contextual understanding, grammar, syntax, overall readability.";

/// Which inputs a prompt shows the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Source + MT.
    T01,
    /// MT + reference.
    T02,
    /// Source + reference + MT.
    T03,
    /// Source + MT + error words.
    T04,
    /// Source + reference + MT + error words.
    T05,
    /// Source + reference + MT, with annotation guidelines in the scale.
    T06,
    /// Chain of thought, step one: free-form analysis.
    CotAnalysis,
    /// Chain of thought, step two: score from the step-one analysis.
    CotScore,
    /// Five scored exemplars, then the item.
    FewShot,
}

impl Template {
    /// Templates generated by a default `prompts --template all` run.
    ///
    /// The second chain-of-thought step is excluded because it needs the
    /// first step's generations.
    pub const DEFAULT_SET: [Template; 8] = [
        Template::T01,
        Template::T02,
        Template::T03,
        Template::T04,
        Template::T05,
        Template::T06,
        Template::CotAnalysis,
        Template::FewShot,
    ];

    /// Tag used in prompt file names, e.g. `t04` in `en-de_vllm_t04.tsv`.
    pub fn tag(&self) -> &'static str {
        match self {
            Template::T01 => "t01",
            Template::T02 => "t02",
            Template::T03 => "t03",
            Template::T04 => "t04",
            Template::T05 => "t05",
            Template::T06 => "t06",
            Template::CotAnalysis => "t7p1",
            Template::CotScore => "t7p2",
            Template::FewShot => "t08",
        }
    }

    /// Whether this template reads the previous step's generations.
    pub fn needs_previous_output(&self) -> bool {
        matches!(self, Template::CotScore)
    }

    /// Render the instruction (before chat markup) for one triple.
    ///
    /// `previous` is the step-one generation for [`Template::CotScore`] and
    /// `examples` the rendered exemplar block for [`Template::FewShot`].
    pub fn instruction(
        &self,
        pair: &LanguagePair,
        item: &TranslationTriple,
        previous: Option<&str>,
        examples: Option<&str>,
    ) -> Result<String> {
        let s = pair.source;
        let t = pair.target;
        let errors = item.error_words.as_deref().unwrap_or("");

        let text = match self {
            Template::T01 => format!(
                "Score the following translation from {s} to {t} by comparing the source and the translation {SCALE}\n{s} source: {}\n{t} translation: {}\nScore: ",
                item.source, item.translation
            ),
            Template::T02 => format!(
                "Score the following translation from {s} to {t} with respect to the human reference {SCALE}\n{t} translation: {}\n{t} human reference: {}\nScore: ",
                item.translation, item.reference
            ),
            Template::T03 => format!(
                "Score the following translation from {s} to {t} with respect to the human reference {SCALE} \n{s} source: {}\n{t} human reference: {}\n{t} translation: {}\nScore: ",
                item.source, item.reference, item.translation
            ),
            Template::T04 => format!(
                "Score the following translation from {s} to {t} by comparing the source and the translation and considering the error words in translation {SCALE} \n{s} source: {}\n{t} translation: {}\nError words: {errors}\nScore: ",
                item.source, item.translation
            ),
            Template::T05 => format!(
                "Score the following translation from {s} to {t} with respect to the human reference and considering the error words in translation {SCALE} \n{s} source: {}\n{t} human reference: {}\n{t} translation: {}\nError words: {errors}\nScore: ",
                item.source, item.reference, item.translation
            ),
            Template::T06 => format!(
                "Score the following translation from {s} to {t} with respect to the human reference {GUIDELINE_SCALE}\n{s} source: {}\n{t} human reference: {}\n{t} translation: {}\nScore: ",
                item.source, item.reference, item.translation
            ),
            Template::CotAnalysis => format!(
                "You are going to evaluate the quality for {} translation. You need to think step by step. First read the following source, machine translation and reference translation. Analyze where the machine translation is different from the reference translation.\nSource: {}\nMachine translation: {}\nReference translation: {}",
                pair.display_name(),
                item.source,
                item.translation,
                item.reference
            ),
            Template::CotScore => {
                let analysis = previous
                    .ok_or_else(|| EvalError::MissingPreviousOutput(self.tag().to_string()))?;
                format!(
                    "A large language model did an evaluation of the {} translation, which is given as below:\n{analysis}\nBased on above analysis, score the machine translation quality {SCALE} Provide the score strictly in JSON format. ",
                    pair.display_name()
                )
            }
            Template::FewShot => {
                let examples = examples.ok_or_else(|| {
                    EvalError::UnknownLanguagePair(pair.code.to_string())
                })?;
                format!(
                    "You are going to evaluate the quality of machine translation given the source, machine translation and reference translation. The followings are examples of scoring translation quality. \n\n{examples}\n\nNow score the following translation from {s} to {t} with respect to the human reference and examples above {SCALE}\nSource: {}\nMachine translation: {}\nReference translation: {}\nScore:",
                    item.source, item.translation, item.reference
                )
            }
        };

        Ok(text)
    }
}

impl FromStr for Template {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().trim_start_matches('t') {
            "01" | "1" => Ok(Template::T01),
            "02" | "2" => Ok(Template::T02),
            "03" | "3" => Ok(Template::T03),
            "04" | "4" => Ok(Template::T04),
            "05" | "5" => Ok(Template::T05),
            "06" | "6" => Ok(Template::T06),
            "7p1" | "07p1" => Ok(Template::CotAnalysis),
            "7p2" | "07p2" => Ok(Template::CotScore),
            "08" | "8" => Ok(Template::FewShot),
            _ => Err(EvalError::UnknownTemplate(s.to_string())),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
