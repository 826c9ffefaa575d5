//! Configuration for the evaluation harness.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{EvalError, Result};
use crate::score::AlignmentPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Language pairs of the WMT quality estimation test sets.
pub const DEFAULT_LANGUAGE_PAIRS: [&str; 8] = [
    "en-de", "en-mr", "en-zh", "et-en", "ne-en", "ro-en", "ru-en", "si-en",
];

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible server (e.g., "http://localhost:8000")
    pub api_base: String,

    /// API key for authentication; local servers usually need none
    #[serde(default)]
    pub api_key: String,

    /// Model name (e.g., "meta-llama/Llama-2-13b-chat-hf")
    pub model: String,

    /// Maximum tokens per generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling probability mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.8
}

fn default_top_p() -> f32 {
    0.95
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: String::new(),
            model: "meta-llama/Llama-2-13b-chat-hf".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

impl LlmConfig {
    /// Last path segment of the model name, used in output file names.
    pub fn model_short_name(&self) -> &str {
        self.model.rsplit('/').next().unwrap_or(&self.model)
    }
}

/// Settings for a correlation scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Template version tag embedded in output file names (e.g. "03-mixtral").
    pub template: String,

    /// Column holding the model's free-text output.
    pub prediction_column: String,

    /// Which numeric token of each output to use (zero-based).
    pub number_position: usize,

    /// Language pairs to score, one summary row each.
    pub language_pairs: Vec<String>,

    /// Directory containing `{PAIR}_outputs_t{template}.tsv` files.
    pub outputs_dir: PathBuf,

    /// Directory containing `{pair}/{pair}_overlaps_test.tsv` label files.
    pub raw_data_dir: PathBuf,

    /// What to do when predictions and labels cannot be aligned.
    pub alignment: AlignmentPolicy,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            template: "03-mixtral".to_string(),
            prediction_column: "vllm_output".to_string(),
            number_position: 0,
            language_pairs: DEFAULT_LANGUAGE_PAIRS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            outputs_dir: PathBuf::from("./llm_output_samples/"),
            raw_data_dir: PathBuf::from("./raw_data/"),
            alignment: AlignmentPolicy::default(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Scoring settings
    pub eval: EvalConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    eval: Option<EvalFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct EvalFileSection {
    template: Option<String>,
    prediction_column: Option<String>,
    number_position: Option<usize>,
    language_pairs: Option<Vec<String>>,
    outputs_dir: Option<PathBuf>,
    raw_data_dir: Option<PathBuf>,
    alignment: Option<AlignmentPolicy>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LLM_API_BASE, LLM_MODEL, MTQE_TEMPLATE, ...)
    /// 2. Config file (`explicit` if given, else ~/.config/mtqe/config.yaml)
    /// 3. Default values
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => match Self::config_file_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => Config::default(),
            },
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_base) = env::var("LLM_API_BASE") {
            self.llm.api_base = api_base;
        }

        if let Ok(api_key) = env::var("LLM_API_KEY") {
            self.llm.api_key = api_key;
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            self.llm.model = model;
        }

        if let Ok(max_tokens) = env::var("LLM_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                self.llm.max_tokens = tokens;
            }
        }

        if let Ok(temperature) = env::var("LLM_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                self.llm.temperature = temp;
            }
        }

        if let Ok(top_p) = env::var("LLM_TOP_P") {
            if let Ok(p) = top_p.parse() {
                self.llm.top_p = p;
            }
        }

        if let Ok(template) = env::var("MTQE_TEMPLATE") {
            self.eval.template = template;
        }

        if let Ok(column) = env::var("MTQE_PREDICTION_COLUMN") {
            self.eval.prediction_column = column;
        }

        if let Ok(dir) = env::var("MTQE_OUTPUTS_DIR") {
            self.eval.outputs_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = env::var("MTQE_RAW_DATA_DIR") {
            self.eval.raw_data_dir = PathBuf::from(dir);
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, filling unset values with defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| EvalError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
            if let Some(top_p) = llm.top_p {
                config.llm.top_p = top_p;
            }
        }

        if let Some(eval) = file_config.eval {
            if let Some(template) = eval.template {
                config.eval.template = template;
            }
            if let Some(column) = eval.prediction_column {
                config.eval.prediction_column = column;
            }
            if let Some(position) = eval.number_position {
                config.eval.number_position = position;
            }
            if let Some(pairs) = eval.language_pairs {
                config.eval.language_pairs = pairs;
            }
            if let Some(dir) = eval.outputs_dir {
                config.eval.outputs_dir = dir;
            }
            if let Some(dir) = eval.raw_data_dir {
                config.eval.raw_data_dir = dir;
            }
            if let Some(alignment) = eval.alignment {
                config.eval.alignment = alignment;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mtqe")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that the settings needed for inference are present.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_base.is_empty() {
            return Err(EvalError::Config(
                "LLM API base URL is required. Set LLM_API_BASE environment variable or add to config file.".to_string()
            ));
        }

        if self.llm.model.is_empty() {
            return Err(EvalError::Config(
                "LLM model is required. Set LLM_MODEL environment variable or add to config file."
                    .to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err(EvalError::InvalidConfig(format!(
                "top_p must be within [0, 1], got {}",
                self.llm.top_p
            )));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                model: model.into(),
                ..Default::default()
            },
            eval: EvalConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.llm.api_base.is_empty());
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.llm.temperature, 0.8);
        assert_eq!(config.llm.top_p, 0.95);
        assert_eq!(config.eval.template, "03-mixtral");
        assert_eq!(config.eval.prediction_column, "vllm_output");
        assert_eq!(config.eval.number_position, 0);
        assert_eq!(config.eval.language_pairs.len(), 8);
        assert_eq!(config.eval.alignment, AlignmentPolicy::Lenient);
    }

    #[test]
    fn test_validate_fails_without_required_fields() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_missing_api_key() {
        let config = Config::with_llm("http://localhost:8000", "mistralai/Mixtral-8x7B");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_model_short_name() {
        let config = Config::with_llm("http://localhost:8000", "meta-llama/Llama-2-13b-chat-hf");
        assert_eq!(config.llm.model_short_name(), "Llama-2-13b-chat-hf");

        let bare = Config::with_llm("http://localhost:8000", "gemma-7b");
        assert_eq!(bare.llm.model_short_name(), "gemma-7b");
    }

    #[test]
    fn test_yaml_overrides_defaults() {
        let yaml = r#"
llm:
  api_base: http://gpu-box:8000
  model: Qwen/Qwen1.5-14B-Chat
  top_p: 0.9
eval:
  template: 04-qwen
  language_pairs: [en-de, si-en]
  alignment: strict
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.llm.api_base, "http://gpu-box:8000");
        assert_eq!(config.llm.model_short_name(), "Qwen1.5-14B-Chat");
        assert_eq!(config.llm.top_p, 0.9);
        assert_eq!(config.llm.max_tokens, 512);
        assert_eq!(config.eval.template, "04-qwen");
        assert_eq!(config.eval.language_pairs, vec!["en-de", "si-en"]);
        assert_eq!(config.eval.alignment, AlignmentPolicy::Strict);
        assert_eq!(config.eval.prediction_column, "vllm_output");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = Config::from_yaml("llm: [unclosed");
        assert!(matches!(result, Err(EvalError::Config(_))));
    }
}
