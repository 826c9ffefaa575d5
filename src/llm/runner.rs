//! Batch inference over a prompt file.

use super::client::{LlmClient, TokenUsage};
use crate::error::Result;
use crate::language::LanguagePair;
use crate::table::{Delimiter, Table, write_rows};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Column holding the model's generation in output files.
pub const OUTPUT_COLUMN: &str = "vllm_output";

const PROGRESS_EVERY: usize = 50;

/// One prompt and the text the model produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub prompt: String,
    pub output: String,
}

/// Sends prompts through the client one at a time, preserving order.
pub struct Runner {
    client: LlmClient,
}

impl Runner {
    /// Create a runner around a client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Generate a completion for every prompt.
    ///
    /// The first failed request aborts the run.
    pub async fn run(&self, prompts: &[String]) -> Result<Vec<Generation>> {
        let start = Instant::now();
        let mut generations = Vec::with_capacity(prompts.len());
        let mut usage = TokenUsage::default();

        info!(
            model = %self.client.config().model,
            prompts = prompts.len(),
            "starting generation"
        );

        for (idx, prompt) in prompts.iter().enumerate() {
            let response = self.client.generate(prompt).await?;

            if let Some(u) = response.usage {
                usage += u;
            }
            debug!(index = idx, finish_reason = ?response.finish_reason, "generated");

            generations.push(Generation {
                prompt: prompt.clone(),
                output: response.content,
            });

            if (idx + 1) % PROGRESS_EVERY == 0 {
                info!("{}/{} prompts done", idx + 1, prompts.len());
            }
        }

        info!(
            prompts = generations.len(),
            total_tokens = usage.total_tokens,
            elapsed = ?start.elapsed(),
            "generation finished"
        );

        Ok(generations)
    }
}

/// Output file name, e.g. `EN-DE_outputs_t04-Llama-2-13b-chat-hf.tsv`.
pub fn generations_file_name(pair: &LanguagePair, template: &str, model_short: &str) -> String {
    format!("{}_outputs_t{}-{}.tsv", pair.upper_code(), template, model_short)
}

/// Write generations as TSV with `prompt` and `vllm_output` columns.
pub fn write_generations(path: &Path, generations: &[Generation]) -> Result<()> {
    let rows = generations
        .iter()
        .map(|g| [g.prompt.as_str(), g.output.as_str()]);
    write_rows(path, Delimiter::Tab, &["prompt", OUTPUT_COLUMN], rows)
}

/// Read generations back from an output file.
pub fn read_generations(path: &Path) -> Result<Vec<Generation>> {
    let table = Table::read_with(path, Delimiter::Tab)?;
    let prompts = table.column("prompt")?;
    let outputs = table.column(OUTPUT_COLUMN)?;
    Ok(prompts
        .into_iter()
        .zip(outputs)
        .map(|(p, o)| Generation {
            prompt: p.to_string(),
            output: o.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::error::EvalError;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> LlmClient {
        LlmClient::new(LlmConfig {
            api_base: uri.to_string(),
            model: "google/gemma-7b-it".to_string(),
            ..Default::default()
        })
    }

    async fn mock_reply(server: &MockServer, prompt: &str, text: &str) {
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "prompt": prompt })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"text": text, "finish_reason": "stop"}]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_run_preserves_prompt_order() {
        let server = MockServer::start().await;
        mock_reply(&server, "first", "Score: 80").await;
        mock_reply(&server, "second", "I would say 35.").await;

        let runner = Runner::new(client(&server.uri()));
        let prompts = vec!["first".to_string(), "second".to_string()];
        let generations = runner.run(&prompts).await.unwrap();

        assert_eq!(generations.len(), 2);
        assert_eq!(generations[0].output, "Score: 80");
        assert_eq!(generations[1].prompt, "second");
        assert_eq!(generations[1].output, "I would say 35.");
    }

    #[tokio::test]
    async fn test_run_aborts_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let runner = Runner::new(client(&server.uri()));
        let result = runner.run(&["x".to_string()]).await;
        assert!(matches!(result, Err(EvalError::LlmApi(_))));
    }

    #[test]
    fn test_generations_file_name() {
        let pair = LanguagePair::from_code("en-de").unwrap();
        assert_eq!(
            generations_file_name(&pair, "04", "Llama-2-13b-chat-hf"),
            "EN-DE_outputs_t04-Llama-2-13b-chat-hf.tsv"
        );
    }

    #[test]
    fn test_generations_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("EN-DE_outputs_t04-gemma.tsv");
        let generations = vec![
            Generation {
                prompt: "<start_of_turn>user\nScore it<end_of_turn>".to_string(),
                output: " 72\n\nThe translation\tis fluent.".to_string(),
            },
            Generation {
                prompt: "p2".to_string(),
                output: "\"quoted\" 10".to_string(),
            },
        ];

        write_generations(&path, &generations).unwrap();
        assert_eq!(read_generations(&path).unwrap(), generations);
    }
}
