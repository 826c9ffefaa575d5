//! Model-specific chat markup wrapped around each instruction.

use crate::error::{EvalError, Result};
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted with the instruction text.
pub const USER_INPUT: &str = "{user_input}";

/// Chat markup expected by a family of instruction-tuned models.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatFormat {
    #[default]
    Llama,
    Gemma,
    Qwen,
    OpenChat,
    Mixtral,
    /// No markup; the instruction is sent as-is.
    Raw,
    /// A user-supplied pattern containing `{user_input}`.
    Custom(String),
}

impl ChatFormat {
    /// The pattern for this format, with `{user_input}` as placeholder.
    pub fn pattern(&self) -> &str {
        match self {
            ChatFormat::Llama => {
                "<s>[INST]<<SYS>>You are a helpful assistant.<</SYS>>{user_input}[/INST]"
            }
            ChatFormat::Gemma => {
                "<start_of_turn>user\n{user_input}<end_of_turn><start_of_turn>model\n"
            }
            ChatFormat::Qwen => "<|im_start|>user\n{user_input}<|im_end|>\n<|im_start|>assistant\n",
            ChatFormat::OpenChat => {
                "GPT4 Correct User: {user_input}\n<|end_of_turn|>GPT4 Correct Assistant:"
            }
            ChatFormat::Mixtral => "<s>[INST]{user_input}[/INST]",
            ChatFormat::Raw => USER_INPUT,
            ChatFormat::Custom(pattern) => pattern,
        }
    }

    /// Wrap an instruction in this format's markup.
    pub fn apply(&self, user_input: &str) -> String {
        self.pattern().replacen(USER_INPUT, user_input, 1)
    }
}

impl FromStr for ChatFormat {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "llama" => Ok(ChatFormat::Llama),
            "gemma" => Ok(ChatFormat::Gemma),
            "qwen" => Ok(ChatFormat::Qwen),
            "openchat" => Ok(ChatFormat::OpenChat),
            "mixtral" => Ok(ChatFormat::Mixtral),
            "raw" | "none" => Ok(ChatFormat::Raw),
            _ if s.contains(USER_INPUT) => Ok(ChatFormat::Custom(s.to_string())),
            _ => Err(EvalError::UnknownChatFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ChatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChatFormat::Llama => "llama",
            ChatFormat::Gemma => "gemma",
            ChatFormat::Qwen => "qwen",
            ChatFormat::OpenChat => "openchat",
            ChatFormat::Mixtral => "mixtral",
            ChatFormat::Raw => "raw",
            ChatFormat::Custom(pattern) => pattern,
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llama_format() {
        assert_eq!(
            ChatFormat::Llama.apply("Score this."),
            "<s>[INST]<<SYS>>You are a helpful assistant.<</SYS>>Score this.[/INST]"
        );
    }

    #[test]
    fn test_mixtral_and_raw() {
        assert_eq!(ChatFormat::Mixtral.apply("hi"), "<s>[INST]hi[/INST]");
        assert_eq!(ChatFormat::Raw.apply("hi"), "hi");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Gemma".parse::<ChatFormat>().unwrap(), ChatFormat::Gemma);
        assert_eq!("openchat".parse::<ChatFormat>().unwrap(), ChatFormat::OpenChat);
        assert!(matches!(
            "falcon".parse::<ChatFormat>(),
            Err(EvalError::UnknownChatFormat(_))
        ));
    }

    #[test]
    fn test_custom_pattern() {
        let format: ChatFormat = "### User\n{user_input}\n### Assistant\n".parse().unwrap();
        assert_eq!(format.apply("go"), "### User\ngo\n### Assistant\n");
    }

    #[test]
    fn test_instruction_braces_are_left_alone() {
        // Instructions may contain literal braces (e.g. JSON requests).
        let out = ChatFormat::Mixtral.apply("reply as {\"score\": n}");
        assert_eq!(out, "<s>[INST]reply as {\"score\": n}[/INST]");
    }
}
