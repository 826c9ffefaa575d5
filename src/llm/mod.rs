//! LLM integration module.
//!
//! Provides an OpenAI-compatible completion client and the batch runner
//! that feeds prompt files through it.

mod client;
mod runner;

pub use client::{LlmClient, LlmResponse, TokenUsage};
pub use runner::{Generation, Runner, generations_file_name, read_generations, write_generations};
