//! LLM integration for one-shot prompt completion.
//!
//! Uses a hosted chat-completion model (Groq's OpenAI-compatible API by default).

mod client;

pub use client::{ChatModel, LlmClient, LlmConfig, LlmError};
