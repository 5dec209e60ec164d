//! LLM client configuration.

use serde::{Deserialize, Serialize};

use crate::config::{first_set, parse_value, ConfigError, Lookup};

/// Configuration for the chat-completion client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the hosted service. Without one the client stays disabled.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.groq.com/openai".to_string()
}

fn default_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Apply overrides.
    ///
    /// Supported variables (the first one set wins):
    /// - `LLM_API_KEY`, `GROQ_API_KEY`: API key
    /// - `LLM_ENDPOINT`: API base URL
    /// - `LLM_MODEL`, `MODEL_NAME`: model identifier
    /// - `LLM_TEMPERATURE`, `TEMPERATURE`: sampling temperature
    /// - `LLM_MAX_TOKENS`, `MAX_TOKENS`: maximum tokens in response
    /// - `LLM_TIMEOUT_SECS`: request timeout
    pub fn with_overrides(mut self, lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        if let Some((_, key)) = first_set(lookup, &["LLM_API_KEY", "GROQ_API_KEY"]) {
            self.api_key = Some(key);
        }
        if let Some((_, endpoint)) = first_set(lookup, &["LLM_ENDPOINT"]) {
            self.endpoint = endpoint;
        }
        if let Some((_, model)) = first_set(lookup, &["LLM_MODEL", "MODEL_NAME"]) {
            self.model = model;
        }
        if let Some((var, val)) = first_set(lookup, &["LLM_TEMPERATURE", "TEMPERATURE"]) {
            self.temperature = parse_value(var, &val)?;
        }
        if let Some((var, val)) = first_set(lookup, &["LLM_MAX_TOKENS", "MAX_TOKENS"]) {
            self.max_tokens = parse_value(var, &val)?;
        }
        if let Some((var, val)) = first_set(lookup, &["LLM_TIMEOUT_SECS"]) {
            self.timeout_secs = parse_value(var, &val)?;
        }
        Ok(self)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Full URL of the chat-completions route.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}
