//! Chat-completion client for a hosted LLM.
//!
//! Talks to any OpenAI-compatible API (Groq by default). One user message in,
//! one completion out: no templating, no history, no streaming.

mod config;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use config::LlmConfig;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client could not be built from the configuration
    #[error("Invalid LLM configuration: {0}")]
    Config(String),
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// No API key configured
    #[error("LLM is disabled (no API key configured)")]
    Disabled,
}

/// Chat-completion request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Chat-completion response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error body returned by OpenAI-compatible APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// A ready-to-use handle on the hosted model.
#[derive(Debug)]
pub struct ChatModel {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatModel {
    fn new(config: &LlmConfig, api_key: &str) -> Result<Self, LlmError> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| LlmError::Config(format!("endpoint {:?}: {}", config.endpoint, e)))?;

        if config.model.trim().is_empty() {
            return Err(LlmError::Config("model name is empty".to_string()));
        }
        if !config.temperature.is_finite() || !(0.0..=2.0).contains(&config.temperature) {
            return Err(LlmError::Config(format!(
                "temperature {} outside 0.0-2.0",
                config.temperature
            )));
        }
        if config.max_tokens == 0 {
            return Err(LlmError::Config("max_tokens must be positive".to_string()));
        }
        if config.timeout_secs == 0 {
            return Err(LlmError::Config("timeout_secs must be positive".to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| LlmError::Config("API key contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.completions_url(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Model identifier this handle sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user message and return the model's reply.
    pub async fn invoke(&self, message: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: message,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        debug!("Sending prompt to {} ({} chars)", self.model, message.len());
        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api(format!("HTTP {}: {}", status, detail)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::Parse("response contained no choices".to_string()))
    }
}

/// LLM client. Disabled (no chat handle) when no API key is configured.
pub struct LlmClient {
    chat: Option<ChatModel>,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    ///
    /// A missing API key is not an error: the client is created without a
    /// chat handle and a warning is logged. Any other configuration problem
    /// is returned to the caller.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(str::to_string);

        let Some(api_key) = api_key else {
            warn!("No API key found (set GROQ_API_KEY or LLM_API_KEY). LLM functionality will not work.");
            return Ok(Self { chat: None });
        };

        let chat = ChatModel::new(&config, &api_key).inspect_err(|e| {
            error!("Unable to initialize LLM: {}", e);
        })?;
        info!("LLM initialized with model: {}", config.model);

        Ok(Self { chat: Some(chat) })
    }

    /// The chat handle, or `None` if the client is disabled.
    pub fn chat_model(&self) -> Option<&ChatModel> {
        self.chat.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.chat.is_some()
    }

    /// Send one message through the chat handle.
    pub async fn complete(&self, message: &str) -> Result<String, LlmError> {
        let chat = self.chat.as_ref().ok_or(LlmError::Disabled)?;
        chat.invoke(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn test_missing_api_key_disables_client() {
        let client = LlmClient::new(LlmConfig::default()).unwrap();
        assert!(!client.is_enabled());
        assert!(client.chat_model().is_none());
    }

    #[test]
    fn test_blank_api_key_disables_client() {
        let client = LlmClient::new(LlmConfig::default().with_api_key("   ")).unwrap();
        assert!(client.chat_model().is_none());
    }

    #[tokio::test]
    async fn test_disabled_client_never_calls_network() {
        // Unroutable endpoint: any request attempt would surface as Connection.
        let config = LlmConfig::default().with_endpoint("http://0.0.0.0:9");
        let client = LlmClient::new(config).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::Disabled));
    }

    #[test]
    fn test_invalid_configuration_fails_construction() {
        let bad_endpoint = LlmConfig::default()
            .with_api_key("key")
            .with_endpoint("not a url");
        assert!(matches!(
            LlmClient::new(bad_endpoint),
            Err(LlmError::Config(_))
        ));

        let mut hot = LlmConfig::default().with_api_key("key");
        hot.temperature = 3.5;
        assert!(matches!(LlmClient::new(hot), Err(LlmError::Config(_))));

        let mut no_tokens = LlmConfig::default().with_api_key("key");
        no_tokens.max_tokens = 0;
        assert!(matches!(LlmClient::new(no_tokens), Err(LlmError::Config(_))));

        let mut no_timeout = LlmConfig::default().with_api_key("key");
        no_timeout.timeout_secs = 0;
        assert!(matches!(LlmClient::new(no_timeout), Err(LlmError::Config(_))));

        let bad_key = LlmConfig::default().with_api_key("line\nbreak");
        assert!(matches!(LlmClient::new(bad_key), Err(LlmError::Config(_))));
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest {
            model: "llama3-70b-8192",
            messages: vec![ChatMessage {
                role: "user",
                content: "What is the capital of France?",
            }],
            temperature: 0.5,
            max_tokens: 4096,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3-70b-8192");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "What is the capital of France?");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["stream"], false);
    }

    #[tokio::test]
    async fn test_invoke_returns_first_choice() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Paris."}}]}"#,
        )
        .await;

        let config = LlmConfig::default()
            .with_api_key("gsk_test")
            .with_endpoint(&endpoint);
        let client = LlmClient::new(config).unwrap();
        let chat = client.chat_model().unwrap();
        assert_eq!(chat.model(), "llama3-70b-8192");
        let reply = chat
            .invoke("What is the capital of France?")
            .await
            .unwrap();
        assert_eq!(reply, "Paris.");

        let raw_request = server.await.unwrap();
        assert!(raw_request.starts_with("POST /v1/chat/completions"));
        assert!(raw_request
            .to_lowercase()
            .contains("authorization: bearer gsk_test"));
        assert!(raw_request.contains("What is the capital of France?"));
    }

    #[tokio::test]
    async fn test_invoke_surfaces_api_error_message() {
        let (endpoint, server) = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#,
        )
        .await;

        let config = LlmConfig::default()
            .with_api_key("wrong")
            .with_endpoint(&endpoint);
        let client = LlmClient::new(config).unwrap();
        let err = client.complete("hi").await.unwrap_err();
        match err {
            LlmError::Api(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Invalid API Key"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_without_choices_is_parse_error() {
        let (endpoint, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

        let config = LlmConfig::default()
            .with_api_key("gsk_test")
            .with_endpoint(&endpoint);
        let client = LlmClient::new(config).unwrap();
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
        server.await.unwrap();
    }
}
