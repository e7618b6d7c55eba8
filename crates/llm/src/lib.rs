//! Chat-style LLM capability.
//!
//! Parameters recognized by the core: `{model, messages, max_completion_tokens,
//! temperature?, response_format?}`. The return value is always the
//! assistant message content as a single string — tool calling, streaming
//! and multi-provider fallback are not part of this contract.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// Role in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// A single message handed to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// `response_format = "json_object"` requests a JSON-only body; the core
/// still defensively parses rather than trusting the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    JsonObject,
}

#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_completion_tokens: u32,
    pub temperature: Option<f32>,
    pub response_format: Option<ResponseFormat>,
}

/// Model name prefixes that reject a custom `temperature` (reasoning
/// models spend their sampling budget on hidden chain-of-thought and only
/// support their default).
const REASONING_MODEL_PREFIXES: &[&str] = &["gpt-5", "o1", "o3"];

pub fn is_reasoning_model(model: &str) -> bool {
    REASONING_MODEL_PREFIXES
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, params: ChatParams) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` adapter.
#[derive(Debug, Clone)]
pub struct OpenAiLlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiLlmClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn chat(&self, params: ChatParams) -> Result<String> {
        let endpoint = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let messages: Vec<serde_json::Value> = params
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                };
                json!({ "role": role, "content": m.content })
            })
            .collect();

        let mut payload = json!({
            "model": params.model,
            "messages": messages,
            "max_completion_tokens": params.max_completion_tokens,
        });

        if !is_reasoning_model(&params.model) {
            if let Some(temperature) = params.temperature {
                payload["temperature"] = json!(temperature);
            }
        } else if params.temperature.is_some() {
            debug!(model = %params.model, "omitting temperature for reasoning-family model");
        }

        if let Some(ResponseFormat::JsonObject) = params.response_format {
            payload["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("chat completion request failed to send")?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .context("chat completion response was not valid JSON")?;

        if !status.is_success() {
            bail!("LLM provider returned {status}: {body}");
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str());

        match content {
            Some(text) => Ok(text.to_string()),
            None => {
                warn!(%body, "chat completion response missing choices[0].message.content");
                bail!("chat completion response missing choices[0].message.content")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasoning_prefixes_are_matched() {
        assert!(is_reasoning_model("gpt-5-nano"));
        assert!(is_reasoning_model("o1-preview"));
        assert!(!is_reasoning_model("gpt-4o-mini"));
    }

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn chat(&self, params: ChatParams) -> Result<String> {
            Ok(params.messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn echo_client_returns_last_message() {
        let client = EchoClient;
        let params = ChatParams {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hello")],
            max_completion_tokens: 100,
            temperature: Some(0.8),
            response_format: Some(ResponseFormat::JsonObject),
        };
        assert_eq!(client.chat(params).await.unwrap(), "hello");
    }
}
