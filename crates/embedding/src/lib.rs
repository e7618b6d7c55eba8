//! Text → fixed-length vector capability.
//!
//! The concrete dimension is a property of the configured model, not of this
//! contract: callers must keep the vector store's collection dimension in
//! sync with whatever `EmbeddingClient::embed` returns.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

/// Deterministic for a given `(text, model)` pair. Failure is not retried
/// here — the caller (a use case, via the vector store port) decides whether
/// to degrade or propagate.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Identifier of the model backing this client, surfaced for logging and
    /// for collection-dimension sanity checks.
    fn model(&self) -> &str;
}

/// OpenAI-compatible `/embeddings` adapter (text-embedding-3-small by
/// default).
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiEmbeddingClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let endpoint = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "model": self.model,
            "input": text,
        });

        debug!(model = %self.model, chars = text.len(), "embedding request");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("embedding request failed to send")?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .context("embedding response was not valid JSON")?;

        if !status.is_success() {
            bail!("embedding provider returned {status}: {body}");
        }

        let vector = body
            .get("data")
            .and_then(|data| data.get(0))
            .and_then(|first| first.get("embedding"))
            .and_then(|embedding| embedding.as_array())
            .ok_or_else(|| {
                warn!(%body, "embedding response missing data[0].embedding");
                anyhow::anyhow!("embedding response missing data[0].embedding")
            })?;

        vector
            .iter()
            .map(|value| {
                value
                    .as_f64()
                    .map(|v| v as f32)
                    .ok_or_else(|| anyhow::anyhow!("embedding component was not a number"))
            })
            .collect()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbeddingClient(Vec<f32>);

    #[async_trait]
    impl EmbeddingClient for FixedEmbeddingClient {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }

        fn model(&self) -> &str {
            "fixed-test-model"
        }
    }

    #[tokio::test]
    async fn deterministic_for_fixed_double() {
        let client = FixedEmbeddingClient(vec![0.1, 0.2, 0.3]);
        let a = client.embed("hello").await.unwrap();
        let b = client.embed("hello").await.unwrap();
        assert_eq!(a, b);
    }
}
