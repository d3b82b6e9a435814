use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{InterestError, InterestResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Requested output size; the `text-embedding-3-*` models shorten on request.
    pub dimension: usize,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>, dimension: usize) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            dimension,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> InterestResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.config.dimension]);
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: [text],
            dimensions: self.config.dimension,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(InterestError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await?;
        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| InterestError::Embedding("No embedding returned".to_string()))?;

        if embedding.len() != self.config.dimension {
            return Err(InterestError::Embedding(format!(
                "model {} returned {} values, expected {}",
                self.config.model,
                embedding.len(),
                self.config.dimension
            )));
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = EmbeddingRequest {
            model: DEFAULT_OPENAI_MODEL,
            input: ["board games"],
            dimensions: 100,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["input"][0], "board games");
        assert_eq!(json["dimensions"], 100);
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_api() {
        let provider = OpenAIProvider::new(
            OpenAIConfig::new("unused", 8).with_base_url("http://127.0.0.1:9"),
        );
        assert_eq!(provider.embed("  ").await.unwrap(), vec![0.0; 8]);
    }
}
