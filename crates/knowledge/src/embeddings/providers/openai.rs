//! OpenAI embedding provider.
//!
//! Calls `POST {endpoint}/embeddings` with bearer authentication. The whole
//! batch goes out in one request and transient failures are retried with
//! exponential backoff.

use crate::embeddings::provider::{check_dimensions, EmbeddingProvider};
use async_trait::async_trait;
use forge_core::config::EmbeddingSettings;
use forge_core::{retry_async, AppError, AppResult, RetryPolicy};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI embeddings client.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    pub fn new(settings: &EmbeddingSettings, api_key: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for OpenAI: {}", e))
            })?;

        let base_url = settings
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    /// Order results by `index` and check their shape.
    fn collect_embeddings(
        &self,
        response: EmbeddingResponse,
        expected: usize,
    ) -> AppResult<Vec<Vec<f32>>> {
        if response.data.len() != expected {
            return Err(AppError::Embedding(format!(
                "OpenAI returned {} embeddings for {} inputs",
                response.data.len(),
                expected
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .map(|d| {
                check_dimensions("openai", &d.embedding, self.dimensions)?;
                Ok(d.embedding)
            })
            .collect()
    }

    async fn embed_once(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(self.embeddings_url())
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to OpenAI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse OpenAI response: {}", e)))?;

        self.collect_embeddings(body, texts.len())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "openai", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts", texts.len());
        retry_async(self.retry, "OpenAI embedding", || self.embed_once(texts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(endpoint: Option<&str>) -> OpenAIProvider {
        let settings = EmbeddingSettings {
            endpoint: endpoint.map(str::to_string),
            dimensions: 3,
            ..EmbeddingSettings::default()
        };
        OpenAIProvider::new(&settings, "sk-test").unwrap()
    }

    #[test]
    fn test_default_endpoint() {
        let provider = provider(None);
        assert_eq!(provider.embeddings_url(), "https://api.openai.com/v1/embeddings");
        assert_eq!(provider.model_name(), "text-embedding-ada-002");
    }

    #[test]
    fn test_custom_endpoint() {
        let provider = provider(Some("http://localhost:9000/v1/"));
        assert_eq!(provider.embeddings_url(), "http://localhost:9000/v1/embeddings");
    }

    #[test]
    fn test_request_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let json = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-ada-002",
            input: &input,
        })
        .unwrap();
        assert_eq!(json["model"], "text-embedding-ada-002");
        assert_eq!(json["input"][1], "b");
    }

    #[test]
    fn test_collect_orders_by_index() {
        let provider = provider(None);
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data": [
                {"index": 1, "embedding": [0.0, 1.0, 0.0]},
                {"index": 0, "embedding": [1.0, 0.0, 0.0]}
            ]}"#,
        )
        .unwrap();

        let embeddings = provider.collect_embeddings(response, 2).unwrap();
        assert_eq!(embeddings[0], vec![1.0, 0.0, 0.0]);
        assert_eq!(embeddings[1], vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_collect_rejects_wrong_dimension() {
        let provider = provider(None);
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data": [{"index": 0, "embedding": [1.0, 0.0]}]}"#).unwrap();

        let result = provider.collect_embeddings(response, 1);
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[test]
    fn test_collect_rejects_short_batch() {
        let provider = provider(None);
        let response: EmbeddingResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(provider.collect_embeddings(response, 1).is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let provider = provider(Some("http://127.0.0.1:1"));
        let embeddings = provider.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
