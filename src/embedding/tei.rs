//! HTTP client for a TEI-compatible /embeddings endpoint

use serde::Deserialize;
use serde_json::json;

use crate::config::{EmbeddingConfig, RetryConfig};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::retry::RetryPolicy;

/// Client for the external embedding server.
///
/// Sends OpenAI-style `{"input": [...]}` bodies and expects
/// `{"data": [{"embedding": [...]}]}` back, one row per input text.
pub struct TeiClient {
    http: reqwest::Client,
    endpoint: String,
    dimension: usize,
    batch_size: usize,
    retry: RetryPolicy,
}

/// Blank entries are replaced with `""` so the response stays positionally
/// aligned with the input batch.
fn clean_batch(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .map(|t| {
            if t.trim().is_empty() {
                String::new()
            } else {
                t.clone()
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl TeiClient {
    pub fn new(config: &EmbeddingConfig, retry: &RetryConfig) -> Result<Self, EmbeddingError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EmbeddingError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/embeddings", config.url.trim_end_matches('/')),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
            retry: RetryPolicy::new(retry.max_retries, retry.backoff()),
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "input": texts }))
            .send()
            .await
            .map_err(|e| EmbeddingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "server returned {} embeddings for {} inputs",
                parsed.data.len(),
                texts.len()
            )));
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for row in parsed.data {
            if row.embedding.len() != self.dimension {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: row.embedding.len(),
                });
            }
            vectors.push(row.embedding);
        }

        Ok(vectors)
    }
}

impl EmbeddingProvider for TeiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("empty text".to_string()));
        }

        let texts = vec![text.to_string()];
        let texts = texts.as_slice();
        let mut vectors = self.retry.run(move || self.request(texts)).await?;

        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::MalformedResponse("no embeddings returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let cleaned = clean_batch(texts);

        // Process in chunks of batch_size
        let mut vectors = Vec::with_capacity(cleaned.len());
        for chunk in cleaned.chunks(self.batch_size) {
            vectors.extend(self.retry.run(move || self.request(chunk)).await?);
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
