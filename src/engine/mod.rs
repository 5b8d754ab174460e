//! HTTP client for the external search engine (Elasticsearch)
//!
//! The engine owns the inverted index, the dense-vector index, and all
//! relevance scoring; this module only shapes requests and parses hits.

mod mapping;

pub use mapping::index_mapping;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{EngineConfig, RetryConfig};
use crate::retry::{RetryPolicy, Transient};

#[derive(Error, Debug)]
pub enum EngineError {
    /// Network-level failure (connect, timeout, broken transfer)
    #[error("engine request failed: {0}")]
    Transport(String),

    /// Non-2xx response from the engine
    #[error("engine returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("malformed engine response: {0}")]
    MalformedResponse(String),
}

impl Transient for EngineError {
    fn is_transient(&self) -> bool {
        match self {
            EngineError::Transport(_) => true,
            EngineError::Status { status, .. } => *status >= 500 || *status == 429,
            EngineError::MalformedResponse(_) => false,
        }
    }
}

/// A raw hit from the engine: document id, engine-assigned score, source
#[derive(Debug, Clone)]
pub struct RawHit {
    pub id: String,
    pub score: f32,
    pub source: Value,
}

/// Narrow seam over the engine operations the loader and dispatcher need.
/// `EsClient` is the only production implementation; tests stub it.
pub trait SearchEngine {
    fn put_document(
        &self,
        id: &str,
        document: &Value,
    ) -> impl std::future::Future<Output = Result<(), EngineError>> + Send;

    fn search(
        &self,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<Vec<RawHit>, EngineError>> + Send;

    fn refresh(&self) -> impl std::future::Future<Output = Result<(), EngineError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<u64, EngineError>> + Send;
}

/// Elasticsearch HTTP client bound to one index
pub struct EsClient {
    http: reqwest::Client,
    base_url: String,
    index: String,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

impl EsClient {
    pub fn new(config: &EngineConfig, retry: &RetryConfig) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.index.clone(),
            retry: RetryPolicy::new(retry.max_retries, retry.backoff()),
        })
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn index_url(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            format!("{}/{}", self.base_url, self.index)
        } else {
            format!("{}/{}/{}", self.base_url, self.index, suffix)
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(EngineError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Whether the configured index exists
    pub async fn index_exists(&self) -> Result<bool, EngineError> {
        self.retry
            .run(move || async move {
                let response = self
                    .http
                    .head(self.index_url(""))
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                match response.status().as_u16() {
                    200 => Ok(true),
                    404 => Ok(false),
                    status => Err(EngineError::Status {
                        status,
                        body: String::new(),
                    }),
                }
            })
            .await
    }

    /// Drop the configured index. Missing index is not an error.
    pub async fn delete_index(&self) -> Result<(), EngineError> {
        self.retry
            .run(move || async move {
                let response = self
                    .http
                    .delete(self.index_url(""))
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                if response.status().as_u16() == 404 {
                    return Ok(());
                }
                Self::check_status(response).await.map(|_| ())
            })
            .await
    }

    /// Create the index with the product mapping (text fields plus a
    /// dense_vector of `dims`).
    pub async fn create_index(&self, dims: usize) -> Result<(), EngineError> {
        let body = index_mapping(dims);
        let body = &body;
        self.retry
            .run(move || async move {
                let response = self
                    .http
                    .put(self.index_url(""))
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                Self::check_status(response).await.map(|_| ())
            })
            .await
    }
}

impl SearchEngine for EsClient {
    async fn put_document(&self, id: &str, document: &Value) -> Result<(), EngineError> {
        self.retry
            .run(move || async move {
                let response = self
                    .http
                    .put(self.index_url(&format!("_doc/{}", id)))
                    .json(document)
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                Self::check_status(response).await.map(|_| ())
            })
            .await
    }

    async fn search(&self, body: &Value) -> Result<Vec<RawHit>, EngineError> {
        let response = self
            .retry
            .run(move || async move {
                let response = self
                    .http
                    .post(self.index_url("_search"))
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                Self::check_status(response).await
            })
            .await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;

        Ok(parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| RawHit {
                id: hit.id,
                score: hit.score.unwrap_or(0.0),
                source: hit.source,
            })
            .collect())
    }

    async fn refresh(&self) -> Result<(), EngineError> {
        self.retry
            .run(move || async move {
                let response = self
                    .http
                    .post(self.index_url("_refresh"))
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                Self::check_status(response).await.map(|_| ())
            })
            .await
    }

    async fn count(&self) -> Result<u64, EngineError> {
        let response = self
            .retry
            .run(move || async move {
                let response = self
                    .http
                    .get(self.index_url("_count"))
                    .send()
                    .await
                    .map_err(|e| EngineError::Transport(e.to_string()))?;

                Self::check_status(response).await
            })
            .await?;

        let parsed: CountResponse = response
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(e.to_string()))?;

        Ok(parsed.count)
    }
}
