//! Embedding generation via an external TEI-compatible server
//!
//! The only implementation talks HTTP; the trait exists so ingestion and
//! query dispatch can be exercised against a stub in tests.

mod tei;

pub use tei::TeiClient;

use crate::retry::Transient;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Network-level failure (connect, timeout, broken transfer)
    #[error("embedding request failed: {0}")]
    Transport(String),

    /// Non-2xx response from the embedding server
    #[error("embedding server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Returned vector length does not match the configured dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Transient for EmbeddingError {
    fn is_transient(&self) -> bool {
        match self {
            EmbeddingError::Transport(_) => true,
            EmbeddingError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Trait for embedding providers
///
/// One text in, one fixed-dimension vector out; batch variant for ingestion.
pub trait EmbeddingProvider {
    /// Generate an embedding for a single text
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbeddingError>> + Send;

    /// Generate embeddings for multiple texts in one request
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// The vector dimension this provider produces
    fn dimension(&self) -> usize;
}
