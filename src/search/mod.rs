//! Query dispatch: keyword, semantic, and hybrid search
//!
//! Keyword and semantic relevance come entirely from the engine; hybrid mode
//! issues both legs and combines their scores client-side with a weighted
//! sum.

mod body;
mod dispatcher;
mod fusion;

pub use body::{keyword_query, semantic_query};
pub use dispatcher::QueryDispatcher;
pub use fusion::{weighted_sum_fusion, FusedHit, FusionWeights};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("query text cannot be empty")]
    EmptyQuery,

    #[error("invalid weight configuration: weights must be positive and finite")]
    InvalidWeights,

    #[error("embedding query {query:?} failed: {source}")]
    Embedding {
        query: String,
        source: EmbeddingError,
    },

    #[error("engine rejected query {query:?}: {source}")]
    Engine { query: String, source: EngineError },
}

/// Search mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Keyword,
    Semantic,
    Hybrid,
}

/// A search request
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub text: String,
    pub mode: SearchMode,
    pub limit: usize,
    pub weights: FusionWeights,
}

/// A ranked result: product id, combined score, per-leg scores (hybrid
/// only), and the stored product fields for display.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredHit {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    pub source: Value,
}
