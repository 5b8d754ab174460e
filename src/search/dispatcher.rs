//! Stateless query dispatcher over the engine and embedding clients

use crate::embedding::EmbeddingProvider;
use crate::engine::{RawHit, SearchEngine};
use crate::search::{
    keyword_query, semantic_query, weighted_sum_fusion, FusionWeights, QueryError, ScoredHit,
    SearchMode, SearchRequest,
};

/// Hybrid legs fetch more candidates than the final limit so the fused
/// union has enough overlap to combine.
const HYBRID_CANDIDATE_MULTIPLIER: usize = 2;

/// Dispatches one of the three query shapes and returns ranked hits
pub struct QueryDispatcher<'a, S, P> {
    engine: &'a S,
    embedder: &'a P,
}

impl<'a, S, P> QueryDispatcher<'a, S, P>
where
    S: SearchEngine,
    P: EmbeddingProvider,
{
    pub fn new(engine: &'a S, embedder: &'a P) -> Self {
        Self { engine, embedder }
    }

    /// Run the request and return ranked results.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredHit>, QueryError> {
        if request.text.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        match request.mode {
            SearchMode::Keyword => self.keyword(request).await,
            SearchMode::Semantic => self.semantic(request).await,
            SearchMode::Hybrid => self.hybrid(request).await,
        }
    }

    async fn keyword(&self, request: &SearchRequest) -> Result<Vec<ScoredHit>, QueryError> {
        let hits = self
            .keyword_leg(&request.text, request.limit)
            .await?
            .into_iter()
            .map(|hit| ScoredHit {
                id: hit.id,
                score: hit.score,
                keyword_score: Some(hit.score),
                semantic_score: None,
                source: hit.source,
            })
            .collect();
        Ok(hits)
    }

    async fn semantic(&self, request: &SearchRequest) -> Result<Vec<ScoredHit>, QueryError> {
        let hits = self
            .semantic_leg(&request.text, request.limit)
            .await?
            .into_iter()
            .map(|hit| ScoredHit {
                id: hit.id,
                score: hit.score,
                keyword_score: None,
                semantic_score: Some(hit.score),
                source: hit.source,
            })
            .collect();
        Ok(hits)
    }

    async fn hybrid(&self, request: &SearchRequest) -> Result<Vec<ScoredHit>, QueryError> {
        // Re-validate: the weights are plain data and may not have come
        // through the checked constructor.
        let weights = FusionWeights::new(request.weights.keyword, request.weights.semantic)?;

        let candidate_limit = request.limit * HYBRID_CANDIDATE_MULTIPLIER;
        let (keyword_hits, semantic_hits) = tokio::join!(
            self.keyword_leg(&request.text, candidate_limit),
            self.semantic_leg(&request.text, candidate_limit)
        );

        let mut fused = weighted_sum_fusion(keyword_hits?, semantic_hits?, &weights);
        fused.truncate(request.limit);

        Ok(fused
            .into_iter()
            .map(|hit| ScoredHit {
                id: hit.id,
                score: hit.score,
                keyword_score: Some(hit.keyword_score),
                semantic_score: Some(hit.semantic_score),
                source: hit.source,
            })
            .collect())
    }

    async fn keyword_leg(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, QueryError> {
        let body = keyword_query(text, limit);
        self.engine
            .search(&body)
            .await
            .map_err(|source| QueryError::Engine {
                query: text.to_string(),
                source,
            })
    }

    async fn semantic_leg(&self, text: &str, limit: usize) -> Result<Vec<RawHit>, QueryError> {
        let vector = self
            .embedder
            .embed(text)
            .await
            .map_err(|source| QueryError::Embedding {
                query: text.to_string(),
                source,
            })?;

        let body = semantic_query(&vector, limit);
        self.engine
            .search(&body)
            .await
            .map_err(|source| QueryError::Engine {
                query: text.to_string(),
                source,
            })
    }
}
