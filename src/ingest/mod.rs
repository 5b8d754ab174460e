//! Catalog ingestion into the search engine
//!
//! Per-record write failures are logged and collected, not fatal; the batch
//! only fails once the failed fraction reaches the configured threshold.

use thiserror::Error;

use crate::catalog::Product;
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::engine::{EngineError, SearchEngine};

#[derive(Error, Debug)]
pub enum IngestError {
    /// Embedding the batch failed; nothing was written
    #[error("embedding catalog batch failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Too many per-record failures
    #[error("{failed} of {total} records failed (threshold {threshold})")]
    ThresholdExceeded {
        failed: usize,
        total: usize,
        threshold: f32,
    },

    /// Engine failure outside the per-record writes (e.g. refresh)
    #[error("search engine error: {0}")]
    Engine(#[from] EngineError),
}

/// A single record that could not be indexed
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of an ingestion run
#[derive(Debug, Default)]
pub struct IngestReport {
    pub indexed: usize,
    /// Records rejected before the write (wrong dimension, missing vector)
    pub skipped: Vec<RecordFailure>,
    /// Records the engine refused to index
    pub failures: Vec<RecordFailure>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.indexed + self.skipped.len() + self.failures.len()
    }

    fn failed(&self) -> usize {
        self.skipped.len() + self.failures.len()
    }
}

/// Writes product records (plus embeddings) into the engine's index
pub struct CatalogLoader<'a, S, P> {
    engine: &'a S,
    embedder: Option<&'a P>,
    dimension: usize,
    failure_threshold: f32,
}

impl<'a, S, P> CatalogLoader<'a, S, P>
where
    S: SearchEngine,
    P: EmbeddingProvider,
{
    /// With `embedder: None`, records without a precomputed vector are
    /// indexed with a zero vector of `dimension` (keyword search still
    /// works; semantic scores are meaningless).
    pub fn new(
        engine: &'a S,
        embedder: Option<&'a P>,
        dimension: usize,
        failure_threshold: f32,
    ) -> Self {
        Self {
            engine,
            embedder,
            dimension,
            failure_threshold,
        }
    }

    /// Index the catalog, one document per product.
    pub async fn load(&self, products: &[Product]) -> Result<IngestReport, IngestError> {
        if products.is_empty() {
            return Ok(IngestReport::default());
        }

        let vectors = self.resolve_vectors(products).await?;

        let mut report = IngestReport::default();
        for (product, vector) in products.iter().zip(vectors.into_iter()) {
            let Some(vector) = vector else {
                tracing::warn!("skipping {}: embedding server returned no vector", product.id);
                report.skipped.push(RecordFailure {
                    id: product.id.clone(),
                    reason: "embedding server returned no vector".to_string(),
                });
                continue;
            };

            if vector.len() != self.dimension {
                tracing::warn!(
                    "skipping {}: embedding has {} dims, index expects {}",
                    product.id,
                    vector.len(),
                    self.dimension
                );
                report.skipped.push(RecordFailure {
                    id: product.id.clone(),
                    reason: format!(
                        "embedding dimension mismatch: expected {}, got {}",
                        self.dimension,
                        vector.len()
                    ),
                });
                continue;
            }

            let document = product.to_document(&vector);
            match self.engine.put_document(&product.id, &document).await {
                Ok(()) => {
                    tracing::info!("indexed {}: {}", product.id, product.name);
                    report.indexed += 1;
                }
                Err(e) => {
                    tracing::warn!("failed to index {}: {}", product.id, e);
                    report.failures.push(RecordFailure {
                        id: product.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let failed_fraction = report.failed() as f32 / products.len() as f32;
        if failed_fraction >= self.failure_threshold {
            return Err(IngestError::ThresholdExceeded {
                failed: report.failed(),
                total: products.len(),
                threshold: self.failure_threshold,
            });
        }

        if report.indexed > 0 {
            self.engine.refresh().await?;
        }

        Ok(report)
    }

    /// One vector per product: precomputed wins, then the embedding server,
    /// then zeros when embeddings are disabled. `None` marks a record the
    /// server returned no vector for.
    async fn resolve_vectors(
        &self,
        products: &[Product],
    ) -> Result<Vec<Option<Vec<f32>>>, IngestError> {
        let pending: Vec<(usize, String)> = products
            .iter()
            .enumerate()
            .filter(|(_, p)| p.embedding.is_none())
            .map(|(i, p)| (i, p.embedding_text()))
            .collect();

        let mut computed = if let (Some(embedder), false) = (self.embedder, pending.is_empty()) {
            let texts: Vec<String> = pending.iter().map(|(_, t)| t.clone()).collect();
            let computed = embedder.embed_batch(&texts).await?;
            if computed.len() < texts.len() {
                tracing::warn!(
                    "embedding server returned {} vectors for {} texts",
                    computed.len(),
                    texts.len()
                );
            }
            computed
        } else {
            Vec::new()
        };

        let mut vectors = Vec::with_capacity(products.len());
        let mut computed_iter = computed.drain(..);
        for product in products {
            match &product.embedding {
                Some(vector) => vectors.push(Some(vector.clone())),
                None if self.embedder.is_some() => vectors.push(computed_iter.next()),
                None => vectors.push(Some(vec![0.0; self.dimension])),
            }
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sample_catalog;
    use crate::engine::RawHit;
    use serde_json::Value;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    const DIMS: usize = 4;

    struct FakeEngine {
        documents: Mutex<HashMap<String, Value>>,
        failing_ids: HashSet<String>,
        refreshed: Mutex<bool>,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                documents: Mutex::new(HashMap::new()),
                failing_ids: HashSet::new(),
                refreshed: Mutex::new(false),
            }
        }

        fn failing(ids: &[&str]) -> Self {
            let mut engine = Self::new();
            engine.failing_ids = ids.iter().map(|s| s.to_string()).collect();
            engine
        }
    }

    impl SearchEngine for FakeEngine {
        async fn put_document(&self, id: &str, document: &Value) -> Result<(), EngineError> {
            if self.failing_ids.contains(id) {
                return Err(EngineError::Status {
                    status: 400,
                    body: "mapper_parsing_exception".to_string(),
                });
            }
            self.documents
                .lock()
                .unwrap()
                .insert(id.to_string(), document.clone());
            Ok(())
        }

        async fn search(&self, _body: &Value) -> Result<Vec<RawHit>, EngineError> {
            Ok(Vec::new())
        }

        async fn refresh(&self) -> Result<(), EngineError> {
            *self.refreshed.lock().unwrap() = true;
            Ok(())
        }

        async fn count(&self) -> Result<u64, EngineError> {
            Ok(self.documents.lock().unwrap().len() as u64)
        }
    }

    struct FakeProvider;

    impl EmbeddingProvider for FakeProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![0.5; DIMS])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![0.5; DIMS]).collect())
        }

        fn dimension(&self) -> usize {
            DIMS
        }
    }

    #[tokio::test]
    async fn indexes_full_catalog() {
        let engine = FakeEngine::new();
        let provider = FakeProvider;
        let loader = CatalogLoader::new(&engine, Some(&provider), DIMS, 1.0);

        let products = sample_catalog().unwrap();
        let report = loader.load(&products).await.unwrap();

        assert_eq!(report.indexed, 8);
        assert!(report.skipped.is_empty());
        assert!(report.failures.is_empty());
        assert!(*engine.refreshed.lock().unwrap());

        let docs = engine.documents.lock().unwrap();
        assert_eq!(docs["p001"]["embedding"].as_array().unwrap().len(), DIMS);
    }

    #[tokio::test]
    async fn wrong_dimension_record_is_skipped_not_fatal() {
        let engine = FakeEngine::new();
        let provider = FakeProvider;
        let loader = CatalogLoader::new(&engine, Some(&provider), DIMS, 1.0);

        let mut products = sample_catalog().unwrap();
        // Precomputed vector of the wrong length on one record
        products[2].embedding = Some(vec![0.1; DIMS + 3]);

        let report = loader.load(&products).await.unwrap();

        assert_eq!(report.indexed, 7);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, "p003");
        assert!(report.skipped[0].reason.contains("dimension mismatch"));
        assert!(!engine.documents.lock().unwrap().contains_key("p003"));
    }

    #[tokio::test]
    async fn under_returning_provider_skips_the_shorted_record() {
        struct ShortProvider;

        impl EmbeddingProvider for ShortProvider {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
                Ok(vec![0.5; DIMS])
            }

            // Returns one vector fewer than asked for
            async fn embed_batch(
                &self,
                texts: &[String],
            ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
                Ok(texts
                    .iter()
                    .take(texts.len().saturating_sub(1))
                    .map(|_| vec![0.5; DIMS])
                    .collect())
            }

            fn dimension(&self) -> usize {
                DIMS
            }
        }

        let engine = FakeEngine::new();
        let provider = ShortProvider;
        let loader = CatalogLoader::new(&engine, Some(&provider), DIMS, 1.0);

        let products = sample_catalog().unwrap();
        let report = loader.load(&products).await.unwrap();

        assert_eq!(report.indexed, 7);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].id, "p008");
        assert!(report.skipped[0].reason.contains("no vector"));
        assert!(!engine.documents.lock().unwrap().contains_key("p008"));
    }

    #[tokio::test]
    async fn per_record_engine_failures_are_collected() {
        let engine = FakeEngine::failing(&["p002", "p005"]);
        let provider = FakeProvider;
        let loader = CatalogLoader::new(&engine, Some(&provider), DIMS, 1.0);

        let products = sample_catalog().unwrap();
        let report = loader.load(&products).await.unwrap();

        assert_eq!(report.indexed, 6);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.reason.contains("mapper_parsing_exception")));
    }

    #[tokio::test]
    async fn all_records_failing_exceeds_default_threshold() {
        let ids: Vec<String> = sample_catalog()
            .unwrap()
            .iter()
            .map(|p| p.id.clone())
            .collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let engine = FakeEngine::failing(&id_refs);
        let provider = FakeProvider;
        let loader = CatalogLoader::new(&engine, Some(&provider), DIMS, 1.0);

        let products = sample_catalog().unwrap();
        let result = loader.load(&products).await;

        assert!(matches!(
            result,
            Err(IngestError::ThresholdExceeded { failed: 8, total: 8, .. })
        ));
    }

    #[tokio::test]
    async fn zero_vectors_when_embeddings_disabled() {
        let engine = FakeEngine::new();
        let loader: CatalogLoader<'_, _, FakeProvider> =
            CatalogLoader::new(&engine, None, DIMS, 1.0);

        let products = sample_catalog().unwrap();
        let report = loader.load(&products).await.unwrap();

        assert_eq!(report.indexed, 8);
        let docs = engine.documents.lock().unwrap();
        let embedding = docs["p004"]["embedding"].as_array().unwrap();
        assert!(embedding.iter().all(|v| v.as_f64() == Some(0.0)));
    }

    #[tokio::test]
    async fn empty_catalog_is_a_no_op() {
        let engine = FakeEngine::new();
        let provider = FakeProvider;
        let loader = CatalogLoader::new(&engine, Some(&provider), DIMS, 1.0);

        let report = loader.load(&[]).await.unwrap();
        assert_eq!(report.total(), 0);
        assert!(!*engine.refreshed.lock().unwrap());
    }
}
