//! Integration tests against live Elasticsearch and TEI instances
//!
//! The live tests are ignored by default; point PRODSEARCH_ENGINE__URL and
//! PRODSEARCH_EMBEDDING__URL at running services and run with:
//! cargo test -- --ignored

use prodsearch::catalog::Product;
use prodsearch::config::Config;
use prodsearch::embedding::{EmbeddingError, EmbeddingProvider, TeiClient};
use prodsearch::engine::EsClient;
use prodsearch::ingest::CatalogLoader;
use prodsearch::search::{FusionWeights, QueryDispatcher, SearchMode, SearchRequest};

fn product(id: &str, name: &str, description: &str, category: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        brand: "FixtureCo".to_string(),
        price,
        embedding: None,
    }
}

/// Three-product fixture: two shoe products and one laptop
fn fixture_catalog() -> Vec<Product> {
    vec![
        product(
            "f001",
            "Red Shoes",
            "Bright red running shoes with cushioned soles.",
            "Footwear",
            59.0,
        ),
        product(
            "f002",
            "Blue Shoes",
            "Casual blue canvas shoes for everyday wear.",
            "Footwear",
            45.0,
        ),
        product(
            "f003",
            "Laptop",
            "14-inch ultrabook with 16GB RAM and all-day battery.",
            "Computers",
            999.0,
        ),
    ]
}

fn live_config() -> Config {
    let mut config = Config::default();
    config.apply_env_overrides();
    config.engine.index = format!("prodsearch-it-{}", std::process::id());
    config
}

fn request(text: &str, mode: SearchMode, limit: usize, weights: FusionWeights) -> SearchRequest {
    SearchRequest {
        text: text.to_string(),
        mode,
        limit,
        weights,
    }
}

#[tokio::test]
#[ignore] // Requires live Elasticsearch + TEI
async fn live_end_to_end() {
    let config = live_config();

    let es = EsClient::new(&config.engine, &config.retry).unwrap();
    let tei = TeiClient::new(&config.embedding, &config.retry).unwrap();

    // Embedding client returns vectors of the configured dimension
    let vector = tei.embed("red shoes").await.unwrap();
    assert_eq!(vector.len(), config.embedding.dimension);

    // Fresh index with the product mapping
    es.delete_index().await.unwrap();
    es.create_index(config.embedding.dimension).await.unwrap();

    let loader = CatalogLoader::new(
        &es,
        Some(&tei),
        config.embedding.dimension,
        config.ingest.failure_threshold,
    );
    let report = loader.load(&fixture_catalog()).await.unwrap();
    assert_eq!(report.indexed, 3);
    assert!(report.skipped.is_empty());
    assert!(report.failures.is_empty());

    let dispatcher = QueryDispatcher::new(&es, &tei);

    // Keyword query matching a title exactly returns that record
    let hits = dispatcher
        .search(&request(
            "Red Shoes",
            SearchMode::Keyword,
            3,
            FusionWeights::default(),
        ))
        .await
        .unwrap();
    assert!(hits.iter().any(|h| h.id == "f001"));

    // Semantic query for "sneakers" ranks both shoe products above the laptop
    let hits = dispatcher
        .search(&request(
            "sneakers",
            SearchMode::Semantic,
            3,
            FusionWeights::default(),
        ))
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits[0].id != "f003" && hits[1].id != "f003");

    // Hybrid score equals the configured weighted sum of the two legs
    let weights = FusionWeights::new(0.7, 0.3).unwrap();
    let hybrid = dispatcher
        .search(&request("blue shoes", SearchMode::Hybrid, 3, weights))
        .await
        .unwrap();
    let keyword = dispatcher
        .search(&request(
            "blue shoes",
            SearchMode::Keyword,
            6,
            FusionWeights::default(),
        ))
        .await
        .unwrap();
    let semantic = dispatcher
        .search(&request(
            "blue shoes",
            SearchMode::Semantic,
            6,
            FusionWeights::default(),
        ))
        .await
        .unwrap();

    for hit in &hybrid {
        let kw = keyword
            .iter()
            .find(|h| h.id == hit.id)
            .map(|h| h.score)
            .unwrap_or(0.0);
        let sem = semantic
            .iter()
            .find(|h| h.id == hit.id)
            .map(|h| h.score)
            .unwrap_or(0.0);
        assert!(
            (hit.score - (0.7 * kw + 0.3 * sem)).abs() < 1e-3,
            "hybrid score for {} not the weighted sum: {} vs {} + {}",
            hit.id,
            hit.score,
            kw,
            sem
        );
    }

    es.delete_index().await.unwrap();
}

#[tokio::test]
async fn unreachable_embedding_server_surfaces_error_after_retry() {
    let mut config = Config::default();
    // Nothing listens on this port
    config.embedding.url = "http://127.0.0.1:9".to_string();
    config.embedding.timeout_secs = 2;
    config.retry.max_retries = 1;
    config.retry.backoff_ms = 50;

    let tei = TeiClient::new(&config.embedding, &config.retry).unwrap();
    let result = tei.embed("red shoes").await;

    assert!(matches!(result, Err(EmbeddingError::Transport(_))));
}
