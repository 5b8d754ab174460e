//! Product catalog records and loading
//!
//! A catalog is a JSON array of product records. The crate ships a small
//! built-in sample catalog so the demo runs without any input file.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::error::{ProdsearchError, Result};

/// Built-in sample catalog (8 audio products)
const SAMPLE_CATALOG: &str = include_str!("../../data/products.json");

/// A single product record
///
/// The `embedding` field is attached during ingestion, never read from the
/// input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Product {
    /// Text that gets embedded for this product
    pub fn embedding_text(&self) -> String {
        format!("{} — {}", self.name, self.description)
    }

    /// Build the document body written to the search engine.
    ///
    /// The product id becomes the document id and is not repeated in the
    /// source.
    pub fn to_document(&self, embedding: &[f32]) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "category": self.category,
            "brand": self.brand,
            "price": self.price,
            "embedding": embedding,
        })
    }
}

/// Load a catalog from a JSON file (array of products)
pub fn load_catalog(path: &Path) -> Result<Vec<Product>> {
    let content = std::fs::read_to_string(path).map_err(|e| ProdsearchError::Io {
        source: e,
        context: format!("Failed to read catalog file: {:?}", path),
    })?;

    let products: Vec<Product> =
        serde_json::from_str(&content).map_err(|e| ProdsearchError::Json {
            source: e,
            context: format!("Failed to parse catalog file: {:?}", path),
        })?;

    if products.is_empty() {
        return Err(ProdsearchError::Catalog(format!(
            "Catalog file is empty: {:?}",
            path
        )));
    }

    Ok(products)
}

/// The built-in sample catalog
pub fn sample_catalog() -> Result<Vec<Product>> {
    serde_json::from_str(SAMPLE_CATALOG).map_err(|e| ProdsearchError::Json {
        source: e,
        context: "Failed to parse built-in sample catalog".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_parses() {
        let products = sample_catalog().unwrap();
        assert_eq!(products.len(), 8);
        assert_eq!(products[0].id, "p001");
        assert_eq!(products[0].name, "Wireless Headphones");
        assert!(products.iter().all(|p| p.embedding.is_none()));
    }

    #[test]
    fn embedding_text_joins_name_and_description() {
        let products = sample_catalog().unwrap();
        let text = products[0].embedding_text();
        assert!(text.starts_with("Wireless Headphones — "));
        assert!(text.contains("Bluetooth 5.3"));
    }

    #[test]
    fn document_carries_all_fields_and_vector() {
        let products = sample_catalog().unwrap();
        let doc = products[1].to_document(&[0.1, 0.2, 0.3]);

        assert_eq!(doc["name"], "Bluetooth Earphones");
        assert_eq!(doc["brand"], "AirGroove");
        assert_eq!(doc["price"], 49.0);
        assert_eq!(doc["embedding"].as_array().unwrap().len(), 3);
        // id lives in the document id, not the source
        assert!(doc.get("id").is_none());
    }

    #[test]
    fn load_catalog_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").unwrap();

        let result = load_catalog(&path);
        assert!(matches!(result, Err(ProdsearchError::Catalog(_))));
    }

    #[test]
    fn load_catalog_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, SAMPLE_CATALOG).unwrap();

        let products = load_catalog(&path).unwrap();
        assert_eq!(products.len(), 8);
        assert_eq!(products[7].id, "p008");
    }
}
