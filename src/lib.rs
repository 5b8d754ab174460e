//! Prodsearch - Product Catalog Search Demo
//!
//! A CLI that indexes an e-commerce product catalog into Elasticsearch and
//! runs keyword, semantic (vector), and hybrid queries against it. Embeddings
//! come from a TEI-compatible inference server; all indexing and similarity
//! math is delegated to the external services over HTTP.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod retry;
pub mod search;

pub use error::{ProdsearchError, Result};
