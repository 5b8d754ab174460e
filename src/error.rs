use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::engine::EngineError;
use crate::ingest::IngestError;
use crate::search::QueryError;

/// Main error type for the prodsearch application
#[derive(Error, Debug)]
pub enum ProdsearchError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// Catalog file errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Embedding server errors
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Search engine errors
    #[error("Search engine error: {0}")]
    Engine(#[from] EngineError),

    /// Catalog ingestion errors
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestError),

    /// Query errors
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for prodsearch operations
pub type Result<T> = std::result::Result<T, ProdsearchError>;
