//! Configuration management for prodsearch
//!
//! Configuration lives in a TOML file with environment-variable overrides.
//! The search engine and embedding server are reachable only through the
//! endpoints configured here.

use crate::error::{ProdsearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub engine: EngineConfig,
    pub embedding: EmbeddingConfig,
    pub retry: RetryConfig,
    pub ingest: IngestConfig,
    pub query: QueryConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Search engine (Elasticsearch) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the search engine
    pub url: String,
    /// Index name holding the product catalog
    pub index: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Embedding server (TEI) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding server (must expose /embeddings)
    pub url: String,
    /// Vector dimension of the configured model
    pub dimension: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of texts sent to /embeddings in one request
    pub batch_size: usize,
    /// When false, ingestion indexes zero vectors instead of calling the server
    pub enabled: bool,
}

/// Retry policy for calls to both external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Delay between attempts in milliseconds
    pub backoff_ms: u64,
}

/// Catalog ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Fraction of failed records at which a batch becomes a hard failure.
    /// 1.0 means only an all-records failure is fatal.
    pub failure_threshold: f32,
}

/// Query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Default result-count limit
    pub default_limit: usize,
    /// Hybrid-mode weight for the keyword leg
    pub keyword_weight: f32,
    /// Hybrid-mode weight for the semantic leg
    pub semantic_weight: f32,
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ProdsearchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ProdsearchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ProdsearchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: PRODSEARCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("PRODSEARCH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "ENGINE__URL" => {
                self.engine.url = value.to_string();
            }
            "ENGINE__INDEX" => {
                self.engine.index = value.to_string();
            }
            "EMBEDDING__URL" => {
                self.embedding.url = value.to_string();
            }
            "EMBEDDING__DIMENSION" => {
                self.embedding.dimension =
                    value.parse().map_err(|_| ProdsearchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            "EMBEDDING__BATCH_SIZE" => {
                self.embedding.batch_size =
                    value.parse().map_err(|_| ProdsearchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as integer", value),
                    })?;
            }
            "EMBEDDING__ENABLED" => {
                self.embedding.enabled =
                    value.parse().map_err(|_| ProdsearchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as boolean", value),
                    })?;
            }
            "QUERY__KEYWORD_WEIGHT" => {
                self.query.keyword_weight =
                    value.parse().map_err(|_| ProdsearchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as float", value),
                    })?;
            }
            "QUERY__SEMANTIC_WEIGHT" => {
                self.query.semantic_weight =
                    value.parse().map_err(|_| ProdsearchError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as float", value),
                    })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ProdsearchError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("prodsearch").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            engine: EngineConfig {
                url: "http://localhost:9200".to_string(),
                index: "products".to_string(),
                timeout_secs: 30,
            },
            embedding: EmbeddingConfig {
                url: "http://localhost:8080".to_string(),
                dimension: 768,
                timeout_secs: 30,
                batch_size: 32,
                enabled: true,
            },
            retry: RetryConfig {
                max_retries: 1,
                backoff_ms: 500,
            },
            ingest: IngestConfig {
                failure_threshold: 1.0,
            },
            query: QueryConfig {
                default_limit: 5,
                keyword_weight: 1.0,
                semantic_weight: 1.0,
            },
        }
    }
}
