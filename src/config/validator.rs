use crate::config::Config;
use crate::error::{ProdsearchError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_engine(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_retry(config, &mut errors);
        Self::validate_ingest(config, &mut errors);
        Self::validate_query(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProdsearchError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_engine(config: &Config, errors: &mut Vec<ValidationError>) {
        if !Self::is_valid_url(&config.engine.url) {
            errors.push(ValidationError::new(
                "engine.url",
                format!("Must be an http(s) URL: {}", config.engine.url),
            ));
        }

        if config.engine.index.is_empty() {
            errors.push(ValidationError::new(
                "engine.index",
                "Index name cannot be empty",
            ));
        }

        if config.engine.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "engine.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if !Self::is_valid_url(&config.embedding.url) {
            errors.push(ValidationError::new(
                "embedding.url",
                format!("Must be an http(s) URL: {}", config.embedding.url),
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Dimension must be greater than 0",
            ));
        }

        if config.embedding.timeout_secs == 0 {
            errors.push(ValidationError::new(
                "embedding.timeout_secs",
                "Timeout must be greater than 0",
            ));
        }

        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }
    }

    fn validate_retry(config: &Config, errors: &mut Vec<ValidationError>) {
        // max_retries of 0 disables retries, which is allowed. Only guard
        // against a pathological backoff.
        if config.retry.backoff_ms > 60_000 {
            errors.push(ValidationError::new(
                "retry.backoff_ms",
                "Backoff above 60s is almost certainly a misconfiguration",
            ));
        }
    }

    fn validate_ingest(config: &Config, errors: &mut Vec<ValidationError>) {
        let threshold = config.ingest.failure_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            errors.push(ValidationError::new(
                "ingest.failure_threshold",
                format!("Threshold must be in (0, 1], got {}", threshold),
            ));
        }
    }

    fn validate_query(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.query.default_limit == 0 {
            errors.push(ValidationError::new(
                "query.default_limit",
                "Result limit must be greater than 0",
            ));
        }

        for (path, weight) in [
            ("query.keyword_weight", config.query.keyword_weight),
            ("query.semantic_weight", config.query.semantic_weight),
        ] {
            if !weight.is_finite() || weight <= 0.0 {
                errors.push(ValidationError::new(
                    path,
                    format!("Weight must be positive and finite, got {}", weight),
                ));
            }
        }
    }

    fn is_valid_url(url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }
}
