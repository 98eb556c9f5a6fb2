//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid chunker configuration: {0}")]
    InvalidChunker(String),

    #[error("Invalid rerank weights: original {original} + llm {llm} must sum to 1.0")]
    InvalidRerankWeights { original: f64, llm: f64 },

    #[error("Invalid compression target ratio: {0}. Must be in (0, 1)")]
    InvalidTargetRatio(f64),

    #[error("Invalid max_concurrent: {0}. Must be at least 1")]
    InvalidMaxConcurrent(usize),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid window_size: {0}. Must be at least 1")]
    InvalidWindowSize(usize),

    #[error("Invalid timeout_secs: {0}. Must be positive")]
    InvalidTimeout(u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .operant/config.yaml (project config)
    /// 3. .operant/local.yaml (project local overrides, optional)
    /// 4. Environment variables (`OPERANT_`* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".operant/config.yaml"))
            .merge(Yaml::file(".operant/local.yaml"))
            .merge(Env::prefixed("OPERANT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        config
            .chunker
            .validate()
            .map_err(ConfigError::InvalidChunker)?;

        let weight_sum = config.rerank.original_weight + config.rerank.llm_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidRerankWeights {
                original: config.rerank.original_weight,
                llm: config.rerank.llm_weight,
            });
        }

        if config.compression.target_ratio <= 0.0 || config.compression.target_ratio >= 1.0 {
            return Err(ConfigError::InvalidTargetRatio(
                config.compression.target_ratio,
            ));
        }
        if config.compression.max_concurrent == 0 {
            return Err(ConfigError::InvalidMaxConcurrent(
                config.compression.max_concurrent,
            ));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }
        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        if config.store.window_size == 0 {
            return Err(ConfigError::InvalidWindowSize(config.store.window_size));
        }
        if config.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.llm.timeout_secs));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CompressionConfig, RerankConfig, StoreConfig};
    use std::io::Write;

    #[test]
    fn defaults_pass_validation() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn bad_rerank_weights_are_rejected() {
        let config = Config {
            rerank: RerankConfig {
                original_weight: 0.5,
                llm_weight: 0.9,
                ..RerankConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRerankWeights { .. })
        ));
    }

    #[test]
    fn bad_target_ratio_is_rejected() {
        let config = Config {
            compression: CompressionConfig {
                target_ratio: 1.5,
                ..CompressionConfig::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTargetRatio(_))
        ));
    }

    #[test]
    fn zero_window_is_rejected() {
        let config = Config {
            store: StoreConfig { window_size: 0 },
            ..Config::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidWindowSize(_))
        ));
    }

    #[test]
    fn load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "chunker:\n  max_chunk_size: 800\n  overlap_size: 100\n  min_chunk_size: 1000\nllm:\n  timeout_secs: 30"
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.chunker.max_chunk_size, 800);
        assert_eq!(config.llm.timeout_secs, 30);
        // Untouched sections keep their defaults.
        assert_eq!(config.rerank.skip_threshold, 3);
    }

    #[test]
    fn invalid_file_config_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunker:\n  max_chunk_size: 0").unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}
