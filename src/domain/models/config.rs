use serde::{Deserialize, Serialize};

/// Main configuration structure for Operant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Content chunker limits
    #[serde(default)]
    pub chunker: ChunkerConfig,

    /// Reranking enhancer tunables
    #[serde(default)]
    pub rerank: RerankConfig,

    /// Compression enhancer tunables
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Retry policy for model calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Bounded in-memory store sizing
    #[serde(default)]
    pub store: StoreConfig,

    /// Model invocation defaults
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Content chunker limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkerConfig {
    /// Maximum size of each chunk in characters
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Overlap between split chunks in characters
    #[serde(default = "default_overlap_size")]
    pub overlap_size: usize,

    /// Threshold below which multi-leaf splitting is not worthwhile.
    /// Not a hard floor on chunk size.
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,
}

const fn default_max_chunk_size() -> usize {
    1500
}

const fn default_overlap_size() -> usize {
    200
}

const fn default_min_chunk_size() -> usize {
    2000
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            overlap_size: default_overlap_size(),
            min_chunk_size: default_min_chunk_size(),
        }
    }
}

impl ChunkerConfig {
    /// Validate the chunker configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_chunk_size == 0 {
            return Err("max_chunk_size must be greater than 0".to_string());
        }
        if self.overlap_size >= self.max_chunk_size {
            return Err("overlap_size must be less than max_chunk_size".to_string());
        }
        if self.min_chunk_size < self.max_chunk_size {
            return Err("min_chunk_size must be >= max_chunk_size".to_string());
        }
        Ok(())
    }
}

/// Reranking enhancer tunables
///
/// The blend weights are tunables, not load-bearing constants; defaults
/// match the observed behavior of blending 30% original similarity with
/// 70% model-assigned relevance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RerankConfig {
    /// Skip reranking entirely at or below this result count
    #[serde(default = "default_skip_threshold")]
    pub skip_threshold: usize,

    /// How many top results get scored by the model
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Weight of the original similarity score in the blend
    #[serde(default = "default_original_weight")]
    pub original_weight: f64,

    /// Weight of the model-assigned score in the blend
    #[serde(default = "default_llm_weight")]
    pub llm_weight: f64,

    /// Model override for scoring calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

const fn default_skip_threshold() -> usize {
    3
}

const fn default_top_n() -> usize {
    10
}

const fn default_original_weight() -> f64 {
    0.3
}

const fn default_llm_weight() -> f64 {
    0.7
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            skip_threshold: default_skip_threshold(),
            top_n: default_top_n(),
            original_weight: default_original_weight(),
            llm_weight: default_llm_weight(),
            model: None,
        }
    }
}

/// Compression enhancer tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompressionConfig {
    /// Only chunks whose text exceeds this many characters are rewritten
    #[serde(default = "default_compression_max_chars")]
    pub max_chars: usize,

    /// Target compression ratio in (0, 1)
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,

    /// Maximum concurrent in-flight compression calls
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Model override for compression calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

const fn default_compression_max_chars() -> usize {
    1500
}

const fn default_target_ratio() -> f64 {
    0.3
}

const fn default_max_concurrent() -> usize {
    4
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_chars: default_compression_max_chars(),
            target_ratio: default_target_ratio(),
            max_concurrent: default_max_concurrent(),
            model: None,
        }
    }
}

/// Retry policy configuration for model calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum retry attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Bounded in-memory store sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Entries retained before the oldest is evicted
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

const fn default_window_size() -> usize {
    100
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

/// Model invocation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// Default model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Model call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
