//! Sub-configuration structs with defaults matching the reference training setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Exported decoder graph (ONNX)
    pub model_path: PathBuf,

    /// Vocabulary artifact (JSON token -> id map)
    pub vocab_path: PathBuf,

    /// Keyword dictionary table (CSV, column `keys`)
    pub dictionary_path: PathBuf,

    /// Caption table (CSV, columns `val` and `tk`)
    pub caption_path: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/decoder.onnx"),
            vocab_path: PathBuf::from("data/vocab.json"),
            dictionary_path: PathBuf::from("data/dict.csv"),
            caption_path: PathBuf::from("data/captions.csv"),
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of parallel workers for sample preparation and decoding
    pub parallel_workers: usize,

    /// Samples per collated batch
    pub batch_size: usize,

    /// Passes over the caption table
    pub num_epochs: usize,

    /// Shuffle record order every epoch
    pub shuffle: bool,

    /// Seed for the shuffle RNG; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_workers: 2,
            batch_size: 128,
            num_epochs: 5,
            shuffle: true,
            seed: None,
        }
    }
}

/// Resource limits guarding I/O and decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Table/artifact load timeout in milliseconds
    pub load_timeout_ms: u64,

    /// Per-vector predictor timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Maximum words emitted for one generated caption
    pub max_decode_len: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 30_000,
            decode_timeout_ms: 10_000,
            max_decode_len: 20,
        }
    }
}

/// What to do with a keyword that is not in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeywordPolicy {
    /// Abort with `PipelineError::UnknownKeyword`
    #[default]
    Fatal,
    /// Skip the keyword and keep vectorizing
    Ignore,
}

/// Keyword vectorization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    pub unknown: UnknownKeywordPolicy,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text", "json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,

    /// Include the source caption alongside each generated document
    pub include_reference: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
            include_reference: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
