//! Error types for the Keyscribe generation pipeline.
//!
//! Errors are organized by stage to provide clear, actionable messages that
//! include relevant context (file paths, record numbers, offending values).
//! Row-level problems in input tables are not errors: they are logged and
//! skipped by the loaders.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Keyscribe operations.
#[derive(Error, Debug)]
pub enum KeyscribeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Table could not be read at all (I/O failure, unreadable header)
    #[error("Failed to read table {path}: {message}")]
    Table { path: PathBuf, message: String },

    /// Required header column is absent
    #[error("Table {path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    /// Keyword not present in the dictionary
    #[error("Unknown keyword '{keyword}' on line {line}")]
    UnknownKeyword { keyword: String, line: u64 },

    /// Caption could not be split into words
    #[error("Tokenization failed: {message}")]
    Tokenize { message: String },

    /// Vocabulary artifact is malformed or an id cannot be resolved
    #[error("Vocabulary error: {message}")]
    Vocabulary { message: String },

    /// Predictor load or inference failed
    #[error("Model error: {message}")]
    Model { message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Vector width disagrees with the rest of the batch
    #[error("Shape mismatch for record {record}: expected width {expected}, found {found}")]
    ShapeMismatch {
        expected: usize,
        found: usize,
        record: usize,
    },

    /// A blocking worker task panicked or was cancelled
    #[error("Worker task failed: {message}")]
    Worker { message: String },

    /// Collation was asked to build a batch from nothing
    #[error("Cannot collate an empty batch")]
    EmptyBatch,
}

/// Convenience type alias for Keyscribe results.
pub type Result<T> = std::result::Result<T, KeyscribeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keyword_message() {
        let err = PipelineError::UnknownKeyword {
            keyword: "zebra".into(),
            line: 7,
        };
        assert_eq!(err.to_string(), "Unknown keyword 'zebra' on line 7");
    }

    #[test]
    fn test_pipeline_error_converts_to_top_level() {
        let err: KeyscribeError = PipelineError::EmptyBatch.into();
        assert!(err.to_string().starts_with("Pipeline error:"));
    }
}
