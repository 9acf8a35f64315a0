//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "processing.batch_size must be > 0".into(),
            ));
        }
        if self.processing.num_epochs == 0 {
            return Err(ConfigError::ValidationError(
                "processing.num_epochs must be > 0".into(),
            ));
        }
        if self.limits.load_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.load_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_decode_len == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_decode_len must be > 0".into(),
            ));
        }
        if crate::output::OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be one of text, json, jsonl (got '{}')",
                self.output.format
            )));
        }
        Ok(())
    }
}
