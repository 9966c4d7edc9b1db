//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Public because the CLI re-validates after applying flag overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.workers must be > 0".into(),
            ));
        }
        if self.processing.row_worker_multiplier == 0 {
            return Err(ConfigError::ValidationError(
                "processing.row_worker_multiplier must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.filter.quality > 100 {
            return Err(ConfigError::ValidationError(
                "filter.quality must be between 0 and 100".into(),
            ));
        }
        if !self.filter.blur_radius.is_finite() || self.filter.blur_radius < 0.0 {
            return Err(ConfigError::ValidationError(
                "filter.blur_radius must be >= 0".into(),
            ));
        }
        if !self.filter.brightness.is_finite() || self.filter.brightness <= 0.0 {
            return Err(ConfigError::ValidationError(
                "filter.brightness must be > 0".into(),
            ));
        }
        if !self.filter.contrast.is_finite() {
            return Err(ConfigError::ValidationError(
                "filter.contrast must be a finite number".into(),
            ));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.limits.max_file_size == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        Ok(())
    }
}
