//! Configuration management for scanline.
//!
//! Configuration is loaded from a TOML file with sensible defaults; every
//! section is optional. Validation failures are startup-fatal and surface
//! before any processing begins.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for scanline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker pool sizing and input formats
    pub processing: ProcessingConfig,

    /// Filter selection and knobs
    pub filter: FilterConfig,

    /// Channel buffer sizing
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Output location
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (e.g. ~/.config/scanline on
    /// Linux), falling back to ~/.scanline/config.toml if directory
    /// detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "scanline", "scanline")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".scanline").join("config.toml")
            })
    }

    /// Get the resolved output directory path (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.output.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Upper bound on concurrently running row tasks across the process.
    pub fn row_task_cap(&self) -> usize {
        self.processing.workers * self.processing.row_worker_multiplier
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilterKind;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.processing.workers > 0);
        assert_eq!(config.processing.row_worker_multiplier, 2);
        assert_eq!(config.pipeline.buffer_size, 100);
        assert_eq!(config.limits.max_file_size, 100 * 1024 * 1024);
        assert_eq!(config.filter.kind, FilterKind::Grayscale);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[filter]"));
        assert!(toml.contains("kind = \"grayscale\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[filter]\nkind = \"blur\"\nblur_radius = 3.5\n\n[processing]\nworkers = 2\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.filter.kind, FilterKind::Blur);
        assert_eq!(config.filter.blur_radius, 3.5);
        assert_eq!(config.processing.workers, 2);
        // Unspecified sections keep their defaults
        assert_eq!(config.pipeline.buffer_size, 100);
    }

    #[test]
    fn test_load_from_rejects_unknown_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[filter]\nkind = \"sepia\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_row_task_cap() {
        let mut config = Config::default();
        config.processing.workers = 3;
        config.processing.row_worker_multiplier = 4;
        assert_eq!(config.row_task_cap(), 12);
    }
}
