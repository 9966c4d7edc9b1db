//! Sub-configuration structs with defaults matching the stock tool.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::{FilterKind, FilterParams};

/// Worker pool sizing and input format settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Number of parallel image workers
    pub workers: usize,

    /// Concurrent row tasks are capped at `workers * row_worker_multiplier`
    pub row_worker_multiplier: usize,

    /// Supported input formats (lowercased extensions)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            row_worker_multiplier: 2,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "tif".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Which filter runs and with what knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Selected filter
    pub kind: FilterKind,

    /// JPEG output quality (0-100)
    pub quality: u8,

    /// Box blur radius in pixels
    pub blur_radius: f64,

    /// Brightness multiplier (> 0)
    pub brightness: f64,

    /// Contrast factor (unconstrained sign)
    pub contrast: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterKind::Grayscale,
            quality: 95,
            blur_radius: 2.0,
            brightness: 1.2,
            contrast: 1.1,
        }
    }
}

impl FilterConfig {
    /// The per-job parameter block derived from this section.
    pub fn params(&self) -> FilterParams {
        FilterParams {
            blur_radius: self.blur_radius,
            brightness: self.brightness,
            contrast: self.contrast,
            quality: self.quality,
        }
    }
}

/// Queue sizing for backpressure between the orchestrator and the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max jobs/results buffered in each bounded channel
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 100 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum input file size in bytes; larger files fail before decode
    pub max_file_size: u64,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
            decode_timeout_ms: 5000,
        }
    }
}

/// Output location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for filtered images. Empty means "next to the input".
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
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
