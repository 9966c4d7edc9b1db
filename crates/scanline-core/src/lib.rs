//! Scanline Core - concurrent batch image filtering library.
//!
//! Scanline applies one pixel-level filter (grayscale, blur, brightness,
//! contrast) to a directory of images using two nested layers of
//! concurrency: a fixed pool of image workers, each of which fans a single
//! image out into per-row transform tasks and joins them back by row index.
//!
//! # Architecture
//!
//! ```text
//! Discover -> job queue -> worker pool (N) -> row fan-out -> join -> encode
//!                                                |  |  |
//!                                            one task per row
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use scanline_core::{BatchProcessor, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> scanline_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = BatchProcessor::new(config);
//!
//!     let paths = processor.discover("./photos".as_ref());
//!     let results = processor
//!         .process_images(CancellationToken::new(), &paths)
//!         .await;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{BatchError, ConfigError, PipelineError, PipelineResult, Result, ScanlineError};
pub use filters::{FilterRegistry, RowTransform};
pub use pipeline::BatchProcessor;
pub use types::{FilterKind, FilterParams, ImageJob, ImageMetadata, ProcessingResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }
}
