//! Error types for the scanline processing pipeline.
//!
//! Per-file errors are attached to that file's `ProcessingResult` and never
//! abort sibling jobs; only configuration errors and batch cancellation
//! propagate as terminal errors of the top-level call.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ProcessingResult;

/// Top-level error type for scanline operations.
#[derive(Error, Debug)]
pub enum ScanlineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors. Always startup-fatal.
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

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The source file could not be stat'ed
    #[error("Cannot stat {path}: {message}")]
    Stat { path: PathBuf, message: String },

    /// File exceeds the configured size limit
    #[error("File too large: {path} ({size} bytes > {max} bytes)")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// Filter name not present in the registry
    #[error("unknown filter: {name}")]
    UnknownFilter { name: String },

    /// A row task failed; the whole image job is abandoned
    #[error("row processing failed for {path}: {message}")]
    RowProcessing { path: PathBuf, message: String },

    /// Image encoding or output write failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The cancellation signal fired before this job completed
    #[error("processing cancelled")]
    Cancelled,
}

/// Batch-terminal errors returned by the orchestrator.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Cancellation fired before every submitted job reported back. Carries
    /// the results collected so far so no completed job is lost.
    #[error("batch cancelled after {} of {expected} results", .results.len())]
    Cancelled {
        results: Vec<ProcessingResult>,
        expected: usize,
    },
}

impl BatchError {
    /// Consume the error, recovering the partial result set.
    pub fn into_results(self) -> Vec<ProcessingResult> {
        match self {
            BatchError::Cancelled { results, .. } => results,
        }
    }
}

/// Convenience type alias for scanline results.
pub type Result<T> = std::result::Result<T, ScanlineError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
