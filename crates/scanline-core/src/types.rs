//! Core data types for the scanline processing pipeline.
//!
//! These types flow through the job queue, the per-image row fan-out, and
//! the result channel back to the orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::PipelineError;

/// The four built-in pixel filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Grayscale,
    Blur,
    Brightness,
    Contrast,
}

impl FilterKind {
    /// All built-in filters, in registry order.
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Grayscale,
        FilterKind::Blur,
        FilterKind::Brightness,
        FilterKind::Contrast,
    ];

    /// The registry key for this filter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Grayscale => "grayscale",
            FilterKind::Blur => "blur",
            FilterKind::Brightness => "brightness",
            FilterKind::Contrast => "contrast",
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grayscale" => Ok(FilterKind::Grayscale),
            "blur" => Ok(FilterKind::Blur),
            "brightness" => Ok(FilterKind::Brightness),
            "contrast" => Ok(FilterKind::Contrast),
            other => Err(PipelineError::UnknownFilter {
                name: other.to_string(),
            }),
        }
    }
}

/// Numeric knobs for the filters.
///
/// Only the fields relevant to the selected filter are meaningful; the rest
/// are ignored by that filter. Copied into every row task so no job state is
/// shared between tasks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterParams {
    /// Box blur radius in pixels (integer part is used; <= 0 is a no-op)
    pub blur_radius: f64,

    /// Brightness multiplier (> 0; 1.0 is identity)
    pub brightness: f64,

    /// Contrast factor around the 128 midpoint (1.0 is identity)
    pub contrast: f64,

    /// JPEG output quality (0-100)
    pub quality: u8,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            blur_radius: 2.0,
            brightness: 1.2,
            contrast: 1.1,
            quality: 95,
        }
    }
}

/// One image's end-to-end processing request.
///
/// Immutable once created by the orchestrator; consumed exactly once by a
/// pool worker. The filter stays a string (rather than [`FilterKind`]) so
/// registry lookup can fail for names the config never validated — tests
/// exercise the unknown-filter path through it.
#[derive(Debug, Clone)]
pub struct ImageJob {
    /// Unique within a batch (submission sequence order)
    pub id: u64,

    /// Source image file
    pub input_path: PathBuf,

    /// Destination for the filtered image
    pub output_path: PathBuf,

    /// Registry key of the filter to apply
    pub filter: String,

    /// Filter parameters, copied into every row task
    pub params: FilterParams,
}

/// A unit of concurrent work for one image row.
///
/// Carries its own copy of the filter selection and params; the pixel data
/// itself is a shared read-only view of the full source buffer (blur samples
/// neighboring rows), handed to the task alongside this descriptor.
#[derive(Debug, Clone)]
pub struct RowJob {
    /// Back-reference to the owning image job (not ownership)
    pub image_id: u64,

    /// Row index; doubles as the join key
    pub row: usize,

    /// Row width in pixels
    pub width: usize,

    /// Registry key of the filter to apply
    pub filter: String,

    /// Filter parameters
    pub params: FilterParams,
}

/// Outcome of one row task. `row` is the join key; arrival order is
/// irrelevant.
#[derive(Debug)]
pub struct RowResult {
    /// Back-reference to the owning image job
    pub image_id: u64,

    /// Row index this result belongs to
    pub row: usize,

    /// Transformed row bytes; on error, the untouched original row
    pub pixels: Option<Vec<u8>>,

    /// Set when the row task failed
    pub error: Option<PipelineError>,

    /// Time spent in the transform
    pub elapsed: Duration,
}

/// Dimensions and byte counts recorded for a successfully processed image.
#[derive(Debug, Clone, Default)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,

    /// Detected source format ("jpeg", "png", ...)
    pub format: String,

    /// Source file size in bytes
    pub input_bytes: u64,

    /// Encoded output size in bytes
    pub output_bytes: u64,

    /// Row task count for this image (equals height)
    pub rows_processed: u32,
}

/// One result per submitted job.
///
/// `outcome` makes success metadata and the error mutually exclusive by
/// construction.
#[derive(Debug)]
pub struct ProcessingResult {
    pub input_path: PathBuf,
    pub output_path: PathBuf,

    /// Wall-clock time from dequeue to encode (or to the failing stage)
    pub elapsed: Duration,

    pub outcome: std::result::Result<ImageMetadata, PipelineError>,
}

impl ProcessingResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn metadata(&self) -> Option<&ImageMetadata> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.outcome.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_kind_round_trips_through_str() {
        for kind in FilterKind::ALL {
            let parsed: FilterKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_filter_kind_rejects_unknown_name() {
        let err = "sepia".parse::<FilterKind>().unwrap_err();
        assert!(matches!(err, PipelineError::UnknownFilter { name } if name == "sepia"));
    }

    #[test]
    fn test_filter_kind_serde_lowercase() {
        #[derive(Serialize, Deserialize)]
        struct Wrap {
            kind: FilterKind,
        }
        let parsed: Wrap = toml::from_str("kind = \"brightness\"").unwrap();
        assert_eq!(parsed.kind, FilterKind::Brightness);
    }

    #[test]
    fn test_processing_result_outcome_accessors() {
        let ok = ProcessingResult {
            input_path: PathBuf::from("a.png"),
            output_path: PathBuf::from("a_grayscale.png"),
            elapsed: Duration::from_millis(5),
            outcome: Ok(ImageMetadata::default()),
        };
        assert!(ok.is_success());
        assert!(ok.metadata().is_some());
        assert!(ok.error().is_none());

        let failed = ProcessingResult {
            input_path: PathBuf::from("b.png"),
            output_path: PathBuf::from("b_grayscale.png"),
            elapsed: Duration::ZERO,
            outcome: Err(PipelineError::UnknownFilter {
                name: "sepia".into(),
            }),
        };
        assert!(!failed.is_success());
        assert!(failed.metadata().is_none());
        assert!(matches!(
            failed.error(),
            Some(PipelineError::UnknownFilter { .. })
        ));
    }
}
