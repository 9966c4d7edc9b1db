//! Row fan-out: decompose one decoded image into per-row transform tasks,
//! run them concurrently, and reassemble the results in row order.
//!
//! Every filter goes through the same per-row path. Row-local filters slice
//! their own row out of the shared read-only source; blur samples neighboring
//! rows through the same view. One `RowResult` per row, for every filter, so
//! the join step never special-cases.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::filters::{FilterRegistry, RowContext};
use crate::types::{ImageJob, RowJob, RowResult};

use super::decode::DecodedImage;
use super::rows;

/// Filtered pixel output of one image, ready for encoding.
#[derive(Debug)]
pub struct FilteredImage {
    /// Interleaved RGBA destination buffer
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Number of row tasks joined (equals height)
    pub rows_processed: u32,
}

/// Concurrent per-row filter engine.
///
/// The registry is injected and immutable; the semaphore caps row tasks
/// across all images at `workers * row_worker_multiplier`. Hitting the cap
/// only delays task start — results are never dropped or reordered by it.
pub struct RowEngine {
    registry: Arc<FilterRegistry>,
    row_permits: Arc<Semaphore>,
}

impl RowEngine {
    pub fn new(registry: Arc<FilterRegistry>, max_concurrent_rows: usize) -> Self {
        Self {
            registry,
            row_permits: Arc::new(Semaphore::new(max_concurrent_rows.max(1))),
        }
    }

    /// Apply the job's filter to every row of `decoded`.
    ///
    /// Fails the whole image on the first row error; partial results are
    /// discarded so no partially-filtered image can ever be persisted.
    pub async fn apply(
        &self,
        job: &ImageJob,
        decoded: DecodedImage,
        cancel: &CancellationToken,
    ) -> Result<FilteredImage, PipelineError> {
        let width = decoded.width as usize;
        let height = decoded.height as usize;
        // Sole owner of the source from here on; row tasks share it read-only
        let source: Arc<Vec<u8>> = Arc::new(decoded.image.into_raw());

        let (tx, mut rx) = mpsc::channel::<RowResult>(height.max(1));

        for row in 0..height {
            // biased: a signalled cancellation wins over an available permit
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                permit = Arc::clone(&self.row_permits).acquire_owned() => {
                    permit.map_err(|_| PipelineError::Cancelled)?
                }
            };

            let row_job = RowJob {
                image_id: job.id,
                row,
                width,
                filter: job.filter.clone(),
                params: job.params,
            };
            let registry = Arc::clone(&self.registry);
            let source = Arc::clone(&source);
            let tx = tx.clone();

            tokio::spawn(async move {
                let result = run_row(&registry, &source, height, &row_job);
                // Receiver gone means the join already failed; nothing to do
                let _ = tx.send(result).await;
                drop(permit);
            });
        }
        drop(tx);

        // Join: collect one result per row, writing back by index. Arrival
        // order is irrelevant; a missing index is a defect.
        let mut dest = vec![0u8; width * height * 4];
        let mut received = 0usize;

        while received < height {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                next = rx.recv() => next,
            };
            let Some(result) = next else { break };
            received += 1;

            if let Some(error) = result.error {
                return Err(fail_image(job, error));
            }
            let Some(pixels) = result.pixels else {
                return Err(fail_image(
                    job,
                    PipelineError::RowProcessing {
                        path: job.input_path.clone(),
                        message: format!("row {} produced no pixels", result.row),
                    },
                ));
            };
            if !rows::write_row(&mut dest, width, result.row, &pixels) {
                return Err(fail_image(
                    job,
                    PipelineError::RowProcessing {
                        path: job.input_path.clone(),
                        message: format!("row {} does not fit the destination", result.row),
                    },
                ));
            }
        }

        if received < height {
            // Channel closed early: a row task died without reporting
            return Err(PipelineError::RowProcessing {
                path: job.input_path.clone(),
                message: format!("missing row results: got {received} of {height}"),
            });
        }

        Ok(FilteredImage {
            pixels: dest,
            width: decoded.width,
            height: decoded.height,
            rows_processed: height as u32,
        })
    }
}

/// Run one row task: registry lookup, transform, timing.
///
/// An unknown filter yields the untouched original row alongside the error,
/// so the join layer decides whether to ignore or abort (it aborts).
fn run_row(
    registry: &FilterRegistry,
    source: &Arc<Vec<u8>>,
    height: usize,
    job: &RowJob,
) -> RowResult {
    let started = Instant::now();

    match registry.get(&job.filter) {
        Some(transform) => {
            let ctx = RowContext {
                pixels: source.as_slice(),
                width: job.width,
                height,
                row: job.row,
            };
            let pixels = transform.apply_row(&ctx, &job.params);
            RowResult {
                image_id: job.image_id,
                row: job.row,
                pixels: Some(pixels),
                error: None,
                elapsed: started.elapsed(),
            }
        }
        None => RowResult {
            image_id: job.image_id,
            row: job.row,
            pixels: rows::extract_row(source.as_slice(), job.width, job.row),
            error: Some(PipelineError::UnknownFilter {
                name: job.filter.clone(),
            }),
            elapsed: started.elapsed(),
        },
    }
}

/// Escalate a row failure to a whole-image failure. The unknown-filter error
/// keeps its identity; everything else is wrapped as a row-processing error.
fn fail_image(job: &ImageJob, error: PipelineError) -> PipelineError {
    match error {
        e @ PipelineError::UnknownFilter { .. } => e,
        e @ PipelineError::Cancelled => e,
        e => PipelineError::RowProcessing {
            path: job.input_path.clone(),
            message: e.to_string(),
        },
    }
}
