//! Batch orchestration: turn discovered paths into jobs, drive the worker
//! pool, and gather one result per job.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{BatchError, PipelineError};
use crate::filters::FilterRegistry;
use crate::types::{ImageJob, ProcessingResult};

use super::discovery::FileDiscovery;
use super::fanout::RowEngine;
use super::pool::WorkerPool;

/// The batch orchestrator - the main entry point for processing.
pub struct BatchProcessor {
    config: Arc<Config>,
    registry: Arc<FilterRegistry>,
}

impl BatchProcessor {
    /// Create a processor with the built-in filter set.
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, Arc::new(FilterRegistry::builtin()))
    }

    /// Create a processor with a custom filter registry.
    pub fn with_registry(config: Config, registry: Arc<FilterRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }

    /// Discover all supported image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        FileDiscovery::new(self.config.processing.clone()).discover(path)
    }

    /// Process every path, collecting one result per submitted job.
    pub async fn process_images(
        &self,
        cancel: CancellationToken,
        paths: &[PathBuf],
    ) -> Result<Vec<ProcessingResult>, BatchError> {
        self.process_images_with(cancel, paths, |_| {}).await
    }

    /// Streaming variant: `on_result` fires for every result as it lands,
    /// in completion order. Used by the CLI to drive its progress bar.
    ///
    /// On cancellation the partial result set comes back inside
    /// [`BatchError::Cancelled`] — every submitted job either completes or
    /// the cancellation error is surfaced, never a silent loss.
    pub async fn process_images_with<F>(
        &self,
        cancel: CancellationToken,
        paths: &[PathBuf],
        mut on_result: F,
    ) -> Result<Vec<ProcessingResult>, BatchError>
    where
        F: FnMut(&ProcessingResult),
    {
        tracing::info!(count = paths.len(), "Starting batch image processing");

        let engine = Arc::new(RowEngine::new(
            Arc::clone(&self.registry),
            self.config.row_task_cap(),
        ));
        let (pool, mut result_rx) = WorkerPool::start(&self.config, engine, cancel.clone());

        let mut results: Vec<ProcessingResult> = Vec::with_capacity(paths.len());
        let mut jobs: Vec<ImageJob> = Vec::new();

        for (seq, path) in paths.iter().enumerate() {
            let job = self.build_job(seq as u64, path);

            // Pre-submission validation: stat + size limit. An oversized
            // file fails right here - no decode is ever attempted.
            match self.validate_source(path) {
                Err(error) => {
                    let result = ProcessingResult {
                        input_path: path.clone(),
                        output_path: job.output_path,
                        elapsed: Duration::ZERO,
                        outcome: Err(error),
                    };
                    on_result(&result);
                    results.push(result);
                }
                Ok(()) => jobs.push(job),
            }
        }

        let expected = results.len() + jobs.len();

        // Submission runs alongside collection: both queues are bounded, so
        // submitting a whole oversized batch up front would wedge once the
        // job and result buffers fill with nobody draining.
        let submitter = pool.submitter();
        let submit_task = tokio::spawn(async move {
            for job in jobs {
                submitter.submit(job).await;
            }
        });

        while results.len() < expected {
            let received = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = submit_task.await;
                    pool.stop().await;
                    return Err(BatchError::Cancelled {
                        results,
                        expected: paths.len(),
                    });
                }
                received = result_rx.recv() => received,
            };
            match received {
                Some(result) => {
                    on_result(&result);
                    results.push(result);
                }
                None => {
                    // Workers are gone; without cancellation this is a defect
                    tracing::error!(
                        collected = results.len(),
                        expected,
                        "Result channel closed before the batch completed"
                    );
                    break;
                }
            }
        }

        let _ = submit_task.await;
        pool.stop().await;

        if cancel.is_cancelled() && results.len() < paths.len() {
            return Err(BatchError::Cancelled {
                results,
                expected: paths.len(),
            });
        }
        Ok(results)
    }

    fn build_job(&self, id: u64, input: &Path) -> ImageJob {
        ImageJob {
            id,
            input_path: input.to_path_buf(),
            output_path: self.output_path_for(input),
            filter: self.config.filter.kind.to_string(),
            params: self.config.filter.params(),
        }
    }

    /// `photo.jpg` filtered with grayscale lands at
    /// `<output dir>/photo_grayscale.jpg`. An empty output dir means "next
    /// to the input".
    fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("png");

        let dir = if self.config.output.dir.as_os_str().is_empty() {
            input.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            self.config.output_dir()
        };

        dir.join(format!("{stem}_{}.{ext}", self.config.filter.kind))
    }

    fn validate_source(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Stat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let max = self.config.limits.max_file_size;
        if metadata.len() > max {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max,
            });
        }
        Ok(())
    }
}
