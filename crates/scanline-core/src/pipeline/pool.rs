//! Image worker pool: a fixed number of workers consuming a bounded job
//! queue, each job run through decode, row fan-out, and encode.
//!
//! Every wait a worker performs — dequeue, result send — is combined with
//! the cancellation token in a `select!`, so a worker mid-wait always
//! observes shutdown. `stop` consumes the pool, making double shutdown (and
//! submit-after-stop) unrepresentable rather than a runtime hazard.

use std::sync::Arc;
use std::time::Instant;

use image::RgbaImage;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::PipelineError;
use crate::types::{ImageJob, ImageMetadata, ProcessingResult};

use super::decode::{format_to_string, ImageDecoder};
use super::encode;
use super::fanout::RowEngine;

pub struct WorkerPool {
    job_tx: mpsc::Sender<ImageJob>,
    handles: Vec<JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl WorkerPool {
    /// Spawn the configured worker count and return the pool together with
    /// its result stream: one `ProcessingResult` per completed job, in
    /// completion order (not submission order).
    pub fn start(
        config: &Config,
        engine: Arc<RowEngine>,
        cancel: CancellationToken,
    ) -> (Self, mpsc::Receiver<ProcessingResult>) {
        let buffer = config.pipeline.buffer_size;
        let (job_tx, job_rx) = mpsc::channel::<ImageJob>(buffer);
        let (result_tx, result_rx) = mpsc::channel::<ProcessingResult>(buffer);

        let job_rx = Arc::new(Mutex::new(job_rx));
        let decoder = Arc::new(ImageDecoder::new(config.limits.clone()));

        tracing::info!(workers = config.processing.workers, "Starting worker pool");

        let handles = (0..config.processing.workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&job_rx),
                    result_tx.clone(),
                    Arc::clone(&engine),
                    Arc::clone(&decoder),
                    cancel.clone(),
                ))
            })
            .collect();

        (
            Self {
                job_tx,
                handles,
                shutdown: cancel,
            },
            result_rx,
        )
    }

    /// Enqueue a job, blocking while the queue is full (backpressure).
    ///
    /// Returns `false` — the job is rejected and logged as dropped — when
    /// the pool is shutting down, rather than blocking forever.
    pub async fn submit(&self, job: ImageJob) -> bool {
        submit_or_reject(&self.job_tx, &self.shutdown, job).await
    }

    /// A cheap clonable handle for submitting jobs from another task.
    ///
    /// The orchestrator drives submission and collection concurrently so a
    /// batch larger than the queue buffers cannot wedge the pipeline; the
    /// handle must be dropped for the job queue to close.
    pub fn submitter(&self) -> JobSubmitter {
        JobSubmitter {
            job_tx: self.job_tx.clone(),
            shutdown: self.shutdown.clone(),
        }
    }

    /// Shut down: close the job intake and wait for workers to drain
    /// in-flight work. The result channel closes when the last worker drops
    /// its sender — exactly once, after all producers have stopped.
    pub async fn stop(self) {
        tracing::info!("Stopping worker pool");
        drop(self.job_tx);
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!("Image worker task failed: {e}");
            }
        }
    }
}

/// Detached job intake handle; see [`WorkerPool::submitter`].
#[derive(Clone)]
pub struct JobSubmitter {
    job_tx: mpsc::Sender<ImageJob>,
    shutdown: CancellationToken,
}

impl JobSubmitter {
    /// Same contract as [`WorkerPool::submit`].
    pub async fn submit(&self, job: ImageJob) -> bool {
        submit_or_reject(&self.job_tx, &self.shutdown, job).await
    }
}

async fn submit_or_reject(
    job_tx: &mpsc::Sender<ImageJob>,
    shutdown: &CancellationToken,
    job: ImageJob,
) -> bool {
    let job_id = job.id;
    // biased: a signalled shutdown must reject even when the queue has room
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => {
            tracing::warn!(job_id, "Worker pool shutting down, job rejected");
            false
        }
        sent = job_tx.send(job) => {
            if sent.is_err() {
                tracing::warn!(job_id, "Job queue closed, job rejected");
            }
            sent.is_ok()
        }
    }
}

/// One worker: `Idle -> Dequeuing -> Processing -> Idle`, exiting when the
/// queue closes or the shutdown signal fires.
async fn worker_loop(
    worker_id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<ImageJob>>>,
    results: mpsc::Sender<ProcessingResult>,
    engine: Arc<RowEngine>,
    decoder: Arc<ImageDecoder>,
    cancel: CancellationToken,
) {
    tracing::debug!(worker_id, "Image worker started");

    loop {
        // The dequeue arm releases the queue lock whenever shutdown wins
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(worker_id, "Image worker stopped by cancellation");
                return;
            }
            job = async { jobs.lock().await.recv().await } => match job {
                Some(job) => job,
                None => {
                    tracing::debug!(worker_id, "Image worker stopped, job queue closed");
                    return;
                }
            },
        };

        tracing::debug!(
            worker_id,
            job_id = job.id,
            input = %job.input_path.display(),
            filter = %job.filter,
            "Processing image job"
        );

        let result = process_job(&engine, &decoder, &job, &cancel).await;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = results.send(result) => {
                if sent.is_err() {
                    // Result consumer is gone; nothing left to work for
                    return;
                }
            }
        }
    }
}

/// Process a single image job, capturing any failure on its result.
async fn process_job(
    engine: &RowEngine,
    decoder: &ImageDecoder,
    job: &ImageJob,
    cancel: &CancellationToken,
) -> ProcessingResult {
    let started = Instant::now();
    let outcome = run_stages(engine, decoder, job, cancel).await;

    if let Ok(meta) = &outcome {
        tracing::debug!(
            job_id = job.id,
            width = meta.width,
            height = meta.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Image processing completed"
        );
    }

    ProcessingResult {
        input_path: job.input_path.clone(),
        output_path: job.output_path.clone(),
        elapsed: started.elapsed(),
        outcome,
    }
}

async fn run_stages(
    engine: &RowEngine,
    decoder: &ImageDecoder,
    job: &ImageJob,
    cancel: &CancellationToken,
) -> Result<ImageMetadata, PipelineError> {
    let decoded = decoder.decode(&job.input_path).await?;
    let detected = decoded.format;
    let format = format_to_string(detected);
    let input_bytes = decoded.file_size;
    let (width, height) = (decoded.width, decoded.height);

    let filtered = engine.apply(job, decoded, cancel).await?;

    // Encode is the last step; a job cancelled before the join completed
    // never reaches it, so no output file appears for cancelled work.
    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    let image = RgbaImage::from_raw(filtered.width, filtered.height, filtered.pixels).ok_or(
        PipelineError::Encode {
            path: job.output_path.clone(),
            message: "filtered buffer does not match image dimensions".to_string(),
        },
    )?;
    let output_bytes = encode::save_image(&image, &job.output_path, detected, job.params.quality)?;

    Ok(ImageMetadata {
        width,
        height,
        format,
        input_bytes,
        output_bytes,
        rows_processed: filtered.rows_processed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterRegistry;
    use crate::types::FilterParams;
    use std::path::Path;

    fn test_config(workers: usize) -> Config {
        let mut config = Config::default();
        config.processing.workers = workers;
        config.processing.row_worker_multiplier = 2;
        config.pipeline.buffer_size = 16;
        config
    }

    fn test_engine(config: &Config) -> Arc<RowEngine> {
        Arc::new(RowEngine::new(
            Arc::new(FilterRegistry::builtin()),
            config.row_task_cap(),
        ))
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x * 40) as u8, (y * 40) as u8, 128, 255])
        });
        img.save(&path).unwrap();
        path
    }

    fn job(id: u64, input: &Path, output: &Path, filter: &str) -> ImageJob {
        ImageJob {
            id,
            input_path: input.to_path_buf(),
            output_path: output.to_path_buf(),
            filter: filter.to_string(),
            params: FilterParams::default(),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_processes_jobs_and_closes_results() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(2);
        let cancel = CancellationToken::new();
        let (pool, mut results) = WorkerPool::start(&config, test_engine(&config), cancel);

        for i in 0..3u64 {
            let input = write_png(dir.path(), &format!("in{i}.png"), 6, 4);
            let output = dir.path().join(format!("out{i}.png"));
            assert!(pool.submit(job(i, &input, &output, "grayscale")).await);
        }

        let mut collected = Vec::new();
        for _ in 0..3 {
            collected.push(results.recv().await.unwrap());
        }
        pool.stop().await;

        // All succeeded, output files exist, and the stream is closed
        assert!(collected.iter().all(ProcessingResult::is_success));
        for result in &collected {
            assert!(result.output_path.exists());
            let meta = result.metadata().unwrap();
            assert_eq!((meta.width, meta.height), (6, 4));
            assert_eq!(meta.rows_processed, 4);
            assert!(meta.output_bytes > 0);
        }
        assert!(results.recv().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_captures_per_job_failure_without_aborting_others() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(2);
        let cancel = CancellationToken::new();
        let (pool, mut results) = WorkerPool::start(&config, test_engine(&config), cancel);

        let good = write_png(dir.path(), "good.png", 4, 4);
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();

        assert!(
            pool.submit(job(0, &bad, &dir.path().join("bad_out.png"), "grayscale"))
                .await
        );
        assert!(
            pool.submit(job(1, &good, &dir.path().join("good_out.png"), "grayscale"))
                .await
        );

        let mut collected = Vec::new();
        for _ in 0..2 {
            collected.push(results.recv().await.unwrap());
        }
        pool.stop().await;

        let failed = collected.iter().find(|r| !r.is_success()).unwrap();
        let succeeded = collected.iter().find(|r| r.is_success()).unwrap();
        assert!(matches!(failed.error(), Some(PipelineError::Decode { .. })));
        assert!(!failed.output_path.exists());
        assert!(succeeded.output_path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_unknown_filter_writes_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(1);
        let cancel = CancellationToken::new();
        let (pool, mut results) = WorkerPool::start(&config, test_engine(&config), cancel);

        let input = write_png(dir.path(), "in.png", 4, 4);
        let output = dir.path().join("in_sepia.png");
        assert!(pool.submit(job(0, &input, &output, "sepia")).await);

        let result = results.recv().await.unwrap();
        pool.stop().await;

        assert!(matches!(
            result.error(),
            Some(PipelineError::UnknownFilter { name }) if name.as_str() == "sepia"
        ));
        assert!(!output.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_rejects_submission_after_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(1);
        let cancel = CancellationToken::new();
        let (pool, _results) = WorkerPool::start(&config, test_engine(&config), cancel.clone());

        cancel.cancel();

        let input = write_png(dir.path(), "in.png", 2, 2);
        let accepted = pool
            .submit(job(0, &input, &dir.path().join("out.png"), "grayscale"))
            .await;
        assert!(!accepted);
        pool.stop().await;
    }
}
