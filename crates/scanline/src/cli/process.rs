//! The `scanline process` command: discovery, batch run, progress, summary.

use std::path::PathBuf;

use clap::Args;
use scanline_core::{
    BatchError, BatchProcessor, Config, FilterKind, ProcessingResult,
};
use tokio_util::sync::CancellationToken;

/// Arguments for the `process` command. Flags override the config file.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Image file or directory to process
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output directory for filtered images
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Filter to apply (grayscale, blur, brightness, contrast)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Number of parallel image workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Concurrent row tasks are capped at workers * multiplier
    #[arg(long)]
    pub row_multiplier: Option<usize>,

    /// JPEG output quality (0-100)
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Box blur radius in pixels
    #[arg(long)]
    pub blur_radius: Option<f64>,

    /// Brightness multiplier
    #[arg(long)]
    pub brightness: Option<f64>,

    /// Contrast factor
    #[arg(long)]
    pub contrast: Option<f64>,

    /// Configuration file path (instead of the default location)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute the process command.
pub async fn execute(args: ProcessArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(path) = &args.config {
        config = Config::load_from(path)?;
    }
    apply_overrides(&mut config, &args)?;
    config.validate()?;

    let output_dir = config.output_dir();
    if !output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&output_dir)?;
    }

    let processor = BatchProcessor::new(config);
    let files = processor.discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to process", files.len());

    // Ctrl-C flips the shared token; workers, row tasks, and the collection
    // loop all observe it.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal, stopping");
            signal_token.cancel();
        }
    });

    let progress = create_progress_bar(files.len() as u64);
    let start_time = std::time::Instant::now();

    let outcome = {
        let progress = &progress;
        processor
            .process_images_with(cancel, &files, move |_result| {
                progress.inc(1);
                let elapsed = start_time.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    let rate = progress.position() as f64 / elapsed;
                    progress.set_message(format!("{:.1} img/sec", rate));
                }
            })
            .await
    };

    progress.finish_and_clear();

    let (results, cancelled) = match outcome {
        Ok(results) => (results, false),
        Err(BatchError::Cancelled { results, .. }) => (results, true),
    };

    for result in results.iter().filter(|r| !r.is_success()) {
        if let Some(error) = result.error() {
            tracing::error!(file = %result.input_path.display(), "Failed to process image: {error}");
        }
    }

    print_summary(&results, files.len(), start_time.elapsed(), cancelled);

    if cancelled {
        anyhow::bail!("processing cancelled before the batch completed");
    }
    Ok(())
}

/// Fold CLI flags over the loaded config.
fn apply_overrides(config: &mut Config, args: &ProcessArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(filter) = &args.filter {
        config.filter.kind = filter.parse::<FilterKind>()?;
    }
    if let Some(workers) = args.workers {
        config.processing.workers = workers;
    }
    if let Some(multiplier) = args.row_multiplier {
        config.processing.row_worker_multiplier = multiplier;
    }
    if let Some(quality) = args.quality {
        config.filter.quality = quality;
    }
    if let Some(radius) = args.blur_radius {
        config.filter.blur_radius = radius;
    }
    if let Some(brightness) = args.brightness {
        config.filter.brightness = brightness;
    }
    if let Some(contrast) = args.contrast {
        config.filter.contrast = contrast;
    }
    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary after batch processing.
fn print_summary(
    results: &[ProcessingResult],
    discovered: usize,
    elapsed: std::time::Duration,
    cancelled: bool,
) {
    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let failed = results.len() - succeeded;
    let total_bytes: u64 = results
        .iter()
        .filter_map(ProcessingResult::metadata)
        .map(|m| m.input_bytes)
        .sum();

    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { succeeded as f64 / secs } else { 0.0 };
    let throughput = if secs > 0.0 {
        total_bytes as f64 / 1_000_000.0 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    if cancelled {
        let missing = discovered.saturating_sub(results.len());
        eprintln!("    Cancelled:    {:>8}", missing);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", discovered);
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("    Throughput:   {:>7.1} MB/sec", throughput);
    eprintln!("  ====================================");
}
