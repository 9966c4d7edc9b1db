//! Scanline CLI - concurrent batch image filtering.
//!
//! Scanline walks a directory of images, applies one pixel-level filter to
//! each (grayscale, blur, brightness, contrast), and writes the results to
//! an output directory. Images are processed by a fixed worker pool; each
//! image is itself split into per-row tasks that run concurrently.
//!
//! # Usage
//!
//! ```bash
//! # Grayscale every image under ./photos into ./output
//! scanline process ./photos
//!
//! # Blur with a custom radius and worker count
//! scanline process ./photos --filter blur --blur-radius 3 --workers 8
//!
//! # View configuration
//! scanline config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Scanline - concurrent batch image filtering.
#[derive(Parser, Debug)]
#[command(name = "scanline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply the configured filter to an image file or directory
    Process(cli::process::ProcessArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match scanline_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `scanline config path`."
            );
            scanline_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Scanline v{}", scanline_core::VERSION);

    match cli.command {
        Commands::Process(args) => cli::process::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config),
    }
}
