//! Subtrad - Batch Subtitle Translation
//!
//! Entry point: builds the configuration once from the config file and the
//! environment, then translates every container of the given folder.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtrad::cli::Args;
use subtrad::config::{Config, TranslationMode};
use subtrad::error::SubtradError;
use subtrad::workflow::Workflow;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    let _guard = setup_logging(args.verbose)?;

    info!("Starting Subtrad - Batch Subtitle Translation");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load subtrad.toml from current directory first
            if std::path::Path::new("subtrad.toml").exists() {
                info!("Found subtrad.toml in current directory, loading...");
                Config::from_file("subtrad.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env();

    if let Some(mode) = &args.mode {
        config.translate.mode = mode.parse::<TranslationMode>()?;
    }
    if args.block_size.is_some() {
        config.translate.block_size = args.block_size;
    }

    // Fatal problems stop the run before any container is touched
    config.validate()?;
    if !args.folder.is_dir() {
        return Err(SubtradError::InvalidInput(format!(
            "{} is not a valid folder",
            args.folder.display()
        ))
        .into());
    }

    info!(
        "Mode: {:?}, block size: {}, target language: {}, embedding: {}",
        config.translate.mode,
        config.translate.effective_block_size(),
        config.translate.target_language,
        config.output.embed_subtitles
    );

    let workflow = Workflow::new(config).await?;
    let report = workflow.process_directory(&args.folder).await?;

    for (container, reason) in &report.skipped {
        println!("Skipped {}: {}", container.display(), reason);
    }
    println!(
        "{} translated, {} skipped, {} failed blocks, {} new containers",
        report.processed.len(),
        report.skipped.len(),
        report.failed_blocks,
        report.embedded.len()
    );

    info!("Subtrad run completed");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subtrad").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subtrad.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subtrad.log").display());

    Ok(guard)
}
