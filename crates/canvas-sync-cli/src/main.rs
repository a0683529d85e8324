use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use canvas_sync_core::app::{ConfigLoader, Schedule, SyncLoop, SynchronizerBuilder};
use canvas_sync_core::impls::RecordingUploader;

/// Periodically back up a canvas snapshot to a remote endpoint.
#[derive(Debug, Parser)]
#[command(name = "canvas-sync", version)]
struct Args {
    /// TOML config file. `CANVAS_SYNC_*` env vars override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle, print the report as JSON and exit.
    #[arg(long)]
    once: bool,

    /// Record uploads in memory instead of sending them.
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .with_file(debug)
        .with_line_number(debug);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("tracing already initialized")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load().context("loading configuration")?;

    init_tracing(config.debug)?;
    info!(
        base_url = %config.base_url,
        location = %config.location_url,
        capture = %config.capture_path.display(),
        "configuration loaded"
    );
    if config.token.is_empty() {
        warn!("no token configured, uploads go out without Authorization");
    }

    let mut builder = SynchronizerBuilder::from_config(&config)?;
    let recorder = if args.dry_run {
        let recorder = Arc::new(RecordingUploader::new());
        builder = builder.uploader(recorder.clone());
        info!("dry run: uploads are recorded, not sent");
        Some(recorder)
    } else {
        None
    };
    let mut synchronizer = builder.build()?;

    if args.once {
        let report = synchronizer.run_cycle().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let handle = SyncLoop::start(
        synchronizer,
        Schedule::new(config.initial_delay(), config.interval()),
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    info!("shutdown requested");

    let synchronizer = handle.stop().await?;
    let stats = synchronizer.stats();
    info!(
        cycles = stats.cycles,
        uploads = stats.uploads(),
        accepted = stats.accepted,
        "bye"
    );
    if let Some(recorder) = recorder {
        info!(recorded = recorder.call_count(), "dry run finished");
    }
    Ok(())
}
