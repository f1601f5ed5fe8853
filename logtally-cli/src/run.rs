//! Run handler: configuration, logging, pipeline execution and summary output.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use logtally_core::config::LogTallyConfig;
use logtally_log_pipeline::{LogPipelineBuilder, PipelineConfig};

use crate::cli::Cli;
use crate::error::CliError;
use crate::logging;
use crate::output::OutputWriter;

/// Execute one run described by the command line.
///
/// # Errors
///
/// Returns `CliError::Config` for invalid settings, `CliError::Input` when the
/// input resolves to no readable files, `CliError::Output` when a destination
/// cannot be written, and `CliError::Cancelled` on interrupt.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli).await?;
    logging::init_tracing(&config.general).map_err(|e| CliError::Config(format!("{e:#}")))?;
    logtally_core::metrics::describe_all();

    let pipeline_config = PipelineConfig::from_core(&config.pipeline).with_paths(
        cli.input.as_str(),
        &cli.parsed_out,
        &cli.trap_out,
        &cli.report_out,
    );
    let pipeline = LogPipelineBuilder::new().config(pipeline_config).build()?;

    info!(
        input = %cli.input,
        parsed = %cli.parsed_out.display(),
        trap = %cli.trap_out.display(),
        report = %cli.report_out.display(),
        "logtally starting"
    );

    let cancel = CancellationToken::new();
    let watcher = spawn_signal_watcher(cancel.clone());
    let result = pipeline.run_until_cancelled(cancel).await;
    watcher.abort();

    let summary = result?;
    OutputWriter::new(cli.output).render(&summary)?;
    Ok(())
}

/// Load configuration: optional file, then environment, then command-line flags.
async fn load_config(cli: &Cli) -> Result<LogTallyConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => LogTallyConfig::load(path).await?,
        None => LogTallyConfig::from_env()?,
    };

    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(workers) = cli.workers {
        config.pipeline.workers = workers;
    }

    config.validate()?;
    Ok(config)
}

/// Cancel the run on SIGINT / SIGTERM.
fn spawn_signal_watcher(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            signal = wait_for_shutdown_signal() => match signal {
                Ok(name) => {
                    warn!(signal = name, "shutdown signal received, cancelling run");
                    cancel.cancel();
                }
                Err(e) => warn!(error = %e, "signal handlers unavailable, run cannot be interrupted"),
            },
            () = cancel.cancelled() => {}
        }
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> anyhow::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> anyhow::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
