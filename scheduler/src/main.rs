/// Voz do Brasil Scheduler - Main Entry Point
///
/// Long-running process that launches the downloader every business day at
/// the configured time and records the outcome in a log file.
mod config;
mod schedule;
mod workers;

use std::path::Path;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{SchedulerConfig, LOG_FILE_NAME};
use schedule::{ScheduleEntry, Scheduler};
use vozbr_shared::models::DownloadRequest;
use workers::fetcher_process::ProcessFetcher;

/// Log to stdout and to `<log_dir>/voz_brasil_scheduler.log`.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vozbr_scheduler=info,vozbr_shared=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = SchedulerConfig::from_env()?;
    std::fs::create_dir_all(&config.log_dir)?;
    let _log_guard = init_tracing(&config.log_dir);

    info!("=== Voz do Brasil Scheduler Starting ===");
    info!("Project directory: {}", config.project_dir.display());
    info!("Downloader: {}", config.fetcher_bin.display());

    let runner = ProcessFetcher::new(config.fetcher_bin.clone(), config.project_dir.clone())
        .with_leading_args(config.fetcher_args.clone());

    let download_dir = config.download_dir.clone();
    let filename = config.filename.clone();
    let entry = ScheduleEntry::daily(config.trigger_time, move || {
        DownloadRequest::new(download_dir.clone(), filename.clone())
    });

    info!(
        "Scheduler configured. Downloads run at {} on business days",
        entry.trigger_time().format("%H:%M")
    );
    let mut scheduler = Scheduler::new(runner, config.poll_interval).with_entry(entry);

    scheduler.run_until(shutdown_signal()).await;

    info!("Voz do Brasil Scheduler stopped.");
    Ok(())
}
