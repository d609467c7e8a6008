//! Application wiring - turns parsed arguments into a running scheduler
//!
//! 1. Validates the arguments into a [`Config`]
//! 2. Opens the log file sink (file + stdout)
//! 3. Creates the filesystem adapter, mirror engine and scheduler
//! 4. Runs until SIGINT / SIGTERM, then flushes the log

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use foldersync_audit::{AuditLogger, FileEventSink};
use foldersync_core::config::{Config, ConfigBuilder, ValidationError};
use foldersync_core::ports::TokioClock;
use foldersync_sync::engine::MirrorEngine;
use foldersync_sync::filesystem::LocalFileSystemAdapter;
use foldersync_sync::scheduler::SyncScheduler;

use crate::Cli;

/// Exit code for arguments that parse but fail validation (matches clap's usage errors)
const EXIT_CONFIG_ERROR: u8 = 2;

/// Builds and validates the configuration from parsed arguments.
pub(crate) fn build_config(cli: &Cli) -> Result<Config, Vec<ValidationError>> {
    ConfigBuilder::new()
        .source(&cli.source_folder)
        .replica(&cli.replica_folder)
        .log_file(&cli.log_file)
        .interval_secs(cli.sync_interval)
        .build_validated()
}

/// Runs the sync loop until a shutdown signal arrives.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            eprintln!("Invalid configuration:");
            for err in &errors {
                eprintln!("  {err}");
            }
            return Ok(ExitCode::from(EXIT_CONFIG_ERROR));
        }
    };

    info!(
        source = %config.source.display(),
        replica = %config.replica.display(),
        log_file = %config.log_file.display(),
        interval = %config.interval,
        "Configuration validated"
    );

    let sink = FileEventSink::open(&config.log_file)
        .await
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;
    let audit = AuditLogger::new(Arc::new(sink));

    let engine = MirrorEngine::new(Arc::new(LocalFileSystemAdapter::new()), audit.clone());
    let scheduler = SyncScheduler::new(&config, engine, audit.clone(), Arc::new(TokioClock::new()));

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let summary = scheduler.run(shutdown).await;
    audit.flush().await;

    info!(
        ticks = summary.ticks(),
        failed = summary.ticks_failed,
        "FolderSync stopped"
    );

    Ok(ExitCode::SUCCESS)
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, then cancels `token`.
///
/// A handler that cannot be installed is logged and never fires; the other
/// one still works.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::path::Path;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn parse(dir: &Path, replica: &str, log: &str, interval: &str) -> Cli {
        let source = dir.join("source");
        let replica = dir.join(replica);
        let log = dir.join(log);
        Cli::try_parse_from([
            OsStr::new("foldersync"),
            source.as_os_str(),
            replica.as_os_str(),
            log.as_os_str(),
            OsStr::new(interval),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_config_valid() {
        let dir = TempDir::new().unwrap();
        let cli = parse(dir.path(), "replica", "sync.log", "15");

        let config = build_config(&cli).unwrap();

        assert_eq!(config.interval.as_secs(), 15);
        assert_eq!(config.replica, dir.path().join("replica"));
    }

    #[test]
    fn test_build_config_reports_every_problem() {
        let dir = TempDir::new().unwrap();
        let cli = parse(dir.path(), "source/inner", "source/inner/sync.log", "0");

        let errors = build_config(&cli).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(fields, vec!["interval", "replica", "log_file"]);
    }

    #[tokio::test]
    async fn test_run_exits_with_config_error() {
        let dir = TempDir::new().unwrap();
        let cli = parse(dir.path(), "replica", "sync.log", "-1");

        let code = run(cli).await.unwrap();

        assert_eq!(
            format!("{code:?}"),
            format!("{:?}", ExitCode::from(EXIT_CONFIG_ERROR))
        );
        assert!(!dir.path().join("sync.log").exists());
    }

    #[tokio::test]
    async fn test_run_fails_when_log_file_unwritable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blocker"), b"x").unwrap();
        let cli = parse(dir.path(), "replica", "blocker/sync.log", "1");

        let err = run(cli).await.unwrap_err();

        assert!(err.to_string().contains("Failed to open log file"));
    }
}
