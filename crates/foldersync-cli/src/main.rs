//! FolderSync CLI - One-way folder mirroring on a fixed interval
//!
//! Usage:
//!
//! ```text
//! foldersync <SOURCE_FOLDER> <REPLICA_FOLDER> <LOG_FILE> <SYNC_INTERVAL>
//! ```
//!
//! Sync events are appended to the log file and echoed to stdout.
//! Diagnostics go to stderr, filtered by `RUST_LOG` or `-v`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;

#[derive(Debug, Parser)]
#[command(
    name = "foldersync",
    version,
    about = "Periodically mirror a source folder into a replica folder"
)]
pub struct Cli {
    /// Folder whose content is copied
    pub source_folder: PathBuf,

    /// Folder made identical to the source on every sync
    pub replica_folder: PathBuf,

    /// File receiving one line per sync operation (appended, created if missing)
    pub log_file: PathBuf,

    /// Seconds between the starts of two consecutive syncs (must be > 0)
    #[arg(allow_negative_numbers = true)]
    pub sync_interval: i64,

    /// Verbose diagnostics on stderr (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    app::run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_four_positionals() {
        let cli = Cli::try_parse_from(["foldersync", "/src", "/rep", "/var/log/sync.log", "30"])
            .unwrap();

        assert_eq!(cli.source_folder, PathBuf::from("/src"));
        assert_eq!(cli.replica_folder, PathBuf::from("/rep"));
        assert_eq!(cli.log_file, PathBuf::from("/var/log/sync.log"));
        assert_eq!(cli.sync_interval, 30);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_negative_interval_reaches_validation() {
        let cli = Cli::try_parse_from(["foldersync", "a", "b", "c.log", "-5"]).unwrap();
        assert_eq!(cli.sync_interval, -5);
    }

    #[test]
    fn test_rejects_missing_arguments() {
        assert!(Cli::try_parse_from(["foldersync", "a", "b", "c.log"]).is_err());
        assert!(Cli::try_parse_from(["foldersync"]).is_err());
    }

    #[test]
    fn test_rejects_non_integer_interval() {
        assert!(Cli::try_parse_from(["foldersync", "a", "b", "c.log", "ten"]).is_err());
        assert!(Cli::try_parse_from(["foldersync", "a", "b", "c.log", "1.5"]).is_err());
    }

    #[test]
    fn test_verbose_flag_counts() {
        let cli = Cli::try_parse_from(["foldersync", "-vv", "a", "b", "c.log", "1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
