//! File + console event sink
//!
//! Appends one line per event to the log file and mirrors the same line to
//! standard output.
//!
//! ## Design Decisions
//!
//! - **Append mode**: the file is created if absent (along with its parent
//!   directory) and never truncated, so restarts keep earlier history.
//! - **Flush per event**: each line is flushed after writing so the file is
//!   current even if the process is killed between ticks.
//! - **Fail at open**: an unwritable log path is detected by `open`, before
//!   the scheduler starts.
//! - **Console errors are returned**: a closed or broken stdout surfaces as
//!   an `emit` error after the file line is written, never as a panic.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use foldersync_core::{domain::SyncEvent, ports::IEventSink};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::AuditError;

/// Writer receiving the console copy of each log line
type ConsoleWriter = Box<dyn Write + Send>;

/// Event sink writing to an append-mode log file and, optionally, stdout
pub struct FileEventSink {
    path: PathBuf,
    file: Mutex<File>,
    console: Option<std::sync::Mutex<ConsoleWriter>>,
}

impl fmt::Debug for FileEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEventSink")
            .field("path", &self.path)
            .field("console", &self.console.is_some())
            .finish_non_exhaustive()
    }
}

impl FileEventSink {
    /// Opens (creating if needed) the log file at `path` in append mode.
    ///
    /// Console mirroring is enabled by default.
    ///
    /// # Errors
    /// Returns [`AuditError`] if the parent directory cannot be created or
    /// the file cannot be opened for writing.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| AuditError::CreateLogDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| AuditError::OpenLogFile {
                path: path.clone(),
                source,
            })?;

        debug!("log file opened");

        Ok(Self {
            path,
            file: Mutex::new(file),
            console: Some(std::sync::Mutex::new(Box::new(std::io::stdout()) as ConsoleWriter)),
        })
    }

    /// Enables or disables mirroring to standard output.
    #[must_use]
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console.then(|| {
            std::sync::Mutex::new(Box::new(std::io::stdout()) as ConsoleWriter)
        });
        self
    }

    /// Mirrors log lines to `writer` instead of standard output.
    #[must_use]
    pub fn with_console_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.console = Some(std::sync::Mutex::new(Box::new(writer) as ConsoleWriter));
        self
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl IEventSink for FileEventSink {
    async fn emit(&self, event: &SyncEvent) -> anyhow::Result<()> {
        let line = event.log_line();

        {
            let mut file = self.file.lock().await;
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await?;
        }

        if let Some(console) = &self.console {
            let mut out = console
                .lock()
                .map_err(|_| anyhow::anyhow!("console writer lock poisoned"))?;
            writeln!(out, "{line}")?;
            out.flush()?;
        }

        Ok(())
    }

    async fn flush(&self) -> anyhow::Result<()> {
        let mut file = self.file.lock().await;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}

// ============================================================================
// Unit tests
// ============================================================================
