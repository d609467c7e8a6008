//! One-way mirror engine
//!
//! The [`MirrorEngine`] makes a replica directory tree identical to a source
//! tree: same relative paths, same file content, nothing extra.
//!
//! ## Mirror Flow
//!
//! Directory pairs are processed from an explicit work stack, one visit per
//! pair:
//!
//! 1. **Ensure**: create the replica directory if it does not exist
//! 2. **Copy**: list the source directory; copy every file, queue every subdirectory
//! 3. **Prune**: list the replica directory; remove every name the source lacks
//!
//! Copies for a level always complete before that level's deletions are
//! computed, so a rename shows up as an independent add plus remove.
//!
//! ## Error Policy
//!
//! A failure on one entry is recorded as an `error` event and the visit
//! moves on to the next sibling. An unreadable source directory skips its
//! whole subtree, deletion pass included. Only problems with the two root
//! paths fail the call.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use foldersync_audit::AuditLogger;
use foldersync_core::domain::{SyncAction, SyncEvent};
use foldersync_core::ports::{EntryKind, IMirrorFileSystem};

use crate::{saturating_millis, SyncError};

// ============================================================================
// MirrorReport
// ============================================================================

/// Summary of one completed mirror call
#[derive(Debug, Clone, Default, Serialize)]
pub struct MirrorReport {
    /// Applied and failed operations, in the order they happened
    #[serde(skip)]
    pub events: Vec<SyncEvent>,
    /// Number of replica directories created
    pub dirs_created: u32,
    /// Number of files copied into the replica
    pub files_copied: u32,
    /// Number of replica files (or links) removed
    pub files_removed: u32,
    /// Number of replica directory subtrees removed
    pub dirs_removed: u32,
    /// Number of entry operations that failed
    pub errors: u32,
    /// Wall-clock duration of the call in milliseconds
    pub duration_ms: u64,
}

impl MirrorReport {
    fn record(&mut self, event: SyncEvent) {
        match event.action() {
            SyncAction::CreateDir => self.dirs_created += 1,
            SyncAction::CopyFile => self.files_copied += 1,
            SyncAction::RemoveFile => self.files_removed += 1,
            SyncAction::RemoveDir => self.dirs_removed += 1,
            SyncAction::Error => self.errors += 1,
            SyncAction::SyncComplete => return,
        }
        self.events.push(event);
    }

    /// Number of filesystem mutations applied to the replica
    pub fn mutations(&self) -> u32 {
        self.dirs_created + self.files_copied + self.files_removed + self.dirs_removed
    }

    /// Returns true if any entry operation failed
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Events of a single action, in order
    pub fn events_of(&self, action: SyncAction) -> impl Iterator<Item = &SyncEvent> {
        self.events.iter().filter(move |e| e.action() == action)
    }
}

/// A source directory and the replica directory that must mirror it
#[derive(Debug, Clone)]
struct DirectoryPair {
    source: PathBuf,
    replica: PathBuf,
}

// ============================================================================
// MirrorEngine
// ============================================================================

/// Stateless one-way mirror engine
///
/// Nothing survives between calls to [`mirror`](MirrorEngine::mirror); every
/// call re-scans both trees from scratch.
pub struct MirrorEngine {
    fs: Arc<dyn IMirrorFileSystem>,
    audit: AuditLogger,
}

impl MirrorEngine {
    /// Creates a new `MirrorEngine`
    ///
    /// # Arguments
    /// * `fs` - Filesystem port used for every inspection and mutation
    /// * `audit` - Logger receiving one event per applied or failed operation
    pub fn new(fs: Arc<dyn IMirrorFileSystem>, audit: AuditLogger) -> Self {
        Self { fs, audit }
    }

    /// Makes `replica` identical to `source`
    ///
    /// # Errors
    /// - [`SyncError::SourceMissing`] if `source` does not exist
    /// - [`SyncError::SourceNotDirectory`] if `source` is not a directory
    /// - [`SyncError::ReplicaNotDirectory`] if `replica` exists as a non-directory
    /// - [`SyncError::EntryOperationFailed`] if a root cannot be inspected
    ///
    /// Each of these is logged as exactly one `error` event and nothing is
    /// applied. Failures below the roots are recorded in the report instead.
    #[instrument(skip(self), fields(source = %source.display(), replica = %replica.display()))]
    pub async fn mirror(&self, source: &Path, replica: &Path) -> Result<MirrorReport, SyncError> {
        let start = Instant::now();

        if let Err(err) = self.check_roots(source, replica).await {
            warn!(%err, "Mirror aborted");
            self.audit.log_error(root_of(&err), &err.to_string()).await;
            return Err(err);
        }

        let mut report = MirrorReport::default();
        let mut stack = vec![DirectoryPair {
            source: source.to_path_buf(),
            replica: replica.to_path_buf(),
        }];

        while let Some(pair) = stack.pop() {
            self.visit(pair, &mut stack, &mut report).await;
        }

        report.duration_ms = saturating_millis(start.elapsed());

        info!(
            dirs_created = report.dirs_created,
            files_copied = report.files_copied,
            files_removed = report.files_removed,
            dirs_removed = report.dirs_removed,
            errors = report.errors,
            duration_ms = report.duration_ms,
            "Mirror completed"
        );

        Ok(report)
    }

    async fn check_roots(&self, source: &Path, replica: &Path) -> Result<(), SyncError> {
        match self.fs.stat(source).await {
            Ok(Some(EntryKind::Directory)) => {}
            Ok(Some(_)) => return Err(SyncError::SourceNotDirectory(source.to_path_buf())),
            Ok(None) => return Err(SyncError::SourceMissing(source.to_path_buf())),
            Err(e) => return Err(entry_error("inspect source folder", source, &e)),
        }

        match self.fs.stat(replica).await {
            Ok(None | Some(EntryKind::Directory)) => Ok(()),
            Ok(Some(_)) => Err(SyncError::ReplicaNotDirectory(replica.to_path_buf())),
            Err(e) => Err(entry_error("inspect replica folder", replica, &e)),
        }
    }

    // ========================================================================
    // Directory visit
    // ========================================================================

    async fn visit(
        &self,
        pair: DirectoryPair,
        stack: &mut Vec<DirectoryPair>,
        report: &mut MirrorReport,
    ) {
        debug!(source = %pair.source.display(), replica = %pair.replica.display(), "Visiting directory pair");

        // Step 1: the replica directory must exist before any child is processed.
        match self.fs.stat(&pair.replica).await {
            Ok(Some(_)) => {}
            Ok(None) => match self.fs.create_dir_all(&pair.replica).await {
                Ok(()) => report.record(self.audit.log_create_dir(&pair.replica).await),
                Err(e) => {
                    self.record_failure(report, "create directory", &pair.replica, &e)
                        .await;
                    return;
                }
            },
            Err(e) => {
                self.record_failure(report, "inspect", &pair.replica, &e)
                    .await;
                return;
            }
        }

        // Step 2: source listing is authoritative for this level.
        let names = match self.fs.list_dir(&pair.source).await {
            Ok(mut names) => {
                names.sort();
                names
            }
            Err(e) => {
                self.record_failure(report, "list directory", &pair.source, &e)
                    .await;
                return;
            }
        };

        // Step 3: copy files, queue subdirectories.
        let mut subdirs = Vec::new();
        for name in &names {
            let source = pair.source.join(name);
            let replica = pair.replica.join(name);

            match self.source_kind(&source).await {
                Ok(EntryKind::Directory) => {
                    if self.clear_for_directory(&replica, report).await {
                        subdirs.push(DirectoryPair { source, replica });
                    }
                }
                Ok(EntryKind::File) => {
                    if self.clear_for_file(&replica, report).await {
                        self.copy(&source, &replica, report).await;
                    }
                }
                Ok(EntryKind::Symlink | EntryKind::Other) => {
                    let e = anyhow!("unsupported file type");
                    self.record_failure(report, "copy file", &source, &e).await;
                }
                Err(e) => {
                    self.record_failure(report, "copy", &source, &e).await;
                }
            }
        }
        // Reversed so that subdirectories are visited in name order.
        stack.extend(subdirs.into_iter().rev());

        // Step 4: prune what the source does not have.
        let keep: HashSet<&OsString> = names.iter().collect();
        self.prune(&pair.replica, &keep, report).await;
    }

    /// Kind of a source entry, following links. A name that resolves to
    /// nothing is either a dangling link or an entry that vanished after
    /// the listing.
    async fn source_kind(&self, path: &Path) -> anyhow::Result<EntryKind> {
        if let Some(kind) = self.fs.stat(path).await? {
            return Ok(kind);
        }
        match self.fs.lstat(path).await? {
            Some(EntryKind::Symlink) => Err(anyhow!("dangling symbolic link")),
            _ => Err(anyhow!("entry vanished during synchronization")),
        }
    }

    // ========================================================================
    // Type mismatch handling
    // ========================================================================

    /// Make room for a directory at `replica`. Returns false if the slot is
    /// still occupied by something that is not a directory.
    async fn clear_for_directory(&self, replica: &Path, report: &mut MirrorReport) -> bool {
        match self.fs.lstat(replica).await {
            Ok(None | Some(EntryKind::Directory)) => true,
            Ok(Some(_)) => self.remove_file(replica, report).await,
            Err(e) => {
                self.record_failure(report, "inspect", replica, &e).await;
                false
            }
        }
    }

    /// Make room for a file copy at `replica`. Links are removed so the copy
    /// never writes through them.
    async fn clear_for_file(&self, replica: &Path, report: &mut MirrorReport) -> bool {
        match self.fs.lstat(replica).await {
            Ok(None | Some(EntryKind::File)) => true,
            Ok(Some(EntryKind::Directory)) => self.remove_dir(replica, report).await,
            Ok(Some(_)) => self.remove_file(replica, report).await,
            Err(e) => {
                self.record_failure(report, "inspect", replica, &e).await;
                false
            }
        }
    }

    // ========================================================================
    // Deletion pass
    // ========================================================================

    async fn prune(&self, replica_dir: &Path, keep: &HashSet<&OsString>, report: &mut MirrorReport) {
        let mut names = match self.fs.list_dir(replica_dir).await {
            Ok(names) => names,
            Err(e) => {
                self.record_failure(report, "list directory", replica_dir, &e)
                    .await;
                return;
            }
        };
        names.sort();

        for name in names.iter().filter(|n| !keep.contains(n)) {
            let path = replica_dir.join(name);
            match self.fs.lstat(&path).await {
                Ok(Some(EntryKind::Directory)) => {
                    self.remove_dir(&path, report).await;
                }
                Ok(Some(_)) => {
                    self.remove_file(&path, report).await;
                }
                // Already gone
                Ok(None) => {}
                Err(e) => {
                    self.record_failure(report, "inspect", &path, &e).await;
                }
            }
        }
    }

    // ========================================================================
    // Single operations
    // ========================================================================

    async fn copy(&self, source: &Path, replica: &Path, report: &mut MirrorReport) {
        match self.fs.copy_file(source, replica).await {
            Ok(()) => report.record(self.audit.log_copy_file(source, replica).await),
            Err(e) => self.record_failure(report, "copy file", source, &e).await,
        }
    }

    async fn remove_file(&self, path: &Path, report: &mut MirrorReport) -> bool {
        match self.fs.remove_file(path).await {
            Ok(()) => {
                report.record(self.audit.log_remove_file(path).await);
                true
            }
            Err(e) => {
                self.record_failure(report, "remove file", path, &e).await;
                false
            }
        }
    }

    async fn remove_dir(&self, path: &Path, report: &mut MirrorReport) -> bool {
        match self.fs.remove_dir_all(path).await {
            Ok(()) => {
                report.record(self.audit.log_remove_dir(path).await);
                true
            }
            Err(e) => {
                self.record_failure(report, "remove directory", path, &e)
                    .await;
                false
            }
        }
    }

    async fn record_failure(
        &self,
        report: &mut MirrorReport,
        operation: &'static str,
        path: &Path,
        cause: &anyhow::Error,
    ) {
        let err = entry_error(operation, path, cause);
        warn!(%err, "Entry operation failed");
        report.record(self.audit.log_error(path, &err.to_string()).await);
    }
}

fn entry_error(operation: &'static str, path: &Path, cause: &anyhow::Error) -> SyncError {
    SyncError::EntryOperationFailed {
        operation,
        path: path.to_path_buf(),
        message: format!("{cause:#}"),
    }
}

/// Path an aborting root error refers to
fn root_of(err: &SyncError) -> &Path {
    match err {
        SyncError::SourceMissing(p)
        | SyncError::SourceNotDirectory(p)
        | SyncError::ReplicaNotDirectory(p) => p.as_path(),
        SyncError::EntryOperationFailed { path, .. } => path.as_path(),
    }
}

// ============================================================================
// Tests
// ============================================================================
