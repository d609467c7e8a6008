//! Configuration module for FolderSync.
//!
//! Provides the typed configuration assembled from the command line, with
//! validation and a builder pattern for programmatic use. Anything rejected
//! here is a configuration error: it is reported before the scheduler starts
//! and the process exits non-zero.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::SyncInterval;

// ---------------------------------------------------------------------------
// Config struct
// ---------------------------------------------------------------------------

/// Top-level configuration for one mirror pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory whose content is authoritative.
    pub source: PathBuf,
    /// Directory made identical to `source` on every tick.
    pub replica: PathBuf,
    /// Append-mode log file receiving one line per sync event.
    pub log_file: PathBuf,
    /// Time between the starts of two consecutive ticks.
    pub interval: SyncInterval,
}

impl Config {
    /// Create a configuration from already-typed values.
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        log_file: impl Into<PathBuf>,
        interval: SyncInterval,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            log_file: log_file.into(),
            interval,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field, e.g. `"interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. A missing source
    /// directory is deliberately NOT an error here: it is reported on every
    /// tick instead, so the mirror resumes once the source reappears.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (field, path) in [
            ("source", &self.source),
            ("replica", &self.replica),
            ("log_file", &self.log_file),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if !errors.is_empty() {
            return errors;
        }

        let source = resolve_path(&self.source);
        let replica = resolve_path(&self.replica);
        let log_file = resolve_path(&self.log_file);

        if source == replica {
            errors.push(ValidationError {
                field: "replica".into(),
                message: format!(
                    "must differ from the source folder: {}",
                    self.replica.display()
                ),
            });
        } else if replica.starts_with(&source) {
            errors.push(ValidationError {
                field: "replica".into(),
                message: format!(
                    "must not be inside the source folder: {} is within {}",
                    self.replica.display(),
                    self.source.display()
                ),
            });
        } else if source.starts_with(&replica) {
            errors.push(ValidationError {
                field: "replica".into(),
                message: format!(
                    "must not contain the source folder: {} is within {}",
                    self.source.display(),
                    self.replica.display()
                ),
            });
        }

        if self.log_file.is_dir() {
            errors.push(ValidationError {
                field: "log_file".into(),
                message: format!("is a directory: {}", self.log_file.display()),
            });
        }
        if log_file.starts_with(&replica) {
            errors.push(ValidationError {
                field: "log_file".into(),
                message: format!(
                    "must not be inside the replica folder: {}",
                    self.log_file.display()
                ),
            });
        }

        errors
    }
}

/// Best-effort absolute, normalized form of `path` for overlap checks.
///
/// Existing paths are canonicalized (resolving symlinks); paths that do not
/// exist yet are made absolute and lexically cleaned of `.` and `..`.
fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for [`Config`] that accepts raw, unvalidated values.
///
/// The interval is kept as a signed integer until `build_validated`, so a
/// zero or negative value is reported alongside any other problem.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    source: PathBuf,
    replica: PathBuf,
    log_file: PathBuf,
    interval_secs: i64,
}

impl ConfigBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source folder.
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = path.into();
        self
    }

    /// Set the replica folder.
    pub fn replica(mut self, path: impl Into<PathBuf>) -> Self {
        self.replica = path.into();
        self
    }

    /// Set the log file path.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Set the sync interval in seconds.
    pub fn interval_secs(mut self, seconds: i64) -> Self {
        self.interval_secs = seconds;
        self
    }

    /// Build and validate, returning every error found.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let interval = SyncInterval::new(self.interval_secs);

        // Paths are checked even when the interval is bad so all errors are reported together.
        let config = Config::new(self.source, self.replica, self.log_file, SyncInterval::MIN);
        let mut errors = config.validate();

        match interval {
            Ok(interval) if errors.is_empty() => Ok(Config { interval, ..config }),
            Ok(_) => Err(errors),
            Err(e) => {
                errors.insert(
                    0,
                    ValidationError {
                        field: "interval".into(),
                        message: e.to_string(),
                    },
                );
                Err(errors)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn valid_builder(dir: &TempDir) -> ConfigBuilder {
        ConfigBuilder::new()
            .source(dir.path().join("source"))
            .replica(dir.path().join("replica"))
            .log_file(dir.path().join("logs").join("sync.log"))
            .interval_secs(10)
    }

    #[test]
    fn build_validated_accepts_valid_config() {
        let dir = TempDir::new().unwrap();
        let cfg = valid_builder(&dir).build_validated().expect("valid config");
        assert_eq!(cfg.interval.as_secs(), 10);
        assert_eq!(cfg.source, dir.path().join("source"));
        assert_eq!(cfg.replica, dir.path().join("replica"));
    }

    #[test]
    fn missing_source_is_not_a_config_error() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new(
            dir.path().join("does-not-exist"),
            dir.path().join("replica"),
            dir.path().join("sync.log"),
            SyncInterval::new(5).unwrap(),
        );
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_catches_zero_interval() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .interval_secs(0)
            .build_validated()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "interval"));
    }

    #[test]
    fn validate_catches_negative_interval() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .interval_secs(-30)
            .build_validated()
            .unwrap_err();
        assert_eq!(errors[0].field, "interval");
        assert!(errors[0].message.contains("-30"));
    }

    #[test]
    fn validate_catches_empty_paths() {
        let errors = ConfigBuilder::new()
            .interval_secs(1)
            .build_validated()
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["source", "replica", "log_file"]);
    }

    #[test]
    fn validate_catches_identical_folders() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .replica(dir.path().join("source"))
            .build_validated()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "replica"));
    }

    #[test]
    fn validate_catches_replica_inside_source() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .replica(dir.path().join("source").join("backup"))
            .build_validated()
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "replica" && e.message.contains("inside the source")));
    }

    #[test]
    fn validate_catches_source_inside_replica() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .source(dir.path().join("replica").join("data"))
            .build_validated()
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "replica" && e.message.contains("contain the source")));
    }

    #[test]
    fn validate_catches_parent_dir_trick() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .replica(dir.path().join("source").join("..").join("source"))
            .build_validated()
            .unwrap_err();
        assert!(errors.iter().any(|e| e.field == "replica"));
    }

    #[test]
    fn validate_catches_log_file_directory() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .log_file(dir.path())
            .build_validated()
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "log_file" && e.message.contains("directory")));
    }

    #[test]
    fn validate_catches_log_file_inside_replica() {
        let dir = TempDir::new().unwrap();
        let errors = valid_builder(&dir)
            .log_file(dir.path().join("replica").join("sync.log"))
            .build_validated()
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "log_file" && e.message.contains("replica")));
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError {
            field: "interval".into(),
            message: "must be greater than 0".into(),
        };
        assert_eq!(err.to_string(), "interval: must be greater than 0");
    }

    #[test]
    fn config_serializes_interval_as_seconds() {
        let cfg = Config::new("/s", "/r", "/l.log", SyncInterval::new(7).unwrap());
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["interval"], 7);
        assert_eq!(json["source"], "/s");
    }
}
