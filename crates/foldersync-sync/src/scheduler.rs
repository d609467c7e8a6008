//! Sync scheduler - re-runs the mirror engine on a fixed interval
//!
//! The [`SyncScheduler`] runs tick 0 immediately, then starts a new tick
//! every `interval`, measured from the start of the previous tick. A tick
//! that overruns the interval is followed by the next one without delay.
//!
//! ## Flow
//!
//! ```text
//! ┌──────┐  tick  ┌──────────────┐  report  ┌──────────────────────┐
//! │ Idle │ ─────→ │ Running(n)   │ ───────→ │ log completion marker│
//! └──────┘        └──────────────┘          └──────────┬───────────┘
//!    ↑                                                 │
//!    └──── sleep(interval - elapsed) or shutdown ──────┘
//! ```
//!
//! Shutdown is only observed between ticks: an in-flight mirror always
//! finishes and logs its marker before the loop exits.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use foldersync_audit::AuditLogger;
use foldersync_core::config::Config;
use foldersync_core::domain::SyncInterval;
use foldersync_core::ports::IClock;

use crate::engine::MirrorEngine;
use crate::saturating_millis;

// ============================================================================
// SchedulerState / SchedulerSummary
// ============================================================================

/// Current activity of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick (or not started)
    Idle,
    /// Mirror run `tick` is in progress (0-based)
    Running {
        /// Index of the running tick
        tick: u64,
    },
}

/// Outcome counts returned when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerSummary {
    /// Ticks whose mirror call returned a report
    pub ticks_succeeded: u64,
    /// Ticks aborted by a root error (e.g. missing source)
    pub ticks_failed: u64,
}

impl SchedulerSummary {
    /// Total number of ticks run
    pub fn ticks(&self) -> u64 {
        self.ticks_succeeded + self.ticks_failed
    }
}

// ============================================================================
// SyncScheduler
// ============================================================================

/// Fixed-interval driver for one source/replica pair
pub struct SyncScheduler {
    engine: MirrorEngine,
    audit: AuditLogger,
    clock: Arc<dyn IClock>,
    source: PathBuf,
    replica: PathBuf,
    interval: SyncInterval,
    state_tx: watch::Sender<SchedulerState>,
}

impl SyncScheduler {
    /// Creates a new `SyncScheduler`
    ///
    /// # Arguments
    /// * `config` - Validated configuration supplying the paths and interval
    /// * `engine` - Mirror engine run on every tick
    /// * `audit` - Logger receiving the per-tick completion marker
    /// * `clock` - Time source used for fire-time arithmetic and sleeping
    pub fn new(
        config: &Config,
        engine: MirrorEngine,
        audit: AuditLogger,
        clock: Arc<dyn IClock>,
    ) -> Self {
        let (state_tx, _) = watch::channel(SchedulerState::Idle);

        info!(
            source = %config.source.display(),
            replica = %config.replica.display(),
            interval = %config.interval,
            "Creating sync scheduler"
        );

        Self {
            engine,
            audit,
            clock,
            source: config.source.clone(),
            replica: config.replica.clone(),
            interval: config.interval,
            state_tx,
        }
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        *self.state_tx.borrow()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    /// Runs ticks until `shutdown` is cancelled
    ///
    /// Never returns on its own. Root errors such as a missing source fail
    /// that tick only; the loop carries on.
    pub async fn run(&self, shutdown: CancellationToken) -> SchedulerSummary {
        let mut summary = SchedulerSummary::default();
        let mut tick: u64 = 0;

        info!(interval_secs = self.interval.as_secs(), "Starting sync loop");

        loop {
            if shutdown.is_cancelled() {
                info!("Shutdown requested before tick start");
                break;
            }

            let started = self.clock.now();
            self.run_tick(tick, &mut summary).await;
            tick += 1;

            let elapsed = self.clock.now().saturating_duration_since(started);
            let wait = self.interval.as_duration().saturating_sub(elapsed);
            debug!(
                elapsed_ms = saturating_millis(elapsed),
                wait_ms = saturating_millis(wait),
                "Waiting for next tick"
            );

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping sync loop");
                    break;
                }
                _ = self.clock.sleep(wait) => {}
            }
        }

        info!(
            ticks_succeeded = summary.ticks_succeeded,
            ticks_failed = summary.ticks_failed,
            "Sync loop stopped"
        );

        summary
    }

    async fn run_tick(&self, tick: u64, summary: &mut SchedulerSummary) {
        self.state_tx.send_replace(SchedulerState::Running { tick });
        info!(tick, "Starting sync tick");

        match self.engine.mirror(&self.source, &self.replica).await {
            Ok(report) => {
                summary.ticks_succeeded += 1;
                let report_json = serde_json::to_string(&report).unwrap_or_default();
                if report.has_errors() {
                    warn!(
                        tick,
                        mutations = report.mutations(),
                        errors = report.errors,
                        report = %report_json,
                        "Sync tick completed with errors"
                    );
                } else {
                    info!(
                        tick,
                        mutations = report.mutations(),
                        report = %report_json,
                        "Sync tick completed"
                    );
                }
            }
            Err(err) => {
                summary.ticks_failed += 1;
                error!(tick, %err, "Sync tick failed");
            }
        }

        self.audit.log_sync_complete().await;
        self.audit.flush().await;
        self.state_tx.send_replace(SchedulerState::Idle);
    }
}

// ============================================================================
// Tests
// ============================================================================
