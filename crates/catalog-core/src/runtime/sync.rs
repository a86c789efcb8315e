// crates/catalog-core/src/runtime/sync.rs
// ============================================================================
// Module: View Sync Engine
// Description: Background task converging the name-sorted projection.
// Purpose: Keep the projection eventually consistent without blocking callers.
// Dependencies: crate::{core, events, interfaces}, thiserror, tokio
// ============================================================================

//! ## Overview
//! The engine reconciles the projection once before it starts (bounded retry),
//! then runs a single sequential loop that waits on three things at once:
//!
//! - the scheduled timer: unconditional refresh with bounded retry;
//!   exhaustion is fatal,
//! - the dirty-check timer: single-attempt refresh when a write is pending;
//!   failure re-raises the flag for the next tick,
//! - the shutdown signal: the loop returns without starting another refresh.
//!
//! Because the branches run one at a time inside one loop, at most one
//! refresh is ever in flight. Fatal outcomes are returned as
//! [`ViewSyncError`] for the process owner to act on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::Interval;
use tokio::time::MissedTickBehavior;

use crate::events::CatalogEventSink;
use crate::events::SyncOutcome;
use crate::events::SyncTrigger;
use crate::events::ViewSyncEvent;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;
use crate::runtime::dirty::DirtyFlag;
use crate::runtime::retry::RetryPolicy;
use crate::runtime::retry::with_bounded_retries;
use crate::runtime::shutdown::ShutdownSignal;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default interval of the unconditional scheduled refresh.
pub const DEFAULT_SCHEDULED_INTERVAL: Duration = Duration::from_secs(30 * 60);
/// Default interval of the dirty-flag check.
pub const DEFAULT_DIRTY_CHECK_INTERVAL: Duration = Duration::from_secs(2);
/// Smallest timer period accepted by the loop.
const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

// ============================================================================
// SECTION: Config
// ============================================================================

/// Timer and retry tuning for the view sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSyncConfig {
    /// Interval of the unconditional refresh; also the worst-case staleness
    /// bound while dirty-check refreshes keep failing.
    pub scheduled_interval: Duration,
    /// Interval of the dirty-flag check.
    pub dirty_check_interval: Duration,
    /// Retry policy for startup and scheduled refreshes.
    pub retry: RetryPolicy,
}

impl Default for ViewSyncConfig {
    fn default() -> Self {
        Self {
            scheduled_interval: DEFAULT_SCHEDULED_INTERVAL,
            dirty_check_interval: DEFAULT_DIRTY_CHECK_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal view sync outcomes. The process should stop serving reads.
#[derive(Debug, Error)]
pub enum ViewSyncError {
    /// The initial reconciliation never succeeded.
    #[error("initial view reconciliation failed after {attempts} attempts: {source}")]
    StartupExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        source: StoreError,
    },
    /// A scheduled refresh never succeeded.
    #[error("scheduled view refresh failed after {attempts} attempts: {source}")]
    ScheduledExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        source: StoreError,
    },
    /// The background task ended abnormally.
    #[error("view sync task failed: {0}")]
    TaskFailed(String),
}

/// Why a single attempt inside a retry sequence did not refresh.
enum AttemptError {
    /// Shutdown was raised before the attempt started.
    Cancelled,
    /// The store rejected the refresh.
    Store(StoreError),
}

/// Why a retry sequence ended without a refresh.
enum SequenceFailure {
    /// Shutdown interrupted the sequence.
    Cancelled,
    /// Every attempt failed.
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        source: StoreError,
    },
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Background refresher for the name-sorted projection.
#[derive(Clone)]
pub struct ViewSyncEngine {
    /// Timer and retry tuning.
    config: ViewSyncConfig,
    /// Storage gateway owning the projection.
    store: Arc<dyn CatalogStore>,
    /// Flag raised by writers.
    dirty: Arc<DirtyFlag>,
    /// Event sink for refresh attempts.
    events: Arc<dyn CatalogEventSink>,
}

impl ViewSyncEngine {
    /// Creates an engine; nothing runs until [`Self::start`].
    #[must_use]
    pub fn new(
        config: ViewSyncConfig,
        store: Arc<dyn CatalogStore>,
        dirty: Arc<DirtyFlag>,
        events: Arc<dyn CatalogEventSink>,
    ) -> Self {
        Self {
            config,
            store,
            dirty,
            events,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &ViewSyncConfig {
        &self.config
    }

    /// Reconciles the projection, then spawns the background loop.
    ///
    /// Returns only after the initial reconciliation succeeded (or shutdown
    /// interrupted it, in which case the spawned loop exits immediately).
    ///
    /// # Errors
    ///
    /// Returns [`ViewSyncError::StartupExhausted`] when every reconciliation
    /// attempt fails.
    pub async fn start(self, shutdown: ShutdownSignal) -> Result<ViewSyncHandle, ViewSyncError> {
        match self.refresh_with_retries(SyncTrigger::Startup, &shutdown).await {
            Ok(()) | Err(SequenceFailure::Cancelled) => {}
            Err(SequenceFailure::Exhausted {
                attempts,
                source,
            }) => {
                return Err(ViewSyncError::StartupExhausted {
                    attempts,
                    source,
                });
            }
        }
        let task = tokio::spawn(self.run(shutdown));
        Ok(ViewSyncHandle {
            task,
        })
    }

    /// Refreshes once if a write is pending. Returns whether a refresh ran.
    ///
    /// On failure the flag is raised again so the next tick retries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the refresh fails.
    pub async fn refresh_if_dirty(&self) -> Result<bool, StoreError> {
        if !self.dirty.try_consume() {
            return Ok(false);
        }
        match self.refresh_once().await {
            Ok(()) => {
                self.record(SyncTrigger::Dirty, 1, SyncOutcome::Refreshed, None);
                Ok(true)
            }
            Err(err) => {
                self.dirty.mark_dirty();
                self.record(SyncTrigger::Dirty, 1, SyncOutcome::Failed, Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Runs the timer loop until shutdown or a fatal scheduled failure.
    async fn run(self, shutdown: ShutdownSignal) -> Result<(), ViewSyncError> {
        let mut scheduled = ticker(self.config.scheduled_interval);
        let mut dirty_check = ticker(self.config.dirty_check_interval);
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => return Ok(()),
                _ = scheduled.tick() => {
                    match self.refresh_with_retries(SyncTrigger::Scheduled, &shutdown).await {
                        Ok(()) => {}
                        Err(SequenceFailure::Cancelled) => return Ok(()),
                        Err(SequenceFailure::Exhausted { attempts, source }) => {
                            return Err(ViewSyncError::ScheduledExhausted { attempts, source });
                        }
                    }
                }
                _ = dirty_check.tick() => {
                    // Failures are recorded and left for the next tick.
                    let _ = self.refresh_if_dirty().await;
                }
            }
        }
    }

    /// Refreshes with bounded retry, observing shutdown during each backoff pause.
    async fn refresh_with_retries(
        &self,
        trigger: SyncTrigger,
        shutdown: &ShutdownSignal,
    ) -> Result<(), SequenceFailure> {
        let result = with_bounded_retries(
            self.config.retry,
            |attempt| async move {
                if shutdown.is_cancelled() {
                    return Err(AttemptError::Cancelled);
                }
                match self.refresh_once().await {
                    Ok(()) => {
                        self.record(trigger, attempt + 1, SyncOutcome::Refreshed, None);
                        Ok(())
                    }
                    Err(err) => {
                        self.record(trigger, attempt + 1, SyncOutcome::Failed, Some(err.to_string()));
                        Err(AttemptError::Store(err))
                    }
                }
            },
            |delay| async move {
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = shutdown.cancelled() => {}
                }
            },
        )
        .await;

        let Err(exhausted) = result else {
            return Ok(());
        };
        match exhausted.last_error {
            AttemptError::Store(source) if !shutdown.is_cancelled() => {
                self.record(
                    trigger,
                    exhausted.attempts,
                    SyncOutcome::Exhausted,
                    Some(source.to_string()),
                );
                Err(SequenceFailure::Exhausted {
                    attempts: exhausted.attempts,
                    source,
                })
            }
            AttemptError::Store(_) | AttemptError::Cancelled => {
                self.record(trigger, exhausted.attempts, SyncOutcome::Cancelled, None);
                Err(SequenceFailure::Cancelled)
            }
        }
    }

    /// Issues exactly one refresh call on the blocking pool.
    async fn refresh_once(&self) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.refresh_view())
            .await
            .map_err(|err| StoreError::Store(format!("view refresh task failed: {err}")))?
    }

    /// Records a refresh event.
    fn record(&self, trigger: SyncTrigger, attempt: u32, outcome: SyncOutcome, error: Option<String>) {
        self.events.record_sync(&ViewSyncEvent::new(trigger, attempt, outcome, error));
    }
}

/// Builds a timer whose first tick fires one period from now.
fn ticker(period: Duration) -> Interval {
    let period = period.max(MIN_TIMER_PERIOD);
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

// ============================================================================
// SECTION: Handle
// ============================================================================

/// Handle to the running background loop.
#[derive(Debug)]
pub struct ViewSyncHandle {
    /// Spawned loop task.
    task: JoinHandle<Result<(), ViewSyncError>>,
}

impl ViewSyncHandle {
    /// Returns true once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ViewSyncError`] when the loop ended on a fatal failure.
    pub async fn wait(self) -> Result<(), ViewSyncError> {
        self.task.await.map_err(|err| ViewSyncError::TaskFailed(err.to_string()))?
    }
}
