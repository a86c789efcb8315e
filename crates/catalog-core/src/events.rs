// crates/catalog-core/src/events.rs
// ============================================================================
// Module: Service Catalog Events
// Description: Structured events for view sync and storage failures.
// Purpose: Emit JSON-line logs without hard dependencies on a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines event payloads and sinks for the view sync engine and
//! catalog operations. Sinks are lightweight so deployments can route events
//! to their preferred logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::unix_millis;

// ============================================================================
// SECTION: Types
// ============================================================================

/// What caused a projection refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    /// Blocking reconciliation before the engine starts.
    Startup,
    /// Unconditional refresh on the scheduled timer.
    Scheduled,
    /// Refresh owed by a pending dirty flag.
    Dirty,
}

/// Result of a single refresh attempt or retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// The projection was refreshed.
    Refreshed,
    /// The attempt failed; another attempt or tick follows.
    Failed,
    /// Every attempt of a bounded retry sequence failed.
    Exhausted,
    /// Shutdown was observed before the sequence completed.
    Cancelled,
}

/// View sync event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewSyncEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Refresh trigger.
    pub trigger: SyncTrigger,
    /// 1-based attempt number within the trigger's sequence.
    pub attempt: u32,
    /// Attempt outcome.
    pub outcome: SyncOutcome,
    /// Store error text when the attempt failed.
    pub error: Option<String>,
}

impl ViewSyncEvent {
    /// Creates a new view sync event with the current timestamp.
    #[must_use]
    pub fn new(trigger: SyncTrigger, attempt: u32, outcome: SyncOutcome, error: Option<String>) -> Self {
        Self {
            event: "view_sync",
            timestamp_ms: unix_millis(),
            trigger,
            attempt,
            outcome,
            error,
        }
    }
}

/// Storage failure observed by a catalog operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreFailureEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Catalog operation that hit the failure.
    pub operation: &'static str,
    /// Store error text.
    pub error: String,
}

impl StoreFailureEvent {
    /// Creates a new storage failure event with the current timestamp.
    #[must_use]
    pub fn new(operation: &'static str, error: impl Into<String>) -> Self {
        Self {
            event: "store_failure",
            timestamp_ms: unix_millis(),
            operation,
            error: error.into(),
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Event sink for catalog runtime events.
pub trait CatalogEventSink: Send + Sync {
    /// Record a view sync event.
    fn record_sync(&self, event: &ViewSyncEvent);

    /// Record a storage failure event.
    fn record_store_failure(&self, _event: &StoreFailureEvent) {}
}

/// Event sink that logs JSON lines to stderr.
pub struct StderrCatalogEventSink;

impl CatalogEventSink for StderrCatalogEventSink {
    fn record_sync(&self, event: &ViewSyncEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_store_failure(&self, event: &StoreFailureEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Event sink that logs JSON lines to a file.
pub struct FileCatalogEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileCatalogEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized payload as a line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl CatalogEventSink for FileCatalogEventSink {
    fn record_sync(&self, event: &ViewSyncEvent) {
        self.append(event);
    }

    fn record_store_failure(&self, event: &StoreFailureEvent) {
        self.append(event);
    }
}

/// No-op event sink.
pub struct NoopCatalogEventSink;

impl CatalogEventSink for NoopCatalogEventSink {
    fn record_sync(&self, _event: &ViewSyncEvent) {}

    fn record_store_failure(&self, _event: &StoreFailureEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("events.jsonl");
        let sink = FileCatalogEventSink::new(&path).expect("open sink");
        sink.record_sync(&ViewSyncEvent::new(SyncTrigger::Dirty, 1, SyncOutcome::Refreshed, None));
        sink.record_store_failure(&StoreFailureEvent::new("fetch_services", "db down"));

        let text = std::fs::read_to_string(&path).expect("read log");
        let lines: Vec<serde_json::Value> =
            text.lines().map(|line| serde_json::from_str(line).expect("json line")).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "view_sync");
        assert_eq!(lines[0]["trigger"], "dirty");
        assert_eq!(lines[0]["outcome"], "refreshed");
        assert_eq!(lines[1]["event"], "store_failure");
        assert_eq!(lines[1]["operation"], "fetch_services");
    }
}
