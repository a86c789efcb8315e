// crates/catalog-core/src/runtime/dirty.rs
// ============================================================================
// Module: Projection Dirty Flag
// Description: Mutex-guarded "a refresh is owed" flag.
// Purpose: Collapse any number of writes into a single pending refresh.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Writers call [`DirtyFlag::mark_dirty`] after a successful mutation. The view
//! sync engine is the only caller of [`DirtyFlag::try_consume`]. The flag is a
//! boolean, not a counter: N writes before a tick owe exactly one refresh.
//! Lock scope never spans I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

// ============================================================================
// SECTION: Dirty Flag
// ============================================================================

/// Shared flag recording that the projection lags the service table.
#[derive(Debug, Default)]
pub struct DirtyFlag {
    /// Pending refresh marker.
    pending: Mutex<bool>,
}

impl DirtyFlag {
    /// Creates a clean flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a refresh is owed.
    pub fn mark_dirty(&self) {
        *self.lock() = true;
    }

    /// Returns true when a refresh is owed.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        *self.lock()
    }

    /// Clears the flag, returning whether a refresh was owed.
    ///
    /// Callers that fail to refresh must call [`Self::mark_dirty`] again.
    #[must_use]
    pub fn try_consume(&self) -> bool {
        std::mem::replace(&mut *self.lock(), false)
    }

    /// Locks the flag; a poisoned lock still holds a valid boolean.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
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

    use std::sync::Arc;

    use super::*;

    #[test]
    fn consume_clears_and_reports_once() {
        let flag = DirtyFlag::new();
        assert!(!flag.try_consume());
        flag.mark_dirty();
        flag.mark_dirty();
        assert!(flag.is_dirty());
        assert!(flag.try_consume());
        assert!(!flag.try_consume());
        assert!(!flag.is_dirty());
    }

    #[test]
    fn concurrent_marks_collapse_into_one_consume() {
        let flag = Arc::new(DirtyFlag::new());
        let writers: Vec<_> = (0 .. 16)
            .map(|_| {
                let flag = Arc::clone(&flag);
                std::thread::spawn(move || flag.mark_dirty())
            })
            .collect();
        for writer in writers {
            assert!(writer.join().is_ok());
        }
        assert!(flag.try_consume());
        assert!(!flag.try_consume());
    }
}
