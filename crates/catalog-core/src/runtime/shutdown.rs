// crates/catalog-core/src/runtime/shutdown.rs
// ============================================================================
// Module: Shutdown Signal
// Description: One-shot, cloneable cancellation signal for background tasks.
// Purpose: Let the view sync engine observe shutdown in the same wait-set as its timers.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! [`shutdown_channel`] links one [`ShutdownTrigger`] to any number of cloned
//! [`ShutdownSignal`]s. A signal can be polled with
//! [`ShutdownSignal::is_cancelled`] or awaited inside a `select!` next to
//! timers. Dropping the trigger counts as shutdown.

use tokio::sync::watch;

/// Creates a linked shutdown trigger and signal.
#[must_use]
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        ShutdownTrigger {
            sender,
        },
        ShutdownSignal {
            receiver,
        },
    )
}

/// Raises shutdown. Dropping the trigger also raises it.
#[derive(Debug)]
pub struct ShutdownTrigger {
    /// Watch sender carrying the cancelled state.
    sender: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Raises shutdown for every linked signal.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

/// Observes shutdown raised by a [`ShutdownTrigger`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    /// Watch receiver carrying the cancelled state.
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Returns true once shutdown has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    /// Resolves once shutdown has been raised.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[tokio::test]
    async fn trigger_and_drop_both_cancel() {
        let (trigger, signal) = shutdown_channel();
        assert!(!signal.is_cancelled());
        trigger.trigger();
        assert!(signal.is_cancelled());
        signal.cancelled().await;

        let (trigger, signal) = shutdown_channel();
        drop(trigger);
        assert!(signal.is_cancelled());
        signal.cancelled().await;
    }
}
