// crates/catalog-cli/src/runtime.rs
// ============================================================================
// Module: Service Catalog Runtime Wiring
// Description: Owns the store, dirty flag, event sink, and view sync engine.
// Purpose: Start the engine, act on its fatal result, and serve one-shot commands.
// Dependencies: catalog-config, catalog-core, catalog-store-sqlite, thiserror, tokio
// ============================================================================

//! ## Overview
//! A [`CatalogRuntime`] is the single owner of the shared dirty flag. Catalog
//! operations and the view sync engine it hands out share that flag, so
//! writes made through [`CatalogRuntime::operations`] are picked up by the
//! engine started in [`CatalogRuntime::serve`].
//!
//! `serve` returns the engine's fatal result instead of exiting; the binary
//! turns it into a non-zero exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use catalog_config::CatalogConfig;
use catalog_config::LogSinkType;
use catalog_core::CatalogEventSink;
use catalog_core::CatalogOperations;
use catalog_core::CatalogStore;
use catalog_core::DirtyFlag;
use catalog_core::FileCatalogEventSink;
use catalog_core::InMemoryCatalogStore;
use catalog_core::NoopCatalogEventSink;
use catalog_core::StderrCatalogEventSink;
use catalog_core::ViewSyncEngine;
use catalog_core::ViewSyncError;
use catalog_core::shutdown_channel;
use catalog_store_sqlite::SqliteCatalogStore;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Runtime wiring errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The store could not be opened.
    #[error("store init failed: {0}")]
    Store(String),
    /// The event sink could not be opened.
    #[error("event sink init failed: {0}")]
    Sink(String),
    /// The projection could not be refreshed after a write.
    #[error("view refresh failed: {0}")]
    Flush(String),
    /// The view sync engine ended on a fatal failure.
    #[error(transparent)]
    Sync(#[from] ViewSyncError),
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Catalog state owned by one process.
#[derive(Clone)]
pub struct CatalogRuntime {
    /// Validated configuration.
    config: CatalogConfig,
    /// Storage gateway.
    store: Arc<dyn CatalogStore>,
    /// Flag shared by operations and the engine.
    dirty: Arc<DirtyFlag>,
    /// Event sink shared by operations and the engine.
    events: Arc<dyn CatalogEventSink>,
}

impl CatalogRuntime {
    /// Opens the configured store and event sink.
    ///
    /// Opening `SQLite` blocks; call this from a blocking context.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the store or sink cannot be opened.
    pub fn from_config(config: CatalogConfig) -> Result<Self, RuntimeError> {
        let store: Arc<dyn CatalogStore> = match config.store.sqlite_config() {
            Some(sqlite) => Arc::new(
                SqliteCatalogStore::new(sqlite).map_err(|err| RuntimeError::Store(err.to_string()))?,
            ),
            None => Arc::new(InMemoryCatalogStore::new()),
        };
        let events = build_event_sink(&config)?;
        Ok(Self::with_parts(config, store, events))
    }

    /// Assembles a runtime from existing parts.
    #[must_use]
    pub fn with_parts(
        config: CatalogConfig,
        store: Arc<dyn CatalogStore>,
        events: Arc<dyn CatalogEventSink>,
    ) -> Self {
        Self {
            config,
            store,
            dirty: Arc::new(DirtyFlag::new()),
            events,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns catalog operations bound to this runtime's dirty flag.
    #[must_use]
    pub fn operations(&self) -> CatalogOperations {
        CatalogOperations::new(
            Arc::clone(&self.store),
            Arc::clone(&self.dirty),
            Arc::clone(&self.events),
        )
    }

    /// Returns a view sync engine bound to this runtime's dirty flag.
    #[must_use]
    pub fn engine(&self) -> ViewSyncEngine {
        ViewSyncEngine::new(
            self.config.sync.engine_config(),
            Arc::clone(&self.store),
            Arc::clone(&self.dirty),
            Arc::clone(&self.events),
        )
    }

    /// Refreshes the projection once if a write is pending. Returns whether
    /// a refresh ran.
    ///
    /// Only for one-shot processes with no engine running from
    /// [`Self::serve`]; otherwise two refreshes could overlap.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Flush`] when the refresh fails.
    pub async fn flush(&self) -> Result<bool, RuntimeError> {
        self.engine().refresh_if_dirty().await.map_err(|err| RuntimeError::Flush(err.to_string()))
    }

    /// Runs the view sync engine until `stop` resolves or the engine fails.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Sync`] when startup reconciliation or a
    /// scheduled refresh exhausts its retries.
    pub async fn serve<F>(&self, stop: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()>,
    {
        let (trigger, shutdown) = shutdown_channel();
        let handle = self.engine().start(shutdown).await?;
        let finished = handle.wait();
        tokio::pin!(finished);
        tokio::pin!(stop);
        tokio::select! {
            result = &mut finished => return result.map_err(RuntimeError::from),
            () = &mut stop => {}
        }
        trigger.trigger();
        finished.await.map_err(RuntimeError::from)
    }
}

/// Builds the configured event sink.
fn build_event_sink(config: &CatalogConfig) -> Result<Arc<dyn CatalogEventSink>, RuntimeError> {
    match (config.logging.sink, &config.logging.path) {
        (LogSinkType::File, Some(path)) => {
            let sink =
                FileCatalogEventSink::new(path).map_err(|err| RuntimeError::Sink(err.to_string()))?;
            Ok(Arc::new(sink))
        }
        (LogSinkType::File, None) => {
            Err(RuntimeError::Sink("file sink requires a path".to_string()))
        }
        (LogSinkType::Stderr, _) => Ok(Arc::new(StderrCatalogEventSink)),
        (LogSinkType::None, _) => Ok(Arc::new(NoopCatalogEventSink)),
    }
}
