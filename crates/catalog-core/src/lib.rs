// crates/catalog-core/src/lib.rs
// ============================================================================
// Module: Service Catalog Core Library
// Description: Public API surface for the service catalog core.
// Purpose: Expose catalog types, the storage gateway interface, and runtime helpers.
// Dependencies: crate::{core, events, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The service catalog core keeps a name-sorted read projection of the catalog
//! eventually consistent with the source-of-truth table and serves paginated
//! reads, including inverted (newest-first) paging, over either source. It is
//! storage-agnostic and integrates through the [`CatalogStore`] interface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod events;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use events::CatalogEventSink;
pub use events::FileCatalogEventSink;
pub use events::NoopCatalogEventSink;
pub use events::StderrCatalogEventSink;
pub use events::StoreFailureEvent;
pub use events::SyncOutcome;
pub use events::SyncTrigger;
pub use events::ViewSyncEvent;
pub use interfaces::CatalogStore;
pub use interfaces::StoreError;
pub use runtime::CatalogError;
pub use runtime::CatalogOperations;
pub use runtime::DirtyFlag;
pub use runtime::FetchServicesRequest;
pub use runtime::InMemoryCatalogStore;
pub use runtime::PageRequest;
pub use runtime::PageWindow;
pub use runtime::RetryExhausted;
pub use runtime::RetryPolicy;
pub use runtime::ShutdownSignal;
pub use runtime::ShutdownTrigger;
pub use runtime::ViewSyncConfig;
pub use runtime::ViewSyncEngine;
pub use runtime::ViewSyncError;
pub use runtime::ViewSyncHandle;
pub use runtime::compute_window;
pub use runtime::reverse_in_place;
pub use runtime::shutdown_channel;
pub use runtime::with_bounded_retries;
