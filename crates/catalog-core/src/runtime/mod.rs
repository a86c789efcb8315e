// crates/catalog-core/src/runtime/mod.rs
// ============================================================================
// Module: Service Catalog Runtime
// Description: View sync engine, pagination, and catalog operations.
// Purpose: Serve catalog reads and writes while the projection converges in the background.
// Dependencies: crate::{core, events, interfaces}, tokio
// ============================================================================

//! ## Overview
//! Runtime modules implement the catalog's write path, the paginated read
//! path, and the background engine that keeps the name-sorted projection
//! eventually consistent. Writers and the engine share one [`DirtyFlag`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod dirty;
pub mod operations;
pub mod pagination;
pub mod retry;
pub mod shutdown;
pub mod store;
pub mod sync;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dirty::DirtyFlag;
pub use operations::CatalogError;
pub use operations::CatalogOperations;
pub use operations::FetchServicesRequest;
pub use pagination::PageRequest;
pub use pagination::PageWindow;
pub use pagination::compute_window;
pub use pagination::reverse_in_place;
pub use retry::RetryExhausted;
pub use retry::RetryPolicy;
pub use retry::with_bounded_retries;
pub use shutdown::ShutdownSignal;
pub use shutdown::ShutdownTrigger;
pub use shutdown::shutdown_channel;
pub use store::InMemoryCatalogStore;
pub use sync::ViewSyncConfig;
pub use sync::ViewSyncEngine;
pub use sync::ViewSyncError;
pub use sync::ViewSyncHandle;
