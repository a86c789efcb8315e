// crates/catalog-store-sqlite/src/lib.rs
// ============================================================================
// Module: Service Catalog SQLite Store
// Description: SQLite-backed catalog store with a refreshable sorted projection.
// Purpose: Provide durable storage for services, versions, and the name-sorted view.
// Dependencies: catalog-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate provides a `SQLite` implementation of
//! [`catalog_core::CatalogStore`]. The name-sorted projection is a plain table
//! rebuilt in one transaction by [`SqliteCatalogStore::refresh_view`], so it
//! lags the service table until the view sync engine refreshes it.

pub mod store;

pub use store::SqliteCatalogStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
