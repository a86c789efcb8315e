// crates/catalog-core/src/core/mod.rs
// ============================================================================
// Module: Service Catalog Core Types
// Description: Canonical catalog records, identifiers, and query shapes.
// Purpose: Provide stable, serializable types shared by stores and operations.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types describe catalog services, their versions, and the query shapes
//! (sources, filters, scan windows, pages) exchanged with a [`crate::CatalogStore`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod identifiers;
pub mod query;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Service;
pub use catalog::ServicePage;
pub use catalog::ServiceVersion;
pub use catalog::VersionPage;
pub use identifiers::ServiceId;
pub use identifiers::VersionTag;
pub use query::NameFilter;
pub use query::RecordSource;
pub use query::ScanWindow;
pub use query::SortKey;
pub use time::unix_millis;
