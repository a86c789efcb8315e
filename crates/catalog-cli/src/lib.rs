// crates/catalog-cli/src/lib.rs
// ============================================================================
// Module: Service Catalog CLI Library
// Description: Process wiring shared by the service-catalog binary and tests.
// Purpose: Build the store, event sink, operations, and engine from configuration.
// Dependencies: catalog-config, catalog-core, catalog-store-sqlite, thiserror, tokio
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and renders output;
//! everything that owns catalog state lives here so it can be exercised
//! without spawning a process.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use runtime::CatalogRuntime;
pub use runtime::RuntimeError;
