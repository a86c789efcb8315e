// crates/catalog-config/src/lib.rs
// ============================================================================
// Module: Service Catalog Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for service-catalog.toml semantics.
// Dependencies: catalog-core, catalog-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `catalog-config` defines the configuration model for the service catalog
//! and validates it strictly and fail-closed before any component starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
