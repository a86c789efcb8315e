// crates/catalog-core/src/core/catalog.rs
// ============================================================================
// Module: Service Catalog Records
// Description: Service and version records plus paginated result envelopes.
// Purpose: Canonical shapes returned by stores and catalog operations.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Service`] is the source-of-truth catalog row. Its `version_count` is a
//! derived counter maintained by the store in the same transaction that adds
//! or removes a [`ServiceVersion`], so listings never need a join.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ServiceId;
use crate::core::identifiers::VersionTag;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Catalog service record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Store-assigned identifier.
    pub id: ServiceId,
    /// Service name, unique across the catalog.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Number of versions registered for the service.
    pub version_count: u64,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Last update time (unix milliseconds).
    pub updated_at_ms: i64,
}

/// Version record attached to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceVersion {
    /// Owning service.
    pub service_id: ServiceId,
    /// Version tag, unique per service.
    pub tag: VersionTag,
    /// Free-form release information.
    pub info: String,
    /// Creation time (unix milliseconds).
    pub created_at_ms: i64,
    /// Last update time (unix milliseconds).
    pub updated_at_ms: i64,
}

// ============================================================================
// SECTION: Pages
// ============================================================================

/// One page of services with the pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePage {
    /// Services in presentation order.
    pub data: Vec<Service>,
    /// Total rows matching the filter in the queried source.
    pub total_items: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Normalized 1-based page number.
    pub current_page: u64,
}

/// One page of versions with the pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPage {
    /// Versions in presentation order (newest first).
    pub data: Vec<ServiceVersion>,
    /// Total versions registered for the service.
    pub total_items: u64,
    /// Requested page size.
    pub page_size: u64,
    /// Normalized 1-based page number.
    pub current_page: u64,
}
