// crates/catalog-core/src/interfaces/mod.rs
// ============================================================================
// Module: Service Catalog Interfaces
// Description: Storage gateway contract consumed by the catalog runtime.
// Purpose: Keep the sync engine and catalog operations storage-agnostic.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`CatalogStore`] is the storage gateway: record CRUD, conditional counts,
//! ordered LIMIT/OFFSET scans, and the projection refresh primitive. Every
//! call is transactional on its own; the runtime never spans a transaction
//! across calls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::NameFilter;
use crate::core::RecordSource;
use crate::core::ScanWindow;
use crate::core::Service;
use crate::core::ServiceId;
use crate::core::ServiceVersion;
use crate::core::VersionTag;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("catalog store io error: {0}")]
    Io(String),
    /// Store data is corrupted.
    #[error("catalog store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("catalog store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data or request is invalid.
    #[error("catalog store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint rejected the write.
    #[error("catalog store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("catalog store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Storage Gateway
// ============================================================================

/// Storage gateway for catalog records and the name-sorted projection.
pub trait CatalogStore: Send + Sync {
    /// Rebuilds the name-sorted projection from the service table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the refresh statement fails.
    fn refresh_view(&self) -> Result<(), StoreError>;

    /// Counts services matching `filter` in `source`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the count fails.
    fn count_services(&self, filter: &NameFilter, source: RecordSource) -> Result<u64, StoreError>;

    /// Returns services matching `filter` from `source` in the source's
    /// ascending order, restricted to `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the scan fails.
    fn scan_services(
        &self,
        filter: &NameFilter,
        source: RecordSource,
        window: ScanWindow,
    ) -> Result<Vec<Service>, StoreError>;

    /// Loads a service by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_service(&self, id: ServiceId) -> Result<Option<Service>, StoreError>;

    /// Counts services named `name`, optionally ignoring one identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the count fails.
    fn count_services_named(
        &self,
        name: &str,
        excluding: Option<ServiceId>,
    ) -> Result<u64, StoreError>;

    /// Inserts a new service with a zero version count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the name is taken.
    fn insert_service(&self, name: &str, description: &str) -> Result<Service, StoreError>;

    /// Updates name and description of a service. Returns `None` when the
    /// service does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the new name is taken.
    fn update_service(
        &self,
        id: ServiceId,
        name: &str,
        description: &str,
    ) -> Result<Option<Service>, StoreError>;

    /// Deletes a service and all of its versions. Returns `false` when the
    /// service does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_service(&self, id: ServiceId) -> Result<bool, StoreError>;

    /// Loads a version by service and tag.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
    ) -> Result<Option<ServiceVersion>, StoreError>;

    /// Inserts a version and increments the owning service's version count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the tag already exists for the
    /// service and [`StoreError::Invalid`] when the service does not exist.
    fn insert_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<ServiceVersion, StoreError>;

    /// Updates version info. Returns `None` when the version does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<Option<ServiceVersion>, StoreError>;

    /// Deletes a version and decrements the owning service's version count.
    /// Returns `false` when the version does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_version(&self, service_id: ServiceId, tag: &VersionTag) -> Result<bool, StoreError>;

    /// Counts versions registered for a service.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the count fails.
    fn count_versions(&self, service_id: ServiceId) -> Result<u64, StoreError>;

    /// Returns versions of a service in creation order, restricted to `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the scan fails.
    fn scan_versions(
        &self,
        service_id: ServiceId,
        window: ScanWindow,
    ) -> Result<Vec<ServiceVersion>, StoreError>;
}
