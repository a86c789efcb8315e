// crates/catalog-core/src/runtime/operations.rs
// ============================================================================
// Module: Catalog Operations
// Description: Create/update/delete/list operations over services and versions.
// Purpose: Enforce catalog rules, raise the dirty flag, and paginate listings.
// Dependencies: crate::{core, events, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Catalog operations are the only writers of the service table. Every
//! successful mutation that changes a projected column raises the shared
//! [`DirtyFlag`]; the view sync engine picks it up on its next tick.
//!
//! Existence and uniqueness are pre-checked with counts so the common case
//! returns a precise error without relying on constraint text; a concurrent
//! writer that slips past the pre-check still surfaces as a store conflict,
//! which maps to the same error. Storage failures are recorded on the event
//! sink and returned as the opaque [`CatalogError::Internal`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::NameFilter;
use crate::core::Service;
use crate::core::ServiceId;
use crate::core::ServicePage;
use crate::core::ServiceVersion;
use crate::core::SortKey;
use crate::core::VersionPage;
use crate::core::VersionTag;
use crate::events::CatalogEventSink;
use crate::events::StoreFailureEvent;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;
use crate::runtime::dirty::DirtyFlag;
use crate::runtime::pagination::PageRequest;
use crate::runtime::pagination::reverse_in_place;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Catalog operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Another service already uses the name.
    #[error("service {0} already exists")]
    ServiceAlreadyExists(String),
    /// No service has the identifier.
    #[error("service {0} does not exist")]
    ServiceNotFound(ServiceId),
    /// The service already has a version with the tag.
    #[error("version {tag} already exists for service {service_id}")]
    VersionAlreadyExists {
        /// Owning service.
        service_id: ServiceId,
        /// Duplicate tag.
        tag: VersionTag,
    },
    /// The service has no version with the tag.
    #[error("version {tag} does not exist for service {service_id}")]
    VersionNotFound {
        /// Owning service.
        service_id: ServiceId,
        /// Missing tag.
        tag: VersionTag,
    },
    /// The request failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Storage failed; details were recorded on the event sink.
    #[error("internal error")]
    Internal,
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Service listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchServicesRequest {
    /// Page selection and direction.
    pub page: PageRequest,
    /// Name substring filter.
    pub name_filter: NameFilter,
    /// Listing order; [`SortKey::Name`] reads the eventually consistent projection.
    pub sort: SortKey,
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Catalog operations over a storage gateway.
#[derive(Clone)]
pub struct CatalogOperations {
    /// Storage gateway.
    store: Arc<dyn CatalogStore>,
    /// Flag shared with the view sync engine.
    dirty: Arc<DirtyFlag>,
    /// Sink for storage failures.
    events: Arc<dyn CatalogEventSink>,
}

impl CatalogOperations {
    /// Creates catalog operations sharing `dirty` with the view sync engine.
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        dirty: Arc<DirtyFlag>,
        events: Arc<dyn CatalogEventSink>,
    ) -> Self {
        Self {
            store,
            dirty,
            events,
        }
    }

    /// Returns whether a service exists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Internal`] on storage failure.
    pub fn service_exists(&self, id: ServiceId) -> Result<bool, CatalogError> {
        self.store
            .get_service(id)
            .map(|service| service.is_some())
            .map_err(|err| self.internal("service_exists", &err))
    }

    /// Returns whether a service has a version with `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Internal`] on storage failure.
    pub fn version_exists(&self, service_id: ServiceId, tag: &VersionTag) -> Result<bool, CatalogError> {
        self.store
            .get_version(service_id, tag)
            .map(|version| version.is_some())
            .map_err(|err| self.internal("version_exists", &err))
    }

    /// Loads a service.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceNotFound`] when absent.
    pub fn get_service(&self, id: ServiceId) -> Result<Service, CatalogError> {
        self.store
            .get_service(id)
            .map_err(|err| self.internal("get_service", &err))?
            .ok_or(CatalogError::ServiceNotFound(id))
    }

    /// Registers a new service.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceAlreadyExists`] when the name is taken
    /// and [`CatalogError::InvalidInput`] when the name is empty.
    pub fn create_service(&self, name: &str, description: &str) -> Result<Service, CatalogError> {
        require_non_empty("service name", name)?;
        let same_name = self
            .store
            .count_services_named(name, None)
            .map_err(|err| self.internal("create_service", &err))?;
        if same_name > 0 {
            return Err(CatalogError::ServiceAlreadyExists(name.to_string()));
        }
        let service = self.store.insert_service(name, description).map_err(|err| match err {
            StoreError::Conflict(_) => CatalogError::ServiceAlreadyExists(name.to_string()),
            other => self.internal("create_service", &other),
        })?;
        self.dirty.mark_dirty();
        Ok(service)
    }

    /// Renames or re-describes an existing service.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceNotFound`] when absent and
    /// [`CatalogError::ServiceAlreadyExists`] when another service has the name.
    pub fn update_service(
        &self,
        id: ServiceId,
        name: &str,
        description: &str,
    ) -> Result<Service, CatalogError> {
        require_non_empty("service name", name)?;
        if !self.service_exists(id)? {
            return Err(CatalogError::ServiceNotFound(id));
        }
        let same_name = self
            .store
            .count_services_named(name, Some(id))
            .map_err(|err| self.internal("update_service", &err))?;
        if same_name > 0 {
            return Err(CatalogError::ServiceAlreadyExists(name.to_string()));
        }
        let updated = self
            .store
            .update_service(id, name, description)
            .map_err(|err| match err {
                StoreError::Conflict(_) => CatalogError::ServiceAlreadyExists(name.to_string()),
                other => self.internal("update_service", &other),
            })?
            .ok_or(CatalogError::ServiceNotFound(id))?;
        self.dirty.mark_dirty();
        Ok(updated)
    }

    /// Removes a service and its versions.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceNotFound`] when absent.
    pub fn delete_service(&self, id: ServiceId) -> Result<(), CatalogError> {
        if !self.service_exists(id)? {
            return Err(CatalogError::ServiceNotFound(id));
        }
        let deleted =
            self.store.delete_service(id).map_err(|err| self.internal("delete_service", &err))?;
        if !deleted {
            return Err(CatalogError::ServiceNotFound(id));
        }
        self.dirty.mark_dirty();
        Ok(())
    }

    /// Lists one page of services.
    ///
    /// Pages past the end return an empty `data` list with the real total.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Internal`] on storage failure.
    pub fn fetch_services(&self, request: &FetchServicesRequest) -> Result<ServicePage, CatalogError> {
        let source = request.sort.source();
        let total = self
            .store
            .count_services(&request.name_filter, source)
            .map_err(|err| self.internal("fetch_services", &err))?;
        let window = request.page.window(total);
        let mut data = if window.is_empty {
            Vec::new()
        } else {
            self.store
                .scan_services(&request.name_filter, source, window.scan_window())
                .map_err(|err| self.internal("fetch_services", &err))?
        };
        if window.needs_reverse {
            reverse_in_place(&mut data);
        }
        Ok(ServicePage {
            data,
            total_items: total,
            page_size: request.page.page_size,
            current_page: request.page.current_page,
        })
    }

    /// Loads a version.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::VersionNotFound`] when absent.
    pub fn get_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
    ) -> Result<ServiceVersion, CatalogError> {
        self.store
            .get_version(service_id, tag)
            .map_err(|err| self.internal("get_version", &err))?
            .ok_or_else(|| CatalogError::VersionNotFound {
                service_id,
                tag: tag.clone(),
            })
    }

    /// Registers a version and bumps the service's version count.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceNotFound`],
    /// [`CatalogError::VersionAlreadyExists`], or
    /// [`CatalogError::InvalidInput`] for an empty tag.
    pub fn create_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<ServiceVersion, CatalogError> {
        require_non_empty("version tag", tag.as_str())?;
        if !self.service_exists(service_id)? {
            return Err(CatalogError::ServiceNotFound(service_id));
        }
        if self.version_exists(service_id, tag)? {
            return Err(CatalogError::VersionAlreadyExists {
                service_id,
                tag: tag.clone(),
            });
        }
        let version = self.store.insert_version(service_id, tag, info).map_err(|err| match err {
            StoreError::Conflict(_) => CatalogError::VersionAlreadyExists {
                service_id,
                tag: tag.clone(),
            },
            StoreError::Invalid(_) => CatalogError::ServiceNotFound(service_id),
            other => self.internal("create_version", &other),
        })?;
        self.dirty.mark_dirty();
        Ok(version)
    }

    /// Replaces a version's info. The projection carries no version fields,
    /// so the dirty flag is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::VersionNotFound`] when absent.
    pub fn update_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<ServiceVersion, CatalogError> {
        let not_found = || CatalogError::VersionNotFound {
            service_id,
            tag: tag.clone(),
        };
        if !self.version_exists(service_id, tag)? {
            return Err(not_found());
        }
        self.store
            .update_version(service_id, tag, info)
            .map_err(|err| self.internal("update_version", &err))?
            .ok_or_else(not_found)
    }

    /// Removes a version and decrements the service's version count.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::VersionNotFound`] when absent.
    pub fn delete_version(&self, service_id: ServiceId, tag: &VersionTag) -> Result<(), CatalogError> {
        let not_found = || CatalogError::VersionNotFound {
            service_id,
            tag: tag.clone(),
        };
        if !self.version_exists(service_id, tag)? {
            return Err(not_found());
        }
        let deleted = self
            .store
            .delete_version(service_id, tag)
            .map_err(|err| self.internal("delete_version", &err))?;
        if !deleted {
            return Err(not_found());
        }
        self.dirty.mark_dirty();
        Ok(())
    }

    /// Lists a service's versions newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ServiceNotFound`] when the service is absent.
    pub fn fetch_versions_inverted(
        &self,
        service_id: ServiceId,
        current_page: u64,
        page_size: u64,
    ) -> Result<VersionPage, CatalogError> {
        if !self.service_exists(service_id)? {
            return Err(CatalogError::ServiceNotFound(service_id));
        }
        let page = PageRequest::new(current_page, page_size, true);
        let total = self
            .store
            .count_versions(service_id)
            .map_err(|err| self.internal("fetch_versions", &err))?;
        let window = page.window(total);
        let mut data = if window.is_empty {
            Vec::new()
        } else {
            self.store
                .scan_versions(service_id, window.scan_window())
                .map_err(|err| self.internal("fetch_versions", &err))?
        };
        if window.needs_reverse {
            reverse_in_place(&mut data);
        }
        Ok(VersionPage {
            data,
            total_items: total,
            page_size: page.page_size,
            current_page: page.current_page,
        })
    }

    /// Records a storage failure and returns the opaque internal error.
    fn internal(&self, operation: &'static str, err: &StoreError) -> CatalogError {
        self.events.record_store_failure(&StoreFailureEvent::new(operation, err.to_string()));
        CatalogError::Internal
    }
}

/// Rejects empty or whitespace-only identifiers.
fn require_non_empty(field: &str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::InvalidInput(format!("{field} is empty")));
    }
    Ok(())
}
