// crates/catalog-core/src/runtime/store.rs
// ============================================================================
// Module: Service Catalog In-Memory Store
// Description: Simple in-memory catalog store for tests and local runs.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`CatalogStore`]. The
//! projection is a snapshot copied from the service map on each refresh, so
//! reads against [`RecordSource::SortedView`] are stale until the next refresh
//! exactly like a database-backed projection. Refresh failures can be
//! injected for tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::NameFilter;
use crate::core::RecordSource;
use crate::core::ScanWindow;
use crate::core::Service;
use crate::core::ServiceId;
use crate::core::ServiceVersion;
use crate::core::VersionTag;
use crate::core::unix_millis;
use crate::interfaces::CatalogStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable state behind the store mutex.
#[derive(Debug, Default)]
struct MemoryState {
    /// Last assigned service identifier.
    last_id: u64,
    /// Services keyed by identifier (creation order).
    services: BTreeMap<ServiceId, Service>,
    /// Versions in creation order.
    versions: Vec<ServiceVersion>,
    /// Projection snapshot sorted by name.
    view: Vec<Service>,
    /// Successful refreshes so far.
    refreshes: u64,
    /// Refresh calls left to fail.
    failures_pending: u32,
}

/// In-memory catalog store for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogStore {
    /// Catalog state protected by a mutex.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryCatalogStore {
    /// Creates an empty store with an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many refreshes have succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn refresh_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.refreshes)
    }

    /// Makes the next `count` refresh calls fail.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn inject_refresh_failures(&self, count: u32) -> Result<(), StoreError> {
        self.lock()?.failures_pending = count;
        Ok(())
    }

    /// Locks the state.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("catalog store mutex poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn refresh_view(&self) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if guard.failures_pending > 0 {
            guard.failures_pending -= 1;
            return Err(StoreError::Store("injected refresh failure".to_string()));
        }
        let mut view: Vec<Service> = guard.services.values().cloned().collect();
        view.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        guard.view = view;
        guard.refreshes += 1;
        drop(guard);
        Ok(())
    }

    fn count_services(&self, filter: &NameFilter, source: RecordSource) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count = match source {
            RecordSource::Table => {
                guard.services.values().filter(|service| filter.matches(&service.name)).count()
            }
            RecordSource::SortedView => {
                guard.view.iter().filter(|service| filter.matches(&service.name)).count()
            }
        };
        drop(guard);
        Ok(to_u64(count))
    }

    fn scan_services(
        &self,
        filter: &NameFilter,
        source: RecordSource,
        window: ScanWindow,
    ) -> Result<Vec<Service>, StoreError> {
        let guard = self.lock()?;
        let rows: Vec<Service> = match source {
            RecordSource::Table => windowed(
                guard.services.values().filter(|service| filter.matches(&service.name)),
                window,
            ),
            RecordSource::SortedView => {
                windowed(guard.view.iter().filter(|service| filter.matches(&service.name)), window)
            }
        };
        drop(guard);
        Ok(rows)
    }

    fn get_service(&self, id: ServiceId) -> Result<Option<Service>, StoreError> {
        Ok(self.lock()?.services.get(&id).cloned())
    }

    fn count_services_named(
        &self,
        name: &str,
        excluding: Option<ServiceId>,
    ) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count = guard
            .services
            .values()
            .filter(|service| service.name == name && Some(service.id) != excluding)
            .count();
        drop(guard);
        Ok(to_u64(count))
    }

    fn insert_service(&self, name: &str, description: &str) -> Result<Service, StoreError> {
        let mut guard = self.lock()?;
        if guard.services.values().any(|service| service.name == name) {
            return Err(StoreError::Conflict(format!("service name {name} already exists")));
        }
        guard.last_id += 1;
        let now = unix_millis();
        let service = Service {
            id: ServiceId::new(guard.last_id),
            name: name.to_string(),
            description: description.to_string(),
            version_count: 0,
            created_at_ms: now,
            updated_at_ms: now,
        };
        guard.services.insert(service.id, service.clone());
        drop(guard);
        Ok(service)
    }

    fn update_service(
        &self,
        id: ServiceId,
        name: &str,
        description: &str,
    ) -> Result<Option<Service>, StoreError> {
        let mut guard = self.lock()?;
        if guard.services.values().any(|service| service.name == name && service.id != id) {
            return Err(StoreError::Conflict(format!("service name {name} already exists")));
        }
        let Some(service) = guard.services.get_mut(&id) else {
            return Ok(None);
        };
        service.name = name.to_string();
        service.description = description.to_string();
        service.updated_at_ms = unix_millis();
        let updated = service.clone();
        drop(guard);
        Ok(Some(updated))
    }

    fn delete_service(&self, id: ServiceId) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        if guard.services.remove(&id).is_none() {
            return Ok(false);
        }
        guard.versions.retain(|version| version.service_id != id);
        drop(guard);
        Ok(true)
    }

    fn get_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
    ) -> Result<Option<ServiceVersion>, StoreError> {
        let guard = self.lock()?;
        let version = guard
            .versions
            .iter()
            .find(|version| version.service_id == service_id && version.tag == *tag)
            .cloned();
        drop(guard);
        Ok(version)
    }

    fn insert_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<ServiceVersion, StoreError> {
        let mut guard = self.lock()?;
        if !guard.services.contains_key(&service_id) {
            return Err(StoreError::Invalid(format!("service {service_id} does not exist")));
        }
        if guard.versions.iter().any(|version| version.service_id == service_id && version.tag == *tag) {
            return Err(StoreError::Conflict(format!(
                "version {tag} already exists for service {service_id}"
            )));
        }
        let now = unix_millis();
        let version = ServiceVersion {
            service_id,
            tag: tag.clone(),
            info: info.to_string(),
            created_at_ms: now,
            updated_at_ms: now,
        };
        guard.versions.push(version.clone());
        if let Some(service) = guard.services.get_mut(&service_id) {
            service.version_count += 1;
            service.updated_at_ms = now;
        }
        drop(guard);
        Ok(version)
    }

    fn update_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<Option<ServiceVersion>, StoreError> {
        let mut guard = self.lock()?;
        let Some(version) = guard
            .versions
            .iter_mut()
            .find(|version| version.service_id == service_id && version.tag == *tag)
        else {
            return Ok(None);
        };
        version.info = info.to_string();
        version.updated_at_ms = unix_millis();
        let updated = version.clone();
        drop(guard);
        Ok(Some(updated))
    }

    fn delete_version(&self, service_id: ServiceId, tag: &VersionTag) -> Result<bool, StoreError> {
        let mut guard = self.lock()?;
        let before = guard.versions.len();
        guard.versions.retain(|version| !(version.service_id == service_id && version.tag == *tag));
        if guard.versions.len() == before {
            return Ok(false);
        }
        if let Some(service) = guard.services.get_mut(&service_id) {
            service.version_count = service.version_count.saturating_sub(1);
            service.updated_at_ms = unix_millis();
        }
        drop(guard);
        Ok(true)
    }

    fn count_versions(&self, service_id: ServiceId) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count = guard.versions.iter().filter(|version| version.service_id == service_id).count();
        drop(guard);
        Ok(to_u64(count))
    }

    fn scan_versions(
        &self,
        service_id: ServiceId,
        window: ScanWindow,
    ) -> Result<Vec<ServiceVersion>, StoreError> {
        let guard = self.lock()?;
        let rows =
            windowed(guard.versions.iter().filter(|version| version.service_id == service_id), window);
        drop(guard);
        Ok(rows)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies an offset/limit window to an ordered iterator.
fn windowed<'a, T, I>(rows: I, window: ScanWindow) -> Vec<T>
where
    T: Clone + 'a,
    I: Iterator<Item = &'a T>,
{
    let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
    rows.skip(offset).take(limit).cloned().collect()
}

/// Converts a collection length to the store's count type.
fn to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    fn seed(store: &InMemoryCatalogStore, names: &[&str]) {
        for name in names {
            store.insert_service(name, "").unwrap();
        }
    }

    #[test]
    fn projection_is_stale_until_refresh() {
        let store = InMemoryCatalogStore::new();
        seed(&store, &["beta", "alpha"]);
        assert_eq!(store.count_services(&NameFilter::any(), RecordSource::SortedView).unwrap(), 0);

        store.refresh_view().unwrap();
        let window = ScanWindow {
            offset: 0,
            limit: 10,
        };
        let names: Vec<String> = store
            .scan_services(&NameFilter::any(), RecordSource::SortedView, window)
            .unwrap()
            .into_iter()
            .map(|service| service.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(store.refresh_count().unwrap(), 1);
    }

    #[test]
    fn injected_failures_are_consumed_in_order() {
        let store = InMemoryCatalogStore::new();
        store.inject_refresh_failures(2).unwrap();
        assert!(store.refresh_view().is_err());
        assert!(store.refresh_view().is_err());
        assert!(store.refresh_view().is_ok());
        assert_eq!(store.refresh_count().unwrap(), 1);
    }

    #[test]
    fn version_count_tracks_inserts_and_deletes() {
        let store = InMemoryCatalogStore::new();
        let service = store.insert_service("svc", "").unwrap();
        let tag = VersionTag::new("v1");
        store.insert_version(service.id, &tag, "first").unwrap();
        assert!(matches!(
            store.insert_version(service.id, &tag, "again"),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.get_service(service.id).unwrap().unwrap().version_count, 1);
        assert!(store.delete_version(service.id, &tag).unwrap());
        assert_eq!(store.get_service(service.id).unwrap().unwrap().version_count, 0);
    }
}
