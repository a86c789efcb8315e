// crates/catalog-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Catalog Store Tests
// Description: Schema, projection, and write-path tests for the SQLite store.
// Purpose: Validate refresh atomicity, filtering, conflicts, and schema versioning.
// ============================================================================

//! ## Overview
//! Tests for `SQLite` store invariants:
//! - The projection only changes on refresh and is ordered by name
//! - Name filters are literal, case-sensitive substrings
//! - Unique keys surface as conflicts; version counts follow writes
//! - Schema version validation on reopen

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use catalog_core::CatalogStore;
use catalog_core::NameFilter;
use catalog_core::RecordSource;
use catalog_core::ScanWindow;
use catalog_core::ServiceId;
use catalog_core::StoreError;
use catalog_core::VersionTag;
use catalog_store_sqlite::SqliteCatalogStore;
use catalog_store_sqlite::SqliteStoreConfig;
use catalog_store_sqlite::SqliteStoreError;
use catalog_store_sqlite::SqliteStoreMode;
use catalog_store_sqlite::SqliteSyncMode;
use proptest::prelude::*;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn open(dir: &TempDir) -> SqliteCatalogStore {
    SqliteCatalogStore::new(SqliteStoreConfig::new(dir.path().join("catalog.db"))).unwrap()
}

fn all() -> ScanWindow {
    ScanWindow {
        offset: 0,
        limit: 1_000,
    }
}

fn scan_names(store: &SqliteCatalogStore, filter: &NameFilter, source: RecordSource) -> Vec<String> {
    store
        .scan_services(filter, source, all())
        .unwrap()
        .into_iter()
        .map(|service| service.name)
        .collect()
}

// ============================================================================
// SECTION: Projection
// ============================================================================

#[test]
fn projection_changes_only_on_refresh() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    for name in ["delta", "alpha", "charlie"] {
        store.insert_service(name, "").unwrap();
    }
    assert_eq!(store.count_services(&NameFilter::any(), RecordSource::SortedView).unwrap(), 0);
    assert_eq!(
        scan_names(&store, &NameFilter::any(), RecordSource::Table),
        vec!["delta", "alpha", "charlie"]
    );

    store.refresh_view().unwrap();
    assert_eq!(
        scan_names(&store, &NameFilter::any(), RecordSource::SortedView),
        vec!["alpha", "charlie", "delta"]
    );

    let bravo = store.insert_service("bravo", "").unwrap();
    store.delete_service(ServiceId::new(1)).unwrap();
    assert_eq!(
        scan_names(&store, &NameFilter::any(), RecordSource::SortedView),
        vec!["alpha", "charlie", "delta"]
    );

    store.refresh_view().unwrap();
    assert_eq!(
        scan_names(&store, &NameFilter::any(), RecordSource::SortedView),
        vec!["alpha", "bravo", "charlie"]
    );
    assert_eq!(store.get_service(bravo.id).unwrap().unwrap().name, "bravo");
}

#[test]
fn projection_window_follows_name_order() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    for name in ["e", "a", "d", "b", "c"] {
        store.insert_service(name, "").unwrap();
    }
    store.refresh_view().unwrap();
    let window = ScanWindow {
        offset: 1,
        limit: 2,
    };
    let names: Vec<String> = store
        .scan_services(&NameFilter::any(), RecordSource::SortedView, window)
        .unwrap()
        .into_iter()
        .map(|service| service.name)
        .collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn name_filter_is_a_literal_case_sensitive_substring() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    for name in ["orders-api", "Orders-ui", "100%-uptime", "inventory"] {
        store.insert_service(name, "").unwrap();
    }
    let orders = NameFilter::contains("orders");
    assert_eq!(scan_names(&store, &orders, RecordSource::Table), vec!["orders-api"]);
    assert_eq!(store.count_services(&orders, RecordSource::Table).unwrap(), 1);

    let percent = NameFilter::contains("%");
    assert_eq!(scan_names(&store, &percent, RecordSource::Table), vec!["100%-uptime"]);
    let underscore = NameFilter::contains("_");
    assert_eq!(store.count_services(&underscore, RecordSource::Table).unwrap(), 0);
}

// ============================================================================
// SECTION: Writes
// ============================================================================

#[test]
fn duplicate_names_conflict() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.insert_service("billing", "").unwrap();
    let other = store.insert_service("ledger", "").unwrap();

    assert!(matches!(store.insert_service("billing", ""), Err(StoreError::Conflict(_))));
    assert!(matches!(
        store.update_service(other.id, "billing", ""),
        Err(StoreError::Conflict(_))
    ));
    assert_eq!(store.count_services_named("billing", None).unwrap(), 1);
    assert_eq!(store.count_services_named("ledger", Some(other.id)).unwrap(), 0);
    assert!(store.update_service(ServiceId::new(42), "x", "").unwrap().is_none());
}

#[test]
fn versions_track_counts_and_cascade() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let service = store.insert_service("svc", "").unwrap();
    for tag in ["v1", "v2", "v3"] {
        store.insert_version(service.id, &VersionTag::new(tag), "").unwrap();
    }
    assert!(matches!(
        store.insert_version(service.id, &VersionTag::new("v1"), ""),
        Err(StoreError::Conflict(_))
    ));
    assert!(matches!(
        store.insert_version(ServiceId::new(99), &VersionTag::new("v1"), ""),
        Err(StoreError::Invalid(_))
    ));
    assert_eq!(store.get_service(service.id).unwrap().unwrap().version_count, 3);

    let updated = store.update_version(service.id, &VersionTag::new("v2"), "notes").unwrap().unwrap();
    assert_eq!(updated.info, "notes");
    assert!(store.delete_version(service.id, &VersionTag::new("v2")).unwrap());
    assert!(!store.delete_version(service.id, &VersionTag::new("v2")).unwrap());
    assert_eq!(store.get_service(service.id).unwrap().unwrap().version_count, 2);

    let window = ScanWindow {
        offset: 0,
        limit: 10,
    };
    let tags: Vec<String> = store
        .scan_versions(service.id, window)
        .unwrap()
        .into_iter()
        .map(|version| version.tag.as_str().to_string())
        .collect();
    assert_eq!(tags, vec!["v1", "v3"]);

    assert!(store.delete_service(service.id).unwrap());
    assert_eq!(store.count_versions(service.id).unwrap(), 0);
}

// ============================================================================
// SECTION: Schema
// ============================================================================

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        store.insert_service("persisted", "kept").unwrap();
        store.refresh_view().unwrap();
    }
    let store = open(&dir);
    assert_eq!(scan_names(&store, &NameFilter::any(), RecordSource::SortedView), vec!["persisted"]);
}

#[test]
fn unsupported_schema_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.db");
    drop(SqliteCatalogStore::new(SqliteStoreConfig::new(&path)).unwrap());
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99]).unwrap();
    drop(connection);

    let result = SqliteCatalogStore::new(SqliteStoreConfig::new(&path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn delete_journal_mode_is_accepted() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig {
        path: dir.path().join("nested").join("catalog.db"),
        busy_timeout_ms: 100,
        journal_mode: SqliteStoreMode::Delete,
        sync_mode: SqliteSyncMode::Normal,
    };
    let store = SqliteCatalogStore::new(config).unwrap();
    store.insert_service("svc", "").unwrap();
    assert!(dir.path().join("nested").join("catalog.db").exists());
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn refreshed_projection_is_sorted_by_name(names in prop::collection::btree_set("[a-z]{1,8}", 0 .. 24)) {
        let dir = TempDir::new().unwrap();
        let store = open(&dir);
        let mut inserted: Vec<String> = names.into_iter().collect();
        // Insert in reverse so creation order differs from name order.
        for name in inserted.iter().rev() {
            store.insert_service(name, "").unwrap();
        }
        store.refresh_view().unwrap();
        inserted.sort();
        prop_assert_eq!(scan_names(&store, &NameFilter::any(), RecordSource::SortedView), inserted);
    }
}
