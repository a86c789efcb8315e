// crates/catalog-store-sqlite/tests/view_sync_sqlite.rs
// ============================================================================
// Module: SQLite View Sync Tests
// Description: View sync engine and catalog operations over the SQLite store.
// Purpose: Validate end-to-end convergence of the name-sorted listing.
// ============================================================================

//! End-to-end convergence tests against a real database file.

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

use std::sync::Arc;
use std::time::Duration;

use catalog_core::CatalogOperations;
use catalog_core::CatalogStore;
use catalog_core::DirtyFlag;
use catalog_core::FetchServicesRequest;
use catalog_core::NameFilter;
use catalog_core::NoopCatalogEventSink;
use catalog_core::PageRequest;
use catalog_core::RetryPolicy;
use catalog_core::SortKey;
use catalog_core::ViewSyncConfig;
use catalog_core::ViewSyncEngine;
use catalog_core::shutdown_channel;
use catalog_store_sqlite::SqliteCatalogStore;
use catalog_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

fn by_name(page: u64, size: u64, inverted: bool) -> FetchServicesRequest {
    FetchServicesRequest {
        page: PageRequest::new(page, size, inverted),
        name_filter: NameFilter::any(),
        sort: SortKey::Name,
    }
}

#[tokio::test(start_paused = true)]
async fn writes_reach_the_sorted_listing_after_a_dirty_tick() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn CatalogStore> =
        Arc::new(SqliteCatalogStore::new(SqliteStoreConfig::new(dir.path().join("c.db"))).unwrap());
    let dirty = Arc::new(DirtyFlag::new());
    let ops = CatalogOperations::new(Arc::clone(&store), Arc::clone(&dirty), Arc::new(NoopCatalogEventSink));
    let config = ViewSyncConfig {
        scheduled_interval: Duration::from_secs(600),
        dirty_check_interval: Duration::from_secs(2),
        retry: RetryPolicy::new(3, Duration::from_secs(1)),
    };
    let engine = ViewSyncEngine::new(config, Arc::clone(&store), Arc::clone(&dirty), Arc::new(NoopCatalogEventSink));
    let (trigger, shutdown) = shutdown_channel();
    let handle = engine.start(shutdown).await.unwrap();

    for name in ["gamma", "alpha", "beta", "delta"] {
        ops.create_service(name, "").unwrap();
    }
    assert_eq!(ops.fetch_services(&by_name(1, 10, false)).unwrap().total_items, 0);

    tokio::time::sleep(Duration::from_secs(4)).await;

    let forward = ops.fetch_services(&by_name(1, 3, false)).unwrap();
    let names: Vec<&str> = forward.data.iter().map(|service| service.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "delta"]);

    let inverted = ops.fetch_services(&by_name(1, 3, true)).unwrap();
    let names: Vec<&str> = inverted.data.iter().map(|service| service.name.as_str()).collect();
    assert_eq!(names, vec!["gamma", "delta", "beta"]);
    assert_eq!(inverted.total_items, 4);
    assert!(!dirty.is_dirty());

    trigger.trigger();
    handle.wait().await.unwrap();
}
