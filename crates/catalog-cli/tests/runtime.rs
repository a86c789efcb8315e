// crates/catalog-cli/tests/runtime.rs
// ============================================================================
// Module: Service Catalog Runtime Tests
// Description: Wiring of store, sink, operations, and engine from configuration.
// Purpose: Validate flush-after-write, clean shutdown, and fatal engine results.
// ============================================================================

//! Runtime wiring tests.

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

use catalog_cli::CatalogRuntime;
use catalog_cli::RuntimeError;
use catalog_config::CatalogConfig;
use catalog_core::FetchServicesRequest;
use catalog_core::InMemoryCatalogStore;
use catalog_core::NameFilter;
use catalog_core::NoopCatalogEventSink;
use catalog_core::PageRequest;
use catalog_core::SortKey;
use catalog_core::ViewSyncError;
use tempfile::TempDir;

fn memory_config() -> CatalogConfig {
    CatalogConfig::from_toml(
        "[store]\ntype = \"memory\"\n[logging]\nsink = \"none\"\n[sync]\nretry_base_delay_ms = 10\n",
    )
    .unwrap()
}

fn by_name() -> FetchServicesRequest {
    FetchServicesRequest {
        page: PageRequest::new(1, 10, false),
        name_filter: NameFilter::any(),
        sort: SortKey::Name,
    }
}

#[tokio::test]
async fn flush_makes_a_write_visible_in_the_sorted_listing() {
    let runtime = CatalogRuntime::from_config(memory_config()).unwrap();
    let ops = runtime.operations();
    ops.create_service("zulu", "").unwrap();
    ops.create_service("alpha", "").unwrap();
    assert!(ops.fetch_services(&by_name()).unwrap().data.is_empty());

    assert!(runtime.flush().await.unwrap());
    let names: Vec<String> =
        ops.fetch_services(&by_name()).unwrap().data.into_iter().map(|service| service.name).collect();
    assert_eq!(names, vec!["alpha", "zulu"]);
    assert!(!runtime.flush().await.unwrap());
}

#[tokio::test]
async fn sqlite_backed_runtime_persists_between_opens() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("events.jsonl");
    let toml = format!(
        "[store]\npath = {:?}\n[logging]\nsink = \"file\"\npath = {:?}\n",
        dir.path().join("catalog.db").display().to_string(),
        log.display().to_string()
    );
    let config = CatalogConfig::from_toml(&toml).unwrap();

    let first = CatalogRuntime::from_config(config.clone()).unwrap();
    first.operations().create_service("persisted", "").unwrap();
    first.flush().await.unwrap();
    drop(first);

    let second = CatalogRuntime::from_config(config).unwrap();
    let page = second.operations().fetch_services(&by_name()).unwrap();
    assert_eq!(page.total_items, 1);
    let events = std::fs::read_to_string(&log).unwrap();
    assert!(events.contains("\"view_sync\""));
}

#[tokio::test(start_paused = true)]
async fn serve_returns_cleanly_when_stopped() {
    let runtime = CatalogRuntime::from_config(memory_config()).unwrap();
    runtime.serve(tokio::time::sleep(Duration::from_secs(5))).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn serve_reports_startup_exhaustion() {
    let store = InMemoryCatalogStore::new();
    store.inject_refresh_failures(3).unwrap();
    let runtime =
        CatalogRuntime::with_parts(memory_config(), Arc::new(store), Arc::new(NoopCatalogEventSink));

    let err = runtime.serve(std::future::pending()).await.unwrap_err();

    assert!(matches!(
        err,
        RuntimeError::Sync(ViewSyncError::StartupExhausted {
            attempts: 3,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn serve_reports_scheduled_exhaustion() {
    let config = CatalogConfig::from_toml(
        "[store]\ntype = \"memory\"\n[logging]\nsink = \"none\"\n[sync]\nscheduled_interval_ms = \
         5000\ndirty_check_interval_ms = 1000\nretry_base_delay_ms = 10\n",
    )
    .unwrap();
    let store = InMemoryCatalogStore::new();
    let runtime =
        CatalogRuntime::with_parts(config, Arc::new(store.clone()), Arc::new(NoopCatalogEventSink));
    let failing = store.clone();
    let serve = runtime.serve(std::future::pending());
    let inject = async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        failing.inject_refresh_failures(3).unwrap();
        std::future::pending::<()>().await;
    };

    let err = tokio::select! {
        result = serve => result.unwrap_err(),
        () = inject => unreachable!(),
    };

    assert!(matches!(err, RuntimeError::Sync(ViewSyncError::ScheduledExhausted { .. })));
}
