//! Config load validation tests for catalog-config.
// crates/catalog-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding) and sections.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use catalog_config::CatalogConfig;
use catalog_config::ConfigError;
use catalog_config::LogSinkType;
use catalog_config::StoreType;
use catalog_store_sqlite::SqliteStoreMode;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<CatalogConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

// ============================================================================
// SECTION: Load Guards
// ============================================================================

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(CatalogConfig::load(Some(Path::new(&long_path))), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        CatalogConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'#'; 1_048_577])?;
    assert_invalid(CatalogConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(CatalogConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    match CatalogConfig::load(Some(Path::new("/nonexistent/service-catalog.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn load_rejects_unknown_keys() -> TestResult {
    let file = write_config(b"[sync]\nscheduled_interval = 5\n")?;
    assert_invalid(CatalogConfig::load(Some(file.path())), "config parse error")
}

// ============================================================================
// SECTION: Sections
// ============================================================================

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let file = write_config(b"")?;
    let config = CatalogConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let engine = config.sync.engine_config();
    if engine.scheduled_interval != Duration::from_secs(1_800)
        || engine.dirty_check_interval != Duration::from_secs(2)
        || engine.retry.attempts != 3
        || engine.retry.base_delay != Duration::from_secs(1)
    {
        return Err(format!("unexpected engine defaults: {engine:?}"));
    }
    if config.pagination.page_size(None) != 10 || config.pagination.page_size(Some(5_000)) != 1_000 {
        return Err("unexpected pagination defaults".to_string());
    }
    if config.logging.sink != LogSinkType::Stderr || config.store.store_type != StoreType::Sqlite {
        return Err("unexpected store or logging defaults".to_string());
    }
    Ok(())
}

#[test]
fn full_file_round_trips_into_components() -> TestResult {
    let toml = br#"
[store]
type = "sqlite"
path = "data/catalog.db"
busy_timeout_ms = 250
journal_mode = "delete"
sync_mode = "normal"

[sync]
scheduled_interval_ms = 60000
dirty_check_interval_ms = 500
retry_attempts = 5
retry_base_delay_ms = 200

[pagination]
default_page_size = 25
max_page_size = 100

[logging]
sink = "file"
path = "logs/catalog.jsonl"
"#;
    let file = write_config(toml)?;
    let config = CatalogConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    let sqlite = config.store.sqlite_config().ok_or("sqlite config missing")?;
    if sqlite.journal_mode != SqliteStoreMode::Delete || sqlite.busy_timeout_ms != 250 {
        return Err(format!("unexpected sqlite config: {sqlite:?}"));
    }
    let engine = config.sync.engine_config();
    if engine.dirty_check_interval != Duration::from_millis(500) || engine.retry.attempts != 5 {
        return Err(format!("unexpected engine config: {engine:?}"));
    }
    if config.pagination.page_size(None) != 25 {
        return Err("unexpected default page size".to_string());
    }
    Ok(())
}

#[test]
fn memory_store_has_no_sqlite_config() -> TestResult {
    let config = CatalogConfig::from_toml("[store]\ntype = \"memory\"\n").map_err(|err| err.to_string())?;
    if config.store.sqlite_config().is_some() {
        return Err("memory store produced a sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn sync_rejects_zero_intervals() -> TestResult {
    assert_invalid(
        CatalogConfig::from_toml("[sync]\nscheduled_interval_ms = 0\n"),
        "sync.scheduled_interval_ms must be greater than zero",
    )?;
    assert_invalid(
        CatalogConfig::from_toml("[sync]\ndirty_check_interval_ms = 0\n"),
        "sync.dirty_check_interval_ms must be greater than zero",
    )
}

#[test]
fn sync_rejects_dirty_interval_above_scheduled() -> TestResult {
    assert_invalid(
        CatalogConfig::from_toml(
            "[sync]\nscheduled_interval_ms = 1000\ndirty_check_interval_ms = 2000\n",
        ),
        "must not exceed sync.scheduled_interval_ms",
    )
}

#[test]
fn sync_rejects_retry_attempts_out_of_range() -> TestResult {
    assert_invalid(CatalogConfig::from_toml("[sync]\nretry_attempts = 0\n"), "sync.retry_attempts")?;
    assert_invalid(CatalogConfig::from_toml("[sync]\nretry_attempts = 11\n"), "sync.retry_attempts")
}

#[test]
fn pagination_rejects_default_above_max() -> TestResult {
    assert_invalid(
        CatalogConfig::from_toml("[pagination]\ndefault_page_size = 50\nmax_page_size = 20\n"),
        "pagination.default_page_size",
    )
}

#[test]
fn logging_file_sink_requires_path() -> TestResult {
    assert_invalid(
        CatalogConfig::from_toml("[logging]\nsink = \"file\"\n"),
        "requires logging.path",
    )?;
    assert_invalid(
        CatalogConfig::from_toml("[logging]\nsink = \"none\"\npath = \"x.log\"\n"),
        "logging.path is only valid",
    )
}

#[test]
fn sqlite_store_rejects_empty_path() -> TestResult {
    assert_invalid(CatalogConfig::from_toml("[store]\npath = \"\"\n"), "store.path must be non-empty")
}
