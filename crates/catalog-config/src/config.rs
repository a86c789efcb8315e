// crates/catalog-config/src/config.rs
// ============================================================================
// Module: Service Catalog Configuration
// Description: Configuration loading and validation for the service catalog.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: catalog-core, catalog-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys, out-of-range timers, and inconsistent sections are rejected
//! at load time so the process never starts half-configured.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use catalog_core::RetryPolicy;
use catalog_core::ViewSyncConfig;
use catalog_store_sqlite::SqliteStoreConfig;
use catalog_store_sqlite::SqliteStoreMode;
use catalog_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "service-catalog.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SERVICE_CATALOG_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default `SQLite` database path.
const DEFAULT_STORE_PATH: &str = "service-catalog.db";
/// Default busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default scheduled refresh interval (30 minutes).
const DEFAULT_SCHEDULED_INTERVAL_MS: u64 = 30 * 60 * 1_000;
/// Default dirty-check interval.
const DEFAULT_DIRTY_CHECK_INTERVAL_MS: u64 = 2_000;
/// Default refresh attempts per retry sequence.
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
/// Upper bound on refresh attempts per retry sequence.
const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Default base backoff delay.
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;
/// Upper bound on the base backoff delay.
const MAX_RETRY_BASE_DELAY_MS: u64 = 60_000;
/// Default page size for listings.
const DEFAULT_PAGE_SIZE: u64 = 10;
/// Default upper bound on requested page sizes.
const DEFAULT_MAX_PAGE_SIZE: u64 = 1_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Service catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Storage backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// View sync engine timers and retry policy.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Listing defaults and limits.
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Event sink selection.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CatalogConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is taken from `path`, then [`CONFIG_ENV_VAR`], then
    /// `service-catalog.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text cannot be parsed or validated.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.sync.validate()?;
        self.pagination.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Durable `SQLite` database.
    #[default]
    Sqlite,
    /// Process-local memory; contents vanish on exit.
    Memory,
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: default_store_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.store_type == StoreType::Memory {
            return Ok(());
        }
        validate_path_string("store.path", &self.path.to_string_lossy())?;
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "store.busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the `SQLite` store configuration, or `None` for the memory backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match self.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => Some(SqliteStoreConfig {
                path: self.path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
        }
    }
}

/// View sync engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Unconditional refresh interval in milliseconds.
    #[serde(default = "default_scheduled_interval_ms")]
    pub scheduled_interval_ms: u64,
    /// Dirty-flag check interval in milliseconds.
    #[serde(default = "default_dirty_check_interval_ms")]
    pub dirty_check_interval_ms: u64,
    /// Attempts per startup or scheduled retry sequence.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Backoff before the second attempt; doubles after each failure.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            scheduled_interval_ms: DEFAULT_SCHEDULED_INTERVAL_MS,
            dirty_check_interval_ms: DEFAULT_DIRTY_CHECK_INTERVAL_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

impl SyncConfig {
    /// Validates timer and retry bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduled_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sync.scheduled_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.dirty_check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sync.dirty_check_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.dirty_check_interval_ms > self.scheduled_interval_ms {
            return Err(ConfigError::Invalid(
                "sync.dirty_check_interval_ms must not exceed sync.scheduled_interval_ms"
                    .to_string(),
            ));
        }
        if self.retry_attempts == 0 || self.retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "sync.retry_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}"
            )));
        }
        if self.retry_base_delay_ms > MAX_RETRY_BASE_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "sync.retry_base_delay_ms must not exceed {MAX_RETRY_BASE_DELAY_MS}"
            )));
        }
        Ok(())
    }

    /// Converts to the engine's timer and retry settings.
    #[must_use]
    pub const fn engine_config(&self) -> ViewSyncConfig {
        ViewSyncConfig {
            scheduled_interval: Duration::from_millis(self.scheduled_interval_ms),
            dirty_check_interval: Duration::from_millis(self.dirty_check_interval_ms),
            retry: RetryPolicy::new(
                self.retry_attempts,
                Duration::from_millis(self.retry_base_delay_ms),
            ),
        }
    }
}

/// Listing defaults and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size used when a request names none.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Largest page size a request may ask for.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    /// Validates page size bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "pagination.max_page_size must be greater than zero".to_string(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(
                "pagination.default_page_size must be between 1 and pagination.max_page_size"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the page size for a request, capped at `max_page_size`.
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default_page_size).min(self.max_page_size)
    }
}

/// Event sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events.
    None,
}

/// Event logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink type.
    #[serde(default)]
    pub sink: LogSinkType,
    /// Output file for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates sink settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkType::File, Some(path)) => {
                validate_path_string("logging.path", &path.to_string_lossy())
            }
            (LogSinkType::File, None) => {
                Err(ConfigError::Invalid("logging.sink = \"file\" requires logging.path".to_string()))
            }
            (LogSinkType::Stderr | LogSinkType::None, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only valid with logging.sink = \"file\"".to_string(),
            )),
            (LogSinkType::Stderr | LogSinkType::None, None) => Ok(()),
        }
    }
}

/// Returns the default `SQLite` path.
fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default scheduled refresh interval.
const fn default_scheduled_interval_ms() -> u64 {
    DEFAULT_SCHEDULED_INTERVAL_MS
}

/// Returns the default dirty-check interval.
const fn default_dirty_check_interval_ms() -> u64 {
    DEFAULT_DIRTY_CHECK_INTERVAL_MS
}

/// Returns the default retry attempts.
const fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

/// Returns the default base backoff delay.
const fn default_retry_base_delay_ms() -> u64 {
    DEFAULT_RETRY_BASE_DELAY_MS
}

/// Returns the default page size.
const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Returns the default page size cap.
const fn default_max_page_size() -> u64 {
    DEFAULT_MAX_PAGE_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    if path.to_string_lossy().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
