// crates/catalog-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Catalog Store
// Description: Durable CatalogStore backed by SQLite.
// Purpose: Persist services and versions and rebuild the name-sorted projection.
// Dependencies: catalog-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`CatalogStore`] using `SQLite`. Three
//! tables are kept:
//!
//! - `service`: source of truth, ordered by creation (`id`),
//! - `version`: versions per service, cascading on service delete,
//! - `name_sorted_service`: the projection, with an explicit `position`.
//!
//! Every trait call runs in its own statement or transaction. A refresh
//! clears and re-fills the projection atomically, so readers never observe
//! a half-built view. Unique-key violations surface as
//! [`StoreError::Conflict`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use catalog_core::CatalogStore;
use catalog_core::NameFilter;
use catalog_core::RecordSource;
use catalog_core::ScanWindow;
use catalog_core::Service;
use catalog_core::ServiceId;
use catalog_core::ServiceVersion;
use catalog_core::StoreError;
use catalog_core::VersionTag;
use catalog_core::unix_millis;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Column list shared by the service table and the projection.
const SERVICE_COLUMNS: &str = "id, name, description, version_count, created_at_ms, updated_at_ms";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` catalog store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default tuning.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data could not be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid request or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A unique key is already taken.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

/// Maps a write error, surfacing unique-key violations as conflicts.
fn map_write_error(err: rusqlite::Error, conflict: impl FnOnce() -> String) -> SqliteStoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            SqliteStoreError::Conflict(conflict())
        }
        other => SqliteStoreError::Db(other.to_string()),
    }
}

/// Maps a read error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err adapter.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed catalog store.
///
/// # Invariants
/// - `SQLite` connection access is serialized through a mutex.
/// - The projection only changes inside [`Self::refresh_view`].
#[derive(Clone)]
pub struct SqliteCatalogStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// Opens an `SQLite`-backed catalog store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or carries an unsupported schema version.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Rebuilds the projection in one transaction.
    fn refresh_projection(&self) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute("DELETE FROM name_sorted_service", params![]).map_err(db_error)?;
        tx.execute(
            &format!(
                "INSERT INTO name_sorted_service (position, {SERVICE_COLUMNS})
                 SELECT ROW_NUMBER() OVER (ORDER BY name, id), {SERVICE_COLUMNS}
                 FROM service"
            ),
            params![],
        )
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Counts matching services in `source`.
    fn count_matching(&self, filter: &NameFilter, source: RecordSource) -> Result<u64, SqliteStoreError> {
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row(
                &format!(
                    "SELECT COUNT(1) FROM {} WHERE (?1 = '' OR instr(name, ?1) > 0)",
                    source_table(source)
                ),
                params![filter.term()],
                |row| row.get(0),
            )
            .map_err(db_error)?;
        drop(guard);
        to_u64(count, "service count")
    }

    /// Scans matching services in the source's ascending order.
    fn scan_matching(
        &self,
        filter: &NameFilter,
        source: RecordSource,
        window: ScanWindow,
    ) -> Result<Vec<Service>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(&format!(
                "SELECT {SERVICE_COLUMNS} FROM {} WHERE (?1 = '' OR instr(name, ?1) > 0)
                 ORDER BY {} LIMIT ?2 OFFSET ?3",
                source_table(source),
                source_order(source)
            ))
            .map_err(db_error)?;
        let rows = stmt
            .query_map(
                params![filter.term(), to_i64(window.limit), to_i64(window.offset)],
                ServiceRow::from_row,
            )
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(stmt);
        drop(guard);
        rows.into_iter().map(ServiceRow::into_service).collect()
    }

    /// Loads a service row from the source-of-truth table.
    fn load_service(connection: &Connection, id: ServiceId) -> Result<Option<Service>, SqliteStoreError> {
        let row = connection
            .query_row(
                &format!("SELECT {SERVICE_COLUMNS} FROM service WHERE id = ?1"),
                params![to_i64(id.get())],
                ServiceRow::from_row,
            )
            .optional()
            .map_err(db_error)?;
        row.map(ServiceRow::into_service).transpose()
    }

    /// Loads a version row.
    fn load_version(
        connection: &Connection,
        service_id: ServiceId,
        tag: &VersionTag,
    ) -> Result<Option<ServiceVersion>, SqliteStoreError> {
        let row = connection
            .query_row(
                "SELECT service_id, tag, info, created_at_ms, updated_at_ms FROM version
                 WHERE service_id = ?1 AND tag = ?2",
                params![to_i64(service_id.get()), tag.as_str()],
                VersionRow::from_row,
            )
            .optional()
            .map_err(db_error)?;
        row.map(VersionRow::into_version).transpose()
    }

    /// Inserts a service row.
    fn insert_service_row(&self, name: &str, description: &str) -> Result<Service, SqliteStoreError> {
        let now = unix_millis();
        let guard = self.lock()?;
        guard
            .execute(
                "INSERT INTO service (name, description, version_count, created_at_ms, \
                 updated_at_ms) VALUES (?1, ?2, 0, ?3, ?3)",
                params![name, description, now],
            )
            .map_err(|err| map_write_error(err, || format!("service name {name} already exists")))?;
        let id = to_u64(guard.last_insert_rowid(), "service id")?;
        drop(guard);
        Ok(Service {
            id: ServiceId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            version_count: 0,
            created_at_ms: now,
            updated_at_ms: now,
        })
    }

    /// Updates a service row.
    fn update_service_row(
        &self,
        id: ServiceId,
        name: &str,
        description: &str,
    ) -> Result<Option<Service>, SqliteStoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE service SET name = ?1, description = ?2, updated_at_ms = ?3 WHERE id = ?4",
                params![name, description, unix_millis(), to_i64(id.get())],
            )
            .map_err(|err| map_write_error(err, || format!("service name {name} already exists")))?;
        if changed == 0 {
            return Ok(None);
        }
        let service = Self::load_service(&guard, id)?;
        drop(guard);
        Ok(service)
    }

    /// Inserts a version and bumps the owning service's count.
    fn insert_version_row(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<ServiceVersion, SqliteStoreError> {
        let now = unix_millis();
        let raw_id = to_i64(service_id.get());
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let bumped = tx
            .execute(
                "UPDATE service SET version_count = version_count + 1, updated_at_ms = ?1 \
                 WHERE id = ?2",
                params![now, raw_id],
            )
            .map_err(db_error)?;
        if bumped == 0 {
            return Err(SqliteStoreError::Invalid(format!("service {service_id} does not exist")));
        }
        tx.execute(
            "INSERT INTO version (service_id, tag, info, created_at_ms, updated_at_ms) VALUES \
             (?1, ?2, ?3, ?4, ?4)",
            params![raw_id, tag.as_str(), info, now],
        )
        .map_err(|err| {
            map_write_error(err, || format!("version {tag} already exists for service {service_id}"))
        })?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(ServiceVersion {
            service_id,
            tag: tag.clone(),
            info: info.to_string(),
            created_at_ms: now,
            updated_at_ms: now,
        })
    }

    /// Updates a version's info.
    fn update_version_row(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<Option<ServiceVersion>, SqliteStoreError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE version SET info = ?1, updated_at_ms = ?2 WHERE service_id = ?3 AND tag = ?4",
                params![info, unix_millis(), to_i64(service_id.get()), tag.as_str()],
            )
            .map_err(db_error)?;
        if changed == 0 {
            return Ok(None);
        }
        let version = Self::load_version(&guard, service_id, tag)?;
        drop(guard);
        Ok(version)
    }

    /// Deletes a version and decrements the owning service's count.
    fn delete_version_row(&self, service_id: ServiceId, tag: &VersionTag) -> Result<bool, SqliteStoreError> {
        let raw_id = to_i64(service_id.get());
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let deleted = tx
            .execute(
                "DELETE FROM version WHERE service_id = ?1 AND tag = ?2",
                params![raw_id, tag.as_str()],
            )
            .map_err(db_error)?;
        if deleted == 0 {
            return Ok(false);
        }
        tx.execute(
            "UPDATE service SET version_count = MAX(version_count - 1, 0), updated_at_ms = ?1 \
             WHERE id = ?2",
            params![unix_millis(), raw_id],
        )
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(true)
    }

    /// Scans a service's versions in creation order.
    fn scan_version_rows(
        &self,
        service_id: ServiceId,
        window: ScanWindow,
    ) -> Result<Vec<ServiceVersion>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT service_id, tag, info, created_at_ms, updated_at_ms FROM version
                 WHERE service_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(
                params![to_i64(service_id.get()), to_i64(window.limit), to_i64(window.offset)],
                VersionRow::from_row,
            )
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        drop(stmt);
        drop(guard);
        rows.into_iter().map(VersionRow::into_version).collect()
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn refresh_view(&self) -> Result<(), StoreError> {
        self.refresh_projection().map_err(StoreError::from)
    }

    fn count_services(&self, filter: &NameFilter, source: RecordSource) -> Result<u64, StoreError> {
        self.count_matching(filter, source).map_err(StoreError::from)
    }

    fn scan_services(
        &self,
        filter: &NameFilter,
        source: RecordSource,
        window: ScanWindow,
    ) -> Result<Vec<Service>, StoreError> {
        self.scan_matching(filter, source, window).map_err(StoreError::from)
    }

    fn get_service(&self, id: ServiceId) -> Result<Option<Service>, StoreError> {
        let guard = self.lock()?;
        Ok(Self::load_service(&guard, id)?)
    }

    fn count_services_named(
        &self,
        name: &str,
        excluding: Option<ServiceId>,
    ) -> Result<u64, StoreError> {
        let excluded = excluding.map(|id| to_i64(id.get()));
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row(
                "SELECT COUNT(1) FROM service WHERE name = ?1 AND (?2 IS NULL OR id != ?2)",
                params![name, excluded],
                |row| row.get(0),
            )
            .map_err(db_error)?;
        drop(guard);
        Ok(to_u64(count, "service count")?)
    }

    fn insert_service(&self, name: &str, description: &str) -> Result<Service, StoreError> {
        self.insert_service_row(name, description).map_err(StoreError::from)
    }

    fn update_service(
        &self,
        id: ServiceId,
        name: &str,
        description: &str,
    ) -> Result<Option<Service>, StoreError> {
        self.update_service_row(id, name, description).map_err(StoreError::from)
    }

    fn delete_service(&self, id: ServiceId) -> Result<bool, StoreError> {
        let guard = self.lock()?;
        let deleted = guard
            .execute("DELETE FROM service WHERE id = ?1", params![to_i64(id.get())])
            .map_err(db_error)?;
        drop(guard);
        Ok(deleted > 0)
    }

    fn get_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
    ) -> Result<Option<ServiceVersion>, StoreError> {
        let guard = self.lock()?;
        Ok(Self::load_version(&guard, service_id, tag)?)
    }

    fn insert_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<ServiceVersion, StoreError> {
        self.insert_version_row(service_id, tag, info).map_err(StoreError::from)
    }

    fn update_version(
        &self,
        service_id: ServiceId,
        tag: &VersionTag,
        info: &str,
    ) -> Result<Option<ServiceVersion>, StoreError> {
        self.update_version_row(service_id, tag, info).map_err(StoreError::from)
    }

    fn delete_version(&self, service_id: ServiceId, tag: &VersionTag) -> Result<bool, StoreError> {
        self.delete_version_row(service_id, tag).map_err(StoreError::from)
    }

    fn count_versions(&self, service_id: ServiceId) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count: i64 = guard
            .query_row(
                "SELECT COUNT(1) FROM version WHERE service_id = ?1",
                params![to_i64(service_id.get())],
                |row| row.get(0),
            )
            .map_err(db_error)?;
        drop(guard);
        Ok(to_u64(count, "version count")?)
    }

    fn scan_versions(
        &self,
        service_id: ServiceId,
        window: ScanWindow,
    ) -> Result<Vec<ServiceVersion>, StoreError> {
        self.scan_version_rows(service_id, window).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Raw service row as stored.
struct ServiceRow {
    /// Row identifier.
    id: i64,
    /// Service name.
    name: String,
    /// Service description.
    description: String,
    /// Version count.
    version_count: i64,
    /// Creation time (unix ms).
    created_at_ms: i64,
    /// Update time (unix ms).
    updated_at_ms: i64,
}

impl ServiceRow {
    /// Reads a row selected with [`SERVICE_COLUMNS`].
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            version_count: row.get(3)?,
            created_at_ms: row.get(4)?,
            updated_at_ms: row.get(5)?,
        })
    }

    /// Converts into the domain record.
    fn into_service(self) -> Result<Service, SqliteStoreError> {
        Ok(Service {
            id: ServiceId::new(to_u64(self.id, "service id")?),
            name: self.name,
            description: self.description,
            version_count: to_u64(self.version_count, "version count")?,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

/// Raw version row as stored.
struct VersionRow {
    /// Owning service identifier.
    service_id: i64,
    /// Version tag.
    tag: String,
    /// Release information.
    info: String,
    /// Creation time (unix ms).
    created_at_ms: i64,
    /// Update time (unix ms).
    updated_at_ms: i64,
}

impl VersionRow {
    /// Reads a version row.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            service_id: row.get(0)?,
            tag: row.get(1)?,
            info: row.get(2)?,
            created_at_ms: row.get(3)?,
            updated_at_ms: row.get(4)?,
        })
    }

    /// Converts into the domain record.
    fn into_version(self) -> Result<ServiceVersion, SqliteStoreError> {
        Ok(ServiceVersion {
            service_id: ServiceId::new(to_u64(self.service_id, "service id")?),
            tag: VersionTag::new(self.tag),
            info: self.info,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the table backing a record source.
const fn source_table(source: RecordSource) -> &'static str {
    match source {
        RecordSource::Table => "service",
        RecordSource::SortedView => "name_sorted_service",
    }
}

/// Returns the ascending order column of a record source.
const fn source_order(source: RecordSource) -> &'static str {
    match source {
        RecordSource::Table => "id",
        RecordSource::SortedView => "position",
    }
}

/// Converts a stored integer that must be non-negative.
fn to_u64(value: i64, what: &str) -> Result<u64, SqliteStoreError> {
    u64::try_from(value).map_err(|_| SqliteStoreError::Corrupt(format!("negative {what}: {value}")))
}

/// Converts a request integer for binding, saturating at `i64::MAX`.
fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path
        .components()
        .any(|component| component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS service (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    description TEXT NOT NULL,
                    version_count INTEGER NOT NULL DEFAULT 0,
                    created_at_ms INTEGER NOT NULL,
                    updated_at_ms INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS version (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    service_id INTEGER NOT NULL
                        REFERENCES service(id) ON DELETE CASCADE,
                    tag TEXT NOT NULL,
                    info TEXT NOT NULL,
                    created_at_ms INTEGER NOT NULL,
                    updated_at_ms INTEGER NOT NULL,
                    UNIQUE (service_id, tag)
                );
                CREATE INDEX IF NOT EXISTS idx_version_service
                    ON version (service_id, id);
                CREATE TABLE IF NOT EXISTS name_sorted_service (
                    position INTEGER PRIMARY KEY,
                    id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    version_count INTEGER NOT NULL,
                    created_at_ms INTEGER NOT NULL,
                    updated_at_ms INTEGER NOT NULL
                );",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
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

    #[test]
    fn path_validation_rejects_empty_and_directories() {
        assert!(matches!(validate_store_path(Path::new("")), Err(SqliteStoreError::Invalid(_))));
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(validate_store_path(dir.path()), Err(SqliteStoreError::Invalid(_))));
        let long = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        assert!(matches!(validate_store_path(Path::new(&long)), Err(SqliteStoreError::Invalid(_))));
    }

    #[test]
    fn conflict_maps_to_store_conflict() {
        let err: StoreError = SqliteStoreError::Conflict("taken".to_string()).into();
        assert_eq!(err, StoreError::Conflict("taken".to_string()));
    }
}
