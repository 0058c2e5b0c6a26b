// crates/decor-layout-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Layout Store
// Description: Durable LayoutStore backed by SQLite with shape probing.
// Purpose: Persist versioned layouts; read legacy single-version databases.
// Dependencies: decor-layout-core, rusqlite, serde, serde_json
// ============================================================================

//! ## Overview
//! This module implements a durable [`LayoutStore`] using `SQLite`. Each save
//! replaces the full item list for a warehouse and bumps its version in a
//! single transaction; reads fail closed on undecodable stored data.
//!
//! The database shape is probed exactly once when the store opens:
//! - The versioned `warehouse_layouts` table is preferred.
//! - A database carrying only the legacy `decor_layouts` table is served in
//!   legacy shape: one deployment-wide record keyed by the configured legacy
//!   organization id, with every layout pinned at version `1`.
//! - A database with neither table is rejected with
//!   [`StoreError::MigrationRequired`]; the store never creates tables
//!   implicitly. Run [`run_migration`] to initialize or upgrade a database.
//!
//! Security posture: database contents are untrusted; every loaded item is
//! routed through the sanitizer before it leaves the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use decor_layout_core::DecorItem;
use decor_layout_core::Layout;
use decor_layout_core::LayoutStore;
use decor_layout_core::MAX_LAYOUT_ITEMS;
use decor_layout_core::StoreError;
use decor_layout_core::WarehouseId;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default organization key for the legacy single-record table.
pub const DEFAULT_LEGACY_ORG_ID: &str = "default-org";
/// Versioned layout table name.
const VERSIONED_TABLE: &str = "warehouse_layouts";
/// Legacy single-version layout table name.
const LEGACY_TABLE: &str = "decor_layouts";
/// Version reported for every layout served from the legacy table shape.
const LEGACY_PINNED_VERSION: i64 = 1;

/// Schema statement creating the versioned layout table.
const CREATE_VERSIONED_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS warehouse_layouts (
    warehouse_id TEXT PRIMARY KEY,
    version INTEGER NOT NULL,
    updated_at INTEGER,
    items_json TEXT NOT NULL
) STRICT;";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
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
    /// Normal synchronous mode.
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

/// Configuration for the `SQLite` layout store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `legacy_org_id` is non-empty; it keys the single deployment-wide record
///   when the database carries the legacy table shape.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteLayoutStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Organization key of the deployment-wide record in legacy shape.
    #[serde(default = "default_legacy_org_id")]
    pub legacy_org_id: String,
}

impl SqliteLayoutStoreConfig {
    /// Returns a config with defaults for the given database path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
            legacy_org_id: DEFAULT_LEGACY_ORG_ID.to_string(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default legacy organization key.
fn default_legacy_org_id() -> String {
    DEFAULT_LEGACY_ORG_ID.to_string()
}

/// Validates the store configuration before opening a connection.
fn validate_config(config: &SqliteLayoutStoreConfig) -> Result<(), StoreError> {
    if config.path.as_os_str().is_empty() {
        return Err(StoreError::Invalid("store path must not be empty".to_string()));
    }
    if config.path.is_dir() {
        return Err(StoreError::Invalid(format!(
            "store path is a directory: {}",
            config.path.display()
        )));
    }
    if config.legacy_org_id.is_empty() {
        return Err(StoreError::Invalid("legacy_org_id must not be empty".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Storage Shape
// ============================================================================

/// Database table shape selected by the startup probe.
///
/// # Invariants
/// - The shape is fixed for the lifetime of an opened store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageShape {
    /// The versioned `warehouse_layouts` table is present.
    Versioned,
    /// Only the legacy `decor_layouts` table is present; versions pin at `1`.
    Legacy,
}

impl StorageShape {
    /// Returns a stable label for the shape.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Versioned => "versioned",
            Self::Legacy => "legacy",
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable layout store backed by a single `SQLite` connection.
///
/// # Invariants
/// - The table shape is probed once at open and never re-probed.
/// - Saves are transactional: the version read and the upsert commit
///   together or not at all.
/// - Loaded items are sanitized before being returned.
pub struct SqliteLayoutStore {
    /// Serialized access to the underlying connection.
    connection: Mutex<Connection>,
    /// Table shape selected by the startup probe.
    shape: StorageShape,
    /// Organization key of the deployment-wide record in legacy shape.
    legacy_org_id: String,
}

impl SqliteLayoutStore {
    /// Opens the store, applying pragmas and probing the table shape.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for a bad configuration,
    /// [`StoreError::MigrationRequired`] when neither layout table exists,
    /// and [`StoreError::Db`] for engine failures.
    pub fn open(config: &SqliteLayoutStoreConfig) -> Result<Self, StoreError> {
        validate_config(config)?;
        let connection = Connection::open(&config.path).map_err(db_error)?;
        apply_pragmas(&connection, config)?;
        let shape = probe_shape(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            shape,
            legacy_org_id: config.legacy_org_id.clone(),
        })
    }

    /// Returns the table shape selected by the startup probe.
    #[must_use]
    pub const fn shape(&self) -> StorageShape {
        self.shape
    }

    /// Loads a layout from the versioned table.
    fn load_versioned(
        connection: &Connection,
        warehouse_id: &WarehouseId,
    ) -> Result<Layout, StoreError> {
        let row = connection
            .prepare_cached(
                "SELECT version, updated_at, items_json FROM warehouse_layouts WHERE \
                 warehouse_id = ?1",
            )
            .map_err(db_error)?
            .query_row(params![warehouse_id.as_str()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .optional()
            .map_err(db_error)?;
        match row {
            Some((version, updated_at, items_json)) => Ok(Layout {
                warehouse_id: warehouse_id.clone(),
                version,
                updated_at,
                items: decode_items(&items_json)?,
            }),
            None => Ok(Layout::empty(warehouse_id.clone())),
        }
    }

    /// Loads the deployment-wide legacy record, pinning the version at `1`.
    ///
    /// The legacy table holds a single layout for the whole deployment keyed
    /// by the configured organization id; every warehouse is served from it.
    fn load_legacy(
        connection: &Connection,
        org_id: &str,
        warehouse_id: &WarehouseId,
    ) -> Result<Layout, StoreError> {
        let row = connection
            .prepare_cached("SELECT items_json, updated_at FROM decor_layouts WHERE org_id = ?1")
            .map_err(db_error)?
            .query_row(params![org_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
            })
            .optional()
            .map_err(db_error)?;
        match row {
            Some((items_json, updated_at)) => Ok(Layout {
                warehouse_id: warehouse_id.clone(),
                version: LEGACY_PINNED_VERSION,
                updated_at,
                items: decode_items(&items_json)?,
            }),
            None => Ok(Layout::empty(warehouse_id.clone())),
        }
    }

    /// Saves into the versioned table, bumping the stored version.
    fn save_versioned(
        connection: &mut Connection,
        warehouse_id: &WarehouseId,
        items: &[DecorItem],
    ) -> Result<Layout, StoreError> {
        let items: Vec<DecorItem> = items.iter().map(DecorItem::sanitized).collect();
        let items_json = encode_items(&items)?;
        let updated_at = unix_millis();
        let tx = connection.transaction().map_err(db_error)?;
        let current: Option<i64> = tx
            .prepare_cached("SELECT version FROM warehouse_layouts WHERE warehouse_id = ?1")
            .map_err(db_error)?
            .query_row(params![warehouse_id.as_str()], |row| row.get(0))
            .optional()
            .map_err(db_error)?;
        let next_version = current.unwrap_or(0).saturating_add(1).max(1);
        tx.prepare_cached(
            "INSERT INTO warehouse_layouts (warehouse_id, version, updated_at, items_json) \
             VALUES (?1, ?2, ?3, ?4) ON CONFLICT(warehouse_id) DO UPDATE SET version = \
             excluded.version, updated_at = excluded.updated_at, items_json = \
             excluded.items_json",
        )
        .map_err(db_error)?
        .execute(params![warehouse_id.as_str(), next_version, updated_at, items_json])
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        Ok(Layout {
            warehouse_id: warehouse_id.clone(),
            version: next_version,
            updated_at: Some(updated_at),
            items,
        })
    }

    /// Upserts the deployment-wide legacy record; the version stays at `1`.
    fn save_legacy(
        connection: &Connection,
        org_id: &str,
        warehouse_id: &WarehouseId,
        items: &[DecorItem],
    ) -> Result<Layout, StoreError> {
        let items: Vec<DecorItem> = items.iter().map(DecorItem::sanitized).collect();
        let items_json = encode_items(&items)?;
        let updated_at = unix_millis();
        connection
            .prepare_cached(
                "INSERT INTO decor_layouts (org_id, items_json, updated_at) VALUES (?1, ?2, \
                 ?3) ON CONFLICT(org_id) DO UPDATE SET items_json = excluded.items_json, \
                 updated_at = excluded.updated_at",
            )
            .map_err(db_error)?
            .execute(params![org_id, items_json, updated_at])
            .map_err(db_error)?;
        Ok(Layout {
            warehouse_id: warehouse_id.clone(),
            version: LEGACY_PINNED_VERSION,
            updated_at: Some(updated_at),
            items,
        })
    }
}

impl LayoutStore for SqliteLayoutStore {
    fn load(&self, warehouse_id: &WarehouseId) -> Result<Layout, StoreError> {
        let guard = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        match self.shape {
            StorageShape::Versioned => Self::load_versioned(&guard, warehouse_id),
            StorageShape::Legacy => Self::load_legacy(&guard, &self.legacy_org_id, warehouse_id),
        }
    }

    fn save(&self, warehouse_id: &WarehouseId, items: &[DecorItem]) -> Result<Layout, StoreError> {
        if items.len() > MAX_LAYOUT_ITEMS {
            return Err(StoreError::Invalid(format!(
                "layout item count {} exceeds the cap of {MAX_LAYOUT_ITEMS}",
                items.len()
            )));
        }
        let mut guard = self.connection.lock().unwrap_or_else(PoisonError::into_inner);
        match self.shape {
            StorageShape::Versioned => Self::save_versioned(&mut guard, warehouse_id, items),
            StorageShape::Legacy => {
                Self::save_legacy(&guard, &self.legacy_org_id, warehouse_id, items)
            }
        }
    }
}

// ============================================================================
// SECTION: Migration
// ============================================================================

/// Creates the versioned table and carries over the legacy record.
///
/// The deployment-wide legacy record stored under `legacy_org_id` is copied
/// into the versioned table keyed by `target_warehouse_id` at version `1`.
/// Idempotent: the versioned table is created only if absent, and the copy
/// never overwrites an existing versioned row. Returns the number of legacy
/// records copied (`0` or `1`).
///
/// # Errors
///
/// Returns [`StoreError::Db`] when the migration statements fail.
pub fn run_migration(
    path: &Path,
    legacy_org_id: &str,
    target_warehouse_id: &WarehouseId,
) -> Result<usize, StoreError> {
    let connection = Connection::open(path).map_err(db_error)?;
    connection.execute_batch(CREATE_VERSIONED_TABLE_SQL).map_err(db_error)?;
    if !table_exists(&connection, LEGACY_TABLE)? {
        return Ok(0);
    }
    connection
        .execute(
            "INSERT INTO warehouse_layouts (warehouse_id, version, updated_at, items_json) \
             SELECT ?1, 1, updated_at, items_json FROM decor_layouts WHERE org_id = ?2 ON \
             CONFLICT(warehouse_id) DO NOTHING",
            params![target_warehouse_id.as_str(), legacy_org_id],
        )
        .map_err(db_error)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteLayoutStoreConfig,
) -> Result<(), StoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)
}

/// Selects the table shape for an opened database.
fn probe_shape(connection: &Connection) -> Result<StorageShape, StoreError> {
    if table_exists(connection, VERSIONED_TABLE)? {
        return Ok(StorageShape::Versioned);
    }
    if table_exists(connection, LEGACY_TABLE)? {
        return Ok(StorageShape::Legacy);
    }
    Err(StoreError::MigrationRequired)
}

/// Returns whether a table with the given name exists.
fn table_exists(connection: &Connection, name: &str) -> Result<bool, StoreError> {
    connection
        .prepare_cached("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .map_err(db_error)?
        .query_row(params![name], |_| Ok(()))
        .optional()
        .map_err(db_error)
        .map(|row| row.is_some())
}

/// Decodes a stored item list, sanitizing every survivor.
fn decode_items(items_json: &str) -> Result<Vec<DecorItem>, StoreError> {
    let items: Vec<DecorItem> = serde_json::from_str(items_json)
        .map_err(|err| StoreError::Corrupt(format!("stored item list failed to decode: {err}")))?;
    Ok(items.iter().map(DecorItem::sanitized).collect())
}

/// Encodes an item list for storage.
fn encode_items(items: &[DecorItem]) -> Result<String, StoreError> {
    serde_json::to_string(items)
        .map_err(|err| StoreError::Invalid(format!("item list failed to encode: {err}")))
}

/// Maps a `rusqlite` error into the store error taxonomy.
fn db_error(err: rusqlite::Error) -> StoreError {
    StoreError::Db(err.to_string())
}

/// Returns the current unix time in milliseconds.
fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|elapsed| i64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0)
}
