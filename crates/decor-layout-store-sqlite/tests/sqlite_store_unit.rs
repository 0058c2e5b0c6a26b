// crates/decor-layout-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Layout Store Unit Tests
// Description: Shape probing, versioning, legacy fallback, and migration.
// Purpose: Validate store behavior against real on-disk databases.
// ============================================================================

//! ## Overview
//! Unit tests for the `SQLite` layout store:
//! - Startup probe outcomes for versioned, legacy, and uninitialized files
//! - Version bumping across sequential saves
//! - Legacy shape serving one deployment-wide record, version pinned at `1`
//! - Fail-closed handling of corrupt stored data
//! - Migration idempotence and legacy record carry-over

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

use std::path::Path;
use std::path::PathBuf;

use decor_layout_core::DecorItem;
use decor_layout_core::DecorKind;
use decor_layout_core::ItemId;
use decor_layout_core::LayoutStore;
use decor_layout_core::MAX_LAYOUT_ITEMS;
use decor_layout_core::StoreError;
use decor_layout_core::WarehouseId;
use decor_layout_store_sqlite::SqliteLayoutStore;
use decor_layout_store_sqlite::SqliteLayoutStoreConfig;
use decor_layout_store_sqlite::StorageShape;
use decor_layout_store_sqlite::run_migration;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn temp_db() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("layouts.sqlite");
    (dir, path)
}

fn open_store(path: &Path) -> SqliteLayoutStore {
    SqliteLayoutStore::open(&SqliteLayoutStoreConfig::for_path(path)).expect("open store")
}

fn open_store_with_legacy_org(path: &Path, org_id: &str) -> SqliteLayoutStore {
    let mut config = SqliteLayoutStoreConfig::for_path(path);
    config.legacy_org_id = org_id.to_string();
    SqliteLayoutStore::open(&config).expect("open store")
}

fn migrate(path: &Path) -> usize {
    run_migration(path, "legacy-org", &WarehouseId::new("warehouse-main")).expect("migration")
}

fn item(tag: usize) -> DecorItem {
    DecorItem {
        id: ItemId::new(format!("item-{tag}")),
        kind: DecorKind::Pallet,
        x: i64::try_from(tag).unwrap(),
        z: 0,
        width: 2,
        depth: 2,
        height: 2,
        rotation_y: 0.0,
    }
}

/// Creates a legacy-shape database with one stored layout row.
fn seed_legacy_db(path: &Path, org_id: &str, items_json: &str) {
    let connection = Connection::open(path).expect("open raw connection");
    connection
        .execute_batch(
            "CREATE TABLE decor_layouts (org_id TEXT PRIMARY KEY, items_json TEXT NOT NULL, \
             updated_at INTEGER);",
        )
        .expect("create legacy table");
    connection
        .execute(
            "INSERT INTO decor_layouts (org_id, items_json, updated_at) VALUES (?1, ?2, ?3)",
            params![org_id, items_json, 1_600_000_000_000_i64],
        )
        .expect("seed legacy row");
}

// ============================================================================
// SECTION: Startup Probe
// ============================================================================

#[test]
fn uninitialized_database_requires_migration() {
    let (_dir, path) = temp_db();
    let result = SqliteLayoutStore::open(&SqliteLayoutStoreConfig::for_path(&path));
    assert!(matches!(result, Err(StoreError::MigrationRequired)));
}

#[test]
fn migrated_database_opens_in_versioned_shape() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let store = open_store(&path);
    assert_eq!(store.shape(), StorageShape::Versioned);
}

#[test]
fn legacy_database_opens_in_legacy_shape() {
    let (_dir, path) = temp_db();
    seed_legacy_db(&path, "warehouse-a", "[]");
    let store = open_store(&path);
    assert_eq!(store.shape(), StorageShape::Legacy);
}

#[test]
fn directory_path_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let result =
        SqliteLayoutStore::open(&SqliteLayoutStoreConfig::for_path(dir.path()));
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

// ============================================================================
// SECTION: Versioned Shape
// ============================================================================

#[test]
fn missing_warehouse_loads_as_empty_first_version() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let store = open_store(&path);
    let layout = store.load(&WarehouseId::new("warehouse-a")).expect("load");
    assert_eq!(layout.version, 1);
    assert_eq!(layout.updated_at, None);
    assert!(layout.items.is_empty());
}

#[test]
fn save_load_roundtrip_preserves_items() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let store = open_store(&path);
    let warehouse = WarehouseId::new("warehouse-a");
    let items = vec![item(0), item(1)];

    let saved = store.save(&warehouse, &items).expect("save");
    assert_eq!(saved.version, 1);
    assert!(saved.updated_at.is_some());

    let loaded = store.load(&warehouse).expect("load");
    assert_eq!(loaded.items, items);
    assert_eq!(loaded.version, 1);
}

#[test]
fn sequential_saves_bump_version_per_warehouse() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let store = open_store(&path);
    let warehouse_a = WarehouseId::new("warehouse-a");
    let warehouse_b = WarehouseId::new("warehouse-b");

    assert_eq!(store.save(&warehouse_a, &[item(0)]).expect("save").version, 1);
    assert_eq!(store.save(&warehouse_a, &[item(1)]).expect("save").version, 2);
    assert_eq!(store.save(&warehouse_a, &[]).expect("save").version, 3);
    // Versions are independent per warehouse.
    assert_eq!(store.save(&warehouse_b, &[item(0)]).expect("save").version, 1);
}

#[test]
fn saved_items_are_sanitized() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let store = open_store(&path);
    let mut oversized = item(0);
    oversized.width = 99;
    let saved = store.save(&WarehouseId::new("warehouse-a"), &[oversized]).expect("save");
    assert_eq!(saved.items[0].width, 10);
}

#[test]
fn over_cap_save_is_rejected() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let store = open_store(&path);
    let items: Vec<DecorItem> = (0 ..= MAX_LAYOUT_ITEMS).map(item).collect();
    let result = store.save(&WarehouseId::new("warehouse-a"), &items);
    assert!(matches!(result, Err(StoreError::Invalid(_))));
}

#[test]
fn corrupt_stored_json_fails_closed() {
    let (_dir, path) = temp_db();
    migrate(&path);
    let connection = Connection::open(&path).expect("open raw connection");
    connection
        .execute(
            "INSERT INTO warehouse_layouts (warehouse_id, version, updated_at, items_json) \
             VALUES (?1, ?2, ?3, ?4)",
            params!["warehouse-a", 3_i64, 1_600_000_000_000_i64, "{not json"],
        )
        .expect("seed corrupt row");
    drop(connection);

    let store = open_store(&path);
    let result = store.load(&WarehouseId::new("warehouse-a"));
    assert!(matches!(result, Err(StoreError::Corrupt(_))));
}

// ============================================================================
// SECTION: Legacy Shape
// ============================================================================

#[test]
fn legacy_layouts_pin_version_at_one() {
    let (_dir, path) = temp_db();
    let items_json = serde_json::to_string(&vec![item(0)]).expect("encode");
    seed_legacy_db(&path, "legacy-org", &items_json);
    let store = open_store_with_legacy_org(&path, "legacy-org");
    let warehouse = WarehouseId::new("warehouse-a");

    let loaded = store.load(&warehouse).expect("load");
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.items, vec![item(0)]);

    // Saves persist but never advance the version in legacy shape.
    let saved = store.save(&warehouse, &[item(0), item(1)]).expect("save");
    assert_eq!(saved.version, 1);
    assert_eq!(store.load(&warehouse).expect("reload").items.len(), 2);
    assert_eq!(store.load(&warehouse).expect("reload").version, 1);
}

#[test]
fn legacy_record_is_served_under_the_configured_org_id() {
    let (_dir, path) = temp_db();
    let items_json = serde_json::to_string(&vec![item(0)]).expect("encode");
    seed_legacy_db(&path, "legacy-org", &items_json);
    let store = open_store_with_legacy_org(&path, "legacy-org");

    // The deployment-wide record is visible regardless of the warehouse asked
    // for; the returned layout still carries the requested id.
    let loaded = store.load(&WarehouseId::new("warehouse-main")).expect("load");
    assert_eq!(loaded.items, vec![item(0)]);
    assert_eq!(loaded.warehouse_id, WarehouseId::new("warehouse-main"));
    assert_eq!(store.load(&WarehouseId::new("warehouse-b")).expect("load").items.len(), 1);
}

#[test]
fn legacy_saves_share_one_deployment_record() {
    let (_dir, path) = temp_db();
    seed_legacy_db(&path, "legacy-org", "[]");
    let store = open_store_with_legacy_org(&path, "legacy-org");

    store.save(&WarehouseId::new("warehouse-a"), &[item(0), item(1)]).expect("save");
    let seen_elsewhere = store.load(&WarehouseId::new("warehouse-b")).expect("load");
    assert_eq!(seen_elsewhere.items, vec![item(0), item(1)]);
}

// ============================================================================
// SECTION: Migration
// ============================================================================

#[test]
fn migration_copies_the_legacy_record_once() {
    let (_dir, path) = temp_db();
    let items_json = serde_json::to_string(&vec![item(0), item(1)]).expect("encode");
    seed_legacy_db(&path, "legacy-org", &items_json);

    assert_eq!(migrate(&path), 1);
    assert_eq!(migrate(&path), 0);

    // The deployment-wide record lands under the target warehouse id.
    let store = open_store(&path);
    assert_eq!(store.shape(), StorageShape::Versioned);
    let loaded = store.load(&WarehouseId::new("warehouse-main")).expect("load");
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.items.len(), 2);
}

#[test]
fn migration_ignores_records_under_other_org_ids() {
    let (_dir, path) = temp_db();
    seed_legacy_db(&path, "some-other-org", "[]");
    assert_eq!(migrate(&path), 0);
}
