// crates/decor-layout-store-sqlite/src/lib.rs
// ============================================================================
// Module: Decor Layout SQLite Store Crate
// Description: Durable LayoutStore backed by SQLite.
// Purpose: Persist versioned warehouse layouts with a legacy fallback shape.
// Dependencies: decor-layout-core, rusqlite, serde, serde_json
// ============================================================================

//! ## Overview
//! SQLite-backed implementation of the layout store contract. The store
//! probes the database shape once at startup and speaks either the versioned
//! table or the legacy single-version table for its whole lifetime; when
//! neither exists it refuses to start until the migration is run.

pub mod store;

pub use store::DEFAULT_LEGACY_ORG_ID;
pub use store::SqliteJournalMode;
pub use store::SqliteLayoutStore;
pub use store::SqliteLayoutStoreConfig;
pub use store::SqliteSyncMode;
pub use store::StorageShape;
pub use store::run_migration;
