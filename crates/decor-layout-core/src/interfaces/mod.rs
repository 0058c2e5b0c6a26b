// crates/decor-layout-core/src/interfaces/mod.rs
// ============================================================================
// Module: Decor Layout Interfaces
// Description: Backend-agnostic interfaces for layout persistence.
// Purpose: Define the contract surfaces between session, gateway, and store.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the editing session and the HTTP service integrate
//! with concrete persistence backends without embedding backend-specific
//! details. Implementations must fail closed on missing or invalid data.
//!
//! Security posture: interface implementations consume untrusted inputs;
//! responses must be sanitized before entering session state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::item::DecorItem;
use crate::core::layout::Layout;
use crate::core::layout::WarehouseId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed, actionable message returned when the layout storage tables are
/// absent entirely. Distinct from generic failures so operators know to run
/// the migration rather than retry.
pub const MIGRATION_REQUIRED_MESSAGE: &str =
    "layout storage is not initialized; run the decor layout migration before loading or saving \
     layouts";

// ============================================================================
// SECTION: Layout Store
// ============================================================================

/// Layout store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - [`StoreError::MigrationRequired`] always renders
///   [`MIGRATION_REQUIRED_MESSAGE`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing tables are absent; the operator must run the migration.
    #[error(
        "layout storage is not initialized; run the decor layout migration before loading or \
         saving layouts"
    )]
    MigrationRequired,
    /// Database engine error.
    #[error("layout store db error: {0}")]
    Db(String),
    /// Stored data failed to decode.
    #[error("layout store corruption: {0}")]
    Corrupt(String),
    /// Invalid store configuration or data.
    #[error("layout store invalid data: {0}")]
    Invalid(String),
}

/// Versioned layout store keyed by warehouse identifier.
pub trait LayoutStore {
    /// Loads the layout for a warehouse.
    ///
    /// A warehouse with no stored record yields [`Layout::empty`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, warehouse_id: &WarehouseId) -> Result<Layout, StoreError>;

    /// Replaces the full item list for a warehouse and bumps its version.
    ///
    /// Optimistic, not transactional: the new version is computed from the
    /// currently stored one without checking the writer's assumed prior
    /// version; the last successful write wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, warehouse_id: &WarehouseId, items: &[DecorItem]) -> Result<Layout, StoreError>;
}

// ============================================================================
// SECTION: Layout Gateway
// ============================================================================

/// Gateway errors observed by the editing session.
///
/// # Invariants
/// - Variants are stable for session error classification.
/// - [`GatewayError::Timeout`] is distinguished from generic transport
///   failures so the session can surface a precise load-timeout message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The load request exceeded its cancellation window.
    #[error("layout request timed out after {0} seconds")]
    Timeout(u64),
    /// Network or protocol failure.
    #[error("layout transport error: {0}")]
    Transport(String),
    /// The server rejected the request as invalid (oversized or malformed).
    #[error("layout request rejected: {0}")]
    Validation(String),
    /// The server reported that storage requires migration.
    #[error("{0}")]
    StorageUnavailable(String),
}

/// Client-side persistence gateway driven by the editing session.
pub trait LayoutGateway {
    /// Fetches the current layout for a warehouse.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the fetch fails or times out.
    fn load(&self, warehouse_id: &WarehouseId) -> Result<Layout, GatewayError>;

    /// Persists a full replacement item list for a warehouse.
    ///
    /// An in-flight save is not cancellable; it runs to completion or
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the save fails.
    fn save(&self, warehouse_id: &WarehouseId, items: &[DecorItem])
    -> Result<Layout, GatewayError>;
}
