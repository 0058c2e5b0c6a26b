// crates/decor-layout-core/src/core/layout.rs
// ============================================================================
// Module: Persisted Layout Unit
// Description: Versioned layout record keyed by warehouse identifier.
// Purpose: Provide the stable wire and storage shape for saved arrangements.
// Dependencies: crate::core::item, serde
// ============================================================================

//! ## Overview
//! A [`Layout`] is the persisted unit: the full item list for one warehouse
//! plus a monotonically increasing version and the last save timestamp.
//! Item order is insertion order and carries no semantic meaning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::item::DecorItem;

// ============================================================================
// SECTION: Warehouse Identifier
// ============================================================================

/// Warehouse identifier keying one persisted layout.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(String);

impl WarehouseId {
    /// Creates a new warehouse identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for WarehouseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WarehouseId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Persisted arrangement for one warehouse.
///
/// # Invariants
/// - `version` is a positive integer, monotonically increasing per
///   successful save for a given warehouse (legacy storage pins it at `1`).
/// - `updated_at` is unix milliseconds of the last save, `None` before the
///   first save.
/// - Every element of `items` has passed the sanitizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Warehouse identifier keying this layout.
    pub warehouse_id: WarehouseId,
    /// Layout version, starting at 1.
    pub version: i64,
    /// Unix-millisecond timestamp of the last save, when known.
    pub updated_at: Option<i64>,
    /// Full item list, replaced wholesale on every save.
    pub items: Vec<DecorItem>,
}

impl Layout {
    /// Returns the empty first-version layout for a warehouse with no stored
    /// record.
    #[must_use]
    pub const fn empty(warehouse_id: WarehouseId) -> Self {
        Self {
            warehouse_id,
            version: 1,
            updated_at: None,
            items: Vec::new(),
        }
    }
}
