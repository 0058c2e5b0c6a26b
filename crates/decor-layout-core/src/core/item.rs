// crates/decor-layout-core/src/core/item.rs
// ============================================================================
// Module: Decor Item Model & Sanitizer
// Description: Placed decor objects with invariant-enforcing normalization.
// Purpose: Guarantee every item entering memory or storage is sanitized.
// Dependencies: rand, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`DecorItem`] is one placed object (box, pallet, or shelf) on the
//! warehouse floor plan. Items arrive from placement tools, the network, or
//! legacy storage; regardless of origin every field is routed through the
//! clamping sanitizer before it becomes reachable.
//!
//! Batch parsing carries two intentionally different policies split by trust
//! boundary: the strict parser rejects a whole batch on the first invalid
//! element (server-side request validation), the lenient parser skips invalid
//! elements and keeps the rest (client-side local recovery).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum item size along any axis, in grid cells.
pub const SIZE_MIN: i64 = 1;
/// Maximum item size along any axis, in grid cells.
pub const SIZE_MAX: i64 = 10;
/// Default edge length for newly placed items.
pub const DEFAULT_ITEM_SIZE: i64 = 2;
/// Hard cap on items accepted in a single layout batch.
pub const MAX_LAYOUT_ITEMS: usize = 10_000;

// ============================================================================
// SECTION: Identifier
// ============================================================================

/// Opaque item identifier, stable for the lifetime of the placed object.
///
/// # Invariants
/// - Opaque UTF-8 string; no normalization or validation is applied by this type.
/// - Generated identifiers are unique with overwhelming probability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an item identifier from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh client-side identifier.
    #[must_use]
    pub fn generate() -> Self {
        let value: u128 = rand::thread_rng().r#gen();
        Self(format!("item-{value:032x}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Kind
// ============================================================================

/// Closed enumeration of placeable decor object kinds.
///
/// # Invariants
/// - Variants are stable for serialization; no other wire values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorKind {
    /// Storage box.
    Box,
    /// Wooden pallet.
    Pallet,
    /// Shelving unit.
    Shelf,
}

impl DecorKind {
    /// Returns the stable wire label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Pallet => "pallet",
            Self::Shelf => "shelf",
        }
    }
}

impl fmt::Display for DecorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Item
// ============================================================================

/// One placed decor object with position, footprint, and rotation.
///
/// # Invariants
/// - `x` and `z` are integer grid cells.
/// - `width`, `depth`, and `height` are within `[SIZE_MIN, SIZE_MAX]` once
///   sanitized.
/// - `rotation_y` is finite radians once sanitized; it is intentionally not
///   range-clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorItem {
    /// Opaque unique identifier, generated client-side.
    pub id: ItemId,
    /// Object kind.
    pub kind: DecorKind,
    /// Floor coordinate along the x axis, in grid cells.
    pub x: i64,
    /// Floor coordinate along the z axis, in grid cells.
    pub z: i64,
    /// Footprint width in grid cells.
    pub width: i64,
    /// Footprint depth in grid cells.
    pub depth: i64,
    /// Height in grid cells.
    pub height: i64,
    /// Rotation around the vertical axis, in radians.
    #[serde(rename = "rotationY")]
    pub rotation_y: f64,
}

impl DecorItem {
    /// Creates a sanitized item at the given floor position with default size.
    #[must_use]
    pub fn placed(kind: DecorKind, x: f64, z: f64) -> Self {
        Self {
            id: ItemId::generate(),
            kind,
            x: clamp_coord(x),
            z: clamp_coord(z),
            width: DEFAULT_ITEM_SIZE,
            depth: DEFAULT_ITEM_SIZE,
            height: DEFAULT_ITEM_SIZE,
            rotation_y: 0.0,
        }
    }

    /// Returns a copy with every field normalized by the sanitizer.
    ///
    /// Idempotent: sanitizing a sanitized item is a no-op.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind,
            x: self.x,
            z: self.z,
            width: self.width.clamp(SIZE_MIN, SIZE_MAX),
            depth: self.depth.clamp(SIZE_MIN, SIZE_MAX),
            height: self.height.clamp(SIZE_MIN, SIZE_MAX),
            rotation_y: if self.rotation_y.is_finite() {
                self.rotation_y
            } else {
                0.0
            },
        }
    }

    /// Returns a duplicate with a fresh identifier, offset by one grid cell.
    #[must_use]
    pub fn duplicated(&self) -> Self {
        Self {
            id: ItemId::generate(),
            x: self.x.saturating_add(1),
            z: self.z.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Partial update applied to an existing item through the inspector.
///
/// # Invariants
/// - `None` fields leave the current value unchanged.
/// - Applied values pass through the sanitizer clamps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DecorItemPatch {
    /// New x coordinate, if changed.
    pub x: Option<f64>,
    /// New z coordinate, if changed.
    pub z: Option<f64>,
    /// New width, if changed.
    pub width: Option<f64>,
    /// New depth, if changed.
    pub depth: Option<f64>,
    /// New height, if changed.
    pub height: Option<f64>,
    /// New rotation in radians, if changed.
    pub rotation_y: Option<f64>,
}

impl DecorItemPatch {
    /// Applies the patch to an item, clamping every written field.
    #[must_use]
    pub fn applied_to(&self, item: &DecorItem) -> DecorItem {
        let mut next = item.clone();
        if let Some(x) = self.x {
            next.x = clamp_coord(x);
        }
        if let Some(z) = self.z {
            next.z = clamp_coord(z);
        }
        if let Some(width) = self.width {
            next.width = clamp_size(width);
        }
        if let Some(depth) = self.depth {
            next.depth = clamp_size(depth);
        }
        if let Some(height) = self.height {
            next.height = clamp_size(height);
        }
        if let Some(rotation_y) = self.rotation_y {
            next.rotation_y = if rotation_y.is_finite() {
                rotation_y
            } else {
                0.0
            };
        }
        next
    }
}

// ============================================================================
// SECTION: Clamps
// ============================================================================

/// Rounds a floor coordinate to the nearest grid cell.
///
/// Non-finite input normalizes to `0`.
#[must_use]
pub fn clamp_coord(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    round_to_i64(value)
}

/// Rounds a size to the nearest grid cell, clamped to `[SIZE_MIN, SIZE_MAX]`.
///
/// Non-finite input normalizes to `SIZE_MIN`.
#[must_use]
pub fn clamp_size(value: f64) -> i64 {
    if !value.is_finite() {
        return SIZE_MIN;
    }
    round_to_i64(value).clamp(SIZE_MIN, SIZE_MAX)
}

/// Rounds a finite value and converts it to `i64`, saturating at the range
/// bounds.
fn round_to_i64(value: f64) -> i64 {
    // f64 cannot represent every i64 exactly; bound by powers of two that
    // round-trip losslessly.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    let rounded = value.round();
    if rounded >= MAX_EXACT {
        return 9_007_199_254_740_992;
    }
    if rounded <= -MAX_EXACT {
        return -9_007_199_254_740_992;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "value is rounded and bounded to the exactly-representable f64 integer range"
    )]
    let converted = rounded as i64;
    converted
}

// ============================================================================
// SECTION: Batch Parsing
// ============================================================================

/// Batch validation errors returned by the strict parser.
///
/// # Invariants
/// - Variants are stable for protocol error mapping and tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemBatchError {
    /// The candidate payload was not a JSON array.
    #[error("decor item batch is not an array")]
    NotAnArray,
    /// The batch exceeded the hard item cap.
    #[error("decor item batch has too many items: {actual} (max {max})")]
    TooManyItems {
        /// Maximum allowed item count.
        max: usize,
        /// Actual item count received.
        actual: usize,
    },
    /// One element failed shape validation, invalidating the whole batch.
    #[error("decor item at index {index} is invalid: {reason}")]
    InvalidItem {
        /// Zero-based index of the offending element.
        index: usize,
        /// Validation failure description.
        reason: String,
    },
}

/// Raw wire shape of an item before sanitization.
///
/// # Invariants
/// - Numeric fields are `f64` so out-of-range and fractional wire values are
///   observed before clamping.
#[derive(Debug, Deserialize)]
struct RawItem {
    /// Opaque item identifier.
    id: String,
    /// Object kind; unknown labels fail deserialization.
    kind: DecorKind,
    /// Raw x coordinate.
    x: f64,
    /// Raw z coordinate.
    z: f64,
    /// Raw width.
    width: f64,
    /// Raw depth.
    depth: f64,
    /// Raw height.
    height: f64,
    /// Raw rotation in radians.
    #[serde(rename = "rotationY")]
    rotation_y: f64,
}

impl RawItem {
    /// Validates the raw shape and returns the sanitized item.
    fn sanitize(self) -> Result<DecorItem, String> {
        if self.id.is_empty() {
            return Err("missing id".to_string());
        }
        for (label, value) in [
            ("x", self.x),
            ("z", self.z),
            ("width", self.width),
            ("depth", self.depth),
            ("height", self.height),
            ("rotationY", self.rotation_y),
        ] {
            if !value.is_finite() {
                return Err(format!("field {label} is not finite"));
            }
        }
        Ok(DecorItem {
            id: ItemId::new(self.id),
            kind: self.kind,
            x: clamp_coord(self.x),
            z: clamp_coord(self.z),
            width: clamp_size(self.width),
            depth: clamp_size(self.depth),
            height: clamp_size(self.height),
            rotation_y: self.rotation_y,
        })
    }
}

/// Parses one candidate element into a sanitized item.
fn parse_element(element: &Value) -> Result<DecorItem, String> {
    let raw: RawItem =
        serde_json::from_value(element.clone()).map_err(|err| err.to_string())?;
    raw.sanitize()
}

/// Parses a candidate batch with whole-batch rejection semantics.
///
/// Server-side trust boundary: the entire batch is invalid when the payload
/// is not an array, exceeds [`MAX_LAYOUT_ITEMS`], or any element fails shape
/// validation. Valid batches are returned fully sanitized.
///
/// # Errors
///
/// Returns [`ItemBatchError`] describing the first rejection cause.
pub fn parse_items_strict(value: &Value) -> Result<Vec<DecorItem>, ItemBatchError> {
    let elements = value.as_array().ok_or(ItemBatchError::NotAnArray)?;
    if elements.len() > MAX_LAYOUT_ITEMS {
        return Err(ItemBatchError::TooManyItems {
            max: MAX_LAYOUT_ITEMS,
            actual: elements.len(),
        });
    }
    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let item = parse_element(element).map_err(|reason| ItemBatchError::InvalidItem {
            index,
            reason,
        })?;
        items.push(item);
    }
    Ok(items)
}

/// Parses a candidate batch, silently skipping invalid elements.
///
/// Client-side trust boundary: local-state recovery must not brick the
/// editor over one bad record. Survivors are returned fully sanitized.
#[must_use]
pub fn parse_items_lenient(value: &Value) -> Vec<DecorItem> {
    let Some(elements) = value.as_array() else {
        return Vec::new();
    };
    elements
        .iter()
        .filter_map(|element| parse_element(element).ok())
        .collect()
}
