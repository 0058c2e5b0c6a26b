// crates/decor-layout-core/tests/sanitizer.rs
// ============================================================================
// Module: Sanitizer Unit Tests
// Description: Clamp edge cases and batch parsing policies.
// Purpose: Validate the item invariants at both trust boundaries.
// ============================================================================

//! ## Overview
//! Unit tests for the item sanitizer and the two batch-parsing policies:
//! - Clamp edge cases for coordinates and sizes
//! - Sanitizer idempotence (property-based)
//! - Strict whole-batch rejection (server-side trust boundary)
//! - Lenient skip-and-keep recovery (client-side trust boundary)

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

use decor_layout_core::DecorItem;
use decor_layout_core::DecorKind;
use decor_layout_core::ItemBatchError;
use decor_layout_core::ItemId;
use decor_layout_core::MAX_LAYOUT_ITEMS;
use decor_layout_core::clamp_coord;
use decor_layout_core::clamp_size;
use decor_layout_core::parse_items_lenient;
use decor_layout_core::parse_items_strict;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn wire_item(id: &str, kind: &str) -> Value {
    json!({
        "id": id,
        "kind": kind,
        "x": 3,
        "z": 4,
        "width": 2,
        "depth": 2,
        "height": 2,
        "rotationY": 0.0,
    })
}

fn batch_of(count: usize) -> Value {
    let items: Vec<Value> = (0 .. count).map(|i| wire_item(&format!("item-{i}"), "box")).collect();
    Value::Array(items)
}

// ============================================================================
// SECTION: Clamp Edge Cases
// ============================================================================

#[test]
fn clamp_size_clamps_below_minimum() {
    assert_eq!(clamp_size(0.0), 1);
}

#[test]
fn clamp_size_clamps_above_maximum() {
    assert_eq!(clamp_size(11.0), 10);
}

#[test]
fn clamp_size_normalizes_non_finite() {
    assert_eq!(clamp_size(f64::NAN), 1);
    assert_eq!(clamp_size(f64::INFINITY), 1);
    assert_eq!(clamp_size(f64::NEG_INFINITY), 1);
}

#[test]
fn clamp_coord_normalizes_non_finite() {
    assert_eq!(clamp_coord(f64::NAN), 0);
}

#[test]
fn clamp_coord_rounds_to_nearest() {
    assert_eq!(clamp_coord(2.6), 3);
    assert_eq!(clamp_coord(2.4), 2);
    assert_eq!(clamp_coord(-2.6), -3);
}

// ============================================================================
// SECTION: Sanitizer Idempotence
// ============================================================================

proptest! {
    #[test]
    fn sanitize_is_idempotent(
        x in any::<i64>(),
        z in any::<i64>(),
        width in any::<i64>(),
        depth in any::<i64>(),
        height in any::<i64>(),
        rotation in any::<f64>(),
    ) {
        let item = DecorItem {
            id: ItemId::new("item-prop"),
            kind: DecorKind::Pallet,
            x,
            z,
            width,
            depth,
            height,
            rotation_y: rotation,
        };
        let once = item.sanitized();
        let twice = once.sanitized();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sanitized_sizes_are_in_range(width in any::<i64>()) {
        let item = DecorItem {
            id: ItemId::new("item-prop"),
            kind: DecorKind::Shelf,
            x: 0,
            z: 0,
            width,
            depth: 1,
            height: 1,
            rotation_y: 0.0,
        };
        let sanitized = item.sanitized();
        prop_assert!(sanitized.width >= 1 && sanitized.width <= 10);
    }
}

#[test]
fn sanitize_zeroes_non_finite_rotation() {
    let item = DecorItem {
        id: ItemId::new("item-1"),
        kind: DecorKind::Box,
        x: 0,
        z: 0,
        width: 2,
        depth: 2,
        height: 2,
        rotation_y: f64::NAN,
    };
    assert!((item.sanitized().rotation_y - 0.0).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Strict Batch Parsing
// ============================================================================

#[test]
fn strict_rejects_non_array() {
    let result = parse_items_strict(&json!({"items": []}));
    assert_eq!(result, Err(ItemBatchError::NotAnArray));
}

#[test]
fn strict_rejects_over_cap_batch() {
    let result = parse_items_strict(&batch_of(MAX_LAYOUT_ITEMS + 1));
    assert_eq!(
        result,
        Err(ItemBatchError::TooManyItems {
            max: MAX_LAYOUT_ITEMS,
            actual: MAX_LAYOUT_ITEMS + 1,
        })
    );
}

#[test]
fn strict_accepts_cap_sized_batch() {
    let items = parse_items_strict(&batch_of(MAX_LAYOUT_ITEMS)).expect("cap-sized batch");
    assert_eq!(items.len(), MAX_LAYOUT_ITEMS);
}

#[test]
fn strict_rejects_unknown_kind() {
    let batch = json!([wire_item("item-0", "box"), wire_item("item-1", "pallete")]);
    let Err(ItemBatchError::InvalidItem {
        index, ..
    }) = parse_items_strict(&batch)
    else {
        panic!("expected invalid item rejection");
    };
    assert_eq!(index, 1);
}

#[test]
fn strict_rejects_missing_id() {
    let mut item = wire_item("", "box");
    item["id"] = json!("");
    let result = parse_items_strict(&json!([item]));
    assert!(matches!(result, Err(ItemBatchError::InvalidItem { index: 0, .. })));
}

#[test]
fn strict_rejects_missing_numeric_field() {
    let mut item = wire_item("item-0", "box");
    item.as_object_mut().expect("object").remove("height");
    let result = parse_items_strict(&json!([item]));
    assert!(matches!(result, Err(ItemBatchError::InvalidItem { index: 0, .. })));
}

#[test]
fn strict_sanitizes_accepted_batch() {
    let batch = json!([{
        "id": "item-0",
        "kind": "shelf",
        "x": 2.6,
        "z": -2.6,
        "width": 0,
        "depth": 99,
        "height": 3.4,
        "rotationY": 1.5,
    }]);
    let items = parse_items_strict(&batch).expect("valid batch");
    assert_eq!(items[0].x, 3);
    assert_eq!(items[0].z, -3);
    assert_eq!(items[0].width, 1);
    assert_eq!(items[0].depth, 10);
    assert_eq!(items[0].height, 3);
    assert!((items[0].rotation_y - 1.5).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Lenient Batch Parsing
// ============================================================================

#[test]
fn lenient_skips_invalid_elements() {
    let batch = json!([
        wire_item("item-0", "box"),
        wire_item("item-1", "pallete"),
        {"garbage": true},
        wire_item("item-2", "shelf"),
    ]);
    let items = parse_items_lenient(&batch);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId::new("item-0"));
    assert_eq!(items[1].id, ItemId::new("item-2"));
}

#[test]
fn lenient_returns_empty_for_non_array() {
    assert!(parse_items_lenient(&json!("nope")).is_empty());
}
