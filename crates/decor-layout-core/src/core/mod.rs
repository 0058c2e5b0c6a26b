// crates/decor-layout-core/src/core/mod.rs
// ============================================================================
// Module: Decor Layout Core Model
// Description: Item and layout data model with invariant-enforcing parsing.
// Purpose: Group the sanitized domain types shared across crates.
// Dependencies: crate::core::{item, layout}
// ============================================================================

//! ## Overview
//! Data model for placed decor objects and the persisted layout unit. All
//! constructors and parsers route values through the sanitizer so no
//! unclamped or non-finite field can exist at rest or in memory.

pub mod item;
pub mod layout;
