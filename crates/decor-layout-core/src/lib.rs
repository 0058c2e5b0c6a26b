// crates/decor-layout-core/src/lib.rs
// ============================================================================
// Module: Decor Layout Core
// Description: Domain model, editing session, and interface contracts.
// Purpose: Provide the backend-agnostic core of the decor layout editor.
// Dependencies: rand, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types and logic for the warehouse decor layout editor: the sanitized
//! item model, the bounded undo/redo history, the editing session state
//! machine, and the persistence interface traits implemented by concrete
//! stores and gateways. The core is synchronous and deterministic; hosts
//! supply clock ticks and perform I/O through the interfaces.
//!
//! Security posture: all items arriving over a wire or from storage are
//! untrusted and must pass the sanitizer before entering session state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod session;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::item::DEFAULT_ITEM_SIZE;
pub use crate::core::item::DecorItem;
pub use crate::core::item::DecorItemPatch;
pub use crate::core::item::DecorKind;
pub use crate::core::item::ItemBatchError;
pub use crate::core::item::ItemId;
pub use crate::core::item::MAX_LAYOUT_ITEMS;
pub use crate::core::item::SIZE_MAX;
pub use crate::core::item::SIZE_MIN;
pub use crate::core::item::clamp_coord;
pub use crate::core::item::clamp_size;
pub use crate::core::item::parse_items_lenient;
pub use crate::core::item::parse_items_strict;
pub use crate::core::layout::Layout;
pub use crate::core::layout::WarehouseId;
pub use crate::interfaces::GatewayError;
pub use crate::interfaces::LayoutGateway;
pub use crate::interfaces::LayoutStore;
pub use crate::interfaces::MIGRATION_REQUIRED_MESSAGE;
pub use crate::interfaces::StoreError;
pub use crate::session::history::EditHistory;
pub use crate::session::history::MAX_UNDO_DEPTH;
pub use crate::session::machine::AdvisoryEvent;
pub use crate::session::machine::DecorTool;
pub use crate::session::machine::EditSession;
pub use crate::session::machine::ExitOutcome;
pub use crate::session::machine::SAVE_OVERDUE_AFTER_SECS;
pub use crate::session::machine::SAVE_RECOMMEND_AFTER_SECS;
pub use crate::session::machine::SessionError;
pub use crate::session::machine::SessionPhase;
