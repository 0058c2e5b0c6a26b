// crates/decor-layout-core/src/session/mod.rs
// ============================================================================
// Module: Editing Session
// Description: Bounded undo/redo history and the session state machine.
// Purpose: Make bounded, reversible edits feel instantaneous and safe.
// Dependencies: crate::session::{history, machine}
// ============================================================================

//! ## Overview
//! Session-local editing state: the bounded snapshot history and the state
//! machine orchestrating load, edit, save, and exit. Everything here is
//! exclusively owned by one editing session and never shared across
//! sessions or tabs.

pub mod history;
pub mod machine;
