// crates/decor-layout-core/src/session/machine.rs
// ============================================================================
// Module: Editing Session State Machine
// Description: Load/edit/save/exit orchestration with advisory save timers.
// Purpose: Keep bounded, reversible, crash-safe edits instantaneous and safe.
// Dependencies: crate::core, crate::interfaces, crate::session::history,
// serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`EditSession`] is an explicit per-editor object owning the current item
//! list, selection, tool, bounded history, and advisory timer. It drives the
//! sanitizer on every mutation and delegates load/save to a
//! [`LayoutGateway`], whose responses (or failures) drive state transitions.
//!
//! The phase is derived from underlying flags rather than stored as a single
//! enum field, but the derivation keeps the phases mutually exclusive in
//! effect. The advisory timer is host-ticked at 1 Hz while editing and emits
//! one-time nudge events at fixed thresholds; nothing is ever auto-saved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::core::item::DecorItem;
use crate::core::item::DecorItemPatch;
use crate::core::item::DecorKind;
use crate::core::item::ItemId;
use crate::core::item::parse_items_lenient;
use crate::core::layout::WarehouseId;
use crate::interfaces::GatewayError;
use crate::interfaces::LayoutGateway;
use crate::session::history::EditHistory;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Seconds of continuous editing before the one-time "recommend saving"
/// advisory fires.
pub const SAVE_RECOMMEND_AFTER_SECS: u32 = 270;
/// Seconds of continuous editing before the one-time stronger "please save"
/// advisory fires.
pub const SAVE_OVERDUE_AFTER_SECS: u32 = 300;

// ============================================================================
// SECTION: Phases and Events
// ============================================================================

/// Mutually exclusive session phases derived from the underlying flags.
///
/// # Invariants
/// - Variants are stable for host rendering and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Initial layout fetch is outstanding.
    Loading,
    /// Layout is installed; edit mode is off.
    Viewing,
    /// Edit mode is on; mutations are accepted.
    Editing,
    /// A save is in flight; re-entrant saves are rejected.
    Saving,
    /// The initial fetch failed; the user may retry the load.
    Error,
    /// Exit was requested with pending changes; awaiting confirm or cancel.
    ExitWarning,
}

impl SessionPhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Viewing => "viewing",
            Self::Editing => "editing",
            Self::Saving => "saving",
            Self::Error => "error",
            Self::ExitWarning => "exit_warning",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory events emitted by the session timer at fixed thresholds.
///
/// The presentation layer decides how to render them; the session never
/// forces a save or locks the editor out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryEvent {
    /// Fired once at [`SAVE_RECOMMEND_AFTER_SECS`].
    RecommendSave,
    /// Fired once at [`SAVE_OVERDUE_AFTER_SECS`].
    SaveOverdue,
}

/// Outcome of an exit request from edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Edit mode was left; selection and history were cleared.
    Exited,
    /// Pending changes exist; the session entered the exit warning phase.
    Warned,
}

/// Placement tool selected in the toolbar.
///
/// # Invariants
/// - Variants are stable for host toolbar bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecorTool {
    /// Pointer selection, no placement.
    #[default]
    Select,
    /// Place a storage box.
    PlaceBox,
    /// Place a pallet.
    PlacePallet,
    /// Place a shelving unit.
    PlaceShelf,
}

impl DecorTool {
    /// Returns the kind placed by this tool, when it places anything.
    #[must_use]
    pub const fn placed_kind(self) -> Option<DecorKind> {
        match self {
            Self::Select => None,
            Self::PlaceBox => Some(DecorKind::Box),
            Self::PlacePallet => Some(DecorKind::Pallet),
            Self::PlaceShelf => Some(DecorKind::Shelf),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session operation errors.
///
/// # Invariants
/// - Variants are stable for host error handling and tests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operation is not permitted in the current phase.
    #[error("operation not allowed in the {actual} phase")]
    InvalidPhase {
        /// Phase the session was in when the operation was attempted.
        actual: SessionPhase,
    },
    /// A save is already outstanding; the request is rejected, not queued.
    #[error("a save is already in flight")]
    SaveInFlight,
    /// The referenced item does not exist in the current list.
    #[error("unknown item id: {0}")]
    UnknownItem(ItemId),
    /// The persistence gateway reported a failure.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Per-editor session state machine.
///
/// # Invariants
/// - Every item in `items` has passed the sanitizer.
/// - Mutations record the pre-mutation snapshot before applying.
/// - A failed save never discards `items` or the history.
pub struct EditSession<G: LayoutGateway> {
    /// Persistence gateway for load/save delegation.
    gateway: G,
    /// Warehouse whose layout this session edits.
    warehouse_id: WarehouseId,
    /// Current sanitized item list.
    items: Vec<DecorItem>,
    /// Bounded undo/redo history.
    history: EditHistory,
    /// Currently selected item, if any.
    selected_id: Option<ItemId>,
    /// Active placement tool.
    tool: DecorTool,
    /// Initial fetch outstanding flag.
    loading: bool,
    /// Edit mode flag.
    edit_mode: bool,
    /// Save in flight flag; guards re-entrant saves.
    saving: bool,
    /// Exit warning flag; blocks exit while pending changes exist.
    exit_warning: bool,
    /// Failure message from the initial fetch, when it failed.
    load_error: Option<String>,
    /// Failure message from the most recent save, when it failed.
    save_error: Option<String>,
    /// Version of the last loaded or saved layout.
    layout_version: i64,
    /// Timestamp of the last loaded or saved layout.
    updated_at: Option<i64>,
    /// Seconds elapsed in the current editing stretch.
    edit_seconds: u32,
    /// One-time latch for the recommend-save advisory.
    recommend_fired: bool,
    /// One-time latch for the save-overdue advisory.
    overdue_fired: bool,
}

impl<G: LayoutGateway> EditSession<G> {
    /// Creates a session in the loading phase; call [`Self::load`] to fetch.
    #[must_use]
    pub const fn new(gateway: G, warehouse_id: WarehouseId) -> Self {
        Self {
            gateway,
            warehouse_id,
            items: Vec::new(),
            history: EditHistory::new(),
            selected_id: None,
            tool: DecorTool::Select,
            loading: true,
            edit_mode: false,
            saving: false,
            exit_warning: false,
            load_error: None,
            save_error: None,
            layout_version: 0,
            updated_at: None,
            edit_seconds: 0,
            recommend_fired: false,
            overdue_fired: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the derived session phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.load_error.is_some() {
            SessionPhase::Error
        } else if self.saving {
            SessionPhase::Saving
        } else if self.exit_warning {
            SessionPhase::ExitWarning
        } else if self.edit_mode {
            SessionPhase::Editing
        } else {
            SessionPhase::Viewing
        }
    }

    /// Returns the current sanitized item list.
    #[must_use]
    pub fn items(&self) -> &[DecorItem] {
        &self.items
    }

    /// Returns the selected item identifier, if any.
    #[must_use]
    pub const fn selected_id(&self) -> Option<&ItemId> {
        self.selected_id.as_ref()
    }

    /// Returns the selected item, if any.
    #[must_use]
    pub fn selected_item(&self) -> Option<&DecorItem> {
        let id = self.selected_id.as_ref()?;
        self.items.iter().find(|item| item.id == *id)
    }

    /// Returns the active placement tool.
    #[must_use]
    pub const fn tool(&self) -> DecorTool {
        self.tool
    }

    /// Returns the version of the last loaded or saved layout.
    #[must_use]
    pub const fn layout_version(&self) -> i64 {
        self.layout_version
    }

    /// Returns the timestamp of the last loaded or saved layout.
    #[must_use]
    pub const fn updated_at(&self) -> Option<i64> {
        self.updated_at
    }

    /// Returns the recorded load failure message, when the load failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Returns the most recent save failure message, when a save failed.
    #[must_use]
    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    /// Returns whether unsaved changes exist.
    ///
    /// Hosts use this for the best-effort native "unsaved changes" prompt on
    /// page close; it is a UX mitigation, not a durability guarantee.
    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        self.history.has_pending_changes()
    }

    /// Returns the bounded history for inspection.
    #[must_use]
    pub const fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Returns seconds elapsed in the current editing stretch.
    #[must_use]
    pub const fn edit_seconds(&self) -> u32 {
        self.edit_seconds
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Performs (or retries) the layout fetch.
    ///
    /// On success the items are installed, the history is reset, and the
    /// version and timestamp are recorded. On failure the session lands in
    /// the error phase with a message distinguishing timeout from generic
    /// failure; the item list is unchanged (empty on first load).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside the loading or error
    /// phases and [`SessionError::Gateway`] when the fetch fails.
    pub fn load(&mut self) -> Result<(), SessionError> {
        match self.phase() {
            SessionPhase::Loading | SessionPhase::Error => {}
            actual => {
                return Err(SessionError::InvalidPhase {
                    actual,
                });
            }
        }
        self.loading = true;
        self.load_error = None;
        match self.gateway.load(&self.warehouse_id) {
            Ok(layout) => {
                self.items = layout.items.iter().map(DecorItem::sanitized).collect();
                self.history.clear();
                self.selected_id = None;
                self.layout_version = layout.version;
                self.updated_at = layout.updated_at;
                self.loading = false;
                Ok(())
            }
            Err(error) => {
                self.load_error = Some(error.to_string());
                self.loading = false;
                Err(SessionError::Gateway(error))
            }
        }
    }

    // ------------------------------------------------------------------
    // Edit mode
    // ------------------------------------------------------------------

    /// Enables edit mode, starting the advisory timer at zero.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] unless the session is viewing.
    pub fn enter_edit(&mut self) -> Result<(), SessionError> {
        match self.phase() {
            SessionPhase::Viewing => {
                self.edit_mode = true;
                self.edit_seconds = 0;
                self.recommend_fired = false;
                self.overdue_fired = false;
                Ok(())
            }
            actual => Err(SessionError::InvalidPhase {
                actual,
            }),
        }
    }

    /// Requests leaving edit mode.
    ///
    /// Exits immediately when no pending changes exist; otherwise blocks the
    /// exit and enters the exit warning phase awaiting
    /// [`Self::confirm_discard`] or [`Self::cancel_exit`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] unless the session is editing.
    pub fn request_exit(&mut self) -> Result<ExitOutcome, SessionError> {
        match self.phase() {
            SessionPhase::Editing => {
                if self.history.has_pending_changes() {
                    self.exit_warning = true;
                    Ok(ExitOutcome::Warned)
                } else {
                    self.leave_edit_mode();
                    Ok(ExitOutcome::Exited)
                }
            }
            actual => Err(SessionError::InvalidPhase {
                actual,
            }),
        }
    }

    /// Confirms discarding pending changes and leaves edit mode.
    ///
    /// The edits remain in memory but were never persisted; selection and
    /// history are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside the exit warning phase.
    pub fn confirm_discard(&mut self) -> Result<(), SessionError> {
        match self.phase() {
            SessionPhase::ExitWarning => {
                self.exit_warning = false;
                self.leave_edit_mode();
                Ok(())
            }
            actual => Err(SessionError::InvalidPhase {
                actual,
            }),
        }
    }

    /// Cancels the exit warning and resumes editing.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside the exit warning phase.
    pub fn cancel_exit(&mut self) -> Result<(), SessionError> {
        match self.phase() {
            SessionPhase::ExitWarning => {
                self.exit_warning = false;
                Ok(())
            }
            actual => Err(SessionError::InvalidPhase {
                actual,
            }),
        }
    }

    /// Stops the timer and clears selection and history on exit.
    fn leave_edit_mode(&mut self) {
        self.edit_mode = false;
        self.edit_seconds = 0;
        self.selected_id = None;
        self.history.clear();
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Persists the current item list through the gateway.
    ///
    /// Re-entrant saves are rejected, not queued. On success the change
    /// counter and history are reset and the new version and timestamp are
    /// recorded; edit mode remains as the caller chooses. On failure the
    /// message is recorded and the local item list and history are left
    /// untouched so the operator can retry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SaveInFlight`] while a save is outstanding,
    /// [`SessionError::InvalidPhase`] outside edit mode, and
    /// [`SessionError::Gateway`] when the save fails.
    pub fn save(&mut self) -> Result<(), SessionError> {
        if self.saving {
            return Err(SessionError::SaveInFlight);
        }
        match self.phase() {
            SessionPhase::Editing => {}
            actual => {
                return Err(SessionError::InvalidPhase {
                    actual,
                });
            }
        }
        self.saving = true;
        let result = self.gateway.save(&self.warehouse_id, &self.items);
        self.saving = false;
        match result {
            Ok(layout) => {
                self.layout_version = layout.version;
                self.updated_at = layout.updated_at;
                self.history.clear();
                self.save_error = None;
                self.edit_seconds = 0;
                self.recommend_fired = false;
                self.overdue_fired = false;
                Ok(())
            }
            Err(error) => {
                self.save_error = Some(error.to_string());
                Err(SessionError::Gateway(error))
            }
        }
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Places a new item of the given kind at a floor position.
    ///
    /// The new item gets the default footprint, zero rotation, and becomes
    /// the selection. Returns the generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode.
    pub fn place_item(
        &mut self,
        kind: DecorKind,
        x: f64,
        z: f64,
    ) -> Result<ItemId, SessionError> {
        self.require_editing()?;
        self.history.record(self.items.clone());
        let item = DecorItem::placed(kind, x, z);
        let id = item.id.clone();
        self.selected_id = Some(id.clone());
        self.items.push(item);
        Ok(id)
    }

    /// Applies the active placement tool at a floor position.
    ///
    /// A selection tool is a no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode.
    pub fn apply_tool(&mut self, x: f64, z: f64) -> Result<Option<ItemId>, SessionError> {
        match self.tool.placed_kind() {
            Some(kind) => self.place_item(kind, x, z).map(Some),
            None => {
                self.require_editing()?;
                Ok(None)
            }
        }
    }

    /// Applies a field patch to an existing item.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode and
    /// [`SessionError::UnknownItem`] when the id is absent.
    pub fn update_item(
        &mut self,
        id: &ItemId,
        patch: DecorItemPatch,
    ) -> Result<(), SessionError> {
        self.require_editing()?;
        let index = self.index_of(id)?;
        self.history.record(self.items.clone());
        self.items[index] = patch.applied_to(&self.items[index]).sanitized();
        Ok(())
    }

    /// Duplicates an existing item with a fresh id and offset position.
    ///
    /// The duplicate becomes the selection. Returns the new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode and
    /// [`SessionError::UnknownItem`] when the id is absent.
    pub fn duplicate_item(&mut self, id: &ItemId) -> Result<ItemId, SessionError> {
        self.require_editing()?;
        let index = self.index_of(id)?;
        self.history.record(self.items.clone());
        let duplicate = self.items[index].duplicated();
        let new_id = duplicate.id.clone();
        self.selected_id = Some(new_id.clone());
        self.items.push(duplicate);
        Ok(new_id)
    }

    /// Removes an existing item, clearing the selection if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode and
    /// [`SessionError::UnknownItem`] when the id is absent.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(), SessionError> {
        self.require_editing()?;
        let index = self.index_of(id)?;
        self.history.record(self.items.clone());
        self.items.remove(index);
        if self.selected_id.as_ref() == Some(id) {
            self.selected_id = None;
        }
        Ok(())
    }

    /// Removes every item from the floor plan.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode.
    pub fn clear_items(&mut self) -> Result<(), SessionError> {
        self.require_editing()?;
        self.history.record(self.items.clone());
        self.items.clear();
        self.selected_id = None;
        Ok(())
    }

    /// Reverts the most recent mutation; a no-op on an empty undo stack.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        self.require_editing()?;
        match self.history.undo(&self.items) {
            Some(snapshot) => {
                self.items = snapshot;
                self.retain_selection();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reapplies the most recently undone mutation; a no-op on an empty redo
    /// stack.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside edit mode.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        self.require_editing()?;
        match self.history.redo(&self.items) {
            Some(snapshot) => {
                self.items = snapshot;
                self.retain_selection();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reconstructs local state from a JSON snapshot through the lenient
    /// parser, skipping invalid records.
    ///
    /// When editing, the pre-restore snapshot is recorded for undo.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidPhase`] outside the viewing or editing
    /// phases.
    pub fn restore_snapshot(&mut self, snapshot: &Value) -> Result<usize, SessionError> {
        match self.phase() {
            SessionPhase::Viewing => {}
            SessionPhase::Editing => self.history.record(self.items.clone()),
            actual => {
                return Err(SessionError::InvalidPhase {
                    actual,
                });
            }
        }
        self.items = parse_items_lenient(snapshot);
        self.retain_selection();
        Ok(self.items.len())
    }

    // ------------------------------------------------------------------
    // Selection and tool
    // ------------------------------------------------------------------

    /// Sets or clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownItem`] when the id is absent.
    pub fn select(&mut self, id: Option<ItemId>) -> Result<(), SessionError> {
        if let Some(id) = &id {
            self.index_of(id)?;
        }
        self.selected_id = id;
        Ok(())
    }

    /// Sets the active placement tool.
    pub const fn set_tool(&mut self, tool: DecorTool) {
        self.tool = tool;
    }

    // ------------------------------------------------------------------
    // Advisory timer
    // ------------------------------------------------------------------

    /// Advances the advisory timer by one second.
    ///
    /// Only active while editing; returns a one-time advisory event at the
    /// recommend and overdue thresholds. The counter resets every time
    /// editing is (re-)entered and after a successful save.
    pub fn tick_second(&mut self) -> Option<AdvisoryEvent> {
        if self.phase() != SessionPhase::Editing {
            return None;
        }
        self.edit_seconds = self.edit_seconds.saturating_add(1);
        if !self.recommend_fired && self.edit_seconds >= SAVE_RECOMMEND_AFTER_SECS {
            self.recommend_fired = true;
            return Some(AdvisoryEvent::RecommendSave);
        }
        if !self.overdue_fired && self.edit_seconds >= SAVE_OVERDUE_AFTER_SECS {
            self.overdue_fired = true;
            return Some(AdvisoryEvent::SaveOverdue);
        }
        None
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Ensures the session is in the editing phase.
    fn require_editing(&self) -> Result<(), SessionError> {
        match self.phase() {
            SessionPhase::Editing => Ok(()),
            actual => Err(SessionError::InvalidPhase {
                actual,
            }),
        }
    }

    /// Finds the index of an item by id.
    fn index_of(&self, id: &ItemId) -> Result<usize, SessionError> {
        self.items
            .iter()
            .position(|item| item.id == *id)
            .ok_or_else(|| SessionError::UnknownItem(id.clone()))
    }

    /// Drops the selection when the selected item no longer exists.
    fn retain_selection(&mut self) {
        if let Some(id) = &self.selected_id
            && !self.items.iter().any(|item| item.id == *id)
        {
            self.selected_id = None;
        }
    }
}
