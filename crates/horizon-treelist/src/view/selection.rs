//! Selection and focus state of the control.
//!
//! [`SelectionTracker`] owns the selected-row set and the focused row. It
//! knows nothing about the row tree: every operation returns the net
//! [`SelectionChange`] so the control can update row flags, repaint the
//! affected rows and notify listeners exactly once.

use std::collections::HashSet;

use crate::logging::targets;
use crate::model::RowKey;
use crate::view::KeyboardModifiers;

/// Selection behavior mode of the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionMode {
    /// Rows cannot be selected.
    None,
    /// At most one row is selected at a time (default).
    #[default]
    Single,
    /// Every toggle adds or removes one row independently.
    MultiSimple,
    /// Like `MultiSimple` while Control is held, otherwise like `Single`.
    MultiExtended,
}

impl SelectionMode {
    /// Returns `true` for the modes that allow several selected rows.
    pub fn is_multiple(self) -> bool {
        matches!(self, SelectionMode::MultiSimple | SelectionMode::MultiExtended)
    }
}

/// Net result of a selection operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    /// Rows that became selected, in selection order.
    pub selected: Vec<RowKey>,
    /// Rows that stopped being selected.
    pub deselected: Vec<RowKey>,
}

impl SelectionChange {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.deselected.is_empty()
    }

    /// Every row whose state changed.
    pub fn affected(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.selected.iter().chain(self.deselected.iter()).copied()
    }
}

/// Tracks selected rows and the focused row.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    mode: SelectionMode,

    /// Set of selected keys for O(1) lookup.
    selected_ids: HashSet<RowKey>,

    /// Selected keys in selection order.
    selected: Vec<RowKey>,

    /// The row with keyboard focus.
    focused: Option<RowKey>,
}

impl SelectionTracker {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    // =========================================================================
    // Selection Mode
    // =========================================================================

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switches mode, trimming the selection to what the new mode allows.
    ///
    /// `None` clears everything; `Single` keeps the earliest selected row.
    pub fn set_mode(&mut self, mode: SelectionMode) -> SelectionChange {
        self.mode = mode;
        let keep = match mode {
            SelectionMode::None => 0,
            SelectionMode::Single => 1,
            SelectionMode::MultiSimple | SelectionMode::MultiExtended => return SelectionChange::default(),
        };
        let dropped: Vec<RowKey> = self.selected.iter().skip(keep).copied().collect();
        self.deselect_all(&dropped)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_selected(&self, key: RowKey) -> bool {
        self.selected_ids.contains(&key)
    }

    /// Selected rows in selection order.
    pub fn selected(&self) -> &[RowKey] {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// The focused row.
    pub fn focused(&self) -> Option<RowKey> {
        self.focused
    }

    /// Moves focus; returns the previous focus if it changed.
    pub fn set_focused(&mut self, key: Option<RowKey>) -> Option<Option<RowKey>> {
        if self.focused == key {
            return None;
        }
        let previous = std::mem::replace(&mut self.focused, key);
        tracing::trace!(target: targets::SELECTION, ?previous, ?key, "focus moved");
        Some(previous)
    }

    // =========================================================================
    // Selection Operations
    // =========================================================================

    /// Sets a row's selected state the way the active mode dictates.
    ///
    /// In `Single` mode (and `MultiExtended` without Control) selecting a
    /// row deselects every other row, and deselecting it clears the whole
    /// selection.
    pub fn set_selected(
        &mut self,
        key: RowKey,
        selected: bool,
        modifiers: KeyboardModifiers,
    ) -> SelectionChange {
        match self.mode {
            SelectionMode::None => SelectionChange::default(),
            SelectionMode::Single => self.set_exclusive(key, selected),
            SelectionMode::MultiSimple => self.set_independent(key, selected),
            SelectionMode::MultiExtended if modifiers.control => self.set_independent(key, selected),
            SelectionMode::MultiExtended => self.set_exclusive(key, selected),
        }
    }

    /// Flips a row's selected state; see [`set_selected`](Self::set_selected).
    pub fn toggle(&mut self, key: RowKey, modifiers: KeyboardModifiers) -> SelectionChange {
        let selected = !self.is_selected(key);
        self.set_selected(key, selected, modifiers)
    }

    /// Adds every key to the selection; only in multi modes.
    pub fn select_all(&mut self, keys: impl IntoIterator<Item = RowKey>) -> SelectionChange {
        let mut change = SelectionChange::default();
        if !self.mode.is_multiple() {
            return change;
        }
        for key in keys {
            if self.insert(key) {
                change.selected.push(key);
            }
        }
        change
    }

    /// Deselects everything.
    pub fn clear(&mut self) -> SelectionChange {
        let deselected = std::mem::take(&mut self.selected);
        self.selected_ids.clear();
        SelectionChange {
            selected: Vec::new(),
            deselected,
        }
    }

    /// Drops rows that left the row cache from the selection and focus.
    ///
    /// Returns the selection change and the focused row if it was evicted.
    pub fn evict(&mut self, keys: &[RowKey]) -> (SelectionChange, Option<RowKey>) {
        let lost_focus = self.focused.filter(|focused| keys.contains(focused));
        if lost_focus.is_some() {
            self.focused = None;
        }
        let change = if self.selected.is_empty() {
            SelectionChange::default()
        } else {
            let evicted: HashSet<RowKey> = keys.iter().copied().collect();
            let hit: Vec<RowKey> = self
                .selected
                .iter()
                .copied()
                .filter(|key| evicted.contains(key))
                .collect();
            self.deselect_all(&hit)
        };
        if !change.is_empty() || lost_focus.is_some() {
            tracing::debug!(
                target: targets::SELECTION,
                deselected = change.deselected.len(),
                lost_focus = lost_focus.is_some(),
                "evicted rows"
            );
        }
        (change, lost_focus)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn set_exclusive(&mut self, key: RowKey, selected: bool) -> SelectionChange {
        let others: Vec<RowKey> = self
            .selected
            .iter()
            .copied()
            .filter(|&k| !(selected && k == key))
            .collect();
        let mut change = self.deselect_all(&others);
        if selected && self.insert(key) {
            change.selected.push(key);
        }
        change
    }

    fn set_independent(&mut self, key: RowKey, selected: bool) -> SelectionChange {
        let mut change = SelectionChange::default();
        if selected {
            if self.insert(key) {
                change.selected.push(key);
            }
        } else if self.selected_ids.remove(&key) {
            self.selected.retain(|&k| k != key);
            change.deselected.push(key);
        }
        change
    }

    fn insert(&mut self, key: RowKey) -> bool {
        if self.selected_ids.insert(key) {
            self.selected.push(key);
            true
        } else {
            false
        }
    }

    fn deselect_all(&mut self, keys: &[RowKey]) -> SelectionChange {
        let mut change = SelectionChange::default();
        for &key in keys {
            if self.selected_ids.remove(&key) {
                change.deselected.push(key);
            }
        }
        if !change.deselected.is_empty() {
            self.selected.retain(|k| self.selected_ids.contains(k));
        }
        change
    }
}
