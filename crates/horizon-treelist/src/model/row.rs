//! Rows: identity, hierarchy links, cells and display state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{CellCollection, CellValue, Tag};

/// Counter for generating process-unique row keys.
static ROW_KEY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a row.
///
/// Keys are handed out in increasing order when a [`Row`] is created and
/// are never reused, even after the row is removed. Rows may be created on
/// any thread before being handed to a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(u64);

impl RowKey {
    fn next() -> Self {
        RowKey(ROW_KEY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw key value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The container a row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowContainer {
    /// The control's top-level row list.
    #[default]
    Root,
    /// The child list of another row.
    Row(RowKey),
}

impl From<RowKey> for RowContainer {
    fn from(key: RowKey) -> Self {
        RowContainer::Row(key)
    }
}

impl From<Option<RowKey>> for RowContainer {
    fn from(parent: Option<RowKey>) -> Self {
        parent.map_or(RowContainer::Root, RowContainer::Row)
    }
}

/// A node of the row hierarchy.
///
/// A row is created detached, then handed to a container of a control. The
/// control owns it from then on; `expanded` and `selected` change only
/// through the control so the row cache and selection stay in step.
#[derive(Debug)]
pub struct Row {
    key: RowKey,
    parent: Option<RowKey>,
    children: Vec<RowKey>,
    cells: CellCollection,
    expandable: Option<bool>,
    expanded: bool,
    selected: bool,
    tag: Option<Tag>,
}

impl Default for Row {
    fn default() -> Self {
        Self::new()
    }
}

impl Row {
    /// Creates a detached row with a fresh key.
    pub fn new() -> Self {
        Self {
            key: RowKey::next(),
            parent: None,
            children: Vec::new(),
            cells: CellCollection::new(),
            expandable: None,
            expanded: false,
            selected: false,
            tag: None,
        }
    }

    /// Creates a detached row holding the given cell values.
    pub fn with_cells<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut row = Self::new();
        for value in values {
            row.cells.add(value);
        }
        row
    }

    /// Sets the expandable override using builder pattern.
    pub fn with_expandable(mut self, expandable: bool) -> Self {
        self.expandable = Some(expandable);
        self
    }

    /// Sets the tag using builder pattern.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    /// The parent row, `None` for top-level (or detached) rows.
    pub fn parent(&self) -> Option<RowKey> {
        self.parent
    }

    /// The container this row lives in.
    pub fn container(&self) -> RowContainer {
        self.parent.into()
    }

    /// Child keys in insertion order.
    pub fn children(&self) -> &[RowKey] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn cells(&self) -> &CellCollection {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut CellCollection {
        &mut self.cells
    }

    /// Text of the first cell, or an empty string.
    pub fn text(&self) -> String {
        self.cells
            .get(0)
            .map(|cell| cell.value_as_string())
            .unwrap_or_default()
    }

    /// Whether the row shows an expander.
    ///
    /// Uses the explicit override when one is set, otherwise whether the row
    /// currently has children.
    pub fn is_expandable(&self) -> bool {
        self.expandable.unwrap_or(!self.children.is_empty())
    }

    /// The explicit expandable override, if any.
    pub fn expandable_override(&self) -> Option<bool> {
        self.expandable
    }

    /// Sets or clears the expandable override.
    ///
    /// Hosts that load children lazily mark unloaded folders with
    /// `Some(true)` so they show an expander before any child exists.
    pub fn set_expandable(&mut self, expandable: Option<bool>) {
        self.expandable = expandable;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    pub fn tag_mut(&mut self) -> Option<&mut Tag> {
        self.tag.as_mut()
    }

    pub fn set_tag(&mut self, tag: Option<Tag>) {
        self.tag = tag;
    }

    // =========================================================================
    // Crate-internal state changes
    // =========================================================================

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<RowKey>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<RowKey> {
        &mut self.children
    }

    /// Detaches the row after removal from its container.
    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.children.clear();
        self.selected = false;
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells.fmt(f)
    }
}
