//! The tree/list control facade.
//!
//! [`TreeListControl`] owns the row tree, the row cache, the columns, the
//! viewport and the selection, and keeps them consistent across every
//! structural edit, expansion change and input event.
//!
//! # Example
//!
//! ```
//! use horizon_treelist::{Row, RowContainer, TreeListControl};
//!
//! let mut control = TreeListControl::default();
//! let docs = control.rows_mut(RowContainer::Root).add(Row::with_cells(["docs"])).unwrap();
//! control.rows_mut(docs.into()).add(Row::with_cells(["guide.md"])).unwrap();
//!
//! assert_eq!(control.visible_row_count(), 1);
//! control.expand(docs).unwrap();
//! assert_eq!(control.visible_row_count(), 2);
//! ```
//!
//! # Signals
//!
//! - `row_expanded` / `row_collapsed`: a row's expansion state changed
//! - `row_activated`: Enter was pressed on a row that cannot expand
//! - `selection_changed`: the net change of one selection operation
//! - `focus_changed`: the focused row moved
//!
//! Every signal is emitted after the control's state is consistent again. A
//! slot returning [`Propagation::Suppress`](crate::signal::Propagation)
//! vetoes the repaint the control would otherwise record for it.

use std::collections::HashSet;

use crate::config::TreeListConfig;
use crate::damage::{Damage, DamageTracker};
use crate::config::MAX_LAYOUT_SIZE;
use crate::error::{Result, TreeListError, ensure_at_most, ensure_layout_size, ensure_positive};
use crate::geometry::{Point, Rect, Size, clamp_extent};
use crate::logging::{CacheTreeDebug, span_names, targets};
use crate::model::{ColumnCollection, Row, RowContainer, RowKey, RowTree};
use crate::signal::Signal;
use crate::view::{
    ColumnsMut, Key, KeyboardModifiers, Metrics, MouseButton, RowCache, RowsMut, SelectionChange,
    SelectionMode, SelectionTracker, Viewport,
};

/// Arguments of the row expansion signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowEvent {
    /// The row whose state changed.
    pub key: RowKey,
}

/// Arguments of the focus signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    pub previous: Option<RowKey>,
    pub current: Option<RowKey>,
}

/// Pointer feedback for the host's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    /// Over a column border, or dragging one.
    ResizeColumn,
    /// Over the expander of an expandable row.
    Expander,
}

/// One row of the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow {
    /// Position in the row cache.
    pub position: usize,
    pub key: RowKey,
    /// Hierarchy depth; roots are level 0.
    pub level: usize,
    /// Row bounds in client coordinates.
    pub bounds: Rect,
}

#[derive(Debug, Clone, Copy)]
struct ColumnResize {
    column: usize,
    origin_x: i32,
    origin_width: i32,
}

/// A virtualized tree/list control.
pub struct TreeListControl {
    config: TreeListConfig,
    metrics: Metrics,
    tree: RowTree,
    cache: RowCache,
    pub(crate) columns: ColumnCollection,
    selection: SelectionTracker,
    viewport: Viewport,
    damage: DamageTracker,
    hovered: Option<RowKey>,
    has_focus: bool,
    resize: Option<ColumnResize>,

    /// Emitted after a row was expanded.
    pub row_expanded: Signal<RowEvent>,
    /// Emitted after a row was collapsed.
    pub row_collapsed: Signal<RowEvent>,
    /// Emitted when Enter is pressed on a row that cannot expand.
    pub row_activated: Signal<RowEvent>,
    /// Emitted with the net change of each selection operation.
    pub selection_changed: Signal<SelectionChange>,
    /// Emitted when the focused row moves.
    pub focus_changed: Signal<FocusChange>,
}

static_assertions::assert_impl_all!(TreeListControl: Send, Sync);

impl Default for TreeListControl {
    fn default() -> Self {
        Self::from_valid_config(TreeListConfig::default())
    }
}

impl TreeListControl {
    /// Creates a control, rejecting invalid sizes in `config`.
    pub fn new(config: TreeListConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TreeListConfig) -> Self {
        Self {
            metrics: Metrics::from_config(&config),
            columns: ColumnCollection::new(&config),
            selection: SelectionTracker::new(config.selection_mode),
            config,
            tree: RowTree::new(),
            cache: RowCache::new(),
            viewport: Viewport::default(),
            damage: DamageTracker::new(),
            hovered: None,
            has_focus: false,
            resize: None,
            row_expanded: Signal::new(),
            row_collapsed: Signal::new(),
            row_activated: Signal::new(),
            selection_changed: Signal::new(),
            focus_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The active settings.
    pub fn config(&self) -> &TreeListConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Every row, visible or not.
    pub fn tree(&self) -> &RowTree {
        &self.tree
    }

    /// The flattened visible rows.
    pub fn cache(&self) -> &RowCache {
        &self.cache
    }

    pub fn columns(&self) -> &ColumnCollection {
        &self.columns
    }

    /// Mutable access to the columns; layout is refreshed when the guard drops.
    pub fn columns_mut(&mut self) -> ColumnsMut<'_> {
        ColumnsMut::new(self)
    }

    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.tree.get(key)
    }

    /// Total number of rows.
    pub fn row_count(&self) -> usize {
        self.tree.len()
    }

    /// Number of rows in the row cache.
    pub fn visible_row_count(&self) -> usize {
        self.cache.len()
    }

    /// Keys of the rows in `container`.
    pub fn rows(&self, container: RowContainer) -> Result<&[RowKey]> {
        self.tree.children_of(container)
    }

    /// A handle for editing the rows of `container`.
    ///
    /// Operations on the handle fail with [`TreeListError::UnknownRow`] if
    /// the container is a row that does not exist.
    pub fn rows_mut(&mut self, container: RowContainer) -> RowsMut<'_> {
        RowsMut::new(self, container)
    }

    /// Edits a row's cells, tag or expander override and repaints it.
    pub fn modify_row<F, R>(&mut self, key: RowKey, f: F) -> Result<R>
    where
        F: FnOnce(&mut Row) -> R,
    {
        let row = self.tree.row_mut(key)?;
        let result = f(row);
        self.damage_row(key);
        Ok(result)
    }

    /// The text dump of the row cache.
    pub fn debug_tree(&self) -> String {
        CacheTreeDebug::new().format(&self.cache, &self.tree)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    pub(crate) fn insert_row(
        &mut self,
        container: RowContainer,
        index: Option<usize>,
        row: Row,
    ) -> Result<RowKey> {
        let index = match index {
            Some(index) => index,
            None => self.tree.children_of(container)?.len(),
        };
        let was_empty = self.cache.is_empty();
        let key = self.tree.insert(container, index, row)?;
        let inserted = self.cache.insert_row(&self.tree, key);
        tracing::debug!(
            target: targets::CONTROL,
            %key,
            ?container,
            index,
            visible = inserted.is_some(),
            "row inserted"
        );

        if inserted.is_some() {
            self.layout_changed();
        } else if let RowContainer::Row(parent) = container {
            // The parent may have just gained its expander.
            self.damage_row(parent);
        }
        if was_empty && !self.cache.is_empty() {
            self.focus_row(Some(key), false);
        }
        Ok(key)
    }

    pub(crate) fn remove_row(&mut self, container: RowContainer, key: RowKey) -> Result<Row> {
        if self.tree.row(key)?.container() != container {
            return Err(TreeListError::UnknownRow(key));
        }

        let start = self.cache.position_of(key);
        let removed = self.cache.remove_row(key);
        let row = self.tree.remove(key).ok_or(TreeListError::UnknownRow(key))?;
        tracing::debug!(target: targets::CONTROL, %key, evicted = removed.len(), "row removed");

        // Focus falls to the row that took the removed row's place, else the
        // one before it.
        let fallback = start.and_then(|start| {
            self.cache
                .get(start)
                .or_else(|| start.checked_sub(1).and_then(|previous| self.cache.get(previous)))
                .map(|entry| entry.key)
        });
        self.evict(&removed, fallback);

        if !removed.is_empty() {
            self.layout_changed();
        } else if let RowContainer::Row(parent) = container {
            self.damage_row(parent);
        }
        Ok(row)
    }

    pub(crate) fn clear_rows(&mut self, container: RowContainer) -> Result<()> {
        match container {
            RowContainer::Root => {
                let removed = self.cache.clear();
                self.tree.clear();
                tracing::debug!(target: targets::CONTROL, evicted = removed.len(), "rows cleared");
                self.evict(&removed, None);
                self.layout_changed();
            }
            RowContainer::Row(_) => {
                let children = self.tree.children_of(container)?.to_vec();
                for key in children {
                    self.remove_row(container, key)?;
                }
            }
        }
        Ok(())
    }

    /// Drops evicted rows from hover, selection and focus.
    fn evict(&mut self, removed: &[RowKey], fallback: Option<RowKey>) {
        if removed.is_empty() {
            return;
        }
        if self.hovered.is_some_and(|hovered| removed.contains(&hovered)) {
            self.hovered = None;
        }

        let (change, lost_focus) = self.selection.evict(removed);
        self.apply_selection(change);

        if let Some(lost) = lost_focus {
            self.selection.set_focused(fallback);
            let suppressed = self
                .focus_changed
                .emit(FocusChange {
                    previous: Some(lost),
                    current: fallback,
                })
                .is_suppressed();
            if !suppressed && let Some(fallback) = fallback {
                self.damage_row(fallback);
            }
        }
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    pub fn is_expanded(&self, key: RowKey) -> bool {
        self.tree.get(key).is_some_and(Row::is_expanded)
    }

    /// Expands a row.
    ///
    /// A hidden row is only marked expanded; its children appear once the
    /// row itself becomes visible. Returns `false` if it was already expanded.
    pub fn expand(&mut self, key: RowKey) -> Result<bool> {
        let row = self.tree.row_mut(key)?;
        if row.is_expanded() {
            self.damage_expander(key);
            return Ok(false);
        }
        row.set_expanded(true);
        let inserted = self.cache.expand_row(&self.tree, key);
        tracing::debug!(
            target: targets::CONTROL,
            %key,
            added = inserted.as_ref().map_or(0, |range| range.len()),
            "row expanded"
        );

        self.clamp_offsets();
        if !self.row_expanded.emit(RowEvent { key }).is_suppressed() {
            if inserted.is_some() {
                self.damage.invalidate_all();
            } else {
                self.damage_row(key);
            }
        }
        Ok(true)
    }

    /// Collapses a row, evicting its visible subtree.
    ///
    /// Focus inside the subtree moves to the row itself. Returns `false` if
    /// it was already collapsed.
    pub fn collapse(&mut self, key: RowKey) -> Result<bool> {
        let row = self.tree.row_mut(key)?;
        if !row.is_expanded() {
            self.damage_expander(key);
            return Ok(false);
        }
        row.set_expanded(false);
        let removed = self.cache.collapse_row(key);
        tracing::debug!(target: targets::CONTROL, %key, evicted = removed.len(), "row collapsed");

        let fallback = self.cache.contains(key).then_some(key);
        self.evict(&removed, fallback);
        self.clamp_offsets();
        if !self.row_collapsed.emit(RowEvent { key }).is_suppressed() {
            if removed.is_empty() {
                self.damage_row(key);
            } else {
                self.damage.invalidate_all();
            }
        }
        Ok(true)
    }

    pub fn set_expanded(&mut self, key: RowKey, expanded: bool) -> Result<bool> {
        if expanded {
            self.expand(key)
        } else {
            self.collapse(key)
        }
    }

    pub fn toggle_expanded(&mut self, key: RowKey) -> Result<bool> {
        let expanded = self.tree.row(key)?.is_expanded();
        self.set_expanded(key, !expanded)
    }

    /// Expands every expandable row.
    ///
    /// Rows that receive children afterwards (lazy population) are not
    /// expanded by the same call.
    pub fn expand_all(&mut self) {
        let _span =
            tracing::debug_span!(target: targets::CONTROL, "bulk", operation = span_names::EXPAND_ALL)
                .entered();
        let expanded = self.mark_expanded(self.tree.descendants(RowContainer::Root).collect());
        if expanded.is_empty() {
            return;
        }
        self.cache.rebuild(&self.tree);
        self.layout_changed();
        for key in expanded {
            self.row_expanded.emit(RowEvent { key });
        }
    }

    /// Collapses every row; focus moves to the root of its branch.
    pub fn collapse_all(&mut self) {
        let _span =
            tracing::debug_span!(target: targets::CONTROL, "bulk", operation = span_names::COLLAPSE_ALL)
                .entered();
        let collapsed: Vec<RowKey> = self
            .tree
            .descendants(RowContainer::Root)
            .filter(|&key| self.is_expanded(key))
            .collect();
        if collapsed.is_empty() {
            return;
        }
        for &key in &collapsed {
            if let Some(row) = self.tree.get_mut(key) {
                row.set_expanded(false);
            }
        }

        let before: Vec<RowKey> = self.cache.keys().collect();
        self.cache.rebuild(&self.tree);
        let removed: Vec<RowKey> = before
            .into_iter()
            .filter(|&key| !self.cache.contains(key))
            .collect();
        let fallback = self
            .selection
            .focused()
            .map(|focused| self.tree.ancestors(focused).last().unwrap_or(focused));
        self.evict(&removed, fallback);
        self.layout_changed();
        for key in collapsed {
            self.row_collapsed.emit(RowEvent { key });
        }
    }

    /// Expands a row and every row below it.
    pub fn expand_hierarchy(&mut self, key: RowKey) -> Result<()> {
        self.tree.row(key)?;
        let candidates: Vec<RowKey> = std::iter::once(key)
            .chain(self.tree.descendants(key.into()))
            .collect();
        let expanded = self.mark_expanded(candidates);
        if expanded.is_empty() {
            return Ok(());
        }
        if self.cache.contains(key) {
            // Everything collapsed here comes straight back, so nothing is
            // evicted.
            self.cache.collapse_row(key);
            self.cache.expand_row(&self.tree, key);
            self.layout_changed();
        }
        for key in expanded {
            self.row_expanded.emit(RowEvent { key });
        }
        Ok(())
    }

    /// Collapses a row and every row below it.
    ///
    /// Focus inside the subtree moves to the row itself, or to its nearest
    /// visible ancestor when the row is hidden.
    pub fn collapse_hierarchy(&mut self, key: RowKey) -> Result<()> {
        self.tree.row(key)?;
        let collapsed: Vec<RowKey> = std::iter::once(key)
            .chain(self.tree.descendants(key.into()))
            .filter(|&key| self.is_expanded(key))
            .collect();
        if collapsed.is_empty() {
            return Ok(());
        }
        for &key in &collapsed {
            if let Some(row) = self.tree.get_mut(key) {
                row.set_expanded(false);
            }
        }

        let removed = self.cache.collapse_row(key);
        tracing::debug!(
            target: targets::CONTROL,
            %key,
            collapsed = collapsed.len(),
            evicted = removed.len(),
            "hierarchy collapsed"
        );
        let fallback = self.cache.contains(key).then_some(key);
        self.evict(&removed, fallback);
        self.layout_changed();
        for key in collapsed {
            self.row_collapsed.emit(RowEvent { key });
        }
        Ok(())
    }

    /// Marks the expandable, collapsed rows among `keys` expanded.
    fn mark_expanded(&mut self, keys: Vec<RowKey>) -> Vec<RowKey> {
        let mut expanded = Vec::new();
        for key in keys {
            if let Some(row) = self.tree.get_mut(key)
                && row.is_expandable()
                && !row.is_expanded()
            {
                row.set_expanded(true);
                expanded.push(key);
            }
        }
        expanded
    }

    /// Expands every collapsed ancestor, then scrolls the row into view.
    pub fn ensure_row_visible(&mut self, key: RowKey) -> Result<()> {
        self.expand_ancestors(key)?;
        self.scroll_to_row(key);
        Ok(())
    }

    /// Expands every collapsed ancestor of a row, outermost first, so the
    /// row enters the cache. The row's own state is left alone.
    pub fn expand_ancestors(&mut self, key: RowKey) -> Result<()> {
        self.tree.row(key)?;
        let mut ancestors: Vec<RowKey> = self.tree.ancestors(key).collect();
        ancestors.reverse();
        for ancestor in ancestors {
            self.expand(ancestor)?;
        }
        Ok(())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    /// Changes the mode; `None` clears the selection and `Single` keeps the
    /// earliest selected row.
    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        let change = self.selection.set_mode(mode);
        self.config.selection_mode = mode;
        self.apply_selection(change);
    }

    pub fn is_selected(&self, key: RowKey) -> bool {
        self.selection.is_selected(key)
    }

    /// Selected rows in selection order.
    pub fn selected_rows(&self) -> &[RowKey] {
        self.selection.selected()
    }

    /// Selects or deselects a row without modifiers.
    pub fn set_row_selected(&mut self, key: RowKey, selected: bool) -> Result<()> {
        self.set_row_selected_with(key, selected, KeyboardModifiers::NONE)
    }

    /// Selects or deselects a row as an input event with `modifiers` would.
    ///
    /// Selecting a hidden row expands its ancestors first.
    pub fn set_row_selected_with(
        &mut self,
        key: RowKey,
        selected: bool,
        modifiers: KeyboardModifiers,
    ) -> Result<()> {
        self.tree.row(key)?;
        if !self.cache.contains(key) {
            if !selected || self.selection.mode() == SelectionMode::None {
                return Ok(());
            }
            self.expand_ancestors(key)?;
        }
        let change = self.selection.set_selected(key, selected, modifiers);
        self.apply_selection(change);
        Ok(())
    }

    pub fn toggle_row_selected(&mut self, key: RowKey, modifiers: KeyboardModifiers) -> Result<()> {
        let selected = !self.selection.is_selected(key);
        self.set_row_selected_with(key, selected, modifiers)
    }

    /// Selects every visible row; only in the multi modes.
    pub fn select_all(&mut self) {
        let change = self.selection.select_all(self.cache.keys().collect::<Vec<_>>());
        self.apply_selection(change);
    }

    pub fn clear_selection(&mut self) {
        let change = self.selection.clear();
        self.apply_selection(change);
    }

    /// Writes a selection change through to the rows and notifies listeners.
    fn apply_selection(&mut self, change: SelectionChange) {
        if change.is_empty() {
            return;
        }
        for &key in &change.selected {
            if let Some(row) = self.tree.get_mut(key) {
                row.set_selected(true);
            }
        }
        for &key in &change.deselected {
            if let Some(row) = self.tree.get_mut(key) {
                row.set_selected(false);
            }
        }
        tracing::debug!(
            target: targets::SELECTION,
            selected = change.selected.len(),
            deselected = change.deselected.len(),
            "selection changed"
        );

        let affected: Vec<RowKey> = change.affected().collect();
        if !self.selection_changed.emit(change).is_suppressed() {
            for key in affected {
                self.damage_row(key);
            }
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focused_row(&self) -> Option<RowKey> {
        self.selection.focused()
    }

    /// Moves focus to a row, expanding its ancestors and scrolling it into
    /// view.
    pub fn set_focused_row(&mut self, key: Option<RowKey>) -> Result<()> {
        if let Some(key) = key {
            self.expand_ancestors(key)?;
        }
        self.focus_row(key, true);
        Ok(())
    }

    /// Whether the control itself has keyboard focus.
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Records keyboard focus entering or leaving the control.
    pub fn set_has_focus(&mut self, has_focus: bool) {
        if self.has_focus != has_focus {
            self.has_focus = has_focus;
            if let Some(focused) = self.selection.focused() {
                self.damage_row(focused);
            }
        }
    }

    /// The row under the pointer.
    pub fn hovered_row(&self) -> Option<RowKey> {
        self.hovered
    }

    fn focus_row(&mut self, key: Option<RowKey>, reveal: bool) {
        if reveal && let Some(key) = key {
            self.scroll_to_row(key);
        }
        let Some(previous) = self.selection.set_focused(key) else {
            return;
        };
        let change = FocusChange {
            previous,
            current: key,
        };
        if !self.focus_changed.emit(change).is_suppressed() {
            for key in [previous, key].into_iter().flatten() {
                self.damage_row(key);
            }
        }
    }

    // =========================================================================
    // Viewport and Geometry
    // =========================================================================

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport.size()
    }

    /// Resizes the client area.
    pub fn set_viewport_size(&mut self, size: Size) {
        if self.viewport.size() == size {
            return;
        }
        self.viewport.set_size(size);
        self.damage.set_viewport(self.viewport.client_rect());
        self.layout_changed();
    }

    pub fn extent_width(&self) -> i32 {
        self.columns.extent_width()
    }

    pub fn extent_height(&self) -> i32 {
        self.metrics.extent_height(self.cache.len())
    }

    /// Total scrollable content size.
    pub fn extent(&self) -> Size {
        Size::new(self.extent_width(), self.extent_height())
    }

    pub fn vertical_offset(&self) -> i32 {
        self.viewport.vertical_offset()
    }

    pub fn horizontal_offset(&self) -> i32 {
        self.viewport.horizontal_offset()
    }

    pub fn max_vertical_offset(&self) -> i32 {
        self.viewport.max_vertical_offset(self.extent_height())
    }

    pub fn max_horizontal_offset(&self) -> i32 {
        self.viewport.max_horizontal_offset(self.extent_width())
    }

    pub fn needs_vertical_scroll(&self) -> bool {
        self.viewport.needs_vertical_scroll(self.extent_height())
    }

    pub fn needs_horizontal_scroll(&self) -> bool {
        self.viewport.needs_horizontal_scroll(self.extent_width())
    }

    /// Scrolls vertically, clamped; returns `true` if the offset changed.
    pub fn set_vertical_offset(&mut self, offset: i32) -> bool {
        let changed = self.viewport.set_vertical_offset(offset, self.extent_height());
        if changed {
            self.damage.invalidate_all();
        }
        changed
    }

    /// Scrolls horizontally, clamped; returns `true` if the offset changed.
    pub fn set_horizontal_offset(&mut self, offset: i32) -> bool {
        let changed = self.viewport.set_horizontal_offset(offset, self.extent_width());
        if changed {
            self.damage.invalidate_all();
        }
        changed
    }

    /// Cache positions that intersect the viewport.
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        self.viewport.visible_range(&self.metrics, self.cache.len())
    }

    /// The rows the host has to paint, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = VisibleRow> + '_ {
        let range = self.visible_range();
        let extent_width = self.extent_width();
        self.cache
            .slice(range.clone())
            .iter()
            .zip(range)
            .map(move |(entry, position)| VisibleRow {
                position,
                key: entry.key,
                level: entry.level,
                bounds: self.viewport.row_client_bounds(&self.metrics, position, extent_width),
            })
    }

    /// The visible row under a client point.
    pub fn row_at(&self, point: Point) -> Option<RowKey> {
        self.viewport
            .position_at(&self.metrics, point, self.cache.len())
            .and_then(|position| self.cache.get(position))
            .map(|entry| entry.key)
    }

    /// Bounds of a visible row in content coordinates.
    pub fn row_bounds(&self, key: RowKey) -> Option<Rect> {
        let position = self.cache.position_of(key)?;
        Some(self.metrics.row_bounds(position, self.extent_width()))
    }

    /// Bounds of a visible row in client coordinates.
    pub fn row_client_bounds(&self, key: RowKey) -> Option<Rect> {
        let position = self.cache.position_of(key)?;
        Some(self.viewport.row_client_bounds(&self.metrics, position, self.extent_width()))
    }

    /// Bounds of a visible row's expander in client coordinates.
    pub fn expander_client_bounds(&self, key: RowKey) -> Option<Rect> {
        let position = self.cache.position_of(key)?;
        let level = self.cache.get(position)?.level;
        Some(self.viewport.expander_client_bounds(
            &self.metrics,
            position,
            level,
            self.extent_width(),
        ))
    }

    /// Bounds of one cell of a visible row in client coordinates.
    pub fn cell_client_bounds(&self, key: RowKey, column: usize) -> Option<Rect> {
        let row = self.row_client_bounds(key)?;
        let left = self.columns.column_left(column)?;
        let width = self.columns.get(column)?.width();
        Some(Rect::new(
            left - self.viewport.horizontal_offset(),
            row.top(),
            width,
            row.height(),
        ))
    }

    /// Bounds of the column header in client coordinates, if shown.
    pub fn header_client_bounds(&self) -> Option<Rect> {
        self.metrics.show_header.then(|| {
            Rect::new(
                -self.viewport.horizontal_offset(),
                0,
                self.extent_width(),
                self.metrics.header_height,
            )
        })
    }

    /// Scrolls the minimum amount that shows the whole row.
    ///
    /// Returns `true` if the offset changed.
    pub fn scroll_to_row(&mut self, key: RowKey) -> bool {
        let Some(position) = self.cache.position_of(key) else {
            return false;
        };
        let offset = self.viewport.offset_to_reveal(&self.metrics, position);
        self.set_vertical_offset(offset)
    }

    // =========================================================================
    // Keyboard Input
    // =========================================================================

    /// Handles a key press; returns `true` if the key was consumed.
    pub fn handle_key(&mut self, key: Key, modifiers: KeyboardModifiers) -> bool {
        if self.cache.is_empty() {
            return false;
        }
        let last = self.cache.len() - 1;
        let Some(focused) = self.focused_row() else {
            let target = match key {
                Key::End => last,
                Key::ArrowUp | Key::ArrowDown | Key::PageUp | Key::PageDown | Key::Home => 0,
                _ => return false,
            };
            self.move_focus_to(target, modifiers);
            return true;
        };
        let Some(position) = self.cache.position_of(focused) else {
            return false;
        };

        match key {
            Key::ArrowUp => {
                self.move_focus_to(position.saturating_sub(1), modifiers);
                true
            }
            Key::ArrowDown => {
                self.move_focus_to((position + 1).min(last), modifiers);
                true
            }
            Key::ArrowLeft => {
                if self.is_expanded(focused) {
                    log_input_error("collapse", self.collapse(focused));
                } else if let Some(parent) = self.tree.parent(focused)
                    && let Some(parent_position) = self.cache.position_of(parent)
                {
                    self.move_focus_to(parent_position, modifiers);
                }
                true
            }
            Key::ArrowRight => {
                let expandable = self.tree.get(focused).is_some_and(Row::is_expandable);
                if self.is_expanded(focused) {
                    if self.cache.level_of(focused).map(|level| level + 1)
                        == self.cache.get(position + 1).map(|next| next.level)
                    {
                        self.move_focus_to(position + 1, modifiers);
                    }
                } else if expandable {
                    log_input_error("expand", self.expand(focused));
                }
                true
            }
            Key::PageUp => {
                self.move_focus_to(position.saturating_sub(self.page_rows()), modifiers);
                true
            }
            Key::PageDown => {
                self.move_focus_to((position + self.page_rows()).min(last), modifiers);
                true
            }
            Key::Home => {
                self.move_focus_to(0, modifiers);
                true
            }
            Key::End => {
                self.move_focus_to(last, modifiers);
                true
            }
            Key::Space => {
                log_input_error("select", self.toggle_row_selected(focused, modifiers));
                true
            }
            Key::Enter => {
                if self.tree.get(focused).is_some_and(Row::is_expandable) {
                    log_input_error("toggle expansion", self.toggle_expanded(focused));
                } else {
                    self.row_activated.emit(RowEvent { key: focused });
                }
                true
            }
            Key::A if modifiers.control && self.selection_mode().is_multiple() => {
                self.select_all();
                true
            }
            _ => false,
        }
    }

    /// Rows per viewport page, at least one.
    fn page_rows(&self) -> usize {
        let stride = self.metrics.row_stride().max(1);
        (self.viewport.body_height(&self.metrics) / stride).max(1) as usize
    }

    /// Focuses the row at `position`; Shift in a multi mode also selects the
    /// rows left and reached.
    fn move_focus_to(&mut self, position: usize, modifiers: KeyboardModifiers) {
        let Some(target) = self.cache.get(position).map(|entry| entry.key) else {
            return;
        };
        let previous = self.focused_row();
        self.focus_row(Some(target), true);
        if modifiers.shift && self.selection_mode().is_multiple() {
            let keys: Vec<RowKey> = previous.into_iter().chain([target]).collect();
            let change = self.selection.select_all(keys);
            self.apply_selection(change);
        }
    }

    // =========================================================================
    // Pointer Input
    // =========================================================================

    /// Tracks the pointer; drives an active column resize.
    pub fn pointer_moved(&mut self, point: Point) -> CursorHint {
        if self.resize.is_some() {
            log_input_error("resize column", self.update_column_resize(point.x));
            return CursorHint::ResizeColumn;
        }

        let hovered = self.row_at(point);
        if hovered != self.hovered {
            let previous = std::mem::replace(&mut self.hovered, hovered);
            for key in [previous, hovered].into_iter().flatten() {
                self.damage_row(key);
            }
        }

        if self.column_border_at(point).is_some() {
            CursorHint::ResizeColumn
        } else if hovered.is_some_and(|key| self.is_over_expander(key, point)) {
            CursorHint::Expander
        } else {
            CursorHint::Default
        }
    }

    /// Handles a button press; returns `true` if it was consumed.
    ///
    /// A press on a column border starts resizing it. A press on a row
    /// focuses it and then toggles its expansion if the press hit the
    /// expander, or its selection otherwise.
    pub fn pointer_pressed(
        &mut self,
        point: Point,
        button: MouseButton,
        modifiers: KeyboardModifiers,
    ) -> bool {
        if button != MouseButton::Left {
            return false;
        }
        if let Some(column) = self.column_border_at(point) {
            return self.begin_column_resize(column, point.x).is_ok();
        }
        let Some(key) = self.row_at(point) else {
            return false;
        };

        self.focus_row(Some(key), true);
        if self.is_over_expander(key, point) {
            log_input_error("toggle expansion", self.toggle_expanded(key));
        } else {
            log_input_error("select", self.toggle_row_selected(key, modifiers));
        }
        true
    }

    /// Handles a button release; ends an active column resize.
    pub fn pointer_released(&mut self, button: MouseButton) -> bool {
        button == MouseButton::Left && self.end_column_resize().is_ok()
    }

    /// The pointer left the client area.
    pub fn pointer_left(&mut self) {
        if let Some(previous) = self.hovered.take() {
            self.damage_row(previous);
        }
    }

    /// Scrolls by a wheel rotation of `delta` units (120 per notch).
    pub fn wheel(&mut self, delta: i32) -> bool {
        let offset = self.viewport.offset_after_wheel(
            &self.metrics,
            delta,
            self.config.wheel_scroll_lines,
        );
        self.set_vertical_offset(offset)
    }

    fn is_over_expander(&self, key: RowKey, point: Point) -> bool {
        self.tree.get(key).is_some_and(Row::is_expandable)
            && self
                .expander_client_bounds(key)
                .is_some_and(|bounds| bounds.contains(point))
    }

    // =========================================================================
    // Column Resizing
    // =========================================================================

    /// The column whose right border is under a client point.
    pub fn column_border_at(&self, point: Point) -> Option<usize> {
        self.columns.split_column_at(
            point.x.saturating_add(self.viewport.horizontal_offset()),
            self.config.mouse_tolerance,
            self.config.draw_last_column_right_line,
        )
    }

    pub fn is_resizing_column(&self) -> bool {
        self.resize.is_some()
    }

    /// Starts dragging the right border of `column` from client x `x`.
    pub fn begin_column_resize(&mut self, column: usize, x: i32) -> Result<()> {
        let origin_width = self
            .columns
            .get(column)
            .ok_or(TreeListError::IndexOutOfRange {
                index: column,
                len: self.columns.len(),
            })?
            .width();
        tracing::debug!(target: targets::CONTROL, column, origin_width, "column resize started");
        self.resize = Some(ColumnResize {
            column,
            origin_x: x,
            origin_width,
        });
        Ok(())
    }

    /// Moves the dragged border to client x `x`.
    ///
    /// The width never drops below the column's minimum, and a drag that
    /// would make it zero or negative is ignored. Returns `true` if the
    /// width changed.
    pub fn update_column_resize(&mut self, x: i32) -> Result<bool> {
        let resize = self.resize.ok_or(TreeListError::NoResizeInProgress)?;
        let width = clamp_extent(
            i64::from(resize.origin_width) + i64::from(x) - i64::from(resize.origin_x),
        );
        if width <= 0 {
            return Ok(false);
        }
        let Some(column) = self.columns.get_mut(resize.column) else {
            self.resize = None;
            return Err(TreeListError::NoResizeInProgress);
        };
        let previous = column.width();
        let changed = column.set_width(width)? != previous;
        if changed {
            self.layout_changed();
        }
        Ok(changed)
    }

    pub fn end_column_resize(&mut self) -> Result<()> {
        let resize = self.resize.take().ok_or(TreeListError::NoResizeInProgress)?;
        tracing::debug!(target: targets::CONTROL, column = resize.column, "column resize finished");
        Ok(())
    }

    // =========================================================================
    // Layout Properties
    // =========================================================================

    pub fn set_row_height(&mut self, row_height: i32) -> Result<()> {
        ensure_positive("row height", row_height)?;
        let row_height = ensure_at_most("row height", row_height, MAX_LAYOUT_SIZE)?;
        self.update_layout(|config| config.row_height = row_height);
        Ok(())
    }

    pub fn set_header_height(&mut self, header_height: i32) -> Result<()> {
        let header_height = ensure_layout_size("header height", header_height)?;
        self.update_layout(|config| config.header_height = header_height);
        Ok(())
    }

    pub fn set_show_header(&mut self, show_header: bool) {
        self.update_layout(|config| config.show_header = show_header);
    }

    pub fn set_line_width(&mut self, line_width: i32) -> Result<()> {
        let line_width = ensure_layout_size("line width", line_width)?;
        self.update_layout(|config| config.line_width = line_width);
        Ok(())
    }

    pub fn set_row_overhang(&mut self, row_overhang: i32) -> Result<()> {
        let row_overhang = ensure_layout_size("row overhang", row_overhang)?;
        self.update_layout(|config| config.row_overhang = row_overhang);
        Ok(())
    }

    pub fn set_expander_size(&mut self, size: i32, padding: i32) -> Result<()> {
        let size = ensure_layout_size("expander size", size)?;
        let padding = ensure_layout_size("expander padding", padding)?;
        self.update_layout(|config| {
            config.expander_size = size;
            config.expander_padding = padding;
        });
        Ok(())
    }

    pub fn set_mouse_tolerance(&mut self, tolerance: i32) -> Result<()> {
        self.config.mouse_tolerance = ensure_layout_size("mouse tolerance", tolerance)?;
        Ok(())
    }

    /// Rows per wheel notch; negative scrolls pages, zero disables the wheel.
    pub fn set_wheel_scroll_lines(&mut self, lines: i32) {
        self.config.wheel_scroll_lines = lines;
    }

    pub fn set_draw_last_row_bottom_line(&mut self, draw: bool) {
        self.update_layout(|config| config.draw_last_row_bottom_line = draw);
    }

    pub fn set_draw_last_column_right_line(&mut self, draw: bool) {
        self.update_layout(|config| config.draw_last_column_right_line = draw);
    }

    /// Width of columns added later by name; existing columns keep theirs.
    pub fn set_default_column_width(&mut self, width: i32) -> Result<()> {
        self.columns.set_default_width(width)?;
        self.config.default_column_width = width;
        Ok(())
    }

    /// Minimum width of columns added later by name.
    pub fn set_default_min_column_width(&mut self, min_width: i32) -> Result<()> {
        self.columns.set_default_min_width(min_width)?;
        self.config.default_min_column_width = min_width;
        Ok(())
    }

    /// Padding of columns added later by name.
    pub fn set_default_column_padding(&mut self, padding: i32) -> Result<()> {
        self.columns.set_default_padding(padding)?;
        self.config.default_column_padding = padding;
        Ok(())
    }

    fn update_layout(&mut self, f: impl FnOnce(&mut TreeListConfig)) {
        f(&mut self.config);
        self.metrics = Metrics::from_config(&self.config);
        self.columns.set_line_width(self.config.line_width);
        self.layout_changed();
    }

    // =========================================================================
    // Damage
    // =========================================================================

    /// Drains the repaint request accumulated since the last call.
    pub fn take_damage(&mut self) -> Damage {
        self.damage.take()
    }

    pub fn has_damage(&self) -> bool {
        self.damage.has_damage()
    }

    /// Requests a repaint of one visible row.
    pub fn invalidate_row(&mut self, key: RowKey) {
        self.damage_row(key);
    }

    pub fn invalidate_all(&mut self) {
        self.damage.invalidate_all();
    }

    /// Damages a row across the whole client width.
    fn damage_row(&mut self, key: RowKey) {
        if let Some(bounds) = self.row_client_bounds(key) {
            let width = self.viewport.size().width.max(bounds.right());
            self.damage
                .add_damage(Rect::new(0, bounds.top(), width, bounds.height()));
        }
    }

    fn damage_expander(&mut self, key: RowKey) {
        if let Some(bounds) = self.expander_client_bounds(key) {
            self.damage.add_damage(bounds);
        }
    }

    fn clamp_offsets(&mut self) {
        let extent = self.extent();
        self.viewport.clamp(extent);
    }

    /// Called when a [`ColumnsMut`] guard drops.
    pub(crate) fn columns_edited(&mut self) {
        if self
            .resize
            .is_some_and(|resize| resize.column >= self.columns.len())
        {
            self.resize = None;
        }
        self.layout_changed();
    }

    /// Extents changed: re-clamp the offsets and repaint everything.
    fn layout_changed(&mut self) {
        self.clamp_offsets();
        self.damage.invalidate_all();
    }

    /// Debug check that the cache matches the tree and the selection only
    /// holds visible rows.
    pub fn is_consistent(&self) -> bool {
        let visible: HashSet<RowKey> = self.cache.keys().collect();
        self.cache.is_consistent_with(&self.tree)
            && self.selection.selected().iter().all(|key| visible.contains(key))
            && self.selection.focused().is_none_or(|key| visible.contains(&key))
            && self
                .selection
                .selected()
                .iter()
                .all(|&key| self.tree.get(key).is_some_and(Row::is_selected))
    }
}

/// Input handlers have no caller to report to, so failures are logged.
fn log_input_error<T>(operation: &'static str, result: Result<T>) {
    if let Err(error) = result {
        tracing::warn!(target: targets::CONTROL, operation, %error, "input operation failed");
    }
}
