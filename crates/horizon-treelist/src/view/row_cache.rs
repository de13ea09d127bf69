//! The flattened, position-indexed projection of the visible rows.
//!
//! [`RowCache`] holds one entry per row whose ancestors are all expanded, in
//! depth-first pre-order, together with a key → position map. Every edit is
//! applied in place: the affected range is spliced and the positions of the
//! suffix after it are re-stamped in the same call, so no caller ever sees
//! the two out of step.

use std::collections::HashMap;
use std::ops::Range;

use crate::logging::targets;
use crate::model::{RowKey, RowTree};

/// One visible row and its depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachedRow {
    /// The row.
    pub key: RowKey,
    /// Depth of the row: 0 for top-level rows.
    pub level: usize,
}

impl CachedRow {
    fn new(key: RowKey, level: usize) -> Self {
        Self { key, level }
    }
}

/// Flattened pre-order list of the visible rows, plus a position index.
#[derive(Debug, Default, Clone)]
pub struct RowCache {
    rows: Vec<CachedRow>,
    positions: HashMap<RowKey, usize>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The entry at `position`.
    pub fn get(&self, position: usize) -> Option<CachedRow> {
        self.rows.get(position).copied()
    }

    /// Position of a visible row.
    pub fn position_of(&self, key: RowKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    pub fn contains(&self, key: RowKey) -> bool {
        self.positions.contains_key(&key)
    }

    /// Depth of a visible row.
    pub fn level_of(&self, key: RowKey) -> Option<usize> {
        self.position_of(key).map(|position| self.rows[position].level)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CachedRow> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[CachedRow] {
        &self.rows
    }

    /// Entries inside `range`, clamped to the cache length.
    pub fn slice(&self, range: Range<usize>) -> &[CachedRow] {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        &self.rows[start..end]
    }

    /// Keys of the visible rows in display order.
    pub fn keys(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.rows.iter().map(|entry| entry.key)
    }

    // =========================================================================
    // Incremental updates
    // =========================================================================

    /// Adds a row that was just attached to the tree.
    ///
    /// The row (and, if it is expanded, its visible subtree) is placed right
    /// after the visible subtree of its previous sibling, or right after its
    /// parent when it has none. Rows under a collapsed or hidden parent are
    /// not cached. Returns the range of inserted positions.
    pub(crate) fn insert_row(&mut self, tree: &RowTree, key: RowKey) -> Option<Range<usize>> {
        let row = tree.get(key)?;
        let (level, after_parent) = match row.parent() {
            None => (0, 0),
            Some(parent) => {
                if !tree.get(parent)?.is_expanded() {
                    return None;
                }
                let parent_position = self.position_of(parent)?;
                (self.rows[parent_position].level + 1, parent_position + 1)
            }
        };
        let start = match tree.previous_sibling(key) {
            Some(previous) => self.subtree_end(self.position_of(previous)?),
            None => after_parent,
        };

        let mut entries = vec![CachedRow::new(key, level)];
        entries.extend(visible_subtree(tree, key, level));
        let count = entries.len();
        self.rows.splice(start..start, entries);
        self.restamp(start);

        tracing::trace!(target: targets::CACHE, %key, start, count, "inserted rows");
        Some(start..start + count)
    }

    /// Removes a row and its cached subtree.
    ///
    /// Returns the removed keys, the row itself first.
    pub(crate) fn remove_row(&mut self, key: RowKey) -> Vec<RowKey> {
        let Some(position) = self.position_of(key) else {
            return Vec::new();
        };
        let end = self.subtree_end(position);
        self.remove_range(position..end)
    }

    /// Splices in the visible subtree of a row that was just marked expanded.
    ///
    /// Children that are themselves expanded contribute their own visible
    /// subtrees. Does nothing if the row is not cached or its children are
    /// already present. Returns the range of inserted positions.
    pub(crate) fn expand_row(&mut self, tree: &RowTree, key: RowKey) -> Option<Range<usize>> {
        let position = self.position_of(key)?;
        let level = self.rows[position].level;
        if self.subtree_end(position) > position + 1 {
            return None;
        }

        let entries = visible_subtree(tree, key, level);
        if entries.is_empty() {
            return None;
        }
        let start = position + 1;
        let count = entries.len();
        self.rows.splice(start..start, entries);
        self.restamp(start);

        tracing::trace!(target: targets::CACHE, %key, start, count, "expanded row");
        Some(start..start + count)
    }

    /// Removes the cached subtree of a row, keeping the row itself.
    ///
    /// Returns the removed keys.
    pub(crate) fn collapse_row(&mut self, key: RowKey) -> Vec<RowKey> {
        let Some(position) = self.position_of(key) else {
            return Vec::new();
        };
        let end = self.subtree_end(position);
        self.remove_range(position + 1..end)
    }

    /// Discards every entry, returning the removed keys.
    pub(crate) fn clear(&mut self) -> Vec<RowKey> {
        self.positions.clear();
        let removed: Vec<RowKey> = self.rows.drain(..).map(|entry| entry.key).collect();
        tracing::trace!(target: targets::CACHE, count = removed.len(), "cleared cache");
        removed
    }

    /// Recomputes the whole cache from the tree.
    ///
    /// Used by bulk operations that change the expansion state of many rows
    /// at once.
    pub(crate) fn rebuild(&mut self, tree: &RowTree) {
        self.rows = Self::flatten(tree);
        self.positions.clear();
        self.restamp(0);
        tracing::debug!(target: targets::CACHE, len = self.rows.len(), "rebuilt cache");
    }

    /// The expansion-filtered pre-order traversal of `tree`.
    pub fn flatten(tree: &RowTree) -> Vec<CachedRow> {
        let mut rows = Vec::new();
        for &root in tree.roots() {
            rows.push(CachedRow::new(root, 0));
            rows.extend(visible_subtree(tree, root, 0));
        }
        rows
    }

    /// Returns `true` if the cache equals the flattened `tree` and every
    /// cached key maps to its own position.
    pub fn is_consistent_with(&self, tree: &RowTree) -> bool {
        self.positions.len() == self.rows.len()
            && self
                .rows
                .iter()
                .enumerate()
                .all(|(i, entry)| self.positions.get(&entry.key) == Some(&i))
            && self.rows == Self::flatten(tree)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// One past the last cached descendant of the entry at `position`.
    fn subtree_end(&self, position: usize) -> usize {
        let level = self.rows[position].level;
        self.rows[position + 1..]
            .iter()
            .position(|entry| entry.level <= level)
            .map_or(self.rows.len(), |offset| position + 1 + offset)
    }

    fn remove_range(&mut self, range: Range<usize>) -> Vec<RowKey> {
        if range.is_empty() {
            return Vec::new();
        }
        let start = range.start;
        let removed: Vec<RowKey> = self.rows.drain(range).map(|entry| entry.key).collect();
        for key in &removed {
            self.positions.remove(key);
        }
        self.restamp(start);

        tracing::trace!(target: targets::CACHE, start, count = removed.len(), "removed rows");
        removed
    }

    /// Rewrites the recorded position of every entry from `start` on.
    fn restamp(&mut self, start: usize) {
        for (position, entry) in self.rows.iter().enumerate().skip(start) {
            self.positions.insert(entry.key, position);
        }
    }
}

/// The visible descendants of an expanded row in pre-order, with levels
/// relative to the row's `level`.
///
/// Empty when the row is collapsed. Walks an explicit stack.
fn visible_subtree(tree: &RowTree, key: RowKey, level: usize) -> Vec<CachedRow> {
    let mut out = Vec::new();
    let Some(row) = tree.get(key) else {
        return out;
    };
    if !row.is_expanded() {
        return out;
    }

    let mut stack: Vec<CachedRow> = row
        .children()
        .iter()
        .rev()
        .map(|&child| CachedRow::new(child, level + 1))
        .collect();
    while let Some(entry) = stack.pop() {
        out.push(entry);
        if let Some(row) = tree.get(entry.key)
            && row.is_expanded()
        {
            stack.extend(
                row.children()
                    .iter()
                    .rev()
                    .map(|&child| CachedRow::new(child, entry.level + 1)),
            );
        }
    }
    out
}
