//! Arena storage for the row hierarchy.

use std::collections::HashMap;

use crate::error::{Result, TreeListError};
use crate::model::{Row, RowContainer, RowKey};

/// Owns every row of a control and the parent/child links between them.
///
/// Rows are addressed by [`RowKey`]; links are stored as keys in both
/// directions, so no row holds a reference to another.
#[derive(Debug, Default)]
pub struct RowTree {
    rows: HashMap<RowKey, Row>,
    roots: Vec<RowKey>,
}

impl RowTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows, attached at any depth.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, key: RowKey) -> bool {
        self.rows.contains_key(&key)
    }

    pub fn get(&self, key: RowKey) -> Option<&Row> {
        self.rows.get(&key)
    }

    pub(crate) fn get_mut(&mut self, key: RowKey) -> Option<&mut Row> {
        self.rows.get_mut(&key)
    }

    /// Looks up a row, failing with [`TreeListError::UnknownRow`].
    pub fn row(&self, key: RowKey) -> Result<&Row> {
        self.rows.get(&key).ok_or(TreeListError::UnknownRow(key))
    }

    pub(crate) fn row_mut(&mut self, key: RowKey) -> Result<&mut Row> {
        self.rows.get_mut(&key).ok_or(TreeListError::UnknownRow(key))
    }

    /// Top-level row keys in insertion order.
    pub fn roots(&self) -> &[RowKey] {
        &self.roots
    }

    /// The keys of a container's rows, failing for unknown row containers.
    pub fn children_of(&self, container: RowContainer) -> Result<&[RowKey]> {
        match container {
            RowContainer::Root => Ok(&self.roots),
            RowContainer::Row(key) => self.row(key).map(Row::children),
        }
    }

    fn children_of_mut(&mut self, container: RowContainer) -> Result<&mut Vec<RowKey>> {
        match container {
            RowContainer::Root => Ok(&mut self.roots),
            RowContainer::Row(key) => self.row_mut(key).map(Row::children_mut),
        }
    }

    /// Attaches a detached row to `container` at `index`.
    ///
    /// Nothing is changed if the container is unknown or `index` is past the
    /// end of the container.
    pub(crate) fn insert(
        &mut self,
        container: RowContainer,
        index: usize,
        mut row: Row,
    ) -> Result<RowKey> {
        let key = row.key();
        let siblings = self.children_of_mut(container)?;
        if index > siblings.len() {
            return Err(TreeListError::IndexOutOfRange {
                index,
                len: siblings.len(),
            });
        }
        siblings.insert(index, key);

        row.set_parent(match container {
            RowContainer::Root => None,
            RowContainer::Row(parent) => Some(parent),
        });
        self.rows.insert(key, row);
        Ok(key)
    }

    /// Detaches a row from its container and drops its whole subtree.
    ///
    /// Returns the detached row itself.
    pub(crate) fn remove(&mut self, key: RowKey) -> Option<Row> {
        let parent = self.rows.get(&key)?.parent();
        match parent {
            Some(parent) => {
                if let Some(parent) = self.rows.get_mut(&parent) {
                    parent.children_mut().retain(|&child| child != key);
                }
            }
            None => self.roots.retain(|&root| root != key),
        }

        let descendants: Vec<RowKey> = self.descendants(RowContainer::Row(key)).collect();
        for descendant in descendants {
            self.rows.remove(&descendant);
        }

        let mut row = self.rows.remove(&key)?;
        row.detach();
        Some(row)
    }

    /// Drops every row.
    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.roots.clear();
    }

    /// The parent of a row, `None` for top-level or unknown rows.
    pub fn parent(&self, key: RowKey) -> Option<RowKey> {
        self.rows.get(&key).and_then(Row::parent)
    }

    /// Position of a row inside its container.
    pub fn index_in_container(&self, key: RowKey) -> Option<usize> {
        let container = self.rows.get(&key)?.container();
        self.children_of(container)
            .ok()?
            .iter()
            .position(|&sibling| sibling == key)
    }

    /// The sibling immediately before a row in its container.
    pub fn previous_sibling(&self, key: RowKey) -> Option<RowKey> {
        let index = self.index_in_container(key)?;
        let container = self.rows.get(&key)?.container();
        index
            .checked_sub(1)
            .and_then(|prev| self.children_of(container).ok()?.get(prev).copied())
    }

    /// The sibling immediately after a row in its container.
    pub fn next_sibling(&self, key: RowKey) -> Option<RowKey> {
        let index = self.index_in_container(key)?;
        let container = self.rows.get(&key)?.container();
        self.children_of(container).ok()?.get(index + 1).copied()
    }

    /// Depth of a row: 0 for top-level rows.
    pub fn level(&self, key: RowKey) -> Option<usize> {
        self.contains(key).then(|| self.ancestors(key).count())
    }

    /// Iterates a row's ancestors from its parent up to the top level.
    pub fn ancestors(&self, key: RowKey) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(key),
        }
    }

    /// Iterates the containers enclosing a row, innermost first, ending with
    /// [`RowContainer::Root`]. Empty for unknown rows.
    pub fn containers_of(&self, key: RowKey) -> impl Iterator<Item = RowContainer> + '_ {
        let known = self.contains(key);
        self.ancestors(key)
            .map(RowContainer::Row)
            .chain(known.then_some(RowContainer::Root))
    }

    /// Returns `true` if every ancestor of the row is expanded.
    pub fn is_visible(&self, key: RowKey) -> bool {
        self.contains(key)
            && self
                .ancestors(key)
                .all(|ancestor| self.rows.get(&ancestor).is_some_and(Row::is_expanded))
    }

    /// Iterates every row below `container` in depth-first pre-order,
    /// regardless of expansion.
    ///
    /// The traversal keeps an explicit stack, so deep trees cannot overflow
    /// the call stack. Calling it again restarts from the top.
    pub fn descendants(&self, container: RowContainer) -> Descendants<'_> {
        let stack: Vec<RowKey> = self
            .children_of(container)
            .map(|children| children.iter().rev().copied().collect())
            .unwrap_or_default();
        Descendants { tree: self, stack }
    }

    /// Every container row in the tree: rows that currently have children.
    pub fn containers(&self) -> impl Iterator<Item = RowKey> + '_ {
        self.descendants(RowContainer::Root)
            .filter(|&key| self.rows.get(&key).is_some_and(Row::has_children))
    }
}

/// Iterator over a row's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a RowTree,
    next: Option<RowKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = RowKey;

    fn next(&mut self) -> Option<RowKey> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Depth-first pre-order iterator over a subtree.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    tree: &'a RowTree,
    stack: Vec<RowKey>,
}

impl Iterator for Descendants<'_> {
    type Item = RowKey;

    fn next(&mut self) -> Option<RowKey> {
        let key = self.stack.pop()?;
        if let Some(row) = self.tree.get(key) {
            self.stack.extend(row.children().iter().rev().copied());
        }
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(tree: &mut RowTree, container: RowContainer, text: &str) -> RowKey {
        let index = tree.children_of(container).map(<[RowKey]>::len).unwrap();
        tree.insert(container, index, Row::with_cells([text])).unwrap()
    }

    /// a(a1(a1x), a2), b
    fn sample() -> (RowTree, [RowKey; 5]) {
        let mut tree = RowTree::new();
        let a = add(&mut tree, RowContainer::Root, "a");
        let b = add(&mut tree, RowContainer::Root, "b");
        let a1 = add(&mut tree, a.into(), "a1");
        let a2 = add(&mut tree, a.into(), "a2");
        let a1x = add(&mut tree, a1.into(), "a1x");
        (tree, [a, b, a1, a2, a1x])
    }

    #[test]
    fn test_insert_links_parent_and_children() {
        let (tree, [a, b, a1, a2, a1x]) = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.roots(), &[a, b]);
        assert_eq!(tree.children_of(a.into()).unwrap(), &[a1, a2]);
        assert_eq!(tree.parent(a1x), Some(a1));
        assert_eq!(tree.get(a1).map(Row::container), Some(RowContainer::Row(a)));
        assert_eq!(tree.level(a1x), Some(2));
        assert_eq!(tree.level(b), Some(0));
    }

    #[test]
    fn test_containers_of_walks_up_to_root() {
        let (tree, [a, b, a1, _, a1x]) = sample();
        let containers: Vec<RowContainer> = tree.containers_of(a1x).collect();
        assert_eq!(
            containers,
            vec![RowContainer::Row(a1), RowContainer::Row(a), RowContainer::Root]
        );
        assert_eq!(tree.containers_of(b).collect::<Vec<_>>(), vec![RowContainer::Root]);

        let unknown = Row::new().key();
        assert_eq!(tree.containers_of(unknown).count(), 0);
    }

    #[test]
    fn test_insert_rejects_bad_arguments() {
        let (mut tree, [a, ..]) = sample();
        let detached = Row::new();
        let unknown = detached.key();
        assert_eq!(
            tree.insert(RowContainer::Row(unknown), 0, Row::new()),
            Err(TreeListError::UnknownRow(unknown))
        );
        assert_eq!(
            tree.insert(a.into(), 5, detached),
            Err(TreeListError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_siblings() {
        let (tree, [a, b, a1, a2, _]) = sample();
        assert_eq!(tree.previous_sibling(b), Some(a));
        assert_eq!(tree.previous_sibling(a), None);
        assert_eq!(tree.next_sibling(a1), Some(a2));
        assert_eq!(tree.next_sibling(a2), None);
        assert_eq!(tree.index_in_container(a2), Some(1));
    }

    #[test]
    fn test_descendants_preorder() {
        let (tree, [a, b, a1, a2, a1x]) = sample();
        let all: Vec<_> = tree.descendants(RowContainer::Root).collect();
        assert_eq!(all, vec![a, a1, a1x, a2, b]);
        let under_a: Vec<_> = tree.descendants(a.into()).collect();
        assert_eq!(under_a, vec![a1, a1x, a2]);
        assert_eq!(tree.containers().collect::<Vec<_>>(), vec![a, a1]);
    }

    #[test]
    fn test_ancestors_and_visibility() {
        let (mut tree, [a, _, a1, _, a1x]) = sample();
        assert_eq!(tree.ancestors(a1x).collect::<Vec<_>>(), vec![a1, a]);
        assert!(!tree.is_visible(a1x));
        tree.get_mut(a).unwrap().set_expanded(true);
        assert!(!tree.is_visible(a1x));
        tree.get_mut(a1).unwrap().set_expanded(true);
        assert!(tree.is_visible(a1x));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let (mut tree, [a, b, a1, a2, a1x]) = sample();
        let removed = tree.remove(a1).unwrap();
        assert_eq!(removed.key(), a1);
        assert_eq!(removed.parent(), None);
        assert!(!tree.contains(a1x));
        assert_eq!(tree.children_of(a.into()).unwrap(), &[a2]);

        tree.remove(a);
        assert_eq!(tree.roots(), &[b]);
        assert_eq!(tree.len(), 1);
        assert!(tree.remove(a).is_none());
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let mut tree = RowTree::new();
        let mut parent = RowContainer::Root;
        for _ in 0..50_000 {
            parent = add(&mut tree, parent, "x").into();
        }
        assert_eq!(tree.descendants(RowContainer::Root).count(), 50_000);
        let RowContainer::Row(deepest) = parent else {
            unreachable!()
        };
        assert_eq!(tree.level(deepest), Some(49_999));
    }
}
