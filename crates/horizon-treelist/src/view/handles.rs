//! Borrowing handles for editing rows and columns through the control.

use std::ops::{Deref, DerefMut};

use crate::error::{Result, TreeListError};
use crate::model::{ColumnCollection, Row, RowContainer, RowKey};
use crate::view::TreeListControl;

/// Edits the ordered rows of one container.
///
/// Obtained from [`TreeListControl::rows_mut`]. Every edit keeps the row
/// cache, the selection and the focus in step with the tree.
pub struct RowsMut<'a> {
    control: &'a mut TreeListControl,
    container: RowContainer,
}

impl<'a> RowsMut<'a> {
    pub(crate) fn new(control: &'a mut TreeListControl, container: RowContainer) -> Self {
        Self { control, container }
    }

    pub fn container(&self) -> RowContainer {
        self.container
    }

    /// Keys of the container's rows; empty if the container does not exist.
    pub fn keys(&self) -> &[RowKey] {
        self.control.tree().children_of(self.container).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<RowKey> {
        self.keys().get(index).copied()
    }

    pub fn index_of(&self, key: RowKey) -> Option<usize> {
        self.keys().iter().position(|&k| k == key)
    }

    /// Appends a row, returning its key.
    pub fn add(&mut self, row: Row) -> Result<RowKey> {
        self.control.insert_row(self.container, None, row)
    }

    /// Inserts a row at `index`, shifting later rows down.
    pub fn insert(&mut self, index: usize, row: Row) -> Result<RowKey> {
        self.control.insert_row(self.container, Some(index), row)
    }

    /// Removes a row of this container together with its subtree.
    pub fn remove(&mut self, key: RowKey) -> Result<Row> {
        self.control.remove_row(self.container, key)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Row> {
        let key = self.get(index).ok_or(TreeListError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        self.remove(key)
    }

    /// Removes every row of the container.
    pub fn clear(&mut self) -> Result<()> {
        self.control.clear_rows(self.container)
    }
}

/// Mutable access to the column collection.
///
/// Obtained from [`TreeListControl::columns_mut`]. Dropping the guard
/// re-clamps the scroll offsets to the new content width and requests a
/// full repaint.
pub struct ColumnsMut<'a> {
    control: &'a mut TreeListControl,
}

impl<'a> ColumnsMut<'a> {
    pub(crate) fn new(control: &'a mut TreeListControl) -> Self {
        Self { control }
    }
}

impl Deref for ColumnsMut<'_> {
    type Target = ColumnCollection;

    fn deref(&self) -> &ColumnCollection {
        &self.control.columns
    }
}

impl DerefMut for ColumnsMut<'_> {
    fn deref_mut(&mut self) -> &mut ColumnCollection {
        &mut self.control.columns
    }
}

impl Drop for ColumnsMut<'_> {
    fn drop(&mut self) {
        self.control.columns_edited();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::Damage;

    #[test]
    fn test_rows_mut_edits() {
        let mut control = TreeListControl::default();
        let mut roots = control.rows_mut(RowContainer::Root);
        let a = roots.add(Row::with_cells(["a"])).unwrap();
        let c = roots.add(Row::with_cells(["c"])).unwrap();
        let b = roots.insert(1, Row::with_cells(["b"])).unwrap();
        assert_eq!(roots.keys(), &[a, b, c]);
        assert_eq!(roots.index_of(c), Some(2));

        assert_eq!(
            roots.insert(9, Row::new()).err(),
            Some(TreeListError::IndexOutOfRange { index: 9, len: 3 })
        );
        let removed = roots.remove_at(0).unwrap();
        assert_eq!(removed.key(), a);
        assert_eq!(removed.parent(), None);
        assert_eq!(roots.len(), 2);

        roots.clear().unwrap();
        assert!(roots.is_empty());
        assert!(control.cache().is_empty());
        assert_eq!(control.focused_row(), None);
    }

    #[test]
    fn test_unknown_container() {
        let mut control = TreeListControl::default();
        let a = control.rows_mut(RowContainer::Root).add(Row::new()).unwrap();
        control.rows_mut(RowContainer::Root).remove(a).unwrap();

        let mut orphan = control.rows_mut(a.into());
        assert!(orphan.is_empty());
        assert_eq!(orphan.add(Row::new()).err(), Some(TreeListError::UnknownRow(a)));
        assert_eq!(orphan.clear().err(), Some(TreeListError::UnknownRow(a)));
    }

    #[test]
    fn test_clear_child_container() {
        let mut control = TreeListControl::default();
        let a = control.rows_mut(RowContainer::Root).add(Row::new()).unwrap();
        let mut children = control.rows_mut(a.into());
        children.add(Row::new()).unwrap();
        children.add(Row::new()).unwrap();
        control.expand(a).unwrap();
        assert_eq!(control.visible_row_count(), 3);

        control.rows_mut(a.into()).clear().unwrap();
        assert_eq!(control.visible_row_count(), 1);
        assert!(control.row(a).is_some_and(|row| !row.has_children()));
    }

    #[test]
    fn test_columns_guard_invalidates() {
        let mut control = TreeListControl::default();
        control.take_damage();
        {
            let mut columns = control.columns_mut();
            columns.add("Name");
            columns.add("Size");
        }
        assert_eq!(control.columns().len(), 2);
        assert_eq!(control.extent_width(), 2 + 200 + 1 + 200);
        assert_eq!(control.take_damage(), Damage::Full);
    }
}
