//! The ordered column container and horizontal column layout.

use crate::config::TreeListConfig;
use crate::error::{Result, TreeListError, ensure_at_most, ensure_layout_size, ensure_non_negative};
use crate::geometry::{MAX_EXTENT, clamp_extent};
use crate::model::Column;

/// Insertion-ordered columns of a control.
///
/// Column `n` renders cell `n` of every row. The collection also knows the
/// separator line width, so it owns the horizontal layout: column edges, the
/// total extent width and the border hit test used for interactive resizing.
#[derive(Debug)]
pub struct ColumnCollection {
    columns: Vec<Column>,
    line_width: i32,
    default_width: i32,
    default_min_width: i32,
    default_padding: i32,
}

impl Default for ColumnCollection {
    fn default() -> Self {
        Self::new(&TreeListConfig::default())
    }
}

impl ColumnCollection {
    /// Creates an empty collection using the column defaults of `config`.
    pub fn new(config: &TreeListConfig) -> Self {
        Self {
            columns: Vec::new(),
            line_width: config.line_width,
            default_width: config.default_column_width,
            default_min_width: config.default_min_column_width,
            default_padding: config.default_column_padding,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Appends a column with the collection's default sizes.
    pub fn add(&mut self, text: impl Into<String>) -> &mut Column {
        let column = Column::sized(
            text,
            self.default_width,
            self.default_min_width,
            self.default_padding,
        );
        self.push(column)
    }

    /// Appends a prepared column.
    pub fn push(&mut self, column: Column) -> &mut Column {
        let index = self.columns.len();
        self.columns.push(column);
        tracing::trace!(target: crate::logging::targets::CONTROL, index, "column added");
        &mut self.columns[index]
    }

    /// Inserts a prepared column at `index`.
    pub fn insert(&mut self, index: usize, column: Column) -> Result<&mut Column> {
        if index > self.columns.len() {
            return Err(TreeListError::IndexOutOfRange {
                index,
                len: self.columns.len(),
            });
        }
        self.columns.insert(index, column);
        Ok(&mut self.columns[index])
    }

    /// Removes and returns the column at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Column> {
        if index >= self.columns.len() {
            return Err(TreeListError::IndexOutOfRange {
                index,
                len: self.columns.len(),
            });
        }
        Ok(self.columns.remove(index))
    }

    /// Removes the first column whose header text is `text`.
    pub fn remove(&mut self, text: &str) -> Option<Column> {
        let index = self.index_of(text)?;
        Some(self.columns.remove(index))
    }

    /// Position of the first column whose header text is `text`.
    pub fn index_of(&self, text: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.text() == text)
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }

    /// Separator line width used for the layout.
    pub fn line_width(&self) -> i32 {
        self.line_width
    }

    pub(crate) fn set_line_width(&mut self, line_width: i32) {
        self.line_width = line_width;
    }

    /// Width given to columns created by [`add`](Self::add).
    pub fn default_width(&self) -> i32 {
        self.default_width
    }

    pub fn default_min_width(&self) -> i32 {
        self.default_min_width
    }

    pub fn default_padding(&self) -> i32 {
        self.default_padding
    }

    /// Sets the default width; existing columns keep theirs.
    pub fn set_default_width(&mut self, width: i32) -> Result<()> {
        ensure_non_negative("default column width", width)?;
        self.default_width = ensure_at_most("default column width", width, MAX_EXTENT)?;
        Ok(())
    }

    /// Sets the default minimum width; existing columns keep theirs.
    pub fn set_default_min_width(&mut self, min_width: i32) -> Result<()> {
        ensure_non_negative("default minimum column width", min_width)?;
        self.default_min_width =
            ensure_at_most("default minimum column width", min_width, MAX_EXTENT)?;
        Ok(())
    }

    /// Sets the default padding; existing columns keep theirs.
    pub fn set_default_padding(&mut self, padding: i32) -> Result<()> {
        self.default_padding = ensure_layout_size("default column padding", padding)?;
        Ok(())
    }

    /// Total content width: outer lines plus every column and the separators
    /// between them.
    pub fn extent_width(&self) -> i32 {
        let line = i64::from(self.line_width);
        let widths: i64 = self.columns.iter().map(|c| i64::from(c.width())).sum();
        let separators = self.columns.len().saturating_sub(1) as i64;
        clamp_extent(2 * line + widths + separators * line)
    }

    /// Columns after `index`, left to right.
    pub fn following(&self, index: usize) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().skip(index.saturating_add(1))
    }

    /// Left edge of column `index` in content coordinates.
    pub fn column_left(&self, index: usize) -> Option<i32> {
        if index >= self.columns.len() {
            return None;
        }
        let line = i64::from(self.line_width);
        let preceding: i64 = self.columns[..index]
            .iter()
            .map(|c| i64::from(c.width()) + line)
            .sum();
        Some(clamp_extent(line + preceding))
    }

    /// Column whose right border lies within `tolerance` of content x
    /// coordinate `x`.
    ///
    /// The border right of the last column only counts when
    /// `include_last_border` is set.
    pub fn split_column_at(&self, x: i32, tolerance: i32, include_last_border: bool) -> Option<usize> {
        let last = self.columns.len().checked_sub(1)?;
        let line = i64::from(self.line_width);
        let mut border = line;
        for (index, column) in self.columns.iter().enumerate() {
            border += i64::from(column.width());
            if index == last && !include_last_border {
                break;
            }
            if (i64::from(x) - border).abs() <= i64::from(tolerance) {
                return Some(index);
            }
            border += line;
        }
        None
    }
}

impl<'a> IntoIterator for &'a ColumnCollection {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
