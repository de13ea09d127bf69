//! Cell values and the per-row cell collection.

use std::fmt;

use crate::error::{Result, TreeListError};

/// The value held by a cell.
///
/// Cells are positional: the cell at index `n` is rendered in column `n`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value; renders as an empty string.
    #[default]
    Empty,
    /// Plain text.
    Text(String),
    /// A signed integer.
    Integer(i64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
}

impl CellValue {
    /// Returns `true` if the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The text this value renders as.
    pub fn as_display_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Integer(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Float(value as f64))
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A single cell of a row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    value: CellValue,
}

impl Cell {
    /// Creates a cell holding `value`.
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The cell's value.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Replaces the cell's value.
    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        self.value = value.into();
    }

    /// The value rendered as text.
    pub fn value_as_string(&self) -> String {
        self.value.as_display_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Insertion-ordered cells of a row.
///
/// Cells carry no structural meaning for the row cache, so mutating them
/// never touches cached positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellCollection {
    cells: Vec<Cell>,
}

impl CellCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if there are no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell at `index`.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable access to the cell at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// Iterates cells in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }

    /// Appends a cell and returns it.
    pub fn add(&mut self, value: impl Into<CellValue>) -> &mut Cell {
        let index = self.cells.len();
        self.cells.push(Cell::new(value));
        &mut self.cells[index]
    }

    /// Inserts a cell at `index` and returns it.
    pub fn insert(&mut self, index: usize, value: impl Into<CellValue>) -> Result<&mut Cell> {
        if index > self.cells.len() {
            return Err(TreeListError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            });
        }
        self.cells.insert(index, Cell::new(value));
        Ok(&mut self.cells[index])
    }

    /// Removes and returns the cell at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<Cell> {
        if index >= self.cells.len() {
            return Err(TreeListError::IndexOutOfRange {
                index,
                len: self.cells.len(),
            });
        }
        Ok(self.cells.remove(index))
    }

    /// Removes the first cell equal to `cell`; returns whether one was found.
    pub fn remove(&mut self, cell: &Cell) -> bool {
        match self.index_of(cell) {
            Some(index) => {
                self.cells.remove(index);
                true
            }
            None => false,
        }
    }

    /// Position of the first cell equal to `cell`.
    pub fn index_of(&self, cell: &Cell) -> Option<usize> {
        self.cells.iter().position(|c| c == cell)
    }

    /// Removes every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl<'a> IntoIterator for &'a CellCollection {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl fmt::Display for CellCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            cell.fmt(f)?;
        }
        Ok(())
    }
}
