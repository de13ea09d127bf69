//! Entity model: rows, columns, cells and the row arena.

mod cell;
mod column;
mod columns;
mod row;
mod tag;
mod tree;

pub use cell::{Cell, CellCollection, CellValue};
pub use column::{
    Column, FormatFlags, HorizontalAlignment, TextFormat, Trimming, VerticalAlignment,
};
pub use columns::ColumnCollection;
pub use row::{Row, RowContainer, RowKey};
pub use tag::Tag;
pub use tree::{Ancestors, Descendants, RowTree};
