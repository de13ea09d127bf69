//! Virtualized tree/list control model for Horizon Lattice.
//!
//! This crate provides everything a tree/list control needs except drawing:
//!
//! - **Entity Model**: rows with stable identity, columns, cells
//! - **Row Cache & Index**: the flattened visible rows, patched in place on
//!   every insert, remove, expand and collapse
//! - **Viewport**: pixel geometry, hit testing and scrolling over the cache
//! - **Selection & Focus**: selection modes and the focused row, kept in
//!   step with the cache
//! - **Signals**: synchronous notifications whose slots may veto the
//!   default repaint
//! - **Lazy Sources**: loading children when a row is first expanded
//!
//! The host owns painting and platform input; it feeds translated input to
//! [`TreeListControl`], paints [`TreeListControl::visible_rows`] and drains
//! the recorded [`Damage`].
//!
//! # Example
//!
//! ```
//! use horizon_treelist::{Row, RowContainer, SelectionMode, Size, TreeListConfig, TreeListControl};
//!
//! let config = TreeListConfig::default().with_selection_mode(SelectionMode::MultiSimple);
//! let mut control = TreeListControl::new(config).unwrap();
//! control.set_viewport_size(Size::new(400, 300));
//! control.columns_mut().add("Name");
//!
//! let mut roots = control.rows_mut(RowContainer::Root);
//! let music = roots.add(Row::with_cells(["Music"])).unwrap();
//! let photos = roots.add(Row::with_cells(["Photos"])).unwrap();
//! control.rows_mut(music.into()).add(Row::with_cells(["album.flac"])).unwrap();
//!
//! control.expand(music).unwrap();
//! control.set_row_selected(photos, true).unwrap();
//!
//! let painted: Vec<usize> = control.visible_rows().map(|row| row.level).collect();
//! assert_eq!(painted, vec![0, 1, 0]);
//! assert_eq!(control.selected_rows(), &[photos]);
//! ```

pub mod config;
mod damage;
mod error;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod signal;
pub mod source;
pub mod view;

pub use config::TreeListConfig;
pub use damage::{Damage, DamageTracker};
pub use error::{Result, TreeListError};
pub use geometry::{Point, Rect, Size};
pub use logging::{CacheTreeDebug, TreeFormatOptions, TreeStyle};
pub use model::{
    Cell, CellCollection, CellValue, Column, ColumnCollection, FormatFlags, HorizontalAlignment,
    Row, RowContainer, RowKey, RowTree, Tag, TextFormat, Trimming, VerticalAlignment,
};
pub use signal::{ConnectionId, Propagation, Signal};
pub use source::{HierarchySource, LazyPopulator};
pub use view::{
    CachedRow, CursorHint, FocusChange, Key, KeyboardModifiers, Metrics, MouseButton, RowCache,
    RowEvent, SelectionChange, SelectionMode, TreeListControl, Viewport, VisibleRow, WHEEL_DELTA,
};
