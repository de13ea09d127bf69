//! Prelude module for the tree/list control.
//!
//! ```ignore
//! use horizon_treelist::prelude::*;
//! ```

// ============================================================================
// Control
// ============================================================================

pub use crate::config::TreeListConfig;
pub use crate::view::{
    CursorHint, FocusChange, RowEvent, SelectionChange, SelectionMode, TreeListControl,
    VisibleRow,
};

// ============================================================================
// Entity Model
// ============================================================================

pub use crate::model::{CellValue, Column, HorizontalAlignment, Row, RowContainer, RowKey, Tag};

// ============================================================================
// Input, Geometry and Repaint
// ============================================================================

pub use crate::damage::Damage;
pub use crate::geometry::{Point, Rect, Size};
pub use crate::view::{Key, KeyboardModifiers, MouseButton};

// ============================================================================
// Signals and Sources
// ============================================================================

pub use crate::error::{Result, TreeListError};
pub use crate::signal::Propagation;
pub use crate::source::{HierarchySource, LazyPopulator};
