//! View state of the control: the row cache, the viewport, selection and
//! input handling.
//!
//! - [`RowCache`]: the flattened visible rows and their position index
//! - [`Viewport`] and [`Metrics`]: pixel geometry and scrolling
//! - [`SelectionTracker`]: selected rows and the focused row
//! - [`TreeListControl`]: the facade that keeps all of the above consistent

mod control;
mod handles;
mod input;
mod row_cache;
mod selection;
mod viewport;

pub use control::{CursorHint, FocusChange, RowEvent, TreeListControl, VisibleRow};
pub use handles::{ColumnsMut, RowsMut};
pub use input::{Key, KeyboardModifiers, MouseButton};
pub use row_cache::{CachedRow, RowCache};
pub use selection::{SelectionChange, SelectionMode, SelectionTracker};
pub use viewport::{Metrics, Viewport, WHEEL_DELTA};
