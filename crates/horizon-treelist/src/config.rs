//! Control-wide configuration.
//!
//! [`TreeListConfig`] gathers the numeric constants and drawing switches a
//! [`TreeListControl`](crate::TreeListControl) starts from. Every value can
//! later be changed through the control's validated setters.
//!
//! # Example
//!
//! ```
//! use horizon_treelist::{SelectionMode, TreeListConfig};
//!
//! let config = TreeListConfig::default()
//!     .with_row_height(20)
//!     .with_selection_mode(SelectionMode::MultiExtended);
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{Result, ensure_at_most, ensure_layout_size, ensure_non_negative, ensure_positive};
use crate::geometry::MAX_EXTENT;
use crate::view::SelectionMode;

/// Default width given to newly added columns.
pub const DEFAULT_COLUMN_WIDTH: i32 = 200;
/// Default minimum width of newly added columns.
pub const DEFAULT_MIN_COLUMN_WIDTH: i32 = 40;
/// Default horizontal and vertical padding of newly added columns.
pub const DEFAULT_COLUMN_PADDING: i32 = 5;
/// Default row (and header) height.
pub const DEFAULT_ROW_HEIGHT: i32 = 26;
/// Default indentation per hierarchy level.
pub const DEFAULT_ROW_OVERHANG: i32 = 11;
/// Default separator line width.
pub const DEFAULT_LINE_WIDTH: i32 = 1;
/// Default distance within which the pointer grabs a column border.
pub const DEFAULT_MOUSE_TOLERANCE: i32 = 4;
/// Default expander glyph size.
pub const DEFAULT_EXPANDER_SIZE: i32 = 9;
/// Default padding around the expander glyph.
pub const DEFAULT_EXPANDER_PADDING: i32 = 4;
/// Default number of rows scrolled per wheel notch.
pub const DEFAULT_WHEEL_SCROLL_LINES: i32 = 3;
/// Upper bound of the row heights, line widths and other row-layout sizes.
pub const MAX_LAYOUT_SIZE: i32 = 1 << 16;

/// Construction-time settings of a tree/list control.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeListConfig {
    /// Width given to columns added without an explicit width.
    pub default_column_width: i32,
    /// Minimum width given to columns added without an explicit minimum.
    pub default_min_column_width: i32,
    /// Padding given to new columns.
    pub default_column_padding: i32,
    /// Height of every row, excluding the separator line.
    pub row_height: i32,
    /// Height of the column header, excluding its separator line.
    pub header_height: i32,
    /// Horizontal indentation per hierarchy level.
    pub row_overhang: i32,
    /// Width of separator lines.
    pub line_width: i32,
    /// Distance within which the pointer grabs a column border.
    pub mouse_tolerance: i32,
    /// Size of the expander glyph.
    pub expander_size: i32,
    /// Padding around the expander glyph.
    pub expander_padding: i32,
    /// Rows scrolled per wheel notch; negative scrolls whole pages.
    pub wheel_scroll_lines: i32,
    /// Whether the column header is shown.
    pub show_header: bool,
    /// Whether a separator is drawn right of the last column.
    pub draw_last_column_right_line: bool,
    /// Whether a separator is drawn below the last row.
    pub draw_last_row_bottom_line: bool,
    /// Initial selection mode.
    pub selection_mode: SelectionMode,
}

impl Default for TreeListConfig {
    fn default() -> Self {
        Self {
            default_column_width: DEFAULT_COLUMN_WIDTH,
            default_min_column_width: DEFAULT_MIN_COLUMN_WIDTH,
            default_column_padding: DEFAULT_COLUMN_PADDING,
            row_height: DEFAULT_ROW_HEIGHT,
            header_height: DEFAULT_ROW_HEIGHT,
            row_overhang: DEFAULT_ROW_OVERHANG,
            line_width: DEFAULT_LINE_WIDTH,
            mouse_tolerance: DEFAULT_MOUSE_TOLERANCE,
            expander_size: DEFAULT_EXPANDER_SIZE,
            expander_padding: DEFAULT_EXPANDER_PADDING,
            wheel_scroll_lines: DEFAULT_WHEEL_SCROLL_LINES,
            show_header: true,
            draw_last_column_right_line: true,
            draw_last_row_bottom_line: true,
            selection_mode: SelectionMode::default(),
        }
    }
}

impl TreeListConfig {
    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Sets the row height using builder pattern.
    pub fn with_row_height(mut self, row_height: i32) -> Self {
        self.row_height = row_height;
        self
    }

    /// Sets the header height using builder pattern.
    pub fn with_header_height(mut self, header_height: i32) -> Self {
        self.header_height = header_height;
        self
    }

    /// Sets whether the header is shown using builder pattern.
    pub fn with_header(mut self, show_header: bool) -> Self {
        self.show_header = show_header;
        self
    }

    /// Sets the separator line width using builder pattern.
    pub fn with_line_width(mut self, line_width: i32) -> Self {
        self.line_width = line_width;
        self
    }

    /// Sets the per-level indentation using builder pattern.
    pub fn with_row_overhang(mut self, row_overhang: i32) -> Self {
        self.row_overhang = row_overhang;
        self
    }

    /// Sets the default column width using builder pattern.
    pub fn with_default_column_width(mut self, width: i32) -> Self {
        self.default_column_width = width;
        self
    }

    /// Sets the default minimum column width using builder pattern.
    pub fn with_default_min_column_width(mut self, width: i32) -> Self {
        self.default_min_column_width = width;
        self
    }

    /// Sets the wheel scroll lines using builder pattern.
    pub fn with_wheel_scroll_lines(mut self, lines: i32) -> Self {
        self.wheel_scroll_lines = lines;
        self
    }

    /// Sets whether the trailing row separator is drawn using builder pattern.
    pub fn with_last_row_bottom_line(mut self, draw: bool) -> Self {
        self.draw_last_row_bottom_line = draw;
        self
    }

    /// Sets the selection mode using builder pattern.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Checks every numeric setting, reporting the first invalid one.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("default column width", self.default_column_width)?;
        ensure_at_most("default column width", self.default_column_width, MAX_EXTENT)?;
        ensure_non_negative("default minimum column width", self.default_min_column_width)?;
        ensure_at_most(
            "default minimum column width",
            self.default_min_column_width,
            MAX_EXTENT,
        )?;
        ensure_layout_size("default column padding", self.default_column_padding)?;
        ensure_positive("row height", self.row_height)?;
        ensure_at_most("row height", self.row_height, MAX_LAYOUT_SIZE)?;
        ensure_layout_size("header height", self.header_height)?;
        ensure_layout_size("row overhang", self.row_overhang)?;
        ensure_layout_size("line width", self.line_width)?;
        ensure_layout_size("mouse tolerance", self.mouse_tolerance)?;
        ensure_layout_size("expander size", self.expander_size)?;
        ensure_layout_size("expander padding", self.expander_padding)?;
        Ok(())
    }
}
