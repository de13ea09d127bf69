//! Column descriptors and their text formatting options.

use crate::config::{DEFAULT_COLUMN_PADDING, DEFAULT_COLUMN_WIDTH, DEFAULT_MIN_COLUMN_WIDTH};
use crate::error::{Result, ensure_at_most, ensure_layout_size, ensure_non_negative};
use crate::geometry::MAX_EXTENT;
use crate::model::Tag;

/// Horizontal alignment of text inside a header or body cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Align to the left edge.
    #[default]
    Left,
    /// Center horizontally.
    Center,
    /// Align to the right edge.
    Right,
}

/// Vertical alignment of text inside a header or body cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    /// Align to the top edge.
    Top,
    /// Center vertically.
    #[default]
    Center,
    /// Align to the bottom edge.
    Bottom,
}

/// How text that does not fit is shortened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Trimming {
    /// No trimming.
    None,
    /// Cut at the nearest character.
    Character,
    /// Cut at the nearest word.
    Word,
    /// Cut at the nearest character and append an ellipsis.
    #[default]
    EllipsisCharacter,
    /// Cut at the nearest word and append an ellipsis.
    EllipsisWord,
    /// Elide the middle of a path, keeping its last segment.
    EllipsisPath,
}

/// Layout switches passed through to the text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatFlags {
    /// Keep glyph overhangs inside the layout box.
    pub fit_black_box: bool,
    /// Only lay out whole lines.
    pub line_limit: bool,
    /// Never wrap text.
    pub no_wrap: bool,
    /// Let text draw outside the layout box.
    pub no_clip: bool,
}

impl Default for FormatFlags {
    fn default() -> Self {
        Self {
            fit_black_box: false,
            line_limit: true,
            no_wrap: true,
            no_clip: false,
        }
    }
}

/// Alignment, trimming and flags for one text area (header or body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextFormat {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub trimming: Trimming,
    pub flags: FormatFlags,
}

impl TextFormat {
    /// Returns a copy with a different horizontal alignment.
    pub fn with_horizontal(mut self, alignment: HorizontalAlignment) -> Self {
        self.horizontal = alignment;
        self
    }

    /// Returns a copy with a different vertical alignment.
    pub fn with_vertical(mut self, alignment: VerticalAlignment) -> Self {
        self.vertical = alignment;
        self
    }

    /// Returns a copy with a different trimming mode.
    pub fn with_trimming(mut self, trimming: Trimming) -> Self {
        self.trimming = trimming;
        self
    }
}

/// A named field descriptor rendered as one header cell and one body cell
/// per row.
///
/// The width never drops below the minimum width: every mutation clamps it.
/// Widths are bounded by [`MAX_EXTENT`].
#[derive(Debug)]
pub struct Column {
    text: String,
    width: i32,
    min_width: i32,
    horizontal_padding: i32,
    vertical_padding: i32,
    header_format: TextFormat,
    body_format: TextFormat,
    tag: Option<Tag>,
}

impl Column {
    /// Creates a column with the default width, minimum width and padding.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            width: DEFAULT_COLUMN_WIDTH,
            min_width: DEFAULT_MIN_COLUMN_WIDTH,
            horizontal_padding: DEFAULT_COLUMN_PADDING,
            vertical_padding: DEFAULT_COLUMN_PADDING,
            header_format: TextFormat::default(),
            body_format: TextFormat::default(),
            tag: None,
        }
    }

    /// Creates a column with explicit sizes.
    ///
    /// `padding` applies to both axes. Fails if any size is negative or too
    /// large; `width` is clamped up to `min_width`.
    pub fn with_sizes(
        text: impl Into<String>,
        width: i32,
        min_width: i32,
        padding: i32,
    ) -> Result<Self> {
        let width = ensure_width("column width", width)?;
        let min_width = ensure_width("column minimum width", min_width)?;
        let padding = ensure_layout_size("column padding", padding)?;
        Ok(Self::sized(text, width, min_width, padding))
    }

    /// Builds a column from already validated sizes.
    pub(crate) fn sized(text: impl Into<String>, width: i32, min_width: i32, padding: i32) -> Self {
        let min_width = min_width.clamp(0, MAX_EXTENT);
        let padding = padding.max(0);
        Self {
            width: width.clamp(min_width, MAX_EXTENT),
            min_width,
            horizontal_padding: padding,
            vertical_padding: padding,
            ..Self::new(text)
        }
    }

    /// Sets both paddings using builder pattern.
    pub fn with_padding(mut self, horizontal: i32, vertical: i32) -> Result<Self> {
        self.set_horizontal_padding(horizontal)?;
        self.set_vertical_padding(vertical)?;
        Ok(self)
    }

    /// Sets the body alignment using builder pattern.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.body_format.horizontal = alignment;
        self
    }

    /// Sets the header alignment using builder pattern.
    pub fn with_header_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.header_format.horizontal = alignment;
        self
    }

    /// Header text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Current width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Sets the width, clamped up to the minimum width.
    ///
    /// Returns the width actually applied.
    pub fn set_width(&mut self, width: i32) -> Result<i32> {
        let width = ensure_width("column width", width)?;
        self.width = width.max(self.min_width);
        Ok(self.width)
    }

    pub fn min_width(&self) -> i32 {
        self.min_width
    }

    /// Sets the minimum width, growing the width if it is now too small.
    pub fn set_min_width(&mut self, min_width: i32) -> Result<()> {
        self.min_width = ensure_width("column minimum width", min_width)?;
        self.width = self.width.max(self.min_width);
        Ok(())
    }

    /// Padding between the left and right borders and the text.
    pub fn horizontal_padding(&self) -> i32 {
        self.horizontal_padding
    }

    pub fn set_horizontal_padding(&mut self, padding: i32) -> Result<()> {
        self.horizontal_padding = ensure_layout_size("column horizontal padding", padding)?;
        Ok(())
    }

    /// Padding between the top and bottom borders and the text.
    pub fn vertical_padding(&self) -> i32 {
        self.vertical_padding
    }

    pub fn set_vertical_padding(&mut self, padding: i32) -> Result<()> {
        self.vertical_padding = ensure_layout_size("column vertical padding", padding)?;
        Ok(())
    }

    pub fn header_format(&self) -> &TextFormat {
        &self.header_format
    }

    pub fn header_format_mut(&mut self) -> &mut TextFormat {
        &mut self.header_format
    }

    pub fn body_format(&self) -> &TextFormat {
        &self.body_format
    }

    pub fn body_format_mut(&mut self) -> &mut TextFormat {
        &mut self.body_format
    }

    /// The column's opaque user tag.
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    pub fn set_tag(&mut self, tag: Option<Tag>) {
        self.tag = tag;
    }
}

fn ensure_width(name: &'static str, value: i32) -> Result<i32> {
    ensure_non_negative(name, value)?;
    ensure_at_most(name, value, MAX_EXTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeListError;

    #[test]
    fn test_defaults() {
        let column = Column::new("Name");
        assert_eq!(column.text(), "Name");
        assert_eq!(column.width(), 200);
        assert_eq!(column.min_width(), 40);
        assert_eq!(column.horizontal_padding(), 5);
        assert_eq!(column.vertical_padding(), 5);
        assert_eq!(column.body_format().horizontal, HorizontalAlignment::Left);
        assert_eq!(column.body_format().trimming, Trimming::EllipsisCharacter);
    }

    #[test]
    fn test_width_is_clamped_to_minimum() {
        let mut column = Column::new("Size");
        assert_eq!(column.set_width(10), Ok(40));
        assert_eq!(column.set_width(120), Ok(120));

        column.set_min_width(150).unwrap();
        assert_eq!(column.width(), 150);

        let column = Column::with_sizes("Type", 5, 20, 0).unwrap();
        assert_eq!(column.width(), 20);
    }

    #[test]
    fn test_negative_sizes_rejected() {
        let mut column = Column::new("Date");
        assert_eq!(
            column.set_width(-1),
            Err(TreeListError::NegativeValue {
                name: "column width",
                value: -1
            })
        );
        assert_eq!(column.width(), 200);
        assert!(column.set_horizontal_padding(-3).is_err());
        assert_eq!(column.horizontal_padding(), 5);
        assert!(Column::with_sizes("x", 10, -1, 0).is_err());
        assert!(column.set_width(MAX_EXTENT + 1).is_err());
        assert_eq!(column.set_width(MAX_EXTENT), Ok(MAX_EXTENT));
    }

    #[test]
    fn test_paddings_are_independent() {
        let mut column = Column::with_sizes("Name", 100, 40, 3).unwrap();
        assert_eq!(column.horizontal_padding(), 3);
        assert_eq!(column.vertical_padding(), 3);

        column.set_vertical_padding(1).unwrap();
        assert_eq!(column.horizontal_padding(), 3);
        assert_eq!(column.vertical_padding(), 1);

        let column = Column::new("Size").with_padding(8, 2).unwrap();
        assert_eq!((column.horizontal_padding(), column.vertical_padding()), (8, 2));
        assert!(Column::new("Size").with_padding(8, -2).is_err());
    }

    #[test]
    fn test_formats() {
        let column = Column::new("Size").with_alignment(HorizontalAlignment::Right);
        assert_eq!(column.body_format().horizontal, HorizontalAlignment::Right);
        assert_eq!(column.header_format().horizontal, HorizontalAlignment::Left);

        let format = TextFormat::default()
            .with_vertical(VerticalAlignment::Top)
            .with_trimming(Trimming::EllipsisPath);
        assert_eq!(format.vertical, VerticalAlignment::Top);
        assert!(format.flags.no_wrap);
    }
}
