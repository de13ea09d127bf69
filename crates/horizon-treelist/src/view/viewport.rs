//! Mapping between cache positions and pixel geometry.
//!
//! Content coordinates place the first row right below the header block at
//! y = 0; client coordinates are what the host sees, with the header pinned
//! to the top and the content shifted by the scroll offsets.

use std::ops::Range;

use crate::config::TreeListConfig;
use crate::geometry::{Point, Rect, Size, clamp_extent, scaled};
use crate::logging::targets;

/// Wheel delta reported for one notch of a standard mouse wheel.
pub const WHEEL_DELTA: i32 = 120;

/// Fixed pixel constants of the row layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub row_height: i32,
    pub header_height: i32,
    pub line_width: i32,
    pub show_header: bool,
    pub draw_last_row_bottom_line: bool,
    pub row_overhang: i32,
    pub expander_size: i32,
    pub expander_padding: i32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::from_config(&TreeListConfig::default())
    }
}

impl Metrics {
    pub fn from_config(config: &TreeListConfig) -> Self {
        Self {
            row_height: config.row_height,
            header_height: config.header_height,
            line_width: config.line_width,
            show_header: config.show_header,
            draw_last_row_bottom_line: config.draw_last_row_bottom_line,
            row_overhang: config.row_overhang,
            expander_size: config.expander_size,
            expander_padding: config.expander_padding,
        }
    }

    /// Distance between the tops of two consecutive rows.
    #[inline]
    pub fn row_stride(&self) -> i32 {
        self.row_height.saturating_add(self.line_width)
    }

    /// Height of the header and its separator, 0 when the header is hidden.
    #[inline]
    pub fn header_block(&self) -> i32 {
        if self.show_header {
            self.header_height.saturating_add(self.line_width)
        } else {
            0
        }
    }

    /// Total scrollable height for `len` visible rows.
    pub fn extent_height(&self, len: usize) -> i32 {
        let trailing = if self.draw_last_row_bottom_line {
            self.line_width
        } else {
            0
        };
        let rows = i64::from(scaled(len, self.row_stride()));
        clamp_extent(i64::from(self.header_block()) + rows + i64::from(trailing))
    }

    /// Bounds of the row at `position` in content coordinates.
    pub fn row_bounds(&self, position: usize, extent_width: i32) -> Rect {
        Rect::new(
            self.line_width,
            self.line_width.saturating_add(scaled(position, self.row_stride())),
            extent_width.saturating_sub(self.line_width.saturating_mul(2)).max(0),
            self.row_height,
        )
    }

    /// Bounds of a row's expander glyph given the row's bounds.
    ///
    /// The glyph is indented by the row's level and centered vertically; the
    /// result never leaves the row.
    pub fn expander_bounds(&self, row_bounds: Rect, level: usize) -> Rect {
        let size = self
            .expander_padding
            .saturating_mul(2)
            .saturating_add(self.expander_size);
        let glyph = Rect::new(
            row_bounds.left().saturating_add(scaled(level, self.row_overhang)),
            row_bounds
                .top()
                .saturating_add(row_bounds.height().saturating_sub(size) / 2),
            size,
            size,
        );
        glyph.intersect(&row_bounds).unwrap_or(Rect::ZERO)
    }
}

/// The visible window over the content: client size plus scroll offsets.
///
/// Offsets are kept within `[0, extent - viewport]` by every setter that is
/// given the current extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    size: Size,
    offset: Point,
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            offset: Point::ZERO,
        }
    }

    /// Client size.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// The client rectangle.
    pub fn client_rect(&self) -> Rect {
        Rect::new(0, 0, self.size.width, self.size.height)
    }

    pub fn vertical_offset(&self) -> i32 {
        self.offset.y
    }

    pub fn horizontal_offset(&self) -> i32 {
        self.offset.x
    }

    /// Height available to rows below the header.
    pub fn body_height(&self, metrics: &Metrics) -> i32 {
        self.size.height.saturating_sub(metrics.header_block()).max(0)
    }

    /// Largest valid vertical offset for the given extent.
    pub fn max_vertical_offset(&self, extent_height: i32) -> i32 {
        extent_height.saturating_sub(self.size.height).max(0)
    }

    /// Largest valid horizontal offset for the given extent.
    pub fn max_horizontal_offset(&self, extent_width: i32) -> i32 {
        extent_width.saturating_sub(self.size.width).max(0)
    }

    /// Whether the content is taller than the viewport.
    pub fn needs_vertical_scroll(&self, extent_height: i32) -> bool {
        extent_height > self.size.height
    }

    /// Whether the content is wider than the viewport.
    pub fn needs_horizontal_scroll(&self, extent_width: i32) -> bool {
        extent_width > self.size.width
    }

    /// Sets the vertical offset, clamped to the extent.
    ///
    /// Returns `true` if the offset changed.
    pub fn set_vertical_offset(&mut self, offset: i32, extent_height: i32) -> bool {
        let offset = offset.clamp(0, self.max_vertical_offset(extent_height));
        let changed = offset != self.offset.y;
        if changed {
            tracing::trace!(target: targets::VIEWPORT, offset, "vertical offset changed");
            self.offset.y = offset;
        }
        changed
    }

    /// Sets the horizontal offset, clamped to the extent.
    ///
    /// Returns `true` if the offset changed.
    pub fn set_horizontal_offset(&mut self, offset: i32, extent_width: i32) -> bool {
        let offset = offset.clamp(0, self.max_horizontal_offset(extent_width));
        let changed = offset != self.offset.x;
        if changed {
            tracing::trace!(target: targets::VIEWPORT, offset, "horizontal offset changed");
            self.offset.x = offset;
        }
        changed
    }

    /// Re-clamps both offsets after the extents or the size changed.
    pub fn clamp(&mut self, extent: Size) -> bool {
        let vertical = self.set_vertical_offset(self.offset.y, extent.height);
        let horizontal = self.set_horizontal_offset(self.offset.x, extent.width);
        vertical || horizontal
    }

    /// Cache positions intersecting the viewport, bounded by `len`.
    ///
    /// Starts at `vertical_offset / stride` and spans
    /// `1 + body_height / stride` rows, or one more when the partially
    /// scrolled first row pushes another row into view.
    pub fn visible_range(&self, metrics: &Metrics, len: usize) -> Range<usize> {
        let stride = metrics.row_stride();
        if stride <= 0 {
            return 0..0;
        }
        let body = self.body_height(metrics);
        let first = self.offset.y / stride;
        let last = self.offset.y.saturating_add(body - 1).max(self.offset.y) / stride;
        let count = (1 + body / stride).max(last - first + 1);

        let first = (first as usize).min(len);
        let end = first.saturating_add(count as usize).min(len);
        first..end
    }

    /// Converts content bounds to client bounds.
    pub fn content_to_client(&self, metrics: &Metrics, bounds: Rect) -> Rect {
        bounds.translated(
            -self.offset.x,
            metrics.header_block() - self.offset.y,
        )
    }

    /// Bounds of the row at `position` in client coordinates.
    pub fn row_client_bounds(&self, metrics: &Metrics, position: usize, extent_width: i32) -> Rect {
        self.content_to_client(metrics, metrics.row_bounds(position, extent_width))
    }

    /// Bounds of a row's expander glyph in client coordinates.
    pub fn expander_client_bounds(
        &self,
        metrics: &Metrics,
        position: usize,
        level: usize,
        extent_width: i32,
    ) -> Rect {
        let row = self.row_client_bounds(metrics, position, extent_width);
        metrics.expander_bounds(row, level)
    }

    /// Cache position under a client point, if any.
    ///
    /// Points over the header, above the content or past the last row map
    /// to nothing.
    pub fn position_at(&self, metrics: &Metrics, point: Point, len: usize) -> Option<usize> {
        let stride = metrics.row_stride();
        if stride <= 0 || point.y < metrics.header_block() {
            return None;
        }
        let delta = i64::from(point.y) - i64::from(metrics.header_block()) + i64::from(self.offset.y);
        if delta < 0 {
            return None;
        }
        let position = usize::try_from(delta / i64::from(stride)).ok()?;
        (position < len).then_some(position)
    }

    /// Vertical offset that brings the row at `position` fully into view.
    ///
    /// A row above the window becomes the first visible row, a row below it
    /// the last one; a fully visible row keeps the current offset. The
    /// result is not clamped.
    pub fn offset_to_reveal(&self, metrics: &Metrics, position: usize) -> i32 {
        let stride = metrics.row_stride();
        let top = scaled(position, stride);
        let bottom = top.saturating_add(stride);
        let body = self.body_height(metrics);
        if top < self.offset.y {
            top
        } else if bottom > self.offset.y.saturating_add(body) {
            (bottom - body).min(top)
        } else {
            self.offset.y
        }
    }

    /// Vertical offset after a wheel rotation of `delta` units.
    ///
    /// Positive `lines` scrolls that many rows per notch; negative `lines`
    /// scrolls one viewport page per notch; zero disables wheel scrolling.
    /// The result is not clamped.
    pub fn offset_after_wheel(&self, metrics: &Metrics, delta: i32, lines: i32) -> i32 {
        let delta = i64::from(delta);
        let step = match lines {
            0 => return self.offset.y,
            lines if lines > 0 => (i64::from(metrics.row_stride()).saturating_mul(delta)
                / i64::from(WHEEL_DELTA))
            .saturating_mul(i64::from(lines)),
            _ => {
                let page = self.body_height(metrics).max(metrics.row_stride());
                i64::from(page).saturating_mul(delta) / i64::from(WHEEL_DELTA)
            }
        };
        clamp_extent(i64::from(self.offset.y).saturating_sub(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::MAX_EXTENT;

    /// No header, 25px rows + 1px lines = 26px stride.
    fn metrics() -> Metrics {
        Metrics {
            row_height: 25,
            show_header: false,
            ..Metrics::default()
        }
    }

    #[test]
    fn test_metrics() {
        let m = Metrics::default();
        assert_eq!(m.row_stride(), 27);
        assert_eq!(m.header_block(), 27);
        assert_eq!(m.extent_height(0), 28);
        assert_eq!(m.extent_height(10), 27 + 270 + 1);

        let m = metrics();
        assert_eq!(m.row_stride(), 26);
        assert_eq!(m.header_block(), 0);
    }

    #[test]
    fn test_visible_range_with_partial_rows() {
        let m = metrics();
        let mut viewport = Viewport::new(Size::new(300, 100));
        let extent = m.extent_height(10);

        assert!(viewport.set_vertical_offset(30, extent));
        assert_eq!(viewport.visible_range(&m, 10), 1..5);

        // Shows 40..140: row 5 (130..156) peeks in.
        viewport.set_vertical_offset(40, extent);
        assert_eq!(viewport.visible_range(&m, 10), 1..6);

        viewport.set_vertical_offset(0, extent);
        assert_eq!(viewport.visible_range(&m, 10), 0..4);
        assert_eq!(viewport.visible_range(&m, 2), 0..2);
        assert_eq!(viewport.visible_range(&m, 0), 0..0);
    }

    #[test]
    fn test_visible_range_with_header() {
        let m = Metrics::default();
        let viewport = Viewport::new(Size::new(300, 27 + 54));
        assert_eq!(viewport.visible_range(&m, 10), 0..3);

        // Smaller than the header: still one row.
        let viewport = Viewport::new(Size::new(300, 10));
        assert_eq!(viewport.visible_range(&m, 10), 0..1);
    }

    #[test]
    fn test_offsets_clamp() {
        let m = metrics();
        let mut viewport = Viewport::new(Size::new(100, 100));
        let extent = m.extent_height(10); // 261

        assert!(viewport.set_vertical_offset(1000, extent));
        assert_eq!(viewport.vertical_offset(), 161);
        assert!(viewport.set_vertical_offset(-5, extent));
        assert_eq!(viewport.vertical_offset(), 0);
        assert!(!viewport.set_vertical_offset(0, extent));

        // Content smaller than the viewport pins the offset at 0.
        assert!(!viewport.set_vertical_offset(50, m.extent_height(2)));
        assert!(!viewport.needs_vertical_scroll(m.extent_height(2)));

        viewport.set_horizontal_offset(80, 150);
        assert_eq!(viewport.horizontal_offset(), 50);
        assert!(viewport.clamp(Size::new(120, extent)));
        assert_eq!(viewport.horizontal_offset(), 20);
    }

    #[test]
    fn test_row_bounds() {
        let m = Metrics::default();
        assert_eq!(m.row_bounds(0, 402), Rect::new(1, 1, 400, 26));
        assert_eq!(m.row_bounds(2, 402), Rect::new(1, 55, 400, 26));

        let mut viewport = Viewport::new(Size::new(200, 200));
        viewport.set_vertical_offset(10, 1000);
        viewport.set_horizontal_offset(5, 402);
        assert_eq!(
            viewport.row_client_bounds(&m, 2, 402),
            Rect::new(-4, 55 + 27 - 10, 400, 26)
        );
    }

    #[test]
    fn test_expander_bounds() {
        let m = Metrics::default();
        let row = Rect::new(1, 1, 400, 26);
        // 9px glyph + 2 * 4px padding = 17px, centered in 26px.
        assert_eq!(m.expander_bounds(row, 0), Rect::new(1, 5, 17, 17));
        assert_eq!(m.expander_bounds(row, 2), Rect::new(23, 5, 17, 17));

        // Clipped to the row.
        let narrow = Rect::new(0, 0, 10, 26);
        assert_eq!(m.expander_bounds(narrow, 0), Rect::new(0, 4, 10, 17));
    }

    #[test]
    fn test_position_at() {
        let m = Metrics::default();
        let mut viewport = Viewport::new(Size::new(200, 200));
        assert_eq!(viewport.position_at(&m, Point::new(5, 10), 10), None);
        assert_eq!(viewport.position_at(&m, Point::new(5, 27), 10), Some(0));
        assert_eq!(viewport.position_at(&m, Point::new(5, 27 + 53), 10), Some(1));
        assert_eq!(viewport.position_at(&m, Point::new(5, 27 + 54), 2), None);

        viewport.set_vertical_offset(27, 1000);
        assert_eq!(viewport.position_at(&m, Point::new(5, 27), 10), Some(1));
    }

    #[test]
    fn test_offset_to_reveal() {
        let m = metrics();
        let mut viewport = Viewport::new(Size::new(100, 100));
        let extent = m.extent_height(20);
        viewport.set_vertical_offset(52, extent); // rows 2..=4 fully in view

        // Above: becomes first.
        assert_eq!(viewport.offset_to_reveal(&m, 0), 0);
        // Fully visible: unchanged.
        assert_eq!(viewport.offset_to_reveal(&m, 4), 52);
        // Below: becomes last (bottom at 260 - 100).
        assert_eq!(viewport.offset_to_reveal(&m, 9), 160);
        // Partially visible last row is scrolled fully into view.
        assert_eq!(viewport.offset_to_reveal(&m, 5), 156 - 100);
    }

    #[test]
    fn test_wheel() {
        let m = metrics();
        let mut viewport = Viewport::new(Size::new(100, 100));
        viewport.set_vertical_offset(200, 10_000);

        assert_eq!(viewport.offset_after_wheel(&m, -WHEEL_DELTA, 3), 200 + 78);
        assert_eq!(viewport.offset_after_wheel(&m, WHEEL_DELTA, 1), 200 - 26);
        assert_eq!(viewport.offset_after_wheel(&m, -WHEEL_DELTA, -1), 300);
        assert_eq!(viewport.offset_after_wheel(&m, WHEEL_DELTA * 2, -1), 0);
        assert_eq!(viewport.offset_after_wheel(&m, WHEEL_DELTA, 0), 200);
    }

    #[test]
    fn test_huge_layouts_saturate() {
        let m = Metrics {
            row_height: i32::MAX,
            line_width: i32::MAX,
            row_overhang: i32::MAX,
            ..metrics()
        };
        assert_eq!(m.row_stride(), i32::MAX);
        assert_eq!(m.extent_height(3_000_000), MAX_EXTENT);

        let mut viewport = Viewport::new(Size::new(i32::MAX, i32::MAX));
        viewport.set_vertical_offset(i32::MAX, m.extent_height(10));
        assert_eq!(viewport.vertical_offset(), 0);
        assert_eq!(viewport.visible_range(&m, 10), 0..2);
        assert_eq!(viewport.position_at(&m, Point::new(0, i32::MAX), 5), Some(1));
        assert_eq!(viewport.position_at(&m, Point::new(0, -1), 5), None);

        let mut viewport = Viewport::new(Size::new(100, 100));
        viewport.set_vertical_offset(i32::MAX, m.extent_height(10));
        assert_eq!(viewport.vertical_offset(), MAX_EXTENT - 100);
        assert_eq!(viewport.offset_to_reveal(&m, usize::MAX), MAX_EXTENT);
        assert_eq!(viewport.offset_after_wheel(&m, i32::MIN, i32::MAX), MAX_EXTENT);
    }
}
