//! Damage tracking for partial repaints of the control.
//!
//! The control never paints; it records which client-space rectangles have
//! changed so the host can repaint only those. Focus and selection changes
//! damage single rows, a no-op expand or collapse damages only the expander,
//! and structural edits invalidate everything.

use crate::geometry::Rect;

/// Repaint request drained by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Damage {
    /// Nothing needs repainting.
    None,
    /// Only these client rectangles need repainting, in recording order.
    Regions(Vec<Rect>),
    /// The whole client area needs repainting.
    Full,
}

impl Damage {
    /// Returns `true` if nothing needs repainting.
    pub fn is_none(&self) -> bool {
        matches!(self, Damage::None)
    }
}

/// Accumulates damaged client rectangles between host repaints.
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    regions: Vec<Rect>,
    full_repaint: bool,
    viewport: Option<Rect>,
}

impl DamageTracker {
    /// Above this many fragments the tracker switches to a full repaint.
    const MAX_DAMAGE_COUNT: usize = 64;

    /// Create a new damage tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client bounds used to clip damage.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = Some(viewport);
    }

    /// Add a damaged region that needs repainting.
    ///
    /// Empty rectangles and rectangles entirely outside the viewport are
    /// ignored; the rest are clipped to the viewport.
    pub fn add_damage(&mut self, rect: Rect) {
        if self.full_repaint || rect.is_empty() {
            return;
        }

        let rect = match &self.viewport {
            Some(viewport) => match rect.intersect(viewport) {
                Some(clipped) => clipped,
                None => return,
            },
            None => rect,
        };

        if self.regions.contains(&rect) {
            return;
        }

        self.regions.push(rect);
        if self.regions.len() > Self::MAX_DAMAGE_COUNT {
            self.invalidate_all();
        }
    }

    /// Mark the entire client area as damaged.
    pub fn invalidate_all(&mut self) {
        self.full_repaint = true;
        self.regions.clear();
    }

    /// Check if any damage has been recorded.
    #[inline]
    pub fn has_damage(&self) -> bool {
        self.full_repaint || !self.regions.is_empty()
    }

    /// Check if a full repaint is needed.
    #[inline]
    pub fn needs_full_repaint(&self) -> bool {
        self.full_repaint
    }

    /// The recorded partial regions.
    pub fn regions(&self) -> &[Rect] {
        &self.regions
    }

    /// Take the accumulated damage, leaving the tracker clean.
    pub fn take(&mut self) -> Damage {
        let damage = if self.full_repaint {
            Damage::Full
        } else if self.regions.is_empty() {
            Damage::None
        } else {
            Damage::Regions(std::mem::take(&mut self.regions))
        };
        self.clear();
        damage
    }

    /// Clear all damage.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.full_repaint = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tracker() {
        let mut tracker = DamageTracker::new();
        assert!(!tracker.has_damage());
        assert_eq!(tracker.take(), Damage::None);
    }

    #[test]
    fn test_regions_are_kept_separately() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(Rect::new(0, 0, 10, 10));
        tracker.add_damage(Rect::new(0, 50, 10, 10));
        tracker.add_damage(Rect::new(0, 0, 10, 10));

        assert_eq!(
            tracker.take(),
            Damage::Regions(vec![Rect::new(0, 0, 10, 10), Rect::new(0, 50, 10, 10)])
        );
        assert!(!tracker.has_damage());
    }

    #[test]
    fn test_viewport_clipping() {
        let mut tracker = DamageTracker::new();
        tracker.set_viewport(Rect::new(0, 0, 100, 100));

        tracker.add_damage(Rect::new(-10, 90, 50, 20));
        tracker.add_damage(Rect::new(200, 200, 10, 10));

        assert_eq!(tracker.regions(), &[Rect::new(0, 90, 40, 10)]);
    }

    #[test]
    fn test_invalidate_all_wins() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(Rect::new(0, 0, 10, 10));
        tracker.invalidate_all();
        tracker.add_damage(Rect::new(0, 20, 10, 10));

        assert!(tracker.needs_full_repaint());
        assert_eq!(tracker.take(), Damage::Full);
        assert_eq!(tracker.take(), Damage::None);
    }

    #[test]
    fn test_too_many_fragments_become_full() {
        let mut tracker = DamageTracker::new();
        for i in 0..=DamageTracker::MAX_DAMAGE_COUNT as i32 {
            tracker.add_damage(Rect::new(0, i * 10, 10, 5));
        }
        assert!(tracker.needs_full_repaint());
    }

    #[test]
    fn test_empty_rect_ignored() {
        let mut tracker = DamageTracker::new();
        tracker.add_damage(Rect::new(10, 10, 0, 50));
        tracker.add_damage(Rect::new(10, 10, -10, 50));
        assert!(!tracker.has_damage());
    }
}
