//! Rendered item rectangles, as reported by the view after each layout pass.

use std::collections::HashMap;

use crate::selection::path::Stamp;
use crate::tree::model::Level;

/// An axis-aligned rectangle in the view's coordinate space.
///
/// Coordinates are signed so items scrolled above or left of a container
/// still have a well-defined position relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[allow(dead_code)] // used by tests
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

impl From<ratatui::layout::Rect> for Bounds {
    fn from(rect: ratatui::layout::Rect) -> Self {
        Self::new(
            i32::from(rect.x),
            i32::from(rect.y),
            i32::from(rect.width),
            i32::from(rect.height),
        )
    }
}

/// One layout pass worth of measurements.
///
/// Tagged with the `Stamp` of the state it was rendered from; consumers
/// treat a measurement set from an older stamp as unavailable.
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    stamp: Stamp,
    container: Bounds,
    rects: HashMap<(Level, String), Bounds>,
}

impl Measurements {
    pub fn new(stamp: Stamp, container: Bounds) -> Self {
        Self {
            stamp,
            container,
            rects: HashMap::new(),
        }
    }

    /// Report where an item was drawn. Empty rectangles are ignored.
    pub fn record(&mut self, level: Level, id: &str, rect: Bounds) {
        if rect.is_empty() {
            return;
        }
        self.rects.insert((level, id.to_string()), rect);
    }

    pub fn rect(&self, level: Level, id: &str) -> Option<Bounds> {
        self.rects.get(&(level, id.to_string())).copied()
    }

    pub fn container(&self) -> Bounds {
        self.container
    }

    pub fn is_current(&self, stamp: Stamp) -> bool {
        self.stamp == stamp
    }

    /// The item drawn at `(x, y)`, if any.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<(Level, &str)> {
        self.rects
            .iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|((level, id), _)| (*level, id.as_str()))
    }

    #[allow(dead_code)] // used by tests
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[allow(dead_code)] // used by tests
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_hit_tests_items() {
        let mut m = Measurements::new(Stamp::default(), Bounds::new(0, 0, 80, 24));
        m.record(Level::One, "a", Bounds::new(2, 2, 10, 3));
        m.record(Level::Two, "x", Bounds::new(20, 2, 10, 3));
        assert_eq!(m.hit_test(3, 3), Some((Level::One, "a")));
        assert_eq!(m.hit_test(29, 4), Some((Level::Two, "x")));
        assert_eq!(m.hit_test(30, 4), None, "right edge is exclusive");
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn empty_rects_are_not_recorded() {
        let mut m = Measurements::default();
        m.record(Level::One, "a", Bounds::new(1, 1, 0, 3));
        assert!(m.rect(Level::One, "a").is_none());
        assert!(m.is_empty());
    }

    #[test]
    fn staleness_follows_stamp() {
        let m = Measurements::new(Stamp { path: 2, data: 0 }, Bounds::default());
        assert!(m.is_current(Stamp { path: 2, data: 0 }));
        assert!(!m.is_current(Stamp { path: 3, data: 0 }));
    }

    #[test]
    fn converts_from_ratatui_rect() {
        let b = Bounds::from(ratatui::layout::Rect::new(4, 5, 6, 7));
        assert_eq!(b, Bounds::new(4, 5, 6, 7));
        assert_eq!((b.right(), b.bottom()), (10, 12));
    }
}
