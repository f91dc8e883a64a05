//! Anchor points for the line joining a selected item to its selected child.

use crate::selection::path::{SelectionPath, Stamp};
use crate::tree::model::Level;

use super::measure::{Bounds, Measurements};

/// A point relative to the shared container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// How columns are laid out relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Columns side by side; the trailing edge is the right edge.
    #[default]
    LeftToRight,
    /// Columns stacked; the trailing edge is the bottom edge.
    #[allow(dead_code)] // the terminal view only lays columns out side by side
    TopToBottom,
}

/// Start and end anchors of one connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub from: Point,
    pub to: Point,
}

impl Connector {
    /// Pull both anchors `cells` inward along `flow`, clearing frames drawn
    /// around the measured rectangles.
    pub fn inset(self, flow: Flow, cells: i32) -> Self {
        let (from, to) = match flow {
            Flow::LeftToRight => (
                Point::new(self.from.x + cells, self.from.y),
                Point::new(self.to.x - cells, self.to.y),
            ),
            Flow::TopToBottom => (
                Point::new(self.from.x, self.from.y + cells),
                Point::new(self.to.x, self.to.y - cells),
            ),
        };
        Self { from, to }
    }
}

/// Compute the anchors between `source` and `target`, relative to `container`.
///
/// The source anchor is the midpoint of the source's trailing edge, the
/// target anchor the midpoint of the target's leading edge. Returns `None`
/// when either rectangle is unavailable.
pub fn compute_connector(
    source: Option<Bounds>,
    target: Option<Bounds>,
    container: Bounds,
    flow: Flow,
) -> Option<Connector> {
    let (source, target) = (source?, target?);
    let (from, to) = match flow {
        Flow::LeftToRight => (
            Point::new(source.right(), source.y + source.height / 2),
            Point::new(target.x, target.y + target.height / 2),
        ),
        Flow::TopToBottom => (
            Point::new(source.x + source.width / 2, source.bottom()),
            Point::new(target.x + target.width / 2, target.y),
        ),
    };
    Some(Connector {
        from: Point::new(from.x - container.x, from.y - container.y),
        to: Point::new(to.x - container.x, to.y - container.y),
    })
}

/// The connector for one adjacent level pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairConnector {
    pub source: Level,
    pub target: Level,
    pub connector: Option<Connector>,
}

/// Connectors for every adjacent pair among the shown levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorLayout {
    pub pairs: Vec<PairConnector>,
}

impl ConnectorLayout {
    /// Derive connectors from the current path and the latest measurements.
    ///
    /// Measurements taken for a different `stamp` are ignored, so a late
    /// layout pass never draws lines for a selection that has since moved.
    pub fn compute(
        path: &SelectionPath,
        stamp: Stamp,
        measurements: &Measurements,
        flow: Flow,
        deepest: Level,
    ) -> Self {
        let current = measurements.is_current(stamp);
        let rect_for = |level: Level| {
            if !current {
                return None;
            }
            path.get(level).and_then(|id| measurements.rect(level, id))
        };

        let pairs = Level::ALL
            .into_iter()
            .take(deepest.index())
            .filter_map(|source| source.child().map(|target| (source, target)))
            .map(|(source, target)| PairConnector {
                source,
                target,
                connector: compute_connector(
                    rect_for(source),
                    rect_for(target),
                    measurements.container(),
                    flow,
                ),
            })
            .collect();
        Self { pairs }
    }

    #[allow(dead_code)] // used by tests
    pub fn get(&self, source: Level) -> Option<Connector> {
        self.pairs
            .iter()
            .find(|p| p.source == source)
            .and_then(|p| p.connector)
    }

    /// Connectors that should actually be drawn.
    pub fn drawn(&self) -> impl Iterator<Item = &PairConnector> {
        self.pairs.iter().filter(|p| p.connector.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container() -> Bounds {
        Bounds::new(10, 5, 100, 40)
    }

    #[test]
    fn missing_rect_yields_none() {
        let r = Some(Bounds::new(12, 7, 10, 3));
        assert_eq!(compute_connector(None, r, container(), Flow::LeftToRight), None);
        assert_eq!(compute_connector(r, None, container(), Flow::LeftToRight), None);
        assert_eq!(compute_connector(None, None, container(), Flow::TopToBottom), None);
    }

    #[test]
    fn left_to_right_uses_side_midpoints_relative_to_container() {
        let c = compute_connector(
            Some(Bounds::new(12, 7, 10, 3)),
            Some(Bounds::new(40, 13, 10, 5)),
            container(),
            Flow::LeftToRight,
        )
        .expect("both rects known");
        assert_eq!(c.from, Point::new(12, 3));
        assert_eq!(c.to, Point::new(30, 10));
    }

    #[test]
    fn top_to_bottom_uses_bottom_and_top_centers() {
        let c = compute_connector(
            Some(Bounds::new(10, 5, 20, 4)),
            Some(Bounds::new(40, 20, 10, 4)),
            container(),
            Flow::TopToBottom,
        )
        .expect("both rects known");
        assert_eq!(c.from, Point::new(10, 4));
        assert_eq!(c.to, Point::new(35, 15));
    }

    #[test]
    fn inset_moves_anchors_toward_each_other() {
        let c = Connector {
            from: Point::new(10, 4),
            to: Point::new(16, 6),
        };
        let inset = c.inset(Flow::LeftToRight, 1);
        assert_eq!(inset.from, Point::new(11, 4));
        assert_eq!(inset.to, Point::new(15, 6));
        assert_eq!(c.inset(Flow::TopToBottom, 2).to, Point::new(16, 4));
    }

    #[test]
    fn layout_covers_adjacent_pairs_up_to_deepest_level() {
        let path = SelectionPath::from_segments(["a", "x"]);
        let stamp = Stamp::default();
        let mut m = Measurements::new(stamp, container());
        m.record(Level::One, "a", Bounds::new(12, 7, 10, 3));
        m.record(Level::Two, "x", Bounds::new(40, 7, 10, 3));

        let layout = ConnectorLayout::compute(&path, stamp, &m, Flow::LeftToRight, Level::Three);
        assert_eq!(layout.pairs.len(), 2);
        assert!(layout.get(Level::One).is_some());
        assert!(layout.get(Level::Two).is_none(), "level 3 is unselected");
        assert_eq!(layout.drawn().count(), 1);
    }

    #[test]
    fn stale_measurements_draw_nothing() {
        let path = SelectionPath::from_segments(["a", "x"]);
        let old = Stamp { path: 1, data: 0 };
        let mut m = Measurements::new(old, container());
        m.record(Level::One, "a", Bounds::new(12, 7, 10, 3));
        m.record(Level::Two, "x", Bounds::new(40, 7, 10, 3));

        let layout = ConnectorLayout::compute(
            &path,
            Stamp { path: 2, data: 0 },
            &m,
            Flow::LeftToRight,
            Level::Three,
        );
        assert_eq!(layout.drawn().count(), 0);
    }

    #[test]
    fn unmeasured_selection_draws_nothing() {
        let path = SelectionPath::from_segments(["a", "x"]);
        let stamp = Stamp::default();
        let mut m = Measurements::new(stamp, container());
        m.record(Level::One, "a", Bounds::new(12, 7, 10, 3));
        let layout = ConnectorLayout::compute(&path, stamp, &m, Flow::LeftToRight, Level::Four);
        assert_eq!(layout.pairs.len(), 3);
        assert_eq!(layout.drawn().count(), 0);
    }
}
