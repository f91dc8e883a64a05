//! Rasterise a connector into terminal cells as an elbow route.

use super::connector::{Connector, Flow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCell {
    pub x: i32,
    pub y: i32,
    pub ch: char,
}

/// Cells for an elbow route between the connector's anchors.
///
/// Anchors are edge coordinates: the route occupies the cells from the
/// source's trailing edge up to, but not including, the target's leading
/// edge. The last cell carries an arrow head. Overlapping or touching
/// rectangles produce no cells.
pub fn elbow(connector: Connector, flow: Flow) -> Vec<RouteCell> {
    match flow {
        Flow::LeftToRight => horizontal_elbow(connector),
        Flow::TopToBottom => vertical_elbow(connector),
    }
}

fn horizontal_elbow(Connector { from, to }: Connector) -> Vec<RouteCell> {
    let (x0, y0, x1, y1) = (from.x, from.y, to.x, to.y);
    if x1 <= x0 {
        return Vec::new();
    }
    let mut cells = Vec::new();
    if y0 == y1 {
        for x in x0..x1 {
            cells.push(RouteCell { x, y: y0, ch: '─' });
        }
    } else {
        let mid = x0 + (x1 - x0 - 1) / 2;
        let down = y1 > y0;
        for x in x0..mid {
            cells.push(RouteCell { x, y: y0, ch: '─' });
        }
        cells.push(RouteCell {
            x: mid,
            y: y0,
            ch: if down { '╮' } else { '╯' },
        });
        for y in y0.min(y1) + 1..y0.max(y1) {
            cells.push(RouteCell { x: mid, y, ch: '│' });
        }
        cells.push(RouteCell {
            x: mid,
            y: y1,
            ch: if down { '╰' } else { '╭' },
        });
        for x in mid + 1..x1 {
            cells.push(RouteCell { x, y: y1, ch: '─' });
        }
    }
    finish_with_head(&mut cells, x1 - 1, y1, '▶');
    cells
}

fn vertical_elbow(Connector { from, to }: Connector) -> Vec<RouteCell> {
    let (x0, y0, x1, y1) = (from.x, from.y, to.x, to.y);
    if y1 <= y0 {
        return Vec::new();
    }
    let mut cells = Vec::new();
    if x0 == x1 {
        for y in y0..y1 {
            cells.push(RouteCell { x: x0, y, ch: '│' });
        }
    } else {
        let mid = y0 + (y1 - y0 - 1) / 2;
        let right = x1 > x0;
        for y in y0..mid {
            cells.push(RouteCell { x: x0, y, ch: '│' });
        }
        cells.push(RouteCell {
            x: x0,
            y: mid,
            ch: if right { '╰' } else { '╯' },
        });
        for x in x0.min(x1) + 1..x0.max(x1) {
            cells.push(RouteCell { x, y: mid, ch: '─' });
        }
        cells.push(RouteCell {
            x: x1,
            y: mid,
            ch: if right { '╮' } else { '╭' },
        });
        for y in mid + 1..y1 {
            cells.push(RouteCell { x: x1, y, ch: '│' });
        }
    }
    finish_with_head(&mut cells, x1, y1 - 1, '▼');
    cells
}

/// Replace the straight segment ending at `(x, y)` with an arrow head.
/// Corners are left alone so a one-cell-wide bend stays readable.
fn finish_with_head(cells: &mut [RouteCell], x: i32, y: i32, head: char) {
    if let Some(last) = cells
        .iter_mut()
        .rev()
        .find(|c| c.x == x && c.y == y && matches!(c.ch, '─' | '│'))
    {
        last.ch = head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::connector::Point;

    fn conn(x0: i32, y0: i32, x1: i32, y1: i32) -> Connector {
        Connector {
            from: Point::new(x0, y0),
            to: Point::new(x1, y1),
        }
    }

    fn render(cells: &[RouteCell]) -> String {
        let (min_x, max_x) = (
            cells.iter().map(|c| c.x).min().unwrap(),
            cells.iter().map(|c| c.x).max().unwrap(),
        );
        let (min_y, max_y) = (
            cells.iter().map(|c| c.y).min().unwrap(),
            cells.iter().map(|c| c.y).max().unwrap(),
        );
        let mut rows = Vec::new();
        for y in min_y..=max_y {
            let mut row = String::new();
            for x in min_x..=max_x {
                let ch = cells
                    .iter()
                    .find(|c| c.x == x && c.y == y)
                    .map(|c| c.ch)
                    .unwrap_or(' ');
                row.push(ch);
            }
            rows.push(row);
        }
        rows.join("\n")
    }

    #[test]
    fn straight_horizontal_route_ends_in_arrow() {
        let cells = elbow(conn(0, 2, 4, 2), Flow::LeftToRight);
        assert_eq!(render(&cells), "───▶");
    }

    #[test]
    fn descending_horizontal_elbow() {
        let cells = elbow(conn(0, 0, 5, 2), Flow::LeftToRight);
        assert_eq!(render(&cells), "──╮  \n  │  \n  ╰─▶");
    }

    #[test]
    fn ascending_horizontal_elbow() {
        let cells = elbow(conn(0, 2, 5, 0), Flow::LeftToRight);
        assert_eq!(render(&cells), "  ╭─▶\n  │  \n──╯  ");
    }

    #[test]
    fn overlapping_columns_produce_no_route() {
        assert!(elbow(conn(5, 0, 5, 3), Flow::LeftToRight).is_empty());
        assert!(elbow(conn(0, 4, 3, 4), Flow::TopToBottom).is_empty());
    }

    #[test]
    fn vertical_elbow_bends_toward_target() {
        let cells = elbow(conn(0, 0, 3, 4), Flow::TopToBottom);
        assert_eq!(render(&cells), "│   \n╰──╮\n   │\n   ▼");
    }
}
