//! `techtree path a/x/p`: apply a path and print what the view would show.

use anyhow::{Result, bail};
use tracing::debug;

use crate::connect::connector::{ConnectorLayout, Flow};
use crate::connect::measure::{Bounds, Measurements};
use crate::parser::config::Config;
use crate::selection::controller::SelectionController;
use crate::selection::path::PathState;
use crate::selection::reorder::DisplayOrderCache;
use crate::techtree;
use crate::tree::model::{CandidateSet, Level};

const COLUMN_WIDTH: i32 = 24;
const COLUMN_GAP: i32 = 5;
const ITEM_HEIGHT: i32 = 3;

pub fn run(path: &str) -> Result<()> {
    let root = techtree::find_root()?;
    let set = techtree::load_tree(&root)?;
    let config = techtree::load_config(&root)?;
    for line in path_report(set, &config, path)? {
        println!("  {line}");
    }
    Ok(())
}

fn path_report(set: CandidateSet, config: &Config, path: &str) -> Result<Vec<String>> {
    let mut controller = SelectionController::new(PathState::new(set));
    let events = controller.subscribe();

    let segments = path.split('/').collect::<Vec<_>>();
    if segments.len() > Level::ALL.len() {
        bail!("path {path:?} is deeper than level 4");
    }
    for (level, segment) in Level::ALL.into_iter().zip(segments) {
        let segment = segment.trim();
        if segment.is_empty() {
            bail!("path {path:?} has an empty segment at {level}");
        }
        if !controller.state().visible(level).iter().any(|i| i.id == segment) {
            let under = controller
                .state()
                .path()
                .parent_of(level)
                .map(|p| format!(" under '{p}'"))
                .unwrap_or_default();
            bail!(
                "no {} '{segment}'{under}",
                config.level_name(level).to_lowercase()
            );
        }
        controller.select(level, segment);
    }

    let state = controller.state();
    let deepest = state
        .path()
        .depth()
        .map_or(config.deepest_level(), |d| d.max(config.deepest_level()));
    let mut cache = DisplayOrderCache::new();
    let columns = cache.columns(state, deepest);

    // Lay the columns out on a fixed grid so connector anchors can be reported.
    let container = Bounds::new(
        0,
        0,
        columns.len() as i32 * (COLUMN_WIDTH + COLUMN_GAP),
        columns
            .iter()
            .map(|c| c.items.len() as i32 * ITEM_HEIGHT)
            .max()
            .unwrap_or(0),
    );
    let mut measurements = Measurements::new(state.stamp(), container);
    let mut lines = Vec::new();
    for (col, column) in columns.iter().enumerate() {
        lines.push(format!(
            "{} ({})",
            column.level,
            config.level_name(column.level)
        ));
        if column.items.is_empty() {
            lines.push("    (empty)".to_string());
        }
        for (row, item) in column.items.iter().enumerate() {
            let marker = if column.selected == Some(item.id.as_str()) {
                "●"
            } else {
                " "
            };
            lines.push(format!("  {marker} {} ({})", item.name, item.id));
            measurements.record(
                column.level,
                &item.id,
                Bounds::new(
                    col as i32 * (COLUMN_WIDTH + COLUMN_GAP),
                    row as i32 * ITEM_HEIGHT,
                    COLUMN_WIDTH,
                    ITEM_HEIGHT,
                ),
            );
        }
    }

    let layout = ConnectorLayout::compute(
        state.path(),
        state.stamp(),
        &measurements,
        Flow::LeftToRight,
        deepest,
    );
    lines.push(String::new());
    lines.push(format!("path: {}", state.path()));
    for pair in layout.drawn() {
        if let Some(c) = pair.connector {
            lines.push(format!(
                "connector {} -> {}: ({}, {}) -> ({}, {})",
                pair.source, pair.target, c.from.x, c.from.y, c.to.x, c.to.y
            ));
        }
    }
    let notified = events.drain().len();
    debug!(notified, "path applied");
    lines.push(format!("selection events: {notified}"));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tree;

    fn set() -> CandidateSet {
        tree::parse("a : A\n    x : X\n    y : Y\n        p : P\nb : B\n").unwrap()
    }

    #[test]
    fn marks_selection_and_promotes_it() {
        let lines = path_report(set(), &Config::default(), "a/y").unwrap();
        let level2 = lines.iter().position(|l| l == "level2 (Function)").unwrap();
        assert_eq!(lines[level2 + 1], "  ● Y (y)");
        assert_eq!(lines[level2 + 2], "    X (x)");
        assert!(lines.contains(&"path: a/y".to_string()));
        assert!(lines.contains(&"selection events: 2".to_string()));
    }

    #[test]
    fn reports_connectors_for_selected_pairs_only() {
        let lines = path_report(set(), &Config::default(), "a/y").unwrap();
        let connectors = lines
            .iter()
            .filter(|l| l.starts_with("connector"))
            .collect::<Vec<_>>();
        assert_eq!(connectors, vec!["connector level1 -> level2: (24, 1) -> (29, 1)"]);
    }

    #[test]
    fn rejects_unknown_and_empty_segments() {
        let err = path_report(set(), &Config::default(), "a/zzz").unwrap_err();
        assert_eq!(err.to_string(), "no function 'zzz' under 'a'");
        assert!(path_report(set(), &Config::default(), "a//p").is_err());
        assert!(path_report(set(), &Config::default(), "a/y/p/q/r").is_err());
    }
}
