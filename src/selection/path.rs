//! Selection path and the state it is read from.
//!
//! `SelectionPath` and `PathState` expose read access to everything. Their
//! mutators are `pub(super)`, so only `SelectionController` can change which
//! items are selected.

use std::fmt;

use crate::tree::model::{CandidateSet, Item, Level};

/// Up to four selected ids, one per level.
///
/// A non-empty slot at level K+1 is always scoped by the slot at level K:
/// changing level K to a different id clears every deeper slot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionPath {
    slots: [Option<String>; 4],
}

impl SelectionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from leading segments, e.g. a `a/x/p` deep link.
    ///
    /// Stops at the first empty segment so a deeper slot is never set without
    /// its parent. Segments past level 4 are ignored.
    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut path = Self::new();
        for (level, segment) in Level::ALL.into_iter().zip(segments) {
            let segment = segment.trim();
            if segment.is_empty() {
                break;
            }
            path.slots[level.index()] = Some(segment.to_string());
        }
        path
    }

    pub fn get(&self, level: Level) -> Option<&str> {
        self.slots[level.index()].as_deref()
    }

    #[allow(dead_code)] // used by tests
    pub fn level1(&self) -> Option<&str> {
        self.get(Level::One)
    }

    #[allow(dead_code)] // used by tests
    pub fn level2(&self) -> Option<&str> {
        self.get(Level::Two)
    }

    #[allow(dead_code)] // used by tests
    pub fn level3(&self) -> Option<&str> {
        self.get(Level::Three)
    }

    #[allow(dead_code)] // used by tests
    pub fn level4(&self) -> Option<&str> {
        self.get(Level::Four)
    }

    /// The selection that scopes `level`'s candidates.
    pub fn parent_of(&self, level: Level) -> Option<&str> {
        level.parent().and_then(|p| self.get(p))
    }

    /// Deepest level with a selection.
    pub fn depth(&self) -> Option<Level> {
        Level::ALL
            .into_iter()
            .rev()
            .find(|level| self.get(*level).is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Set `level` to `id`. Deeper slots are left untouched.
    pub(super) fn set(&mut self, level: Level, id: &str) {
        self.slots[level.index()] = Some(id.to_string());
    }

    /// Clear `level` itself and every deeper slot.
    pub(super) fn clear_from(&mut self, level: Level) {
        for slot in &mut self.slots[level.index()..] {
            *slot = None;
        }
    }

    /// Clear every slot strictly deeper than `level`.
    pub(super) fn clear_below(&mut self, level: Level) {
        if let Some(child) = level.child() {
            self.clear_from(child);
        }
    }
}

impl fmt::Display for SelectionPath {
    /// Deep-link form: `a/x/p`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self.slots.iter().map_while(|s| s.as_deref()).collect::<Vec<_>>();
        write!(f, "{}", parts.join("/"))
    }
}

/// Change counters used to tell fresh derived data from stale.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp {
    /// Bumped on every path mutation.
    pub path: u64,
    /// Bumped on every candidate-set edit.
    pub data: u64,
}

/// The current path plus the candidates it is read against.
#[derive(Debug, Default, Clone)]
pub struct PathState {
    path: SelectionPath,
    candidates: CandidateSet,
    stamp: Stamp,
}

impl PathState {
    pub fn new(candidates: CandidateSet) -> Self {
        Self::with_path(candidates, SelectionPath::new())
    }

    /// Start from an initial deep link. No notification is associated with it.
    pub fn with_path(candidates: CandidateSet, path: SelectionPath) -> Self {
        Self {
            path,
            candidates,
            stamp: Stamp::default(),
        }
    }

    pub fn path(&self) -> &SelectionPath {
        &self.path
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    pub fn selected(&self, level: Level) -> Option<&str> {
        self.path.get(level)
    }

    /// Candidates visible at `level` in their natural order.
    ///
    /// Level 1 is always visible; deeper levels need a parent selection.
    pub fn visible(&self, level: Level) -> &[Item] {
        if level == Level::One {
            return self.candidates.candidates(level, None);
        }
        self.candidates
            .candidates(level, self.path.parent_of(level))
    }

    /// The selected item at `level`, if it exists in the visible candidates.
    pub fn selected_item(&self, level: Level) -> Option<&Item> {
        let id = self.path.get(level)?;
        self.visible(level).iter().find(|i| i.id == id)
    }

    pub(super) fn path_mut(&mut self) -> &mut SelectionPath {
        self.stamp.path += 1;
        &mut self.path
    }

    pub(super) fn candidates_mut(&mut self) -> &mut CandidateSet {
        self.stamp.data += 1;
        &mut self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CandidateSet {
        let mut set = CandidateSet::new();
        set.add_item(Level::One, None, Item::new("a", "Alpha"));
        set.add_item(Level::One, None, Item::new("b", "Beta"));
        set.add_item(Level::Two, Some("a"), Item::new("x", "Ex"));
        set.add_item(Level::Two, Some("a"), Item::new("y", "Why"));
        set
    }

    #[test]
    fn deep_link_stops_at_first_gap() {
        let path = SelectionPath::from_segments("a//p".split('/'));
        assert_eq!(path.level1(), Some("a"));
        assert_eq!(path.level2(), None);
        assert_eq!(path.level3(), None, "level 3 must not outlive a missing level 2");
        assert_eq!(path.to_string(), "a");
    }

    #[test]
    fn deep_link_ignores_segments_past_level_four() {
        let path = SelectionPath::from_segments(["a", "b", "c", "d", "e"]);
        assert_eq!(path.level4(), Some("d"));
        assert_eq!(path.depth(), Some(Level::Four));
        assert_eq!(path.to_string(), "a/b/c/d");
    }

    #[test]
    fn clear_below_keeps_the_level_itself() {
        let mut path = SelectionPath::from_segments(["a", "x", "p"]);
        path.clear_below(Level::One);
        assert_eq!(path.level1(), Some("a"));
        assert!(path.level2().is_none() && path.level3().is_none());
        path.clear_from(Level::One);
        assert!(path.is_empty());
    }

    #[test]
    fn visible_levels_follow_parent_selection() {
        let state = PathState::with_path(sample(), SelectionPath::from_segments(["a"]));
        assert_eq!(state.visible(Level::One).len(), 2);
        assert_eq!(state.visible(Level::Two).len(), 2);
        assert!(
            state.visible(Level::Three).is_empty(),
            "no level-2 selection means no level-3 candidates"
        );
    }

    #[test]
    fn selected_item_requires_presence_in_candidates() {
        let state = PathState::with_path(sample(), SelectionPath::from_segments(["a", "zzz"]));
        assert_eq!(state.selected_item(Level::One).map(|i| i.name.as_str()), Some("Alpha"));
        assert!(state.selected_item(Level::Two).is_none());
    }

    #[test]
    fn mutable_access_bumps_stamp() {
        let mut state = PathState::new(sample());
        let before = state.stamp();
        state.path_mut().set(Level::One, "a");
        state.candidates_mut();
        let after = state.stamp();
        assert_eq!(after.path, before.path + 1);
        assert_eq!(after.data, before.data + 1);
    }
}
