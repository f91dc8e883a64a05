//! The single writer of the selection path.

use anyhow::Result;
use tracing::debug;

use crate::tree::model::{CandidateSet, Item, Level};

use super::events::{EventBus, Subscription, TreeEvent};
use super::path::PathState;

/// Owns `PathState` and applies every selection change to it.
///
/// Within one call the path is fully updated before any event is published,
/// so subscribers never observe a half-applied cascade.
#[derive(Debug)]
pub struct SelectionController {
    state: PathState,
    bus: EventBus,
}

impl SelectionController {
    pub fn new(state: PathState) -> Self {
        Self {
            state,
            bus: EventBus::new(),
        }
    }

    pub fn state(&self) -> &PathState {
        &self.state
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.bus.subscribe()
    }

    /// Select `item_id` at `level`.
    ///
    /// Re-selecting the current id is a no-op. Otherwise the slot is set,
    /// every deeper slot is cleared, and `SelectionChanged` is published.
    /// Ids missing from the visible candidates are accepted; the deeper
    /// columns simply render empty. Selecting below an empty parent slot is
    /// ignored. Returns whether anything changed.
    pub fn select(&mut self, level: Level, item_id: &str) -> bool {
        if self.state.selected(level) == Some(item_id) {
            debug!(%level, item_id, "selection unchanged");
            return false;
        }
        if let Some(parent) = level.parent()
            && self.state.selected(parent).is_none()
        {
            debug!(%level, %parent, item_id, "ignoring selection without a parent selection");
            return false;
        }
        if !self.state.visible(level).iter().any(|i| i.id == item_id) {
            debug!(%level, item_id, "selecting id absent from visible candidates");
        }

        let path = self.state.path_mut();
        path.set(level, item_id);
        path.clear_below(level);
        debug!(%level, item_id, path = %self.state.path(), "selection changed");

        self.bus.publish(TreeEvent::SelectionChanged {
            level,
            item_id: item_id.to_string(),
        });
        true
    }

    /// Clear `level` and everything below it. No-op when already empty.
    pub fn clear_from(&mut self, level: Level) -> bool {
        if self.state.selected(level).is_none() {
            return false;
        }
        self.state.path_mut().clear_from(level);
        debug!(%level, path = %self.state.path(), "path cleared");
        self.bus.publish(TreeEvent::PathCleared { level });
        true
    }

    /// Ask the host to open its assistant for a new node under `level`.
    pub fn request_custom_node(&mut self, level: Level) {
        self.bus.publish(TreeEvent::CustomNodeRequested {
            level,
            prompt: custom_node_prompt(level),
        });
    }

    /// Rename a visible item at `level`. Fails when `name` cannot be stored.
    pub fn rename(&mut self, level: Level, item_id: &str, name: &str) -> Result<bool> {
        let parent = self.state.path().parent_of(level).map(str::to_string);
        self.state
            .candidates_mut()
            .rename(level, parent.as_deref(), item_id, name)
    }

    /// Remove a visible item at `level`. Removing the selected item clears
    /// the path from `level` down.
    pub fn remove(&mut self, level: Level, item_id: &str) -> Option<Item> {
        let parent = self.state.path().parent_of(level).map(str::to_string);
        let removed = self
            .state
            .candidates_mut()
            .remove(level, parent.as_deref(), item_id)?;
        if self.state.selected(level) == Some(item_id) {
            self.clear_from(level);
        }
        Some(removed)
    }

    /// Swap in a freshly loaded candidate set. The path is kept as-is.
    pub fn replace_candidates(&mut self, candidates: CandidateSet) {
        *self.state.candidates_mut() = candidates;
    }
}

/// Level-specific opening message for the assistant panel.
pub fn custom_node_prompt(level: Level) -> String {
    format!(
        "Hi! Ready to add a new node under Level {}? Here is how to start:\n\
         - Option 1: type a clear title and description yourself.\n\
         - Option 2: describe your idea in plain words and I will help shape it into a well-structured node.",
        level.number()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::path::SelectionPath;
    use crate::selection::reorder::reorder;

    fn scenario_set() -> CandidateSet {
        let mut set = CandidateSet::new();
        set.add_item(Level::One, None, Item::new("a", "A"));
        set.add_item(Level::One, None, Item::new("b", "B"));
        set.add_item(Level::Two, Some("a"), Item::new("x", "X"));
        set.add_item(Level::Two, Some("a"), Item::new("y", "Y"));
        set.add_item(Level::Two, Some("b"), Item::new("m", "M"));
        set.add_item(Level::Two, Some("b"), Item::new("n", "N"));
        set.add_item(Level::Three, Some("y"), Item::new("p", "P"));
        set
    }

    fn controller() -> (SelectionController, Subscription) {
        let mut c = SelectionController::new(PathState::new(scenario_set()));
        let sub = c.subscribe();
        (c, sub)
    }

    fn display_ids(c: &SelectionController, level: Level) -> Vec<String> {
        reorder(c.state().visible(level), c.state().selected(level))
            .into_iter()
            .map(|i| i.id)
            .collect()
    }

    #[test]
    fn changing_level1_clears_deeper_levels() {
        let (mut c, _sub) = controller();
        c.select(Level::One, "a");
        c.select(Level::Two, "y");
        c.select(Level::Three, "p");
        c.select(Level::One, "b");
        let path = c.state().path();
        assert_eq!(path.level1(), Some("b"));
        assert!(path.level2().is_none(), "level 2 must be cleared");
        assert!(path.level3().is_none(), "level 3 must be cleared");
    }

    #[test]
    fn repeated_selection_emits_once() {
        let (mut c, sub) = controller();
        c.select(Level::One, "a");
        sub.drain();
        assert!(c.select(Level::Two, "y"));
        assert!(!c.select(Level::Two, "y"));
        let events = sub.drain();
        assert_eq!(
            events,
            vec![TreeEvent::SelectionChanged {
                level: Level::Two,
                item_id: "y".into()
            }],
            "second identical selection must not notify"
        );
        assert_eq!(c.state().path().level2(), Some("y"));
    }

    #[test]
    fn repeated_selection_keeps_deeper_levels() {
        let (mut c, _sub) = controller();
        c.select(Level::One, "a");
        c.select(Level::Two, "y");
        let stamp = c.state().stamp();
        c.select(Level::One, "a");
        assert_eq!(c.state().path().level2(), Some("y"));
        assert_eq!(c.state().stamp(), stamp, "no-op must not touch the path");
    }

    #[test]
    fn notification_sees_fully_applied_cascade() {
        let (mut c, sub) = controller();
        c.select(Level::One, "a");
        c.select(Level::Two, "y");
        sub.drain();
        c.select(Level::One, "b");
        // Events are delivered after the mutation; state is already final.
        assert_eq!(sub.drain().len(), 1);
        assert!(c.state().path().level2().is_none());
    }

    #[test]
    fn scenario_one_promotes_level2_selection() {
        let (mut c, _sub) = controller();
        c.select(Level::One, "a");
        c.select(Level::Two, "y");
        assert_eq!(display_ids(&c, Level::One), vec!["a", "b"]);
        assert_eq!(display_ids(&c, Level::Two), vec!["y", "x"]);
        assert!(c.state().path().level3().is_none());
    }

    #[test]
    fn scenario_two_switching_parent_restores_natural_order() {
        let (mut c, _sub) = controller();
        c.select(Level::One, "a");
        c.select(Level::Two, "y");
        c.select(Level::One, "b");
        assert!(c.state().path().level2().is_none());
        assert!(c.state().path().level3().is_none());
        assert_eq!(display_ids(&c, Level::Two), vec!["m", "n"]);
        assert_eq!(display_ids(&c, Level::One), vec!["b", "a"]);
    }

    #[test]
    fn unknown_id_is_accepted_and_deeper_column_is_empty() {
        let (mut c, sub) = controller();
        assert!(c.select(Level::One, "ghost"));
        assert_eq!(c.state().path().level1(), Some("ghost"));
        assert!(c.state().visible(Level::Two).is_empty());
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn selection_below_an_empty_parent_is_ignored() {
        let (mut c, sub) = controller();
        assert!(!c.select(Level::Three, "p"));
        assert!(c.state().path().is_empty());
        assert_eq!(c.state().path().to_string(), "");
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn rapid_selections_are_delivered_in_call_order() {
        let (mut c, sub) = controller();
        c.select(Level::One, "a");
        c.select(Level::Two, "x");
        c.select(Level::Two, "y");
        let levels = sub
            .drain()
            .into_iter()
            .map(|e| match e {
                TreeEvent::SelectionChanged { item_id, .. } => item_id,
                other => panic!("unexpected event {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(levels, vec!["a", "x", "y"]);
    }

    #[test]
    fn removing_selected_item_clears_path_and_notifies() {
        let state = PathState::with_path(scenario_set(), SelectionPath::from_segments(["a", "y", "p"]));
        let mut c = SelectionController::new(state);
        let sub = c.subscribe();
        let removed = c.remove(Level::Two, "y").expect("y is visible");
        assert_eq!(removed.id, "y");
        assert_eq!(c.state().path().to_string(), "a");
        assert_eq!(sub.drain(), vec![TreeEvent::PathCleared { level: Level::Two }]);
    }

    #[test]
    fn removing_unselected_item_keeps_path() {
        let state = PathState::with_path(scenario_set(), SelectionPath::from_segments(["a", "y"]));
        let mut c = SelectionController::new(state);
        let sub = c.subscribe();
        assert!(c.remove(Level::Two, "x").is_some());
        assert_eq!(c.state().path().to_string(), "a/y");
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn custom_node_request_carries_level_prompt() {
        let (mut c, sub) = controller();
        c.request_custom_node(Level::Three);
        match sub.try_next() {
            Some(TreeEvent::CustomNodeRequested { level, prompt }) => {
                assert_eq!(level, Level::Three);
                assert!(prompt.contains("Level 3"));
            }
            other => panic!("expected custom node request, got {other:?}"),
        }
    }

    #[test]
    fn custom_node_request_without_listener_is_harmless() {
        let mut c = SelectionController::new(PathState::new(scenario_set()));
        c.request_custom_node(Level::One);
        assert!(c.state().path().is_empty());
    }

    #[test]
    fn rename_uses_visible_scope() {
        let state = PathState::with_path(scenario_set(), SelectionPath::from_segments(["a"]));
        let mut c = SelectionController::new(state);
        assert!(c.rename(Level::Two, "x", "Renamed").unwrap());
        assert!(!c.rename(Level::Two, "m", "not visible under a").unwrap());
        assert!(c.rename(Level::Two, "x", "Pipe | split").is_err());
        assert_eq!(c.state().visible(Level::Two)[0].name, "Renamed");
    }
}
