//! Display ordering: the active selection is always rendered first.

use crate::tree::model::{Item, Level};

use super::path::{PathState, Stamp};

/// Return `items` with the element whose id is `selected_id` moved to the
/// front. Every other element keeps its relative order.
///
/// An absent or empty `selected_id`, or one already at index 0, returns the
/// input order unchanged. The input is never mutated.
pub fn reorder(items: &[Item], selected_id: Option<&str>) -> Vec<Item> {
    let mut out = items.to_vec();
    let Some(selected_id) = selected_id.filter(|id| !id.is_empty()) else {
        return out;
    };
    if let Some(idx) = out.iter().position(|item| item.id == selected_id)
        && idx > 0
    {
        let selected = out.remove(idx);
        out.insert(0, selected);
    }
    out
}

/// What one column needs to render: its ordered items and the selected id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    pub level: Level,
    pub items: &'a [Item],
    pub selected: Option<&'a str>,
}

#[derive(Debug, Clone)]
struct Entry {
    data: u64,
    parent: Option<String>,
    selected: Option<String>,
    items: Vec<Item>,
}

impl Entry {
    fn matches(&self, data: u64, parent: Option<&str>, selected: Option<&str>) -> bool {
        self.data == data && self.parent.as_deref() == parent && self.selected.as_deref() == selected
    }
}

/// Memoises `reorder` per level on `(candidate revision, parent id, selected id)`.
#[derive(Debug, Default)]
pub struct DisplayOrderCache {
    entries: [Option<Entry>; 4],
    recomputed: usize,
}

impl DisplayOrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The column for `level`, recomputed only when its inputs changed.
    pub fn column<'a>(&'a mut self, state: &'a PathState, level: Level) -> Column<'a> {
        self.refresh(state, level);
        self.view(state, level)
    }

    /// Columns for every level from 1 down to `deepest`.
    pub fn columns<'a>(&'a mut self, state: &'a PathState, deepest: Level) -> Vec<Column<'a>> {
        let levels = Level::ALL.into_iter().take(deepest.number());
        for level in levels.clone() {
            self.refresh(state, level);
        }
        levels.map(|level| self.view(state, level)).collect()
    }

    fn refresh(&mut self, state: &PathState, level: Level) {
        let Stamp { data, .. } = state.stamp();
        let parent = if level == Level::One {
            None
        } else {
            state.path().parent_of(level)
        };
        let selected = state.selected(level);

        let slot = &mut self.entries[level.index()];
        let fresh = slot
            .as_ref()
            .is_some_and(|entry| entry.matches(data, parent, selected));
        if !fresh {
            self.recomputed += 1;
            *slot = Some(Entry {
                data,
                parent: parent.map(str::to_string),
                selected: selected.map(str::to_string),
                items: reorder(state.visible(level), selected),
            });
        }
    }

    fn view<'a>(&'a self, state: &'a PathState, level: Level) -> Column<'a> {
        let items = self.entries[level.index()]
            .as_ref()
            .map(|e| e.items.as_slice())
            .unwrap_or(&[]);
        Column {
            level,
            items,
            selected: state.selected(level),
        }
    }

    /// How many times any column had to be reordered.
    #[allow(dead_code)] // used by tests
    pub fn recomputed(&self) -> usize {
        self.recomputed
    }
}
