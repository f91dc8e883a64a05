use std::collections::HashMap;
use std::fmt;

use anyhow::{Result, bail};

/// Trailing marker that flags a user-added item in `tree.tt`.
pub const CUSTOM_TAG: &str = "[custom]";

/// One tier of the classification hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// Purpose.
    One,
    /// Function.
    Two,
    /// Technique.
    Three,
    /// Implementation (optional fourth tier).
    Four,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::One, Level::Two, Level::Three, Level::Four];

    /// 1-based level number as shown to users.
    pub fn number(self) -> usize {
        self.index() + 1
    }

    /// 0-based slot index.
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Three => 2,
            Self::Four => 3,
        }
    }

    pub fn from_number(n: usize) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::from_number(idx + 1)
    }

    /// The level whose selection scopes this level's candidates.
    pub fn parent(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn child(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Every level strictly deeper than `self`, shallowest first.
    pub fn deeper(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().skip(self.index() + 1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level{}", self.number())
    }
}

/// A selectable entry in one column.
///
/// Ids are unique within their parent scope, not globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Added by the user rather than shipped with the tree.
    pub is_custom: bool,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            is_custom: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn custom(mut self) -> Self {
        self.is_custom = true;
        self
    }
}

/// Reject a display name that would not survive a `tree.tt` round trip.
pub fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("name cannot be empty");
    }
    if name.contains('|') {
        bail!("name cannot contain '|'");
    }
    if name.contains(['\n', '\r']) {
        bail!("name must fit on one line");
    }
    if name.trim_end().ends_with(CUSTOM_TAG) {
        bail!("name cannot end with {CUSTOM_TAG}");
    }
    Ok(())
}

/// The pool of selectable items for every level.
///
/// Level 1 is a flat sequence. Deeper levels are keyed by the id of the
/// selected item one level up. Order is preserved exactly as authored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub level1: Vec<Item>,
    /// `children[0]` holds level 2 keyed by level-1 id, `children[1]` level 3
    /// keyed by level-2 id, `children[2]` level 4 keyed by level-3 id.
    children: [HashMap<String, Vec<Item>>; 3],
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates for `level` given the parent level's selection.
    ///
    /// Level 1 ignores `parent`. Deeper levels with no parent selection, or a
    /// parent with no registered children, yield an empty slice.
    pub fn candidates(&self, level: Level, parent: Option<&str>) -> &[Item] {
        match level.index().checked_sub(1) {
            None => &self.level1,
            Some(map_idx) => parent
                .and_then(|p| self.children[map_idx].get(p))
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    pub fn get(&self, level: Level, parent: Option<&str>, id: &str) -> Option<&Item> {
        self.candidates(level, parent).iter().find(|i| i.id == id)
    }

    fn scope_mut(&mut self, level: Level, parent: Option<&str>) -> Option<&mut Vec<Item>> {
        match level.index().checked_sub(1) {
            None => Some(&mut self.level1),
            Some(map_idx) => parent.and_then(move |p| self.children[map_idx].get_mut(p)),
        }
    }

    /// Append an item to the scope of `parent` at `level`.
    ///
    /// Panics if the id is already present in that scope or if a level > 1
    /// item is added without a parent key.
    pub fn add_item(&mut self, level: Level, parent: Option<&str>, item: Item) {
        assert!(
            self.get(level, parent, &item.id).is_none(),
            "duplicate item '{}' under {:?} at {}",
            item.id,
            parent,
            level
        );
        match level.index().checked_sub(1) {
            None => self.level1.push(item),
            Some(map_idx) => {
                let key = parent.expect("items below level 1 need a parent key");
                self.children[map_idx]
                    .entry(key.to_string())
                    .or_default()
                    .push(item);
            }
        }
    }

    /// Rename an item in place. Returns `Ok(false)` when it does not exist.
    ///
    /// Names that `tree.tt` could not read back unchanged are rejected.
    pub fn rename(
        &mut self,
        level: Level,
        parent: Option<&str>,
        id: &str,
        name: &str,
    ) -> Result<bool> {
        let name = name.trim();
        check_name(name)?;
        match self
            .scope_mut(level, parent)
            .and_then(|items| items.iter_mut().find(|i| i.id == id))
        {
            Some(item) => {
                item.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove an item and, when no sibling-scope item keeps the same id alive,
    /// every descendant keyed by it.
    pub fn remove(&mut self, level: Level, parent: Option<&str>, id: &str) -> Option<Item> {
        let items = self.scope_mut(level, parent)?;
        let idx = items.iter().position(|i| i.id == id)?;
        let removed = items.remove(idx);
        if !self.id_in_use(level, id) {
            self.drop_children(level, id);
        }
        Some(removed)
    }

    fn id_in_use(&self, level: Level, id: &str) -> bool {
        match level.index().checked_sub(1) {
            None => self.level1.iter().any(|i| i.id == id),
            Some(map_idx) => self.children[map_idx]
                .values()
                .any(|items| items.iter().any(|i| i.id == id)),
        }
    }

    fn drop_children(&mut self, level: Level, id: &str) {
        let Some(child) = level.child() else {
            return;
        };
        let map_idx = child.index() - 1;
        let Some(kids) = self.children[map_idx].remove(id) else {
            return;
        };
        for kid in kids {
            if !self.id_in_use(child, &kid.id) {
                self.drop_children(child, &kid.id);
            }
        }
    }

    pub fn has_level4(&self) -> bool {
        !self.children[2].is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.level1.len()
            + self
                .children
                .iter()
                .flat_map(|m| m.values())
                .map(Vec::len)
                .sum::<usize>()
    }
}
