//! Parser and writer for `tree.tt`, the candidate-set file.
//!
//! One item per line, indentation gives the level:
//!
//! ```text
//! # comment
//! early-detection : Early detection | Find disease before symptoms
//!     imaging : Retinal imaging
//!         oct : Optical coherence tomography [custom]
//! ```
//!
//! An item belongs to the nearest preceding item one level up. The indent
//! unit is whatever the first indented line uses.

use anyhow::{Context, Result, bail};

use crate::tree::model::{CUSTOM_TAG, CandidateSet, Item, Level};

const INDENT: &str = "    ";

/// Parse `tree.tt` text into a `CandidateSet`.
pub fn parse(input: &str) -> Result<CandidateSet> {
    let mut set = CandidateSet::new();
    let mut indent_unit: Option<&str> = None;
    // Ids of the current ancestors, one per depth.
    let mut ancestors: Vec<String> = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line_num = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let leading = leading_whitespace(raw);
        let depth = if leading.is_empty() {
            0
        } else {
            let unit = *indent_unit.get_or_insert(leading);
            indent_depth(leading, unit)
                .with_context(|| format!("inconsistent indentation at line {line_num}"))?
        };

        let Some(level) = Level::from_index(depth) else {
            bail!("line {line_num} is nested deeper than level 4");
        };
        if depth > ancestors.len() {
            bail!(
                "line {line_num} skips a level (found {level} without a {} parent)",
                level
                    .parent()
                    .map(|p| p.to_string())
                    .unwrap_or_default()
            );
        }
        ancestors.truncate(depth);

        let item =
            parse_item(trimmed).with_context(|| format!("invalid item at line {line_num}"))?;
        let parent = ancestors.last().map(String::as_str);
        if set.get(level, parent, &item.id).is_some() {
            bail!(
                "duplicate id '{}' at line {line_num} (ids must be unique under one parent)",
                item.id
            );
        }
        let id = item.id.clone();
        set.add_item(level, parent, item);
        ancestors.push(id);
    }

    Ok(set)
}

/// Serialise a `CandidateSet` with canonical four-space indentation.
///
/// Children keyed by an id that appears more than once at a level are
/// written under its first occurrence only, which is where `parse` puts
/// them back.
pub fn serialize(set: &CandidateSet) -> String {
    let mut out = String::new();
    let mut written: Vec<Vec<String>> = vec![Vec::new(); Level::ALL.len()];
    for item in &set.level1 {
        write_subtree(set, Level::One, item, &mut written, &mut out);
    }
    out
}

fn write_subtree(
    set: &CandidateSet,
    level: Level,
    item: &Item,
    written: &mut [Vec<String>],
    out: &mut String,
) {
    out.push_str(&INDENT.repeat(level.index()));
    out.push_str(&format_item(item));
    out.push('\n');

    let Some(child) = level.child() else {
        return;
    };
    if written[level.index()].contains(&item.id) {
        return;
    }
    written[level.index()].push(item.id.clone());
    for kid in set.candidates(child, Some(&item.id)) {
        write_subtree(set, child, kid, written, out);
    }
}

pub fn format_item(item: &Item) -> String {
    let mut line = format!("{} : {}", item.id, item.name);
    if let Some(desc) = item.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(" | ");
        line.push_str(desc);
    }
    if item.is_custom {
        line.push(' ');
        line.push_str(CUSTOM_TAG);
    }
    line
}

fn parse_item(text: &str) -> Result<Item> {
    let (text, is_custom) = match text.strip_suffix(CUSTOM_TAG) {
        Some(rest) => (rest.trim_end(), true),
        None => (text, false),
    };
    let Some((id, rest)) = text.split_once(':') else {
        bail!("expected `id : name`, found {text:?}");
    };
    let id = id.trim();
    if id.is_empty() {
        bail!("item id is empty");
    }
    if id.contains('/') || id.chars().any(char::is_whitespace) {
        bail!("item id {id:?} may not contain '/' or whitespace");
    }
    let (name, description) = match rest.split_once('|') {
        Some((name, desc)) => (name.trim(), Some(desc.trim())),
        None => (rest.trim(), None),
    };
    if name.is_empty() {
        bail!("item {id:?} has no name");
    }

    let mut item = Item::new(id, name);
    if let Some(desc) = description.filter(|d| !d.is_empty()) {
        item = item.with_description(desc);
    }
    if is_custom {
        item = item.custom();
    }
    Ok(item)
}

fn leading_whitespace(raw: &str) -> &str {
    let end = raw.len() - raw.trim_start().len();
    &raw[..end]
}

fn indent_depth(leading: &str, unit: &str) -> Result<usize> {
    let mut rest = leading;
    let mut depth = 0;
    while !rest.is_empty() {
        match rest.strip_prefix(unit) {
            Some(r) => {
                rest = r;
                depth += 1;
            }
            None => bail!(
                "indent {:?} is not a multiple of the unit {:?}",
                leading,
                unit
            ),
        }
    }
    Ok(depth)
}
