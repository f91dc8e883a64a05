//! `techtree list`: print the candidate set as an indented tree.

use anyhow::Result;

use crate::parser::config::Config;
use crate::techtree;
use crate::tree::model::{CandidateSet, Item, Level};

pub fn run() -> Result<()> {
    let root = techtree::find_root()?;
    let set = techtree::load_tree(&root)?;
    let config = techtree::load_config(&root)?;

    let lines = list_lines(&set, &config);
    if lines.is_empty() {
        println!("  No items.");
    } else {
        for line in lines {
            println!("  {line}");
        }
    }
    Ok(())
}

fn list_lines(set: &CandidateSet, config: &Config) -> Vec<String> {
    let mut lines = Vec::new();
    for item in &set.level1 {
        push_subtree(set, config, Level::One, item, &mut lines);
    }
    lines
}

fn push_subtree(
    set: &CandidateSet,
    config: &Config,
    level: Level,
    item: &Item,
    lines: &mut Vec<String>,
) {
    let indent = "  ".repeat(level.index());
    let custom = if item.is_custom { " [custom]" } else { "" };
    lines.push(format!(
        "{indent}{} ({}: {}){custom}",
        item.name,
        config.level_name(level),
        item.id
    ));
    let Some(child) = level.child() else {
        return;
    };
    for kid in set.candidates(child, Some(&item.id)) {
        push_subtree(set, config, child, kid, lines);
    }
}
