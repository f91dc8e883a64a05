//! `techtree init`: create a technology tree in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use crossterm::style::Stylize;
use tracing::info;

use crate::parser::{config, tree};
use crate::techtree;
use crate::tree::sample::SAMPLE_TREE;

const EMPTY_TREE: &str = "\
# techtree candidate set
# <id> : <name> | <optional description>   (indent = next level, [custom] = user added)
";

/// Entry point called from `main`.
pub fn run(empty: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root, empty)
}

/// Run init inside `root`. `empty` writes a tree with no items instead of
/// the sample.
pub fn run_in(root: &Path, empty: bool) -> Result<()> {
    let tree_path = techtree::tree_path(root);
    if tree_path.exists() {
        bail!("techtree is already initialised (techtree/tree.tt exists). Run `techtree edit` instead.");
    }

    fs::create_dir_all(techtree::techtree_dir(root))?;

    let contents = if empty { EMPTY_TREE } else { SAMPLE_TREE };
    let set = tree::parse(contents)?;
    fs::write(&tree_path, contents)
        .with_context(|| format!("failed to write {}", tree_path.display()))?;
    println!(
        "  {} techtree/tree.tt {}",
        "Created".green().bold(),
        format!("({} items)", set.item_count()).dark_grey()
    );

    let config_path = techtree::config_path(root);
    if config_path.exists() {
        println!("  {} techtree/config.tt", "Kept".yellow().bold());
    } else {
        fs::write(&config_path, config::DEFAULT_CONTENTS)?;
        println!("  {} techtree/config.tt", "Created".green().bold());
    }

    info!(root = %root.display(), empty, "initialised tree");
    println!(
        "  {} run {} to explore it",
        "Next:".cyan().bold(),
        "techtree view".bold()
    );
    Ok(())
}
