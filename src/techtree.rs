//! Paths and common operations for the `techtree/` directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::parser::{config, tree};
use crate::tree::model::CandidateSet;

/// Walk upward from `start` to find the directory containing `techtree/tree.tt`.
pub fn find_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if tree_path(dir).exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => bail!("no technology tree found, run `techtree init` to create one"),
        }
    }
}

/// Walk upward from the current working directory to find the tree root.
pub fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_root_from(&cwd)
}

pub fn techtree_dir(root: &Path) -> PathBuf {
    root.join("techtree")
}

pub fn tree_path(root: &Path) -> PathBuf {
    techtree_dir(root).join("tree.tt")
}

pub fn config_path(root: &Path) -> PathBuf {
    techtree_dir(root).join("config.tt")
}

pub fn log_path(root: &Path) -> PathBuf {
    techtree_dir(root).join("techtree.log")
}

pub fn load_tree(root: &Path) -> Result<CandidateSet> {
    let path = tree_path(root);
    let text =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let set = tree::parse(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    info!(items = set.item_count(), path = %path.display(), "loaded tree");
    Ok(set)
}

/// Load `config.tt`, or defaults when the file does not exist.
pub fn load_config(root: &Path) -> Result<config::Config> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(config::Config::default());
    }
    let text = fs::read_to_string(&path)?;
    config::parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}
