//! `techtree edit`: open `techtree/tree.tt` in an editor.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

use crate::parser::tree;
use crate::techtree;

pub fn run() -> Result<()> {
    let root = techtree::find_root()?;
    let tree_path = techtree::tree_path(&root);
    let editor = resolve_editor(techtree::load_config(&root)?.editor);

    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("no editor configured for `techtree edit`"))?;
    let args: Vec<String> = parts.map(ToString::to_string).collect();

    info!(editor = %editor, path = %tree_path.display(), "launching editor");
    let status = Command::new(program)
        .args(&args)
        .arg(&tree_path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| {
            format!(
                "failed to launch editor {:?} for {}",
                editor,
                tree_path.display()
            )
        })?;

    if !status.success() {
        bail!("editor exited with status {}", status);
    }

    // Surface mistakes now rather than on the next `view`.
    let text = std::fs::read_to_string(&tree_path)?;
    if let Err(err) = tree::parse(&text) {
        warn!(error = %format!("{err:#}"), "tree.tt no longer parses");
        eprintln!("  warning: {err:#}");
    }
    Ok(())
}

fn resolve_editor(config_editor: Option<String>) -> String {
    let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
    config_editor
        .filter(|v| !v.trim().is_empty())
        .or_else(|| from_env("TECHTREE_EDITOR"))
        .or_else(|| from_env("VISUAL"))
        .or_else(|| from_env("EDITOR"))
        .unwrap_or_else(|| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "vi".to_string()
            }
        })
}
