mod commands;
mod connect;
mod logging;
mod parser;
mod selection;
mod techtree;
mod tree;
mod tui;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::logging::LogTarget;

#[derive(Parser)]
#[command(
    name = "techtree",
    about = "Browse a purpose / function / technique technology tree with cascading selection"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create techtree/tree.tt and techtree/config.tt in the current directory
    Init {
        /// Start from an empty tree instead of the sample
        #[arg(long)]
        empty: bool,
    },
    /// Open the interactive column view
    View {
        /// Launch with the built-in sample tree (no techtree/ directory required)
        #[arg(long)]
        demo: bool,
        /// Initial selection as a deep link, e.g. `early-detection/imaging/oct`
        #[arg(long, value_name = "A/B/C")]
        path: Option<String>,
    },
    /// Print the whole tree with indentation
    List,
    /// Apply a selection path and print the resulting columns and connectors
    Path {
        /// Slash-separated ids, one per level
        path: String,
    },
    /// Open techtree/tree.tt in your editor
    Edit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(log_target(&cli.command))?;

    match cli.command {
        Command::Init { empty } => commands::init::run(empty),
        Command::View { demo, path } => {
            if let Some(p) = path.as_deref() {
                validate_deep_link(p)?;
            }
            commands::view::run(demo, path.as_deref())
        }
        Command::List => commands::list::run(),
        Command::Path { path } => commands::path::run(&path),
        Command::Edit => commands::edit::run(),
    }
}

/// The view owns the terminal, so it logs to a file next to the tree.
fn log_target(command: &Command) -> LogTarget {
    match command {
        Command::View { demo: true, .. } => LogTarget::Off,
        Command::View { demo: false, .. } => techtree::find_root()
            .map(|root| LogTarget::File(techtree::log_path(&root)))
            .unwrap_or(LogTarget::Off),
        _ => LogTarget::Stderr,
    }
}

fn validate_deep_link(path: &str) -> Result<()> {
    let segments = path.split('/').collect::<Vec<_>>();
    if segments.len() > 4 {
        bail!("--path has {} segments, at most 4 levels exist", segments.len());
    }
    if segments.iter().any(|s| s.trim().is_empty()) {
        bail!("--path {path:?} contains an empty segment");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn view_accepts_demo_and_deep_link() {
        let cli = Cli::try_parse_from(["techtree", "view", "--demo", "--path", "a/x"])
            .expect("view flags should parse");
        match cli.command {
            Command::View { demo, path } => {
                assert!(demo);
                assert_eq!(path.as_deref(), Some("a/x"));
            }
            _ => panic!("expected view command"),
        }
    }

    #[test]
    fn path_requires_an_argument() {
        let parsed = Cli::try_parse_from(["techtree", "path"]);
        let err = parsed.err().expect("expected clap parse error");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn deep_link_validation() {
        assert!(validate_deep_link("a/x/p/i").is_ok());
        assert!(validate_deep_link("a/x/p/i/z").is_err());
        assert!(validate_deep_link("a//p").is_err());
    }
}
