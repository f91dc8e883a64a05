//! `config.tt`: `key: value` settings for the tree view.

use anyhow::{Context, Result, bail};

use crate::tree::model::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Column subtitles, indexed by level.
    pub level_names: [String; 4],
    pub show_level4: bool,
    pub show_descriptions: bool,
    pub show_connectors: bool,
    /// How long the "Results updated" toast stays up.
    pub toast_ms: u64,
    /// Research scenario shown above the path.
    pub scenario: Option<String>,
    pub editor: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level_names: [
                "Purpose".to_string(),
                "Function".to_string(),
                "Technique".to_string(),
                "Implementation".to_string(),
            ],
            show_level4: false,
            show_descriptions: true,
            show_connectors: true,
            toast_ms: 3000,
            scenario: None,
            editor: None,
        }
    }
}

impl Config {
    pub fn level_name(&self, level: Level) -> &str {
        &self.level_names[level.index()]
    }

    /// Deepest level the view shows.
    pub fn deepest_level(&self) -> Level {
        if self.show_level4 {
            Level::Four
        } else {
            Level::Three
        }
    }
}

pub const DEFAULT_CONTENTS: &str = "\
# techtree configuration
# Edit manually or toggle from the view with [s]

# Column subtitles
level1_name: Purpose
level2_name: Function
level3_name: Technique
level4_name: Implementation

# Show a fourth column for implementations
show_level4: false

# Show item descriptions under their names
show_descriptions: true

# Draw connector lines between selected items
show_connectors: true

# How long the results toast stays visible (milliseconds)
toast_ms: 3000

# Research scenario shown above the tree (optional)
scenario:

# Preferred editor for `techtree edit` (falls back to $VISUAL, then $EDITOR)
editor:
";

pub fn parse(input: &str) -> Result<Config> {
    let mut cfg = Config::default();
    for (idx, raw) in input.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            bail!("expected `key: value` at line {line_num}");
        };
        let (key, value) = (key.trim(), value.trim());
        let ctx = || format!("invalid value for `{key}` at line {line_num}");
        match key {
            "level1_name" | "level2_name" | "level3_name" | "level4_name" => {
                let idx = key[5..6]
                    .parse::<usize>()
                    .with_context(ctx)?
                    .saturating_sub(1);
                if !value.is_empty() {
                    cfg.level_names[idx] = value.to_string();
                }
            }
            "show_level4" => cfg.show_level4 = parse_bool(value).with_context(ctx)?,
            "show_descriptions" => cfg.show_descriptions = parse_bool(value).with_context(ctx)?,
            "show_connectors" => cfg.show_connectors = parse_bool(value).with_context(ctx)?,
            "toast_ms" => cfg.toast_ms = value.parse().with_context(ctx)?,
            "scenario" => cfg.scenario = non_empty(value),
            "editor" => cfg.editor = non_empty(value),
            other => bail!("unknown config key `{other}` at line {line_num}"),
        }
    }
    Ok(cfg)
}

pub fn serialize(config: &Config) -> String {
    let [l1, l2, l3, l4] = &config.level_names;
    format!(
        "\
# techtree configuration
# Edit manually or toggle from the view with [s]

# Column subtitles
level1_name: {l1}
level2_name: {l2}
level3_name: {l3}
level4_name: {l4}

# Show a fourth column for implementations
show_level4: {}

# Show item descriptions under their names
show_descriptions: {}

# Draw connector lines between selected items
show_connectors: {}

# How long the results toast stays visible (milliseconds)
toast_ms: {}

# Research scenario shown above the tree (optional)
scenario:{}

# Preferred editor for `techtree edit` (falls back to $VISUAL, then $EDITOR)
editor:{}
",
        config.show_level4,
        config.show_descriptions,
        config.show_connectors,
        config.toast_ms,
        optional_value(config.scenario.as_deref()),
        optional_value(config.editor.as_deref()),
    )
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        other => bail!("expected true/false, found {other:?}"),
    }
}

fn optional_value(value: Option<&str>) -> String {
    value.map(|v| format!(" {v}")).unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contents_parse_to_default() {
        assert_eq!(parse(DEFAULT_CONTENTS).unwrap(), Config::default());
    }

    #[test]
    fn serialize_matches_default_contents() {
        assert_eq!(serialize(&Config::default()), DEFAULT_CONTENTS);
    }

    #[test]
    fn serialize_round_trips_custom_values() {
        let cfg = Config {
            level_names: ["目的".into(), "機能".into(), "測定/技術".into(), "実装".into()],
            show_level4: true,
            show_descriptions: false,
            show_connectors: false,
            toast_ms: 1500,
            scenario: Some("Clinical screening: non-invasive diagnosis".into()),
            editor: Some("nvim -u NONE".into()),
        };
        assert_eq!(parse(&serialize(&cfg)).unwrap(), cfg);
        assert_eq!(cfg.deepest_level(), Level::Four);
        assert_eq!(cfg.level_name(Level::Three), "測定/技術");
    }

    #[test]
    fn scenario_may_contain_colons() {
        let cfg = parse("scenario: Goal: detect early\n").unwrap();
        assert_eq!(cfg.scenario.as_deref(), Some("Goal: detect early"));
    }

    #[test]
    fn rejects_unknown_key_with_line() {
        let err = parse("# c\nshow_orphans: true\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "got: {err:#}");
    }

    #[test]
    fn rejects_bad_bool_and_number() {
        assert!(parse("show_level4: maybe\n").is_err());
        assert!(parse("toast_ms: soon\n").is_err());
        assert!(parse("no separator here\n").is_err());
    }
}
