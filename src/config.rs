use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use ratatui::style::Color;
use serde::Deserialize;

pub const MANIFEST_ENV: &str = "QBANK_MANIFEST";

/// Manifest location: explicit flag, then `QBANK_MANIFEST`, then the first
/// `data/manifest.json` or `manifest.json` found walking up from the cwd.
pub fn resolve_manifest_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(p) = explicit {
        return p;
    }
    if let Ok(envp) = std::env::var(MANIFEST_ENV) {
        return PathBuf::from(envp);
    }
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        for anc in cwd.ancestors() {
            candidates.push(anc.join("data/manifest.json"));
            candidates.push(anc.join("manifest.json"));
        }
    }
    for c in candidates {
        if c.exists() {
            return c;
        }
    }
    // may not exist; the loader reports it as a manifest error
    PathBuf::from("data/manifest.json")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    ToggleAnswer,
    Copy,
    Search,
    CycleCategory,
    CycleDifficulty,
    CycleAuthor,
    CycleSort,
    Clear,
    Reload,
    ResizeLeftShrink,
    ResizeLeftExpand,
}

#[derive(Deserialize)]
struct KeyMapToml {
    keys: HashMap<String, String>,
}

/// Looks for `keymap.toml` in the cwd, then `qbank/keymap.toml` in any ancestor.
pub fn load_keymap() -> Result<HashMap<char, KeyAction>> {
    let mut paths = vec![PathBuf::from("keymap.toml")];
    if let Ok(cwd) = std::env::current_dir() {
        for anc in cwd.ancestors() {
            paths.push(anc.join("qbank/keymap.toml"));
        }
    }
    for p in paths {
        if p.exists() {
            let content = fs::read_to_string(&p)
                .with_context(|| format!("failed to read keymap: {}", p.display()))?;
            debug!("keymap loaded from {}", p.display());
            return parse_keymap_toml(&content);
        }
    }
    Err(anyhow::anyhow!("keymap.toml not found"))
}

pub fn parse_keymap_toml(content: &str) -> Result<HashMap<char, KeyAction>> {
    let km: KeyMapToml = toml::from_str(content).context("failed to parse keymap.toml")?;
    Ok(parse_keymap(km.keys))
}

fn parse_keymap(map: HashMap<String, String>) -> HashMap<char, KeyAction> {
    let mut out = HashMap::new();
    for (k, v) in map {
        let mut chars = k.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if let Some(act) = action_from_str(&v) {
                out.insert(ch, act);
            }
        }
    }
    if out.is_empty() {
        out = default_keymap();
    }
    out
}

fn action_from_str(s: &str) -> Option<KeyAction> {
    use KeyAction::*;
    Some(match s {
        "toggle_answer" => ToggleAnswer,
        "copy" => Copy,
        "search" => Search,
        "cycle_category" => CycleCategory,
        "cycle_difficulty" => CycleDifficulty,
        "cycle_author" => CycleAuthor,
        "cycle_sort" => CycleSort,
        "clear" => Clear,
        "reload" => Reload,
        "shrink_list" => ResizeLeftShrink,
        "expand_list" => ResizeLeftExpand,
        _ => return None,
    })
}

pub fn default_keymap() -> HashMap<char, KeyAction> {
    use KeyAction::*;
    let mut m = HashMap::new();
    m.insert('a', ToggleAnswer);
    m.insert(' ', ToggleAnswer);
    m.insert('y', Copy);
    m.insert('/', Search);
    m.insert('c', CycleCategory);
    m.insert('d', CycleDifficulty);
    m.insert('u', CycleAuthor);
    m.insert('s', CycleSort);
    m.insert('x', Clear);
    m.insert('R', Reload);
    m.insert('<', ResizeLeftShrink);
    m.insert('>', ResizeLeftExpand);
    m
}

// ---------------- theme ----------------
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeKind {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub bar_bg: Color,
    pub selection_bg: Color,
    pub good: Color,
    pub warn: Color,
    pub info: Color,
    pub error: Color,
}

pub fn theme_of(kind: ThemeKind) -> Theme {
    match kind {
        ThemeKind::Dark => Theme {
            fg: Color::Rgb(222, 222, 218),
            muted: Color::Rgb(138, 142, 148),
            accent: Color::Rgb(240, 170, 90),
            bar_bg: Color::Rgb(32, 36, 42),
            selection_bg: Color::Rgb(58, 64, 74),
            good: Color::Rgb(130, 200, 120),
            warn: Color::Rgb(255, 200, 110),
            info: Color::Rgb(120, 170, 255),
            error: Color::Rgb(240, 110, 110),
        },
        ThemeKind::Light => Theme {
            fg: Color::Rgb(28, 28, 30),
            muted: Color::Rgb(118, 118, 124),
            accent: Color::Rgb(200, 110, 20),
            bar_bg: Color::Rgb(236, 238, 242),
            selection_bg: Color::Rgb(212, 220, 232),
            good: Color::Rgb(38, 150, 80),
            warn: Color::Rgb(220, 140, 0),
            info: Color::Rgb(0, 110, 230),
            error: Color::Rgb(200, 40, 40),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keymap_toml_overrides() {
        let km = parse_keymap_toml(
            r#"
            [keys]
            r = "toggle_answer"
            Y = "copy"
            zz = "clear"
            q = "no_such_action"
            "#,
        )
        .unwrap();
        assert_eq!(km.get(&'r'), Some(&KeyAction::ToggleAnswer));
        assert_eq!(km.get(&'Y'), Some(&KeyAction::Copy));
        assert_eq!(km.len(), 2);
    }

    #[test]
    fn empty_keymap_falls_back_to_defaults() {
        let km = parse_keymap_toml("[keys]\n").unwrap();
        assert_eq!(km, default_keymap());
    }

    #[test]
    fn explicit_manifest_wins() {
        let p = resolve_manifest_path(Some(PathBuf::from("/tmp/m.json")));
        assert_eq!(p, PathBuf::from("/tmp/m.json"));
    }
}
