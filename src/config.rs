//! Configuration - optional config.toml, everything defaulted
//!
//! A missing file means stock defaults; an unparseable file logs a
//! warning and falls back to defaults rather than refusing to start.
//! The `[lexicon]` table is kept as a raw TOML value so a malformed
//! override degrades to a warning inside the lexicon merge instead of
//! failing deserialization of the whole config.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_wake_word")]
    pub wake_word: String,
    /// Minimum similarity for the fuzzy app-name fallback.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Where screenshots land; unset means ~/Pictures.
    #[serde(default)]
    pub screenshot_dir: Option<PathBuf>,
    #[serde(default)]
    pub power: PowerConfig,
    /// User lexicon overrides, validated later by `Lexicon`.
    #[serde(default)]
    pub lexicon: Option<toml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            wake_word: default_wake_word(),
            fuzzy_threshold: default_fuzzy_threshold(),
            screenshot_dir: None,
            power: PowerConfig::default(),
            lexicon: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PowerConfig {
    #[serde(default = "default_shutdown_cmd")]
    pub shutdown: String,
    #[serde(default = "default_reboot_cmd")]
    pub reboot: String,
    #[serde(default = "default_suspend_cmd")]
    pub suspend: String,
    /// Empty means "not configured for this desktop".
    #[serde(default = "default_logout_cmd")]
    pub logout: String,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            shutdown: default_shutdown_cmd(),
            reboot: default_reboot_cmd(),
            suspend: default_suspend_cmd(),
            logout: default_logout_cmd(),
        }
    }
}

fn default_name() -> String {
    "Bellhop".into()
}

fn default_wake_word() -> String {
    "hey bellhop".into()
}

fn default_fuzzy_threshold() -> f64 {
    0.7
}

fn default_shutdown_cmd() -> String {
    "systemctl poweroff".into()
}

fn default_reboot_cmd() -> String {
    "systemctl reboot".into()
}

fn default_suspend_cmd() -> String {
    "systemctl suspend".into()
}

/// Session logout depends on the desktop; sniff it from the usual
/// environment variables the way display managers set them.
fn default_logout_cmd() -> String {
    let desktop = env::var("XDG_CURRENT_DESKTOP")
        .or_else(|_| env::var("DESKTOP_SESSION"))
        .unwrap_or_default()
        .to_lowercase();

    if desktop.contains("xfce") {
        "xfce4-session-logout --logout --fast".into()
    } else if desktop.contains("cinnamon") {
        "cinnamon-session-quit --logout --no-prompt".into()
    } else if desktop.contains("gnome") {
        "gnome-session-quit --logout --no-prompt".into()
    } else {
        String::new()
    }
}

impl Config {
    /// Load from `path`, or the stock defaults when the file is missing
    /// or unreadable.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!("failed to parse {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }
}
