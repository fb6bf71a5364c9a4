//! Lexicon - spoken application names mapped to executable commands
//!
//! The built-in table covers what users are likely to say (including
//! common transcription slips like "sigma" for "figma"); a user table
//! from config is merged on top with override-wins semantics. The module
//! also owns the verb and unit synonym tables the classifier consumes.

use std::collections::BTreeMap;

use toml::Value;
use tracing::warn;

/// Verbs that signal an application launch. Trailing space keeps "run"
/// from matching inside "running".
pub const OPEN_VERBS: &[&str] = &["open ", "launch ", "start ", "run "];

/// Verbs that signal an application closure.
pub const CLOSE_VERBS: &[&str] = &["close ", "quit ", "exit ", "kill "];

/// Duration units accepted by the timer rule, in seconds.
pub const UNIT_SECONDS: &[(&str, u64)] = &[("second", 1), ("minute", 60), ("hour", 3600)];

/// Built-in spoken-name -> executable mapping.
fn builtin() -> Vec<(&'static str, &'static str)> {
    vec![
        // Browsers and internet
        ("firefox", "firefox"),
        ("browser", "firefox"),
        ("brave", "brave-browser"),
        ("brave browser", "brave-browser"),
        ("thunderbird", "thunderbird"),
        // Development
        ("code", "code"),
        ("vs code", "code"),
        ("vscode", "code"),
        ("visual studio code", "code"),
        ("visual studio", "code"),
        ("sublime", "sublime_text"),
        ("sublime text", "sublime_text"),
        ("vim", "vim"),
        // Design
        ("gimp", "gimp"),
        ("photoshop", "gimp"),
        ("inkscape", "inkscape"),
        ("blender", "blender"),
        ("figma", "flatpak run com.figma.Figma"),
        // "figma" is routinely transcribed as "sigma"
        ("sigma", "flatpak run com.figma.Figma"),
        // System utilities
        ("terminal", "xfce4-terminal"),
        ("terminal emulator", "xfce4-terminal"),
        ("file manager", "thunar"),
        ("file explorer", "thunar"),
        ("explorer", "thunar"),
        ("settings", "xfce4-settings-manager"),
        ("settings manager", "xfce4-settings-manager"),
        ("task manager", "xfce4-taskmanager"),
        ("calculator", "gnome-calculator"),
        ("calendar", "gnome-calendar"),
        ("volume control", "pavucontrol"),
        // Media and communication
        ("whatsapp", "whatsapp-desktop"),
        ("what's up", "whatsapp-desktop"),
        ("camera", "cheese"),
        ("rhythmbox", "rhythmbox"),
        // System tools
        ("disks", "gnome-disks"),
        ("disk utility", "gnome-disks"),
        ("printer", "system-config-printer"),
        ("scan", "simple-scan"),
        ("firewall", "gufw"),
        ("archive manager", "file-roller"),
        ("transmission", "transmission-gtk"),
        ("photos", "pix"),
    ]
}

/// Spoken-phrase -> execution-token table with deterministic iteration
/// order, so fuzzy tie-breaks and close-all sweeps are stable.
#[derive(Debug, Clone)]
pub struct Lexicon {
    map: BTreeMap<String, String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let map = builtin()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { map }
    }
}

impl Lexicon {
    /// Built-in table merged with a user override table from config.
    ///
    /// The override is free-form TOML; anything other than a table of
    /// string values is skipped with a warning rather than failing
    /// startup.
    pub fn with_overrides(overrides: Option<&Value>) -> Self {
        let mut lexicon = Self::default();
        let Some(value) = overrides else {
            return lexicon;
        };

        let Value::Table(table) = value else {
            warn!("lexicon override is not a table, ignoring");
            return lexicon;
        };

        for (name, command) in table {
            match command {
                Value::String(command) => {
                    lexicon.map.insert(name.to_lowercase(), command.clone());
                }
                other => {
                    warn!(%name, "lexicon override value is not a string, skipping: {other}");
                }
            }
        }
        lexicon
    }

    /// Executable command for a canonical spoken name.
    pub fn command(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Keys in canonical (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Longest lexicon key occurring as a substring of `text`.
    ///
    /// Longer names are checked first so "open vs code" resolves to
    /// "vs code", not "code".
    pub fn match_in_text(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let mut candidates: Vec<&str> = self.map.keys().map(String::as_str).collect();
        candidates.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        candidates.into_iter().find(|name| text.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_wins() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.match_in_text("open vs code"), Some("vs code"));
        assert_eq!(lexicon.match_in_text("open code"), Some("code"));
        assert_eq!(lexicon.match_in_text("visual studio code now"), Some("visual studio code"));
    }

    #[test]
    fn test_no_match() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.match_in_text("make me a sandwich"), None);
        assert_eq!(lexicon.match_in_text(""), None);
    }

    #[test]
    fn test_override_wins() {
        let overrides: Value = toml::from_str("firefox = \"firefox-nightly\"\nzed = \"zed\"").unwrap();
        let lexicon = Lexicon::with_overrides(Some(&overrides));
        assert_eq!(lexicon.command("firefox"), Some("firefox-nightly"));
        assert_eq!(lexicon.command("zed"), Some("zed"));
        // Untouched entries stay.
        assert_eq!(lexicon.command("gimp"), Some("gimp"));
    }

    #[test]
    fn test_override_keys_case_normalized() {
        let overrides: Value = toml::from_str("\"My Editor\" = \"myedit\"").unwrap();
        let lexicon = Lexicon::with_overrides(Some(&overrides));
        assert_eq!(lexicon.command("my editor"), Some("myedit"));
    }

    #[test]
    fn test_malformed_override_ignored() {
        let overrides = Value::Integer(5);
        let lexicon = Lexicon::with_overrides(Some(&overrides));
        assert_eq!(lexicon.command("firefox"), Some("firefox"));

        // Non-string values inside an otherwise valid table are skipped.
        let overrides: Value = toml::from_str("firefox = 3\nzed = \"zed\"").unwrap();
        let lexicon = Lexicon::with_overrides(Some(&overrides));
        assert_eq!(lexicon.command("firefox"), Some("firefox"));
        assert_eq!(lexicon.command("zed"), Some("zed"));
    }

    #[test]
    fn test_keys_sorted() {
        let lexicon = Lexicon::default();
        let keys: Vec<&str> = lexicon.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
