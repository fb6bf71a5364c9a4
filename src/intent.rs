//! Intent classification - the rule cascade from text to action
//!
//! `classify` is a pure function over the normalized utterance and the
//! conversation context. Rules run in a fixed priority order and the
//! first match wins; anything unmatched becomes `RawCommand` and is
//! resolved later by the dispatcher's fallback chain. Only the first
//! run of digits in the text is ever used as a numeric argument; there
//! is no spelled-out number support.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::Context;
use crate::lexicon::{CLOSE_VERBS, Lexicon, OPEN_VERBS, UNIT_SECONDS};

/// Relative step used when a brightness command carries no number and
/// the context has none remembered.
pub const DEFAULT_BRIGHTNESS_STEP: i32 = 10;

/// Same, for volume. Volume steps are deliberately smaller.
pub const DEFAULT_VOLUME_STEP: i32 = 5;

const BRIGHTNESS_UP: &[&str] = &[
    "increase brightness",
    "raise brightness",
    "more brightness",
    "bit brighter",
    "little brighter",
    "brighter",
];

const BRIGHTNESS_DOWN: &[&str] = &[
    "decrease brightness",
    "lower brightness",
    "reduce brightness",
    "dim it",
    "bit darker",
    "little darker",
    "darker",
];

const VOLUME_UP: &[&str] = &[
    "increase volume",
    "raise volume",
    "turn it up",
    "bit louder",
    "little louder",
    "louder",
];

const VOLUME_DOWN: &[&str] = &[
    "decrease volume",
    "lower volume",
    "turn it down",
    "bit quieter",
    "little quieter",
    "quieter",
];

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(second|minute|hour)s?\b").unwrap());

static ALARM_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}(:\d{2}|\s+\d{1,2})?\s*(am|pm)\b").unwrap());

/// A classified utterance. `raw` is the normalized text that produced
/// it; for power hints it carries the canonical keyword instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub raw: String,
    pub kind: IntentKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentKind {
    Empty,
    RawCommand,
    OpenApp { app: String },
    CloseApp { app: String },
    CloseAll,
    /// Absolute target, unclamped here; the dispatcher clamps to 0-100.
    SetBrightness { value: i32 },
    ChangeBrightness { delta: i32 },
    SetVolume { value: i32 },
    ChangeVolume { delta: i32 },
    ClipboardRead,
    TakeScreenshot,
    SetTimer { duration_s: u64 },
    SetAlarm { time_str: String },
}

impl Intent {
    fn new(raw: &str, kind: IntentKind) -> Self {
        Self { raw: raw.to_string(), kind }
    }

    /// Short name of the active variant, recorded as `last_action`.
    pub fn action_name(&self) -> &'static str {
        match self.kind {
            IntentKind::Empty => "empty",
            IntentKind::RawCommand => "raw_command",
            IntentKind::OpenApp { .. } => "open_app",
            IntentKind::CloseApp { .. } => "close_app",
            IntentKind::CloseAll => "close_all",
            IntentKind::SetBrightness { .. } => "set_brightness",
            IntentKind::ChangeBrightness { .. } => "change_brightness",
            IntentKind::SetVolume { .. } => "set_volume",
            IntentKind::ChangeVolume { .. } => "change_volume",
            IntentKind::ClipboardRead => "clipboard_read",
            IntentKind::TakeScreenshot => "take_screenshot",
            IntentKind::SetTimer { .. } => "set_timer",
            IntentKind::SetAlarm { .. } => "set_alarm",
        }
    }
}

/// First run of decimal digits anywhere in the text.
fn extract_number(text: &str) -> Option<i32> {
    NUMBER.find(text).and_then(|m| m.as_str().parse().ok())
}

/// First `<number> <unit>` pattern, converted to seconds.
fn extract_duration(text: &str) -> Option<u64> {
    let caps = DURATION.captures(text)?;
    let amount: u64 = caps[1].parse().ok()?;
    let unit = &caps[2];
    let multiplier = UNIT_SECONDS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, secs)| *secs)?;
    Some(amount * multiplier)
}

/// First clock-time pattern like "7 am", "7:30 pm" or "7 30 pm",
/// returned verbatim for the backend to schedule.
fn extract_alarm_time(text: &str) -> Option<&str> {
    ALARM_TIME.find(text).map(|m| m.as_str())
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// Classify a normalized utterance. Deterministic and total: reads the
/// context but never writes it, and always returns an intent.
pub fn classify(text: &str, lexicon: &Lexicon, ctx: &Context) -> Intent {
    if text.is_empty() {
        return Intent::new(text, IntentKind::Empty);
    }

    // Contextual pronouns, only when we remember an app.
    if let Some(last_app) = &ctx.last_app {
        if text.contains("close that") || text.contains("close it") {
            return Intent::new(text, IntentKind::CloseApp { app: last_app.clone() });
        }
        if text.contains("open that") || text.contains("open it again") {
            return Intent::new(text, IntentKind::OpenApp { app: last_app.clone() });
        }
    }

    // App open/close: needs a verb cue and a resolvable app name.
    if let Some(app) = lexicon.match_in_text(text) {
        if contains_any(text, OPEN_VERBS) {
            return Intent::new(text, IntentKind::OpenApp { app: app.to_string() });
        }
        if contains_any(text, CLOSE_VERBS) {
            return Intent::new(text, IntentKind::CloseApp { app: app.to_string() });
        }
    }

    if text.contains("close all") || text.contains("kill all") {
        return Intent::new(text, IntentKind::CloseAll);
    }

    // Brightness domain. The bare adjectives trigger it too.
    if text.contains("brightness") || text.contains("brighter") || text.contains("darker") {
        if text.contains("set") && text.contains("to") {
            if let Some(value) = extract_number(text) {
                return Intent::new(text, IntentKind::SetBrightness { value });
            }
        }
        if contains_any(text, BRIGHTNESS_UP) {
            let step = magnitude(text, ctx.last_brightness_delta, DEFAULT_BRIGHTNESS_STEP);
            return Intent::new(text, IntentKind::ChangeBrightness { delta: step });
        }
        if contains_any(text, BRIGHTNESS_DOWN) {
            let step = magnitude(text, ctx.last_brightness_delta, DEFAULT_BRIGHTNESS_STEP);
            return Intent::new(text, IntentKind::ChangeBrightness { delta: -step });
        }
    }

    // Volume domain. Mute outranks the absolute and relative forms.
    if text.contains("volume")
        || text.contains("sound")
        || text.contains("louder")
        || text.contains("quieter")
    {
        if text.contains("mute") {
            return Intent::new(text, IntentKind::SetVolume { value: 0 });
        }
        if text.contains("set") && text.contains("to") {
            if let Some(value) = extract_number(text) {
                return Intent::new(text, IntentKind::SetVolume { value });
            }
        }
        if contains_any(text, VOLUME_UP) {
            let step = magnitude(text, ctx.last_volume_delta, DEFAULT_VOLUME_STEP);
            return Intent::new(text, IntentKind::ChangeVolume { delta: step });
        }
        if contains_any(text, VOLUME_DOWN) {
            let step = magnitude(text, ctx.last_volume_delta, DEFAULT_VOLUME_STEP);
            return Intent::new(text, IntentKind::ChangeVolume { delta: -step });
        }
    }

    // Utility intents.
    if text.contains("clipboard")
        && (text.contains("show") || text.contains("read") || text.contains("what is"))
    {
        return Intent::new(text, IntentKind::ClipboardRead);
    }
    if contains_any(
        text,
        &["screenshot", "capture screen", "print screen", "take a picture"],
    ) {
        return Intent::new(text, IntentKind::TakeScreenshot);
    }

    // Timers and alarms require an explicit trigger phrase on top of
    // the pattern match.
    if text.contains("set a timer") || text.contains("timer for") {
        if let Some(duration_s) = extract_duration(text) {
            if duration_s > 0 {
                return Intent::new(text, IntentKind::SetTimer { duration_s });
            }
        }
    }
    if text.contains("set an alarm") || text.contains("alarm for") {
        if let Some(time_str) = extract_alarm_time(text) {
            return Intent::new(
                text,
                IntentKind::SetAlarm { time_str: time_str.to_string() },
            );
        }
    }

    // Power hints are recognized here but executed by the backend's
    // power collaborator, so they travel as canonical raw commands.
    if contains_any(text, &["shutdown", "shut down", "turn off", "power off"]) {
        return Intent::new("shutdown", IntentKind::RawCommand);
    }
    if contains_any(text, &["restart", "reboot"]) {
        return Intent::new("restart", IntentKind::RawCommand);
    }
    if contains_any(text, &["sleep", "suspend"]) {
        return Intent::new("sleep", IntentKind::RawCommand);
    }
    if contains_any(text, &["logout", "log out", "log off"]) {
        return Intent::new("logout", IntentKind::RawCommand);
    }

    Intent::new(text, IntentKind::RawCommand)
}

/// Relative step magnitude: first number in the text, else the last
/// remembered delta if nonzero, else the fixed default. Always positive;
/// the caller applies the direction sign.
fn magnitude(text: &str, last_delta: i32, default: i32) -> i32 {
    match extract_number(text) {
        Some(n) => n.abs(),
        None if last_delta != 0 => last_delta.abs(),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_fresh(text: &str) -> Intent {
        classify(text, &Lexicon::default(), &Context::new())
    }

    #[test]
    fn test_empty_always_empty() {
        let mut ctx = Context::new();
        ctx.last_app = Some("code".into());
        ctx.last_brightness_delta = 20;
        let intent = classify("", &Lexicon::default(), &ctx);
        assert_eq!(intent.kind, IntentKind::Empty);
    }

    #[test]
    fn test_close_that_with_context() {
        let mut ctx = Context::new();
        ctx.last_app = Some("code".into());
        let intent = classify("close that", &Lexicon::default(), &ctx);
        assert_eq!(intent.kind, IntentKind::CloseApp { app: "code".into() });
    }

    #[test]
    fn test_close_that_without_context_falls_through() {
        let intent = classify_fresh("close that");
        assert_eq!(intent.kind, IntentKind::RawCommand);
    }

    #[test]
    fn test_open_it_again() {
        let mut ctx = Context::new();
        ctx.last_app = Some("firefox".into());
        let intent = classify("open it again", &Lexicon::default(), &ctx);
        assert_eq!(intent.kind, IntentKind::OpenApp { app: "firefox".into() });
    }

    #[test]
    fn test_open_app_longest_match() {
        let intent = classify_fresh("open vs code");
        assert_eq!(intent.kind, IntentKind::OpenApp { app: "vs code".into() });
    }

    #[test]
    fn test_close_app() {
        let intent = classify_fresh("quit firefox");
        assert_eq!(intent.kind, IntentKind::CloseApp { app: "firefox".into() });
    }

    #[test]
    fn test_verb_without_app_falls_through() {
        let intent = classify_fresh("open the pod bay doors");
        assert_eq!(intent.kind, IntentKind::RawCommand);
    }

    #[test]
    fn test_close_all() {
        assert_eq!(classify_fresh("close all").kind, IntentKind::CloseAll);
        assert_eq!(classify_fresh("kill all of them").kind, IntentKind::CloseAll);
    }

    #[test]
    fn test_set_brightness_unclamped() {
        let intent = classify_fresh("set brightness to 150");
        assert_eq!(intent.kind, IntentKind::SetBrightness { value: 150 });
    }

    #[test]
    fn test_brighter_default_step() {
        let intent = classify_fresh("brighter");
        assert_eq!(intent.kind, IntentKind::ChangeBrightness { delta: 10 });
    }

    #[test]
    fn test_brighter_reuses_last_delta() {
        let mut ctx = Context::new();
        ctx.last_brightness_delta = 25;
        let intent = classify("brighter", &Lexicon::default(), &ctx);
        assert_eq!(intent.kind, IntentKind::ChangeBrightness { delta: 25 });
    }

    #[test]
    fn test_darker_sign_forced_down() {
        let mut ctx = Context::new();
        // A remembered negative delta must not flip the direction logic.
        ctx.last_brightness_delta = -15;
        let intent = classify("bit darker", &Lexicon::default(), &ctx);
        assert_eq!(intent.kind, IntentKind::ChangeBrightness { delta: -15 });

        let intent = classify("darker by 30", &Lexicon::default(), &ctx);
        assert_eq!(intent.kind, IntentKind::ChangeBrightness { delta: -30 });
    }

    #[test]
    fn test_mute() {
        let intent = classify_fresh("mute the sound");
        assert_eq!(intent.kind, IntentKind::SetVolume { value: 0 });
    }

    #[test]
    fn test_mute_beats_absolute() {
        // Both patterns present; mute is checked first.
        let intent = classify_fresh("mute volume set to 60");
        assert_eq!(intent.kind, IntentKind::SetVolume { value: 0 });
    }

    #[test]
    fn test_set_volume_absolute() {
        let intent = classify_fresh("set volume to 60");
        assert_eq!(intent.kind, IntentKind::SetVolume { value: 60 });
    }

    #[test]
    fn test_louder_default_step() {
        let intent = classify_fresh("louder");
        assert_eq!(intent.kind, IntentKind::ChangeVolume { delta: 5 });
    }

    #[test]
    fn test_quieter_with_number() {
        let intent = classify_fresh("quieter by 20");
        assert_eq!(intent.kind, IntentKind::ChangeVolume { delta: -20 });
    }

    #[test]
    fn test_clipboard() {
        let intent = classify_fresh("read the clipboard");
        assert_eq!(intent.kind, IntentKind::ClipboardRead);
        // "clipboard" alone is not enough.
        let intent = classify_fresh("clipboard");
        assert_eq!(intent.kind, IntentKind::RawCommand);
    }

    #[test]
    fn test_screenshot() {
        assert_eq!(classify_fresh("take a screenshot").kind, IntentKind::TakeScreenshot);
        assert_eq!(classify_fresh("capture screen").kind, IntentKind::TakeScreenshot);
        assert_eq!(classify_fresh("print screen").kind, IntentKind::TakeScreenshot);
    }

    #[test]
    fn test_timer_minutes() {
        let intent = classify_fresh("set a timer for 10 minutes");
        assert_eq!(intent.kind, IntentKind::SetTimer { duration_s: 600 });
    }

    #[test]
    fn test_timer_hours_and_seconds() {
        let intent = classify_fresh("timer for 2 hours");
        assert_eq!(intent.kind, IntentKind::SetTimer { duration_s: 7200 });
        let intent = classify_fresh("set a timer for 45 seconds");
        assert_eq!(intent.kind, IntentKind::SetTimer { duration_s: 45 });
    }

    #[test]
    fn test_timer_needs_trigger_phrase() {
        // A bare duration is not a timer request.
        let intent = classify_fresh("10 minutes");
        assert_eq!(intent.kind, IntentKind::RawCommand);
    }

    #[test]
    fn test_timer_zero_falls_through() {
        let intent = classify_fresh("set a timer for 0 minutes");
        assert_eq!(intent.kind, IntentKind::RawCommand);
    }

    #[test]
    fn test_alarm() {
        let intent = classify_fresh("set an alarm for 7 30 am");
        assert_eq!(intent.kind, IntentKind::SetAlarm { time_str: "7 30 am".into() });
        let intent = classify_fresh("alarm for 6:15 pm");
        assert_eq!(intent.kind, IntentKind::SetAlarm { time_str: "6:15 pm".into() });
        let intent = classify_fresh("set an alarm for 9 am");
        assert_eq!(intent.kind, IntentKind::SetAlarm { time_str: "9 am".into() });
    }

    #[test]
    fn test_power_hints_canonical() {
        let intent = classify_fresh("shut down the computer");
        assert_eq!(intent.kind, IntentKind::RawCommand);
        assert_eq!(intent.raw, "shutdown");

        let intent = classify_fresh("reboot now");
        assert_eq!(intent.raw, "restart");

        let intent = classify_fresh("suspend");
        assert_eq!(intent.raw, "sleep");

        let intent = classify_fresh("log off");
        assert_eq!(intent.raw, "logout");
    }

    #[test]
    fn test_default_raw_command() {
        let intent = classify_fresh("what is the meaning of life");
        assert_eq!(intent.kind, IntentKind::RawCommand);
        assert_eq!(intent.raw, "what is the meaning of life");
    }

    #[test]
    fn test_first_number_only() {
        assert_eq!(extract_number("change by 15 then 30"), Some(15));
        assert_eq!(extract_number("no numbers here"), None);
    }
}
