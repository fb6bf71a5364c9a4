//! Dispatch - routes a classified intent to one backend capability call
//!
//! Clamps absolute values, fills default deltas from context, updates
//! context after the call, and returns a user-facing string. Unmatched
//! text lands in the raw-command chain: quit phrases, power keywords,
//! window context actions, then app-name resolution (exact, substring,
//! fuzzy, literal executable) and finally an apology.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::backend::Backend;
use crate::context::Context;
use crate::fuzzy;
use crate::intent::{Intent, IntentKind};
use crate::lexicon::Lexicon;

/// Leading launch verbs and articles stripped before app-name lookup.
static LAUNCH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(open|launch|start|run|the|a|i)\s+").unwrap());

static CLOSE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(close|quit|terminate|end)\s+").unwrap());

const CLOSE_PHRASES: &[&str] = &["close", "quit", "exit", "terminate", "end"];

/// Generic actions resolved against the focused window, in match order.
const CONTEXT_ACTIONS: &[&str] = &[
    "copy",
    "paste",
    "reload",
    "open downloads",
    "back",
    "forward",
    "new tab",
    "close tab",
    "select all",
];

const BROWSER_CLASSES: &[&str] = &["firefox", "chrome", "brave", "edge"];
const EDITOR_CLASSES: &[&str] = &["gedit", "code", "notepad", "sublime", "vim"];

/// What the loop should do with a dispatched utterance.
#[derive(Debug)]
pub enum Outcome {
    Reply(String),
    /// The user asked the listener to stand down.
    Quit(String),
}

impl Outcome {
    pub fn message(&self) -> &str {
        match self {
            Outcome::Reply(msg) | Outcome::Quit(msg) => msg,
        }
    }
}

pub struct Dispatcher {
    backend: Backend,
    fuzzy_threshold: f64,
    screenshot_dir: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(backend: Backend, fuzzy_threshold: f64, screenshot_dir: Option<PathBuf>) -> Self {
        Self { backend, fuzzy_threshold, screenshot_dir }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Execute one intent: at most one capability call, one context
    /// update, no retries.
    pub fn dispatch(&self, intent: Intent, lexicon: &Lexicon, ctx: &mut Context) -> Outcome {
        if intent.kind == IntentKind::Empty {
            // No backend call and no context mutation for silence.
            return Outcome::Reply("No speech detected.".into());
        }

        ctx.remember(&intent.raw);
        let action = intent.action_name();

        match intent.kind {
            IntentKind::Empty => unreachable!("handled above"),

            IntentKind::OpenApp { app } => {
                let msg = self.backend.apps.open(&app);
                ctx.last_action = Some(action.into());
                ctx.last_app = Some(app);
                Outcome::Reply(msg)
            }
            IntentKind::CloseApp { app } => {
                let msg = self.backend.apps.close(&app);
                ctx.last_action = Some(action.into());
                ctx.last_app = Some(app);
                Outcome::Reply(msg)
            }
            IntentKind::CloseAll => {
                let msg = self.backend.apps.close_all();
                ctx.last_action = Some(action.into());
                Outcome::Reply(msg)
            }

            IntentKind::SetBrightness { value } => {
                let percent = value.clamp(0, 100) as u8;
                let msg = self.backend.brightness.set(percent);
                ctx.last_action = Some(action.into());
                // An absolute set discards relative memory.
                ctx.last_brightness_delta = 0;
                Outcome::Reply(msg)
            }
            IntentKind::ChangeBrightness { delta } => {
                let msg = self.backend.brightness.change(delta);
                ctx.last_action = Some(action.into());
                ctx.last_brightness_delta = delta;
                Outcome::Reply(msg)
            }
            IntentKind::SetVolume { value } => {
                let percent = value.clamp(0, 100) as u8;
                let msg = self.backend.volume.set(percent);
                ctx.last_action = Some(action.into());
                ctx.last_volume_delta = 0;
                Outcome::Reply(msg)
            }
            IntentKind::ChangeVolume { delta } => {
                let msg = self.backend.volume.change(delta);
                ctx.last_action = Some(action.into());
                ctx.last_volume_delta = delta;
                Outcome::Reply(msg)
            }

            IntentKind::ClipboardRead => {
                let clip = self.backend.clipboard.read();
                Outcome::Reply(format!("Clipboard: {clip}"))
            }
            IntentKind::TakeScreenshot => {
                let path = self.backend.screen.screenshot(self.screenshot_dir.as_deref());
                self.backend.notify.notify("Screenshot", &path);
                Outcome::Reply(format!("Screenshot saved: {path}"))
            }
            IntentKind::SetTimer { duration_s } => {
                Outcome::Reply(self.backend.timer.set_timer(duration_s))
            }
            IntentKind::SetAlarm { time_str } => {
                Outcome::Reply(self.backend.timer.set_alarm(&time_str))
            }

            IntentKind::RawCommand => {
                let outcome = self.resolve_raw(&intent.raw, lexicon);
                ctx.last_action = Some(action.into());
                outcome
            }
        }
    }

    /// Fallback chain for text no rule claimed. Order is fixed: quit,
    /// power, window context actions, app resolution, alarm hint,
    /// apology.
    fn resolve_raw(&self, text: &str, lexicon: &Lexicon) -> Outcome {
        if text.contains("stop listening") || text.contains("die") {
            return Outcome::Quit("Standing down. Wake me when you need me.".into());
        }

        if ["shutdown", "shut down", "turn off", "power off"].iter().any(|k| text.contains(k)) {
            return Outcome::Reply(self.backend.power.action("shutdown"));
        }
        if text.contains("restart") || text.contains("reboot") {
            return Outcome::Reply(self.backend.power.action("restart"));
        }
        if text.contains("sleep") || text.contains("suspend") {
            return Outcome::Reply(self.backend.power.action("sleep"));
        }
        if ["logout", "log out", "log off"].iter().any(|k| text.contains(k)) {
            return Outcome::Reply(self.backend.power.action("logout"));
        }

        if let Some(action) = CONTEXT_ACTIONS.iter().find(|a| text.contains(*a)) {
            return Outcome::Reply(self.context_action(action));
        }

        // Closure requests that carried no resolvable app name.
        if CLOSE_PHRASES.iter().any(|p| text.contains(p)) {
            let target = CLOSE_PREFIX.replace(text, "").trim().to_string();
            let key = if lexicon.contains(&target) {
                Some(target.as_str())
            } else {
                lexicon.keys().find(|key| target.contains(key) || key.contains(&target))
            };
            return match key {
                Some(key) => Outcome::Reply(self.backend.apps.close(key)),
                None => {
                    Outcome::Reply("Error: Application name was not recognized for closure.".into())
                }
            };
        }

        let cleaned = LAUNCH_PREFIX.replace(text, "").trim().to_string();

        if lexicon.contains(&cleaned) {
            return Outcome::Reply(self.backend.apps.open(&cleaned));
        }
        if let Some(key) =
            lexicon.keys().find(|key| cleaned.contains(key) || key.contains(&cleaned))
        {
            return Outcome::Reply(self.backend.apps.open(key));
        }
        if let Some(key) = fuzzy::resolve(&cleaned, lexicon.keys(), self.fuzzy_threshold) {
            debug!("fuzzy resolved '{cleaned}' to '{key}'");
            return Outcome::Reply(self.backend.apps.open(key));
        }
        if let Some(msg) = self.backend.apps.spawn(&cleaned) {
            return Outcome::Reply(msg);
        }

        if text.contains("alarm") {
            let _ = self.backend.apps.spawn("gnome-clocks");
            return Outcome::Reply(
                "I heard a request for an alarm but cannot schedule it reliably; \
                 I tried to open your desktop clock app."
                    .into(),
            );
        }

        Outcome::Reply(format!("Sorry, I don't understand '{cleaned}' yet."))
    }

    /// Map a generic action to a key combo for the focused window.
    fn context_action(&self, action: &str) -> String {
        let class = self.backend.window.active_class().to_lowercase();
        debug!("active window class: {class}");

        if BROWSER_CLASSES.iter().any(|c| class.contains(c)) {
            let hit = match action {
                "open downloads" => Some(("ctrl+j", "Opening downloads.")),
                "reload" => Some(("ctrl+r", "Reloading page.")),
                "back" => Some(("alt+Left", "Going back.")),
                "forward" => Some(("alt+Right", "Going forward.")),
                "new tab" => Some(("ctrl+t", "Opening new tab.")),
                "close tab" => Some(("ctrl+w", "Closing tab.")),
                _ => None,
            };
            if let Some((combo, msg)) = hit {
                self.backend.window.send_key(combo);
                return msg.into();
            }
        }

        if EDITOR_CLASSES.iter().any(|c| class.contains(c)) {
            let hit = match action {
                "copy" => Some(("ctrl+c", "Copied.")),
                "paste" => Some(("ctrl+v", "Pasted.")),
                "select all" => Some(("ctrl+a", "Selected all.")),
                _ => None,
            };
            if let Some((combo, msg)) = hit {
                self.backend.window.send_key(combo);
                return msg.into();
            }
        }

        "No context action available.".into()
    }
}
