//! Linux backend - best-effort adapters over common desktop tooling
//!
//! Volume goes through pactl (pipewire and pulseaudio) with an amixer
//! fallback, brightness through xbacklight with a sysfs fallback, and
//! the rest through the usual suspects (pkill, xclip, xdotool,
//! notify-send, a rotating cast of screenshot tools). Everything
//! degrades to a descriptive string; nothing here panics or returns
//! `Err` to the dispatcher.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{
    AppControl, Backend, BrightnessControl, ClipboardControl, Notifier, PowerControl,
    ScreenControl, TimerControl, VolumeControl, WindowControl,
};
use crate::config::PowerConfig;
use crate::lexicon::Lexicon;

/// Assemble the full Linux capability set.
pub fn linux_backend(power: &PowerConfig, lexicon: &Lexicon) -> Backend {
    Backend {
        volume: Box::new(PactlVolume),
        brightness: Box::new(BacklightBrightness),
        power: Box::new(ConfiguredPower { config: power.clone() }),
        apps: Box::new(LexiconApps { lexicon: lexicon.clone() }),
        screen: Box::new(ShellScreenshot),
        clipboard: Box::new(XClipboard),
        timer: Box::new(ThreadTimer),
        window: Box::new(XdoWindow),
        notify: Box::new(NotifySend),
    }
}

fn have(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a command and collect output. Failure to even start counts as a
/// nonzero exit with the error text in stderr position.
fn run(program: &str, args: &[&str]) -> (bool, String, String) {
    match Command::new(program).args(args).output() {
        Ok(out) => (
            out.status.success(),
            String::from_utf8_lossy(&out.stdout).trim().to_string(),
            String::from_utf8_lossy(&out.stderr).trim().to_string(),
        ),
        Err(e) => (false, String::new(), e.to_string()),
    }
}

/// Launch a command line detached, output discarded.
fn spawn_detached(tokens: &[&str]) -> std::io::Result<()> {
    let Some((program, args)) = tokens.split_first() else {
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"));
    };
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .stdin(Stdio::null())
        .spawn()
        .map(drop)
}

// ---- Volume -----------------------------------------------------------------

struct PactlVolume;

impl VolumeControl for PactlVolume {
    fn set(&self, percent: u8) -> String {
        if have("pactl") {
            let (ok, out, err) =
                run("pactl", &["set-sink-volume", "@DEFAULT_SINK@", &format!("{percent}%")]);
            return if ok {
                format!("Volume set to {percent} percent.")
            } else {
                format!("Volume set failed: {}", pick(err, out))
            };
        }
        if have("amixer") {
            let (ok, out, err) = run("amixer", &["set", "Master", &format!("{percent}%")]);
            return if ok {
                format!("Volume set to {percent} percent.")
            } else {
                format!("Volume set failed: {}", pick(err, out))
            };
        }
        "No supported volume control found.".into()
    }

    fn change(&self, delta: i32) -> String {
        if have("pactl") {
            let (ok, out, err) =
                run("pactl", &["set-sink-volume", "@DEFAULT_SINK@", &format!("{delta:+}%")]);
            return if ok {
                "Volume adjusted.".into()
            } else {
                format!("Volume adjust failed: {}", pick(err, out))
            };
        }
        if have("amixer") {
            let sign = if delta >= 0 { "+" } else { "-" };
            let (ok, out, err) =
                run("amixer", &["set", "Master", &format!("{}%{sign}", delta.abs())]);
            return if ok {
                "Volume adjusted.".into()
            } else {
                format!("Volume adjust failed: {}", pick(err, out))
            };
        }
        "No supported volume control found.".into()
    }
}

fn pick(primary: String, fallback: String) -> String {
    if primary.is_empty() { fallback } else { primary }
}

// ---- Brightness -------------------------------------------------------------

struct BacklightBrightness;

const BACKLIGHT_ROOT: &str = "/sys/class/backlight";

impl BrightnessControl for BacklightBrightness {
    fn set(&self, percent: u8) -> String {
        if have("xbacklight") {
            let (ok, out, err) = run("xbacklight", &["-set", &percent.to_string()]);
            return if ok {
                format!("Brightness set to {percent} percent.")
            } else {
                format!("Brightness set failed: {}", pick(err, out))
            };
        }
        match sysfs_adjust(None, Some(percent)) {
            Some(()) => format!("Brightness set to {percent} percent."),
            None => "No supported brightness control found.".into(),
        }
    }

    fn change(&self, delta: i32) -> String {
        if have("xbacklight") {
            let flag = if delta >= 0 { "-inc" } else { "-dec" };
            let (ok, out, err) = run("xbacklight", &[flag, &delta.abs().to_string()]);
            return if ok {
                "Brightness adjusted.".into()
            } else {
                format!("Brightness adjust failed: {}", pick(err, out))
            };
        }
        match sysfs_adjust(Some(delta), None) {
            Some(()) => "Brightness adjusted.".into(),
            None => "No supported brightness control found.".into(),
        }
    }
}

/// Write the first backlight controller under sysfs. Percentages are
/// scaled against the controller's max_brightness.
fn sysfs_adjust(relative: Option<i32>, absolute: Option<u8>) -> Option<()> {
    let controller = fs::read_dir(BACKLIGHT_ROOT).ok()?.flatten().next()?.path();
    let read_value = |name: &str| -> Option<i64> {
        fs::read_to_string(controller.join(name)).ok()?.trim().parse().ok()
    };
    let max = read_value("max_brightness")?;
    let current = read_value("brightness")?;

    let target = if let Some(percent) = absolute {
        max * i64::from(percent) / 100
    } else {
        let delta = max * i64::from(relative?) / 100;
        (current + delta).clamp(0, max)
    };
    fs::write(controller.join("brightness"), target.to_string()).ok()
}

// ---- Power ------------------------------------------------------------------

struct ConfiguredPower {
    config: PowerConfig,
}

impl PowerControl for ConfiguredPower {
    fn action(&self, name: &str) -> String {
        let command = match name {
            n if n.contains("shutdown") || n.contains("power off") => &self.config.shutdown,
            n if n.contains("restart") || n.contains("reboot") => &self.config.reboot,
            n if n.contains("sleep") || n.contains("suspend") => &self.config.suspend,
            n if n.contains("logout") || n.contains("log out") => {
                if self.config.logout.is_empty() {
                    return "Logout command is not configured for this desktop.".into();
                }
                &self.config.logout
            }
            _ => return "Unknown power action.".into(),
        };

        let tokens: Vec<&str> = command.split_whitespace().collect();
        if tokens.is_empty() {
            return "Power command is not configured.".into();
        }
        let (ok, out, err) = run(tokens[0], &tokens[1..]);
        if ok {
            "Power command sent.".into()
        } else {
            format!("Power command failed: {}", pick(err, out))
        }
    }
}

// ---- Apps -------------------------------------------------------------------

struct LexiconApps {
    lexicon: Lexicon,
}

impl AppControl for LexiconApps {
    fn open(&self, name: &str) -> String {
        let Some(command) = self.lexicon.command(name) else {
            return format!("Application '{name}' not found in mappings.");
        };
        let tokens: Vec<&str> = command.split_whitespace().collect();
        if tokens.is_empty() {
            return format!("Application '{name}' has an empty command.");
        }
        match spawn_detached(&tokens) {
            Ok(()) => format!("Opening {name}."),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("Executable not found for '{name}'.")
            }
            Err(e) => format!("Failed to open {name}: {e}"),
        }
    }

    fn close(&self, name: &str) -> String {
        let Some(command) = self.lexicon.command(name) else {
            return format!("Application '{name}' not found in mappings.");
        };
        let token = command.split_whitespace().next().unwrap_or(name);
        let (ok, _, _) = run("pkill", &["-f", token]);
        if ok {
            format!("Closed {name}.")
        } else {
            format!("Could not close {name} (it may not be running).")
        }
    }

    fn close_all(&self) -> String {
        let mut closed = Vec::new();
        let mut idle = Vec::new();
        for (name, command) in self.lexicon.entries() {
            let token = command.split_whitespace().next().unwrap_or(name);
            let (ok, _, _) = run("pkill", &["-f", token]);
            if ok {
                closed.push(name);
            } else {
                idle.push(name);
            }
        }
        if closed.is_empty() && idle.is_empty() {
            return "No apps configured.".into();
        }
        format!("Closed: {}. Not running: {}.", closed.join(", "), idle.join(", "))
    }

    fn list(&self) -> Vec<String> {
        self.lexicon.keys().map(str::to_string).collect()
    }

    fn spawn(&self, command: &str) -> Option<String> {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        let exe = *tokens.first()?;
        // Articles and pronouns left over from verb stripping are not
        // executables worth trying.
        if matches!(exe, "the" | "a" | "an" | "it" | "this") {
            return None;
        }
        match spawn_detached(&tokens) {
            Ok(()) => Some(format!("Trying to open {exe}.")),
            Err(e) => {
                debug!("generic launch of '{exe}' failed: {e}");
                None
            }
        }
    }
}

// ---- Screen / clipboard -----------------------------------------------------

struct ShellScreenshot;

impl ScreenControl for ShellScreenshot {
    fn screenshot(&self, dir: Option<&Path>) -> String {
        let dir = dir.map(Path::to_path_buf).unwrap_or_else(default_screenshot_dir);
        if let Err(e) = fs::create_dir_all(&dir) {
            return format!("Screenshot failed: {e}");
        }
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let path = dir.join(format!("Screenshot-{stamp}.png"));
        let path_str = path.to_string_lossy();

        let attempts: [(&str, Vec<&str>); 3] = [
            ("gnome-screenshot", vec!["-f", &path_str]),
            ("xfce4-screenshooter", vec!["-f", "-o", &path_str]),
            ("scrot", vec!["-q", "100", &path_str]),
        ];
        for (tool, args) in &attempts {
            if !have(tool) {
                continue;
            }
            let (ok, _, err) = run(tool, args);
            return if ok {
                path_str.to_string()
            } else {
                format!("Screenshot failed: {err}")
            };
        }
        "No screenshot tool found (gnome-screenshot, xfce4-screenshooter, or scrot).".into()
    }
}

fn default_screenshot_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join("Pictures")
}

struct XClipboard;

impl ClipboardControl for XClipboard {
    fn read(&self) -> String {
        if have("xclip") {
            let (ok, out, _) = run("xclip", &["-selection", "clipboard", "-o"]);
            return if ok { out } else { "Clipboard read failed.".into() };
        }
        if have("xsel") {
            let (ok, out, _) = run("xsel", &["--clipboard", "--output"]);
            return if ok { out } else { "Clipboard read failed.".into() };
        }
        "No clipboard utility found.".into()
    }
}

// ---- Timer ------------------------------------------------------------------

struct ThreadTimer;

impl TimerControl for ThreadTimer {
    fn set_timer(&self, seconds: u64) -> String {
        if seconds == 0 {
            return "Invalid timer length.".into();
        }
        // Detached; the dispatcher never waits on timer completion.
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(seconds));
            let body = format!("{seconds} seconds elapsed");
            if spawn_detached(&["notify-send", "Timer", &body]).is_err() {
                warn!("timer elapsed but notify-send is unavailable");
            }
        });
        format!("Timer set for {seconds} seconds.")
    }

    fn set_alarm(&self, time_str: &str) -> String {
        // Reliable wall-clock alarms need the desktop clock; opening it
        // is the most honest thing this adapter can do.
        let _ = spawn_detached(&["gnome-clocks"]);
        format!(
            "I heard you want an alarm for {time_str}. \
             Please use your desktop clock application for reliable scheduling."
        )
    }
}

// ---- Window / notifications -------------------------------------------------

struct XdoWindow;

impl WindowControl for XdoWindow {
    fn active_class(&self) -> String {
        let (ok, wid, _) = run("xdotool", &["getactivewindow"]);
        if !ok || wid.is_empty() {
            return String::new();
        }
        let (ok, class, _) = run("xprop", &["-id", &wid, "WM_CLASS"]);
        if ok { class } else { String::new() }
    }

    fn send_key(&self, combo: &str) {
        let (ok, _, err) = run("xdotool", &["key", "--clearmodifiers", combo]);
        if !ok {
            warn!("key injection '{combo}' failed: {err}");
        }
    }
}

struct NotifySend;

impl Notifier for NotifySend {
    fn notify(&self, title: &str, body: &str) {
        if spawn_detached(&["notify-send", title, body]).is_err() {
            // Keep the message visible in logs even without a
            // notification daemon.
            debug!("notify: {title} - {body}");
        }
    }
}
