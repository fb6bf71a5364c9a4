//! Backend capability interface - one narrow trait per OS concern
//!
//! The dispatcher only ever talks to these traits; platform adapters
//! (see `linux`) do the actual process spawning and sysfs poking. Every
//! operation reports back as a user-facing string, including failures,
//! so a broken mixer or a missing tool never raises past this boundary.

pub mod linux;

use std::path::Path;

pub trait VolumeControl {
    /// Absolute target, already clamped to 0-100 by the dispatcher.
    fn set(&self, percent: u8) -> String;
    fn change(&self, delta: i32) -> String;
}

pub trait BrightnessControl {
    fn set(&self, percent: u8) -> String;
    fn change(&self, delta: i32) -> String;
}

pub trait PowerControl {
    /// `name` is a canonical keyword: shutdown, restart, sleep, logout.
    fn action(&self, name: &str) -> String;
}

pub trait AppControl {
    fn open(&self, name: &str) -> String;
    fn close(&self, name: &str) -> String;
    fn close_all(&self) -> String;
    fn list(&self) -> Vec<String>;
    /// Best-effort launch of a literal command line that matched no
    /// lexicon entry. `None` means nothing was started.
    fn spawn(&self, command: &str) -> Option<String>;
}

pub trait ScreenControl {
    /// Returns the saved path, or a failure description.
    fn screenshot(&self, dir: Option<&Path>) -> String;
}

pub trait ClipboardControl {
    fn read(&self) -> String;
}

pub trait TimerControl {
    /// Must not block; completion is signalled through notifications.
    fn set_timer(&self, seconds: u64) -> String;
    fn set_alarm(&self, time_str: &str) -> String;
}

pub trait WindowControl {
    /// WM class of the focused window, empty when unknown.
    fn active_class(&self) -> String;
    /// Inject a key combo like "ctrl+t" into the focused window.
    fn send_key(&self, combo: &str);
}

pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

/// The full capability set the dispatcher consumes.
pub struct Backend {
    pub volume: Box<dyn VolumeControl>,
    pub brightness: Box<dyn BrightnessControl>,
    pub power: Box<dyn PowerControl>,
    pub apps: Box<dyn AppControl>,
    pub screen: Box<dyn ScreenControl>,
    pub clipboard: Box<dyn ClipboardControl>,
    pub timer: Box<dyn TimerControl>,
    pub window: Box<dyn WindowControl>,
    pub notify: Box<dyn Notifier>,
}
