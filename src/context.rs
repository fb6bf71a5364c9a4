//! Conversation context - short-term memory between utterances
//!
//! Remembers just enough to resolve "close that" and to reuse the last
//! relative step when a follow-up like "brighter" carries no number.
//! Single-owner value threaded `&mut` through dispatch; the capture loop
//! is strictly sequential, so there is exactly one writer.

use std::collections::VecDeque;

/// How many recent commands are kept.
const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Default)]
pub struct Context {
    /// Kind of the last dispatched intent ("open_app", "set_volume", ...).
    pub last_action: Option<String>,
    /// Canonical key of the last app opened or closed.
    pub last_app: Option<String>,
    /// Last relative brightness step, 0 after an absolute set.
    pub last_brightness_delta: i32,
    /// Last relative volume step, 0 after an absolute set.
    pub last_volume_delta: i32,
    /// Bounded FIFO of recent normalized commands.
    pub recent_commands: VecDeque<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to the history, evicting the oldest past capacity.
    /// Empty strings are not recorded.
    pub fn remember(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.recent_commands.push_back(text.to_string());
        while self.recent_commands.len() > HISTORY_CAPACITY {
            self.recent_commands.pop_front();
        }
    }
}
