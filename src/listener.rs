//! Capture/dispatch loop - Idle, Capturing, Interpreting, Shutdown
//!
//! The wake-word and speech-to-text engines are external collaborators
//! behind the two traits below; the loop owns their lifecycle. One
//! utterance is processed at a time: wake, pause the wake detector
//! (both cannot hold the microphone at once), capture a transcript,
//! interpret it, resume the detector, go back to waiting. A bad
//! capture is logged and survived; a quit outcome or an exhausted
//! engine shuts the loop down cleanly.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::dispatch::Outcome;
use crate::pipeline::Pipeline;

pub trait WakeEngine {
    /// Block until the wake word fires. `Ok(false)` means the engine
    /// has no more wake events to deliver.
    fn wait_for_wake(&mut self) -> Result<bool>;
    /// Release the capture resource while a command is being recorded.
    fn pause(&mut self) {}
    fn resume(&mut self) {}
}

pub trait SpeechEngine {
    /// Capture one utterance as lowercase text. `Ok(None)` means the
    /// source is exhausted.
    fn capture(&mut self) -> Result<Option<String>>;
}

pub struct Listener<W, S> {
    wake: W,
    speech: S,
    pipeline: Pipeline,
    running: Arc<AtomicBool>,
    display_name: String,
}

impl<W: WakeEngine, S: SpeechEngine> Listener<W, S> {
    pub fn new(
        wake: W,
        speech: S,
        pipeline: Pipeline,
        running: Arc<AtomicBool>,
        display_name: impl Into<String>,
    ) -> Self {
        Self { wake, speech, pipeline, running, display_name: display_name.into() }
    }

    /// Drive the loop until quit, engine exhaustion, or Ctrl-C.
    pub fn run(&mut self) -> Result<()> {
        info!("{} is listening", self.display_name);

        while self.running.load(Ordering::SeqCst) {
            // Idle: wait for the wake signal.
            match self.wake.wait_for_wake() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("wake engine failed: {e}");
                    return Err(e);
                }
            }
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            // Capturing: the command window owns the microphone.
            self.wake.pause();
            let captured = self.speech.capture();

            let quit = match captured {
                Ok(Some(text)) => self.interpret(&text),
                Ok(None) => true,
                Err(e) => {
                    // One bad capture must not kill the loop.
                    warn!("speech capture failed: {e}");
                    self.announce("Speech capture failed.");
                    false
                }
            };
            self.wake.resume();
            if quit {
                break;
            }
        }

        info!("{} shut down", self.display_name);
        Ok(())
    }

    /// Interpreting: normalize, classify, dispatch. Returns true when
    /// the utterance asked the listener to stand down.
    fn interpret(&mut self, text: &str) -> bool {
        let outcome = self.pipeline.handle_utterance(text);
        self.announce(outcome.message());
        matches!(outcome, Outcome::Quit(_))
    }

    fn announce(&self, message: &str) {
        println!("[{}] {message}", self.display_name);
        info!("{message}");
        self.pipeline.notify(&self.display_name, message);
    }
}

// ---- Console engines --------------------------------------------------------

/// Keyboard stand-in for the wake-word engine: every typed line is an
/// utterance, so the wake signal is implicit and always ready.
pub struct ConsoleWake;

impl WakeEngine for ConsoleWake {
    fn wait_for_wake(&mut self) -> Result<bool> {
        Ok(true)
    }
}

/// Keyboard stand-in for the speech engine. A reader thread feeds stdin
/// lines through a channel so the loop can keep checking the running
/// flag while blocked on input.
pub struct ConsoleSpeech {
    rx: flume::Receiver<String>,
    running: Arc<AtomicBool>,
}

impl ConsoleSpeech {
    pub fn new(running: Arc<AtomicBool>) -> Self {
        let (tx, rx) = flume::unbounded();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { rx, running }
    }
}

impl SpeechEngine for ConsoleSpeech {
    fn capture(&mut self) -> Result<Option<String>> {
        loop {
            match self.rx.recv_timeout(Duration::from_millis(100)) {
                Ok(line) => return Ok(Some(line)),
                Err(flume::RecvTimeoutError::Timeout) => {
                    if !self.running.load(Ordering::SeqCst) {
                        return Ok(None);
                    }
                }
                Err(flume::RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}
