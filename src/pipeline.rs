//! Pipeline - the one inbound boundary for recognized utterances
//!
//! normalize -> classify -> dispatch, with the conversation context
//! threaded through. The capture loop calls `handle_utterance` once per
//! transcript and inspects the outcome for the quit signal.

use tracing::debug;

use crate::context::Context;
use crate::dispatch::{Dispatcher, Outcome};
use crate::intent::classify;
use crate::lexicon::Lexicon;
use crate::normalize::normalize;

pub struct Pipeline {
    lexicon: Lexicon,
    context: Context,
    dispatcher: Dispatcher,
}

impl Pipeline {
    pub fn new(lexicon: Lexicon, dispatcher: Dispatcher) -> Self {
        Self { lexicon, context: Context::new(), dispatcher }
    }

    /// Interpret one utterance and return the user-facing outcome.
    pub fn handle_utterance(&mut self, raw: &str) -> Outcome {
        let text = normalize(raw);
        let intent = classify(&text, &self.lexicon, &self.context);
        debug!("'{raw}' -> {:?}", intent.kind);
        let outcome = self.dispatcher.dispatch(intent, &self.lexicon, &mut self.context);
        debug!(
            last_action = ?self.context.last_action,
            history = self.context.recent_commands.len(),
            "context updated"
        );
        outcome
    }

    /// Forward a result to the desktop notifier. Notification failures
    /// are swallowed inside the notifier implementation.
    pub fn notify(&self, title: &str, body: &str) {
        self.dispatcher.backend().notify.notify(title, body);
    }

    #[allow(dead_code)]
    pub fn context(&self) -> &Context {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{CallLog, recording_backend};

    fn pipeline() -> (Pipeline, CallLog) {
        let (backend, calls, _) = recording_backend();
        let dispatcher = Dispatcher::new(backend, 0.7, None);
        (Pipeline::new(Lexicon::default(), dispatcher), calls)
    }

    #[test]
    fn test_noisy_transcript_end_to_end() {
        let (mut pipeline, calls) = pipeline();
        let outcome = pipeline.handle_utterance("Bellhop, can you open VS Code please?");
        assert_eq!(outcome.message(), "Opening vs code.");
        assert_eq!(calls.lock().unwrap().clone(), vec!["apps.open vs code"]);
    }

    #[test]
    fn test_context_carries_between_utterances() {
        let (mut pipeline, calls) = pipeline();
        pipeline.handle_utterance("open firefox");
        pipeline.handle_utterance("close it, please");
        assert_eq!(
            calls.lock().unwrap().clone(),
            vec!["apps.open firefox", "apps.close firefox"]
        );
    }

    #[test]
    fn test_brightness_step_round_trip() {
        let (mut pipeline, calls) = pipeline();
        pipeline.handle_utterance("make it brighter by 20");
        pipeline.handle_utterance("brighter");
        pipeline.handle_utterance("set brightness to 50");
        pipeline.handle_utterance("brighter");
        assert_eq!(
            calls.lock().unwrap().clone(),
            vec![
                "brightness.change 20",
                "brightness.change 20",
                "brightness.set 50",
                // The absolute set wiped the remembered step.
                "brightness.change 10",
            ]
        );
    }

    #[test]
    fn test_empty_transcript() {
        let (mut pipeline, calls) = pipeline();
        let outcome = pipeline.handle_utterance("   ");
        assert_eq!(outcome.message(), "No speech detected.");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_quit_surfaces_to_caller() {
        let (mut pipeline, _) = pipeline();
        let outcome = pipeline.handle_utterance("stop listening");
        assert!(matches!(outcome, Outcome::Quit(_)));
    }

    #[test]
    fn test_history_recorded_normalized() {
        let (mut pipeline, _) = pipeline();
        pipeline.handle_utterance("Open Firefox, please!");
        assert_eq!(pipeline.context().recent_commands.back().unwrap(), "open firefox");
    }
}
