//! Retry policy around a speech input

use super::input::{Capture, SpeechInput};
use super::output::SpeechOutput;

/// Spoken when a capture could not be transcribed
pub const REPEAT_PROMPT: &str = "Sorry, I didn't catch that. Could you please repeat?";

/// Spoken when the recognition service is unavailable
pub const SERVICE_NOTICE: &str =
    "Sorry, I'm currently experiencing some technical issues. Please try again later.";

/// Repeats allowed after an unrecognized capture
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Result of listening for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listened {
    /// User said something
    Heard(String),
    /// No usable input this turn
    Nothing,
    /// Input source is exhausted
    Closed,
}

/// Captures an utterance, asking the user to repeat when it was unclear
#[derive(Debug, Clone, Copy)]
pub struct Listener {
    max_retries: u32,
}

impl Listener {
    /// Allow up to `max_retries` repeats after the first unrecognized capture
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Listen for one utterance
    ///
    /// Unrecognized captures are retried after a spoken prompt. A service
    /// error is announced and ends the turn without retrying.
    pub async fn listen<I, O>(&self, input: &mut I, output: &mut O) -> Listened
    where
        I: SpeechInput + ?Sized,
        O: SpeechOutput + ?Sized,
    {
        let mut retries = 0;

        loop {
            match input.capture_utterance().await {
                Capture::Heard(text) => return Listened::Heard(text),
                Capture::Closed => return Listened::Closed,
                Capture::ServiceError(error) => {
                    tracing::warn!(%error, "speech recognition unavailable");
                    output.speak(SERVICE_NOTICE).await;
                    return Listened::Nothing;
                }
                Capture::Unrecognized => {
                    if retries >= self.max_retries {
                        tracing::debug!(retries, "giving up on unrecognized input");
                        return Listened::Nothing;
                    }
                    retries += 1;
                    output.speak(REPEAT_PROMPT).await;
                }
            }
        }
    }
}

impl Default for Listener {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_budget() {
        assert_eq!(Listener::default().max_retries, DEFAULT_MAX_RETRIES);
    }
}
