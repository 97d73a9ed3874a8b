//! Speech output collaborators

use std::io::Write;

use async_trait::async_trait;

use super::playback::AudioPlayback;
use super::tts::TextToSpeech;

/// Sink for assistant speech
///
/// Speaking never fails from the caller's point of view; implementations
/// deal with their own errors.
#[async_trait(?Send)]
pub trait SpeechOutput {
    /// Say `text`, returning once it has been delivered
    async fn speak(&mut self, text: &str);
}

#[async_trait(?Send)]
impl<T: SpeechOutput + ?Sized> SpeechOutput for &mut T {
    async fn speak(&mut self, text: &str) {
        (**self).speak(text).await;
    }
}

/// Hosted TTS played through the default output device
pub struct Speaker {
    tts: TextToSpeech,
    playback: AudioPlayback,
}

impl Speaker {
    #[must_use]
    pub const fn new(tts: TextToSpeech, playback: AudioPlayback) -> Self {
        Self { tts, playback }
    }
}

#[async_trait(?Send)]
impl SpeechOutput for Speaker {
    async fn speak(&mut self, text: &str) {
        let played = match self.tts.synthesize(text).await {
            Ok(audio) => self.playback.play_mp3(&audio),
            Err(e) => Err(e),
        };

        // Fall back to the terminal so the user still gets the message
        if let Err(e) = played {
            tracing::warn!(error = %e, "speech output failed");
            println!("Assistant: {text}");
        }
    }
}

/// Writes assistant lines as text
pub struct ConsoleOutput<W> {
    writer: W,
}

impl<W: Write> ConsoleOutput<W> {
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the output and return the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait(?Send)]
impl<W: Write> SpeechOutput for ConsoleOutput<W> {
    async fn speak(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "Assistant: {text}") {
            tracing::warn!(error = %e, "console output failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_output_prefixes_lines() {
        let mut output = ConsoleOutput::new(Vec::new());
        output.speak("Hi! What's your name?").await;
        output.speak("Goodbye!").await;

        let text = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(text, "Assistant: Hi! What's your name?\nAssistant: Goodbye!\n");
    }
}
