//! Speech input collaborators
//!
//! A [`SpeechInput`] yields one [`Capture`] per call: a transcript, a signal
//! that nothing intelligible was heard, a service failure, or end of input.

use std::io::BufRead;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::audio::{SAMPLE_RATE, samples_to_wav};
use super::capture::AudioCapture;
use super::detector::UtteranceDetector;
use super::stt::SpeechToText;
use crate::Result;

/// How often the microphone buffer is drained
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of one capture attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Transcribed text, trimmed
    Heard(String),
    /// Speech (or silence) that could not be transcribed
    Unrecognized,
    /// Recognition backend unavailable
    ServiceError(String),
    /// No more input will arrive
    Closed,
}

/// Source of user utterances
#[async_trait(?Send)]
pub trait SpeechInput {
    /// Block until one utterance has been captured and transcribed
    async fn capture_utterance(&mut self) -> Capture;
}

#[async_trait(?Send)]
impl<T: SpeechInput + ?Sized> SpeechInput for &mut T {
    async fn capture_utterance(&mut self) -> Capture {
        (**self).capture_utterance().await
    }
}

/// Microphone endpointing parameters
#[derive(Debug, Clone, Copy)]
pub struct ListenSettings {
    /// RMS level above which a chunk counts as speech
    pub energy_threshold: f32,
    /// Trailing silence that ends an utterance
    pub pause_ms: u64,
    /// How long to wait for speech to start
    pub listen_timeout: Duration,
    /// Longest single utterance before it is cut off
    pub phrase_limit: Duration,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            energy_threshold: super::detector::DEFAULT_ENERGY_THRESHOLD,
            pause_ms: super::detector::DEFAULT_PAUSE_MS,
            listen_timeout: Duration::from_secs(10),
            phrase_limit: Duration::from_secs(15),
        }
    }
}

/// Live microphone input transcribed by a hosted STT service
pub struct Microphone {
    capture: AudioCapture,
    detector: UtteranceDetector,
    stt: SpeechToText,
    settings: ListenSettings,
}

impl Microphone {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if the audio device cannot be opened
    pub fn new(stt: SpeechToText, settings: ListenSettings) -> Result<Self> {
        Ok(Self {
            capture: AudioCapture::new()?,
            detector: UtteranceDetector::new(settings.energy_threshold, settings.pause_ms),
            stt,
            settings,
        })
    }

    /// Record until an utterance ends, or `None` if nobody spoke in time
    async fn record_utterance(&mut self) -> Result<Option<Vec<f32>>> {
        self.detector.reset();
        self.capture.clear_buffer();
        self.capture.start()?;

        tracing::info!("listening");

        let started = Instant::now();
        let mut speech_started: Option<Instant> = None;

        let utterance = loop {
            tokio::time::sleep(POLL_INTERVAL).await;

            let samples = self.capture.take_buffer();
            if !samples.is_empty() && self.detector.process(&samples) {
                break Some(self.detector.take_utterance());
            }

            if self.detector.is_speaking() {
                let since = *speech_started.get_or_insert_with(Instant::now);
                if since.elapsed() > self.settings.phrase_limit {
                    tracing::debug!("phrase limit reached");
                    break Some(self.detector.take_utterance());
                }
            } else {
                speech_started = None;
                if started.elapsed() > self.settings.listen_timeout {
                    tracing::debug!("no speech before timeout");
                    break None;
                }
            }
        };

        self.capture.stop();
        Ok(utterance)
    }

    async fn transcribe(&self, samples: &[f32]) -> Capture {
        tracing::info!(samples = samples.len(), "recognizing");

        let wav = match samples_to_wav(samples, SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => return Capture::ServiceError(e.to_string()),
        };

        match self.stt.transcribe(&wav).await {
            Ok(text) if text.trim().is_empty() => Capture::Unrecognized,
            Ok(text) => Capture::Heard(text.trim().to_string()),
            Err(e) => Capture::ServiceError(e.to_string()),
        }
    }
}

#[async_trait(?Send)]
impl SpeechInput for Microphone {
    async fn capture_utterance(&mut self) -> Capture {
        match self.record_utterance().await {
            Ok(Some(samples)) => self.transcribe(&samples).await,
            Ok(None) => Capture::Unrecognized,
            Err(e) => {
                tracing::warn!(error = %e, "microphone capture failed");
                Capture::ServiceError(e.to_string())
            }
        }
    }
}

/// Line-oriented text input, one utterance per line
pub struct ConsoleInput<R> {
    reader: R,
}

impl<R: BufRead> ConsoleInput<R> {
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait(?Send)]
impl<R: BufRead> SpeechInput for ConsoleInput<R> {
    async fn capture_utterance(&mut self) -> Capture {
        let mut line = String::new();

        match self.reader.read_line(&mut line) {
            Ok(0) => Capture::Closed,
            Ok(_) if line.trim().is_empty() => Capture::Unrecognized,
            Ok(_) => Capture::Heard(line.trim().to_string()),
            Err(e) => Capture::ServiceError(e.to_string()),
        }
    }
}
