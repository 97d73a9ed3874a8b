//! Utterance endpointing
//!
//! Energy-based voice activity detection: an utterance starts when a chunk
//! rises above the energy threshold and ends after a run of quiet samples.

use super::audio::{SAMPLE_RATE, rms_energy};

/// Default RMS threshold; 2000 on the 16-bit scale
pub const DEFAULT_ENERGY_THRESHOLD: f32 = 0.06;

/// Default trailing silence that ends an utterance
pub const DEFAULT_PAUSE_MS: u64 = 800;

/// Minimum voiced duration to count as an utterance (in samples at 16kHz)
const MIN_SPEECH_SAMPLES: usize = 4800; // 0.3 seconds

/// State of the utterance detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for speech
    Idle,
    /// Speech started, accumulating until the pause
    Speaking,
}

/// Splits a live sample stream into utterances
pub struct UtteranceDetector {
    energy_threshold: f32,
    pause_samples: usize,
    state: DetectorState,
    speech_buffer: Vec<f32>,
    voiced_samples: usize,
    silence_counter: usize,
}

impl UtteranceDetector {
    /// Create a detector with the given RMS threshold and trailing pause
    #[must_use]
    pub fn new(energy_threshold: f32, pause_ms: u64) -> Self {
        let pause_samples = usize::try_from(pause_ms.saturating_mul(u64::from(SAMPLE_RATE)) / 1000)
            .unwrap_or(usize::MAX);

        Self {
            energy_threshold,
            pause_samples,
            state: DetectorState::Idle,
            speech_buffer: Vec::new(),
            voiced_samples: 0,
            silence_counter: 0,
        }
    }

    /// Feed a chunk of samples
    ///
    /// Returns true once an utterance is complete: enough speech followed by
    /// the configured pause. The utterance stays buffered until taken.
    pub fn process(&mut self, samples: &[f32]) -> bool {
        let energy = rms_energy(samples);
        let is_speech = energy > self.energy_threshold;

        match self.state {
            DetectorState::Idle => {
                if is_speech {
                    self.state = DetectorState::Speaking;
                    self.speech_buffer.clear();
                    self.speech_buffer.extend_from_slice(samples);
                    self.voiced_samples = samples.len();
                    self.silence_counter = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            DetectorState::Speaking => {
                self.speech_buffer.extend_from_slice(samples);

                if is_speech {
                    self.voiced_samples += samples.len();
                    self.silence_counter = 0;
                } else {
                    self.silence_counter += samples.len();
                }

                if self.is_complete() {
                    tracing::debug!(samples = self.speech_buffer.len(), "utterance complete");
                    return true;
                }

                // A blip followed by a long pause is noise, not speech
                if self.silence_counter > self.pause_samples * 2 {
                    tracing::trace!("noise burst discarded");
                    self.reset();
                }
            }
        }

        false
    }

    /// Whether an utterance is buffered and finished
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == DetectorState::Speaking
            && self.silence_counter > self.pause_samples
            && self.voiced_samples > MIN_SPEECH_SAMPLES
    }

    /// Whether speech has started
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.state == DetectorState::Speaking
    }

    /// Get the accumulated speech buffer
    #[must_use]
    pub fn speech_buffer(&self) -> &[f32] {
        &self.speech_buffer
    }

    /// Take the buffered utterance and return to idle
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.speech_buffer);
        self.reset();
        utterance
    }

    /// Reset detector to idle state
    pub fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.speech_buffer.clear();
        self.voiced_samples = 0;
        self.silence_counter = 0;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }
}

impl Default for UtteranceDetector {
    fn default() -> Self {
        Self::new(DEFAULT_ENERGY_THRESHOLD, DEFAULT_PAUSE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_input_stays_idle() {
        let mut detector = UtteranceDetector::default();

        assert!(!detector.process(&[0.01; 1600]));
        assert_eq!(detector.state(), DetectorState::Idle);
        assert!(detector.speech_buffer().is_empty());
    }

    #[test]
    fn test_pause_length_from_config() {
        let detector = UtteranceDetector::new(0.1, 500);
        assert_eq!(detector.pause_samples, 8000);
    }

    #[test]
    fn test_huge_pause_saturates() {
        let detector = UtteranceDetector::new(0.1, u64::MAX);
        assert!(detector.pause_samples > 0);
        assert!(!detector.is_complete());
    }

    #[test]
    fn test_noise_burst_is_discarded() {
        let mut detector = UtteranceDetector::new(0.05, 100);

        // 0.1s of loud noise is below the minimum speech length
        detector.process(&[0.5; 1600]);
        assert!(detector.is_speaking());

        // Long silence: not an utterance, back to idle
        for _ in 0..3 {
            assert!(!detector.process(&[0.0; 1600]));
        }
        assert_eq!(detector.state(), DetectorState::Idle);
    }
}
