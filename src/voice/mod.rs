//! Voice processing module
//!
//! Audio capture and playback, utterance endpointing, hosted STT/TTS, and
//! the input/output seams the dialogue session talks to.

mod audio;
mod capture;
mod detector;
mod input;
mod listener;
mod output;
mod playback;
mod stt;
mod tts;

pub use audio::{SAMPLE_RATE, decode_mp3, resample, rms_energy, samples_to_wav};
pub use capture::AudioCapture;
pub use detector::{DEFAULT_ENERGY_THRESHOLD, DEFAULT_PAUSE_MS, DetectorState, UtteranceDetector};
pub use input::{Capture, ConsoleInput, ListenSettings, Microphone, SpeechInput};
pub use listener::{DEFAULT_MAX_RETRIES, Listened, Listener, REPEAT_PROMPT, SERVICE_NOTICE};
pub use output::{ConsoleOutput, Speaker, SpeechOutput};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE};
pub use stt::{SpeechToText, SttProvider};
pub use tts::{TextToSpeech, TtsProvider};
