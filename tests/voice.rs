//! Voice pipeline integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;

use hark::session::{GOODBYE, GREETING};
use hark::voice::{
    Capture, ConsoleInput, ConsoleOutput, DetectorState, Listened, Listener, REPEAT_PROMPT,
    SAMPLE_RATE, SERVICE_NOTICE, UtteranceDetector, samples_to_wav,
};
use hark::{Session, SessionEnd};

mod common;

use common::{RecordingOutput, ScriptedInput, heard};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn generate_silence(duration_secs: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    vec![0.0; num_samples]
}

#[tokio::test]
async fn test_listener_returns_clear_speech() {
    let mut input = ScriptedInput::heard(&["hello"]);
    let mut output = RecordingOutput::default();

    let listened = Listener::default().listen(&mut input, &mut output).await;

    assert_eq!(listened, Listened::Heard("hello".to_string()));
    assert!(output.spoken.is_empty());
}

#[tokio::test]
async fn test_listener_retries_unrecognized() {
    let mut input = ScriptedInput::new([Capture::Unrecognized, Capture::Unrecognized, heard("ok")]);
    let mut output = RecordingOutput::default();

    let listened = Listener::new(3).listen(&mut input, &mut output).await;

    assert_eq!(listened, Listened::Heard("ok".to_string()));
    assert_eq!(output.spoken, vec![REPEAT_PROMPT, REPEAT_PROMPT]);
}

#[tokio::test]
async fn test_listener_gives_up_after_max_retries() {
    let mut input = ScriptedInput::new(std::iter::repeat_n(Capture::Unrecognized, 6));
    let mut output = RecordingOutput::default();

    let listened = Listener::new(3).listen(&mut input, &mut output).await;

    assert_eq!(listened, Listened::Nothing);
    assert_eq!(output.count(REPEAT_PROMPT), 3);
    // First attempt plus three retries
    assert_eq!(input.remaining(), 2);
}

#[tokio::test]
async fn test_listener_without_retries() {
    let mut input = ScriptedInput::new([Capture::Unrecognized, heard("late")]);
    let mut output = RecordingOutput::default();

    let listened = Listener::new(0).listen(&mut input, &mut output).await;

    assert_eq!(listened, Listened::Nothing);
    assert!(output.spoken.is_empty());
    assert_eq!(input.remaining(), 1);
}

#[tokio::test]
async fn test_listener_service_error_is_not_retried() {
    let mut input = ScriptedInput::new([
        Capture::ServiceError("503".to_string()),
        heard("never reached"),
    ]);
    let mut output = RecordingOutput::default();

    let listened = Listener::default().listen(&mut input, &mut output).await;

    assert_eq!(listened, Listened::Nothing);
    assert_eq!(output.spoken, vec![SERVICE_NOTICE]);
    assert_eq!(input.remaining(), 1);
}

#[tokio::test]
async fn test_listener_closed_input() {
    let mut input = ScriptedInput::default();
    let mut output = RecordingOutput::default();

    let listened = Listener::default().listen(&mut input, &mut output).await;

    assert_eq!(listened, Listened::Closed);
    assert!(output.spoken.is_empty());
}

#[tokio::test]
async fn test_console_session() {
    let mut store = common::setup_test_store();
    let input = ConsoleInput::new(Cursor::new("Kim\nCapital of France\nParis\n\nexit\n"));
    let mut output = ConsoleOutput::new(Vec::new());
    let mut transcript = Vec::new();

    let end = Session::new(&mut store, input, &mut output, &mut transcript)
        .run()
        .await
        .unwrap();

    assert_eq!(end, SessionEnd::Exit);
    assert_eq!(store.lookup("capital of france"), Some("Paris"));

    let spoken = String::from_utf8(output.into_inner()).unwrap();
    assert!(spoken.starts_with(&format!("Assistant: {GREETING}\n")));
    assert!(spoken.contains(&format!("Assistant: {REPEAT_PROMPT}\n")));
    assert!(spoken.ends_with(&format!("Assistant: {GOODBYE}\n")));

    let transcript = String::from_utf8(transcript).unwrap();
    assert!(transcript.contains("Kim: Capital of France\nAssistant: Paris\n"));
}

#[test]
fn test_detector_ignores_silence() {
    let mut detector = UtteranceDetector::default();

    assert!(!detector.process(&generate_silence(1.0)));
    assert_eq!(detector.state(), DetectorState::Idle);
    assert!(detector.speech_buffer().is_empty());
}

#[test]
fn test_detector_completes_after_pause() {
    let mut detector = UtteranceDetector::default();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    assert!(!detector.process(&speech));
    assert_eq!(detector.state(), DetectorState::Speaking);

    let more_speech = generate_sine_samples(440.0, 0.3, 0.3);
    assert!(!detector.process(&more_speech));

    let silence = generate_silence(1.0);
    assert!(detector.process(&silence));
    assert!(detector.is_complete());
}

#[test]
fn test_detector_short_blip_is_not_an_utterance() {
    let mut detector = UtteranceDetector::default();

    detector.process(&generate_sine_samples(440.0, 0.1, 0.3));
    assert!(detector.is_speaking());

    assert!(!detector.process(&generate_silence(1.0)));
    assert!(!detector.is_complete());
}

#[test]
fn test_detector_accumulates_speech() {
    let mut detector = UtteranceDetector::default();

    let chunk1 = generate_sine_samples(440.0, 0.1, 0.3);
    detector.process(&chunk1);

    let chunk2 = generate_sine_samples(440.0, 0.1, 0.3);
    detector.process(&chunk2);

    assert_eq!(detector.speech_buffer().len(), chunk1.len() + chunk2.len());
}

#[test]
fn test_take_utterance_resets() {
    let mut detector = UtteranceDetector::default();

    let speech = generate_sine_samples(440.0, 0.5, 0.3);
    detector.process(&speech);
    detector.process(&generate_silence(1.0));

    let taken = detector.take_utterance();
    assert_eq!(taken.len(), speech.len() + SAMPLE_RATE as usize);

    assert!(detector.speech_buffer().is_empty());
    assert_eq!(detector.state(), DetectorState::Idle);
}

#[test]
fn test_samples_to_wav() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav_data = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    // Check WAV header magic
    assert_eq!(&wav_data[0..4], b"RIFF");
    assert_eq!(&wav_data[8..12], b"WAVE");
    assert!(wav_data.len() > 44);
}

#[test]
fn test_wav_roundtrip() {
    let original_samples: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav_data = samples_to_wav(&original_samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav_data)).unwrap();

    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read_samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(read_samples.len(), original_samples.len());
}
