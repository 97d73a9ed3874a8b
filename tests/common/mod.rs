//! Shared test utilities
#![allow(dead_code)]

use std::collections::VecDeque;

use async_trait::async_trait;
use hark::voice::{Capture, SpeechInput, SpeechOutput};
use hark::{DbPool, KnowledgeStore, db};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Set up an empty store backed by an in-memory database
#[must_use]
pub fn setup_test_store() -> KnowledgeStore {
    KnowledgeStore::load(setup_test_db()).expect("failed to load test store")
}

/// Speech input that replays a fixed script, then reports closed
#[derive(Default)]
pub struct ScriptedInput {
    script: VecDeque<Capture>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Capture>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Script of utterances that are all heard clearly
    pub fn heard(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| heard(l)))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait(?Send)]
impl SpeechInput for ScriptedInput {
    async fn capture_utterance(&mut self) -> Capture {
        self.script.pop_front().unwrap_or(Capture::Closed)
    }
}

/// Speech output that records everything said
#[derive(Default)]
pub struct RecordingOutput {
    pub spoken: Vec<String>,
}

impl RecordingOutput {
    pub fn count(&self, line: &str) -> usize {
        self.spoken.iter().filter(|s| *s == line).count()
    }
}

#[async_trait(?Send)]
impl SpeechOutput for RecordingOutput {
    async fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }
}

pub fn heard(text: &str) -> Capture {
    Capture::Heard(text.to_string())
}
