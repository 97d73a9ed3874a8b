//! Dialogue session: greet, answer what is known, learn what isn't
//!
//! ```text
//! greet → ask name → ┌─ prompt → listen ─┬─ "exit"  → history → goodbye
//!                    │                   ├─ hit     → speak answer
//!                    │                   └─ miss    → ask for answer → record
//!                    └───────────────────┘
//! ```

use std::io::Write;

use crate::knowledge::{KnowledgeStore, fold_question};
use crate::voice::{Listened, Listener, SpeechInput, SpeechOutput};
use crate::Result;

pub const GREETING: &str = "Hi! What's your name?";
pub const QUESTION_PROMPT: &str = "Ask me a question or say 'exit' to exit.";
pub const UNKNOWN_ANSWER: &str =
    "I'm sorry, I don't know the answer. Can you please provide me with the answer?";
pub const LEARNED: &str = "Thanks! I'll remember that for next time.";
pub const NO_ANSWER: &str = "Okay, maybe next time.";
pub const GOODBYE: &str = "Goodbye!";

/// Name used when the user's name could not be captured
const FALLBACK_NAME: &str = "there";

/// Session behaviour knobs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Utterance that ends the session, compared case-insensitively
    pub exit_word: String,
    /// Consecutive turns without input before giving up
    pub max_idle_turns: u32,
    /// Print each resolved exchange to the transcript
    pub echo_dialogue: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exit_word: "exit".to_string(),
            max_idle_turns: 5,
            echo_dialogue: true,
        }
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// User said the exit word
    Exit,
    /// Input source closed
    Closed,
    /// Too many turns without usable input
    Idle,
}

/// One conversation with one user
pub struct Session<'a, I, O, W> {
    store: &'a mut KnowledgeStore,
    input: I,
    output: O,
    transcript: W,
    listener: Listener,
    config: SessionConfig,
}

impl<'a, I, O, W> Session<'a, I, O, W>
where
    I: SpeechInput,
    O: SpeechOutput,
    W: Write,
{
    /// Create a session over `store`, writing dialogue lines to `transcript`
    pub fn new(store: &'a mut KnowledgeStore, input: I, output: O, transcript: W) -> Self {
        Self {
            store,
            input,
            output,
            transcript,
            listener: Listener::default(),
            config: SessionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listener = listener;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the session to completion
    ///
    /// # Errors
    ///
    /// Returns error if a learned answer cannot be persisted or the
    /// transcript cannot be written
    pub async fn run(&mut self) -> Result<SessionEnd> {
        self.output.speak(GREETING).await;

        let (name, closed) = match self.listen().await {
            Listened::Heard(name) => (name, false),
            Listened::Nothing => (FALLBACK_NAME.to_string(), false),
            Listened::Closed => (FALLBACK_NAME.to_string(), true),
        };
        tracing::info!(name = %name, "session started");

        self.output.speak(&format!("Nice to meet you, {name}!")).await;

        let end = if closed {
            SessionEnd::Closed
        } else {
            self.question_loop().await?
        };

        tracing::info!(?end, "session ended");

        self.write_history(&name)?;
        self.output.speak(GOODBYE).await;

        Ok(end)
    }

    async fn question_loop(&mut self) -> Result<SessionEnd> {
        let exit_word = fold_question(self.config.exit_word.trim());
        let mut idle_turns = 0;

        loop {
            self.output.speak(QUESTION_PROMPT).await;

            let question = match self.listen().await {
                Listened::Heard(question) => question,
                Listened::Closed => return Ok(SessionEnd::Closed),
                Listened::Nothing => {
                    idle_turns += 1;
                    if idle_turns >= self.config.max_idle_turns {
                        tracing::warn!(idle_turns, "no usable input, ending session");
                        return Ok(SessionEnd::Idle);
                    }
                    continue;
                }
            };
            idle_turns = 0;

            if fold_question(question.trim()) == exit_word {
                return Ok(SessionEnd::Exit);
            }

            self.resolve(&question).await?;
        }
    }

    /// Answer `question` from the store, or learn the answer from the user
    async fn resolve(&mut self, question: &str) -> Result<()> {
        if let Some(answer) = self.store.lookup(question).map(str::to_string) {
            self.output.speak(&answer).await;
            return self.write_exchange(question, &answer);
        }

        self.output.speak(UNKNOWN_ANSWER).await;

        match self.listen().await {
            Listened::Heard(answer) => {
                self.store.record(question, &answer)?;
                self.output.speak(LEARNED).await;
                self.write_exchange(question, &answer)
            }
            Listened::Nothing | Listened::Closed => {
                tracing::debug!(question, "no answer supplied");
                self.output.speak(NO_ANSWER).await;
                Ok(())
            }
        }
    }

    async fn listen(&mut self) -> Listened {
        self.listener.listen(&mut self.input, &mut self.output).await
    }

    fn write_exchange(&mut self, question: &str, answer: &str) -> Result<()> {
        if self.config.echo_dialogue {
            writeln!(self.transcript, "You: {question}")?;
            writeln!(self.transcript, "Assistant: {answer}")?;
            writeln!(self.transcript)?;
        }
        Ok(())
    }

    fn write_history(&mut self, name: &str) -> Result<()> {
        writeln!(self.transcript, "Here's our conversation history:")?;
        for entry in self.store.history() {
            writeln!(self.transcript, "{name}: {}", entry.question)?;
            writeln!(self.transcript, "Assistant: {}", entry.answer)?;
            writeln!(self.transcript)?;
        }
        self.transcript.flush()?;
        Ok(())
    }
}
