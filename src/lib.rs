//! hark - a voice-driven Q&A assistant that learns what it doesn't know
//!
//! - Knowledge store: learned question/answer pairs plus history, in `SQLite`
//! - Voice: microphone capture, endpointing, hosted STT and TTS, playback
//! - Session: the greet / ask / answer-or-learn dialogue loop
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  SpeechInput          Session   SpeechOutput │
//! │  Microphone/Console ──► loop ──► Speaker/... │
//! └──────────────────────┬───────────────────────┘
//!                        │ lookup / record
//! ┌──────────────────────▼───────────────────────┐
//! │  KnowledgeStore (in memory) ─► hark.db       │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod knowledge;
pub mod session;
pub mod setup;
pub mod voice;

pub use config::Config;
pub use db::DbPool;
pub use error::{Error, Result};
pub use knowledge::{Fact, HistoryEntry, KnowledgeStore};
pub use session::{Session, SessionConfig, SessionEnd};
