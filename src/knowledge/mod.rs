//! Knowledge store: learned question/answer pairs plus exchange history
//!
//! Questions keep the casing they were taught with but match
//! case-insensitively. Every new fact is persisted before it becomes visible.

mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use store::KnowledgeStore;

/// A learned question and its current answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Question as it was last taught
    pub question: String,
    /// Current answer
    pub answer: String,
    /// When the answer was last set
    pub updated_at: DateTime<Utc>,
}

/// One resolved exchange in the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    pub recorded_at: DateTime<Utc>,
}

/// Fold a question to its lookup key
///
/// Unicode lowercase only; whitespace and punctuation are significant.
#[must_use]
pub fn fold_question(question: &str) -> String {
    question.to_lowercase()
}
