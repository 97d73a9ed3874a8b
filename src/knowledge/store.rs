//! In-memory knowledge store backed by `SQLite`

use std::path::Path;

use chrono::Utc;
use indexmap::IndexMap;

use super::{Fact, HistoryEntry, fold_question};
use crate::Result;
use crate::db::{self, DbPool, KnowledgeRepo};

/// Question/answer mapping and exchange history for one session
///
/// Loaded wholesale on open and owned by the dialogue loop. Lookups never
/// touch the database; `record` writes through before mutating memory.
pub struct KnowledgeStore {
    repo: KnowledgeRepo,
    facts: IndexMap<String, Fact>,
    history: Vec<HistoryEntry>,
}

impl KnowledgeStore {
    /// Open the store file at `path`, creating it if absent
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened or read
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let pool = db::init(path)?;
        Self::load(pool)
    }

    /// Load every fact and the full history from `pool`
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be read
    pub fn load(pool: DbPool) -> Result<Self> {
        let repo = KnowledgeRepo::new(pool);

        let facts: IndexMap<String, Fact> = repo
            .facts()?
            .into_iter()
            .map(|fact| (fold_question(&fact.question), fact))
            .collect();
        let history = repo.history()?;

        tracing::info!(
            facts = facts.len(),
            history = history.len(),
            "knowledge store loaded"
        );

        Ok(Self {
            repo,
            facts,
            history,
        })
    }

    /// Find the answer for `question`, ignoring case
    #[must_use]
    pub fn lookup(&self, question: &str) -> Option<&str> {
        let answer = self
            .facts
            .get(&fold_question(question))
            .map(|fact| fact.answer.as_str());

        tracing::debug!(question, hit = answer.is_some(), "knowledge lookup");
        answer
    }

    /// Teach `answer` for `question` and append the exchange to history
    ///
    /// A question matching an existing one case-insensitively replaces it.
    /// The change is durable once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails; the in-memory store is left unchanged
    pub fn record(&mut self, question: &str, answer: &str) -> Result<()> {
        let now = Utc::now();
        let fact = Fact {
            question: question.to_string(),
            answer: answer.to_string(),
            updated_at: now,
        };
        let entry = HistoryEntry {
            question: question.to_string(),
            answer: answer.to_string(),
            recorded_at: now,
        };

        self.repo.record(&fact, &entry)?;

        self.facts.insert(fold_question(question), fact);
        self.history.push(entry);

        tracing::info!(question, "learned new answer");
        Ok(())
    }

    /// Exchange history, oldest first
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Learned facts in the order they were first taught
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    /// Number of learned facts
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether nothing has been learned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
