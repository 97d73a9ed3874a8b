//! Knowledge repository for learned facts and exchange history

use super::DbPool;
use crate::knowledge::{Fact, HistoryEntry, fold_question};
use crate::{Error, Result};

/// Knowledge repository for database operations
#[derive(Clone)]
pub struct KnowledgeRepo {
    pool: DbPool,
}

impl KnowledgeRepo {
    /// Create a new knowledge repository
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Load every fact in insertion order
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn facts(&self) -> Result<Vec<Fact>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT question, answer, updated_at FROM facts ORDER BY rowid")?;

        let rows = stmt.query_map([], |row| {
            Ok(Fact {
                question: row.get(0)?,
                answer: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;

        let mut facts = Vec::new();
        for row in rows {
            facts.push(row?);
        }

        Ok(facts)
    }

    /// Load the full exchange history, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT question, answer, recorded_at FROM history ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(HistoryEntry {
                question: row.get(0)?,
                answer: row.get(1)?,
                recorded_at: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }

    /// Upsert a fact and append the matching history entry in one transaction
    ///
    /// Facts are keyed by the case-folded question, so a differently-cased
    /// question replaces the existing row and keeps its position.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails; nothing is written in that case
    pub fn record(&self, fact: &Fact, entry: &HistoryEntry) -> Result<()> {
        let mut conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO facts (question_key, question, answer, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(question_key) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                updated_at = excluded.updated_at",
            rusqlite::params![
                fold_question(&fact.question),
                fact.question,
                fact.answer,
                fact.updated_at,
            ],
        )?;

        tx.execute(
            "INSERT INTO history (question, answer, recorded_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![entry.question, entry.answer, entry.recorded_at],
        )?;

        tx.commit()?;

        tracing::debug!(question = %fact.question, "fact persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::init_memory;

    fn pair(question: &str, answer: &str) -> (Fact, HistoryEntry) {
        let now = Utc::now();
        (
            Fact {
                question: question.to_string(),
                answer: answer.to_string(),
                updated_at: now,
            },
            HistoryEntry {
                question: question.to_string(),
                answer: answer.to_string(),
                recorded_at: now,
            },
        )
    }

    #[test]
    fn test_empty_database() {
        let repo = KnowledgeRepo::new(init_memory().unwrap());

        assert!(repo.facts().unwrap().is_empty());
        assert!(repo.history().unwrap().is_empty());
    }

    #[test]
    fn test_record_and_read_back() {
        let repo = KnowledgeRepo::new(init_memory().unwrap());

        let (fact, entry) = pair("What is 2+2?", "4");
        repo.record(&fact, &entry).unwrap();

        let facts = repo.facts().unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].question, "What is 2+2?");
        assert_eq!(facts[0].answer, "4");

        let history = repo.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].answer, "4");
    }

    #[test]
    fn test_case_variant_overwrites_in_place() {
        let repo = KnowledgeRepo::new(init_memory().unwrap());

        let (fact, entry) = pair("Capital of France", "Paris");
        repo.record(&fact, &entry).unwrap();
        let (fact, entry) = pair("Best color", "Blue");
        repo.record(&fact, &entry).unwrap();
        let (fact, entry) = pair("capital of france", "Paris, France");
        repo.record(&fact, &entry).unwrap();

        let facts = repo.facts().unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].question, "capital of france");
        assert_eq!(facts[0].answer, "Paris, France");
        assert_eq!(facts[1].question, "Best color");

        assert_eq!(repo.history().unwrap().len(), 3);
    }

    #[test]
    fn test_failed_record_writes_nothing() {
        let pool = init_memory().unwrap();
        let repo = KnowledgeRepo::new(pool.clone());

        pool.get()
            .unwrap()
            .execute_batch("DROP TABLE history")
            .unwrap();

        let (fact, entry) = pair("Q", "A");
        assert!(repo.record(&fact, &entry).is_err());
        assert!(repo.facts().unwrap().is_empty());
    }
}
