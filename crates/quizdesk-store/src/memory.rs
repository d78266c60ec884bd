//! In-memory quiz source and results store.
//!
//! Used by tests and by short-lived sessions that do not need persistence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use quizdesk_core::error::QuizError;
use quizdesk_core::model::{AttemptResult, Quiz};
use quizdesk_core::traits::{QuizSource, ResultsStore};

use crate::error::StoreError;

/// A fixed set of quizzes keyed by code.
#[derive(Default)]
pub struct MemoryQuizSource {
    quizzes: BTreeMap<String, Quiz>,
    lookups: AtomicU32,
}

impl MemoryQuizSource {
    /// Create a source from quizzes; a later quiz replaces an earlier one
    /// with the same code.
    pub fn new(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.code.clone(), q)).collect(),
            lookups: AtomicU32::new(0),
        }
    }

    /// Number of lookups made against this source.
    pub fn lookup_count(&self) -> u32 {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl QuizSource for MemoryQuizSource {
    fn get_quiz_by_code(&self, code: &str) -> Result<Quiz, QuizError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.quizzes
            .get(code)
            .cloned()
            .ok_or_else(|| QuizError::NotFound(code.to_string()))
    }

    fn list_codes(&self) -> Vec<String> {
        self.quizzes.keys().cloned().collect()
    }
}

/// Results held in a vector, each tagged with its sequence number.
#[derive(Default)]
pub struct MemoryResultsStore {
    rows: Mutex<Vec<(u64, AttemptResult)>>,
}

impl MemoryResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results with their sequence numbers.
    pub fn entries(&self) -> anyhow::Result<Vec<(u64, AttemptResult)>> {
        Ok(self.rows.lock().map_err(StoreError::from)?.clone())
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultsStore for MemoryResultsStore {
    fn append(&self, result: &AttemptResult) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().map_err(StoreError::from)?;
        let last = rows.last().map(|(seq, _)| *seq).unwrap_or(0);
        let seq = last
            .checked_add(1)
            .ok_or(StoreError::SequenceOverflow(last))?;
        rows.push((seq, result.clone()));
        Ok(seq)
    }

    fn query_all(&self) -> anyhow::Result<Vec<AttemptResult>> {
        let rows = self.rows.lock().map_err(StoreError::from)?;
        Ok(rows.iter().map(|(_, r)| r.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quizdesk_core::filter::FilterCriteria;
    use quizdesk_core::model::{AnswerMap, Learner};
    use std::sync::Arc;
    use uuid::Uuid;

    fn result(learner: &str, section: &str) -> AttemptResult {
        AttemptResult {
            id: Uuid::new_v4(),
            learner: Learner {
                id: learner.into(),
                name: learner.into(),
                email: format!("{learner}@example.com"),
                section: Some(section.into()),
                department: None,
            },
            quiz_code: "Q1".into(),
            quiz_title: "Quiz".into(),
            subject: None,
            answers: AnswerMap::new(),
            correct_answers: 1,
            half_credit_answers: 0,
            total_questions: 2,
            score: 50,
            elapsed_secs: 10,
            submitted_at: Utc::now(),
        }
    }

    fn quiz(code: &str) -> Quiz {
        Quiz {
            code: code.into(),
            title: format!("{code} quiz"),
            description: String::new(),
            subject: None,
            time_limit_secs: 60,
            owner: None,
            questions: vec![],
        }
    }

    #[test]
    fn quiz_lookup() {
        let source = MemoryQuizSource::new([quiz("B"), quiz("A")]);
        assert_eq!(source.get_quiz_by_code("A").unwrap().code, "A");
        assert_eq!(
            source.get_quiz_by_code("Z").unwrap_err(),
            QuizError::NotFound("Z".into())
        );
        assert_eq!(source.list_codes(), vec!["A", "B"]);
        assert_eq!(source.lookup_count(), 2);
    }

    #[test]
    fn append_assigns_increasing_sequence() {
        let store = MemoryResultsStore::new();
        assert_eq!(store.append(&result("s1", "A")).unwrap(), 1);
        assert_eq!(store.append(&result("s2", "B")).unwrap(), 2);
        assert_eq!(store.len(), 2);

        let filtered = store.query(&FilterCriteria::default().section("B")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].learner.id, "s2");
    }

    #[test]
    fn concurrent_appends_never_reuse_a_sequence() {
        let store = Arc::new(MemoryResultsStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| store.append(&result(&format!("s{i}"), "A")).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seqs: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        seqs.sort_unstable();
        assert_eq!(seqs, (1..=200).collect::<Vec<_>>());

        let entries = store.entries().unwrap();
        assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
