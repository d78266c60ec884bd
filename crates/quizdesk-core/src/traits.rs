//! Collaborator traits for quiz lookup and result storage.
//!
//! The core never reaches into a global store; callers inject these.
//! Implementations live in the `quizdesk-store` crate.

use crate::error::QuizError;
use crate::filter::{filter, FilterCriteria};
use crate::model::{AttemptResult, Quiz};

// ---------------------------------------------------------------------------
// Quiz source
// ---------------------------------------------------------------------------

/// Resolves quiz codes to published quizzes.
pub trait QuizSource: Send + Sync {
    /// Look up a quiz by its code.
    fn get_quiz_by_code(&self, code: &str) -> Result<Quiz, QuizError>;

    /// All known quiz codes, sorted.
    fn list_codes(&self) -> Vec<String>;
}

// ---------------------------------------------------------------------------
// Results store
// ---------------------------------------------------------------------------

/// Append-only collection of graded attempts.
///
/// Every append is assigned a sequence number strictly greater than any
/// previously assigned by the same store.
pub trait ResultsStore: Send + Sync {
    /// Append a result, returning its sequence number.
    fn append(&self, result: &AttemptResult) -> anyhow::Result<u64>;

    /// All results in sequence order.
    fn query_all(&self) -> anyhow::Result<Vec<AttemptResult>>;

    /// Results matching `criteria`, in sequence order.
    ///
    /// Stores that can filter natively may override this.
    fn query(&self, criteria: &FilterCriteria) -> anyhow::Result<Vec<AttemptResult>> {
        Ok(filter(&self.query_all()?, criteria))
    }
}
