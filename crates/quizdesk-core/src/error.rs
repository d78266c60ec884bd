//! Scoring error types.
//!
//! Only two conditions are errors in the core: a quiz that cannot be scored
//! and a quiz code that does not resolve. Everything else (missing answers,
//! empty result sets, filters that match nothing) yields a well-defined
//! default value.

use thiserror::Error;

/// Errors surfaced by the scoring core and quiz sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// The quiz has no questions and cannot be scored.
    #[error("quiz {code} has no questions and cannot be scored")]
    InvalidQuiz { code: String },

    /// No quiz exists for the given code.
    #[error("quiz not found: {0}")]
    NotFound(String),
}

impl QuizError {
    /// Returns `true` if retrying the same call can never succeed.
    ///
    /// Both variants are permanent; there is no I/O inside the core to retry.
    pub fn is_permanent(&self) -> bool {
        matches!(self, QuizError::InvalidQuiz { .. } | QuizError::NotFound(_))
    }

    /// Message suitable for showing to a learner.
    pub fn user_message(&self) -> String {
        match self {
            QuizError::InvalidQuiz { .. } => {
                "This quiz has no questions yet. Please check with your instructor.".to_string()
            }
            QuizError::NotFound(_) => {
                "Invalid quiz code. Please check with your instructor.".to_string()
            }
        }
    }
}
