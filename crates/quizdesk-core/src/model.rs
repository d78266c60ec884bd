//! Core data model types for quizdesk.
//!
//! These are the fundamental types the whole system uses to represent
//! quizzes, questions, learners, submitted answers and graded attempts.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A published quiz. Immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Join code learners type in (e.g. "MATH101").
    pub code: String,
    /// Human-readable title.
    pub title: String,
    /// Description shown before the quiz starts.
    #[serde(default)]
    pub description: String,
    /// Optional subject used for grouping on dashboards.
    #[serde(default)]
    pub subject: Option<String>,
    /// Time limit in seconds.
    pub time_limit_secs: u64,
    /// Id of the faculty member who authored the quiz.
    #[serde(default)]
    pub owner: Option<String>,
    /// Ordered questions.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A single question in a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its quiz.
    pub id: String,
    /// Prompt text.
    pub prompt: String,
    /// Kind-specific options and answer key.
    pub kind: QuestionKind,
}

/// The kind of a question, each carrying only what its correctness rule needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Exactly one correct option (also used for true/false).
    SingleChoice { options: Vec<String>, answer: usize },
    /// A set of correct options; only the exact set is accepted.
    MultiChoice {
        options: Vec<String>,
        answers: Vec<usize>,
    },
    /// A single expected string, compared case-insensitively.
    FillBlank { answer: String },
    /// No answer key. Non-trivial submissions earn half credit.
    FreeText,
    /// Left items to be paired with right items.
    Matching { pairs: Vec<MatchPair> },
}

/// One (left, right) pair of a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

impl MatchPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Question type tags as written in quiz files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    SingleChoice,
    MultiChoice,
    FillBlank,
    FreeText,
    Matching,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single-choice"),
            QuestionType::MultiChoice => write!(f, "multi-choice"),
            QuestionType::FillBlank => write!(f, "fill-blank"),
            QuestionType::FreeText => write!(f, "free-text"),
            QuestionType::Matching => write!(f, "matching"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "single-choice" | "multiple-choice" | "true-false" => Ok(QuestionType::SingleChoice),
            "multi-choice" | "multi-select" => Ok(QuestionType::MultiChoice),
            "fill-blank" | "short-answer" => Ok(QuestionType::FillBlank),
            "free-text" | "essay" => Ok(QuestionType::FreeText),
            "matching" => Ok(QuestionType::Matching),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// What a learner submitted for one question.
///
/// Untagged so submission files can use plain JSON values:
/// `1`, `[0, 2]`, `"text"` or `[{"left": "a", "right": "b"}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Choice(usize),
    Choices(Vec<usize>),
    Text(String),
    Pairs(Vec<MatchPair>),
}

/// Answers keyed by zero-based question index.
pub type AnswerMap = HashMap<usize, SubmittedAnswer>;

/// The person who took a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// A learner's completed quiz session, before grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub learner: Learner,
    pub quiz_code: String,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub elapsed_secs: u64,
    /// Seconds left on the countdown at submission. When present, elapsed
    /// time is derived from it and the quiz's time limit.
    #[serde(default)]
    pub remaining_secs: Option<u64>,
}

/// One learner's graded attempt at one quiz. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Unique result identifier.
    pub id: Uuid,
    pub learner: Learner,
    pub quiz_code: String,
    pub quiz_title: String,
    /// Subject of the quiz at grading time.
    #[serde(default)]
    pub subject: Option<String>,
    pub answers: AnswerMap,
    /// Questions answered fully correctly.
    pub correct_answers: u32,
    /// Questions that earned half credit.
    #[serde(default)]
    pub half_credit_answers: u32,
    pub total_questions: u32,
    /// Percentage score, rounded half-up.
    pub score: u32,
    pub elapsed_secs: u64,
    pub submitted_at: DateTime<Utc>,
}

impl AttemptResult {
    /// Earned credit with half-credit answers counted as 0.5.
    pub fn credit(&self) -> f64 {
        self.correct_answers as f64 + self.half_credit_answers as f64 * 0.5
    }

    /// Elapsed time formatted the way result tables show it, e.g. `4m 5s`.
    pub fn time_spent_display(&self) -> String {
        format!("{}m {}s", self.elapsed_secs / 60, self.elapsed_secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::FillBlank.to_string(), "fill-blank");
        assert_eq!(
            "single-choice".parse::<QuestionType>().unwrap(),
            QuestionType::SingleChoice
        );
        assert_eq!(
            "true-false".parse::<QuestionType>().unwrap(),
            QuestionType::SingleChoice
        );
        assert_eq!(
            "Short_Answer".parse::<QuestionType>().unwrap(),
            QuestionType::FillBlank
        );
        assert!("ranking".parse::<QuestionType>().is_err());
    }

    #[test]
    fn submitted_answer_untagged_shapes() {
        let json = r#"{"0": 1, "1": [0, 2], "2": "Paris", "3": [{"left": "a", "right": "b"}]}"#;
        let answers: AnswerMap = serde_json::from_str(json).unwrap();
        assert_eq!(answers[&0], SubmittedAnswer::Choice(1));
        assert_eq!(answers[&1], SubmittedAnswer::Choices(vec![0, 2]));
        assert_eq!(answers[&2], SubmittedAnswer::Text("Paris".into()));
        assert_eq!(
            answers[&3],
            SubmittedAnswer::Pairs(vec![MatchPair::new("a", "b")])
        );
    }

    #[test]
    fn question_kind_tagged_json() {
        let q = Question {
            id: "q1".into(),
            prompt: "Pick one".into(),
            kind: QuestionKind::SingleChoice {
                options: vec!["a".into(), "b".into()],
                answer: 1,
            },
        };
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["kind"]["type"], "single-choice");
        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn time_spent_display_splits_minutes() {
        let learner = Learner {
            id: "s1".into(),
            name: "Ann".into(),
            email: "ann@example.com".into(),
            section: None,
            department: None,
        };
        let result = AttemptResult {
            id: Uuid::nil(),
            learner,
            quiz_code: "Q".into(),
            quiz_title: "Quiz".into(),
            subject: None,
            answers: AnswerMap::new(),
            correct_answers: 1,
            half_credit_answers: 1,
            total_questions: 2,
            score: 75,
            elapsed_secs: 245,
            submitted_at: Utc::now(),
        };
        assert_eq!(result.time_spent_display(), "4m 5s");
        assert!((result.credit() - 1.5).abs() < f64::EPSILON);
    }
}
