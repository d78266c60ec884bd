//! Quiz attempt scoring.
//!
//! Applies the per-kind correctness rule to every question in quiz order and
//! turns the earned credit into an integer percentage.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::model::{
    AnswerMap, AttemptResult, Learner, MatchPair, Question, QuestionKind, Quiz, SubmittedAnswer,
};

/// Default minimum trimmed length for a free-text answer to earn half credit.
pub const DEFAULT_FREE_TEXT_MIN_CHARS: usize = 10;

/// How matching questions are graded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchingPolicy {
    /// Correct iff the submitted pairs equal the key exactly.
    #[default]
    Exact,
    /// Matching questions are never credited.
    Ungraded,
}

/// Tunables for the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum trimmed character count for free-text half credit.
    pub free_text_min_chars: usize,
    pub matching: MatchingPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            free_text_min_chars: DEFAULT_FREE_TEXT_MIN_CHARS,
            matching: MatchingPolicy::Exact,
        }
    }
}

/// Outcome of grading one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    HalfCredit,
    Incorrect,
    Unanswered,
}

impl Verdict {
    /// Credit in half-points (2 = full, 1 = half).
    fn half_points(self) -> u64 {
        match self {
            Verdict::Correct => 2,
            Verdict::HalfCredit => 1,
            Verdict::Incorrect | Verdict::Unanswered => 0,
        }
    }
}

/// Per-question verdicts for a scored attempt, in quiz order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub verdicts: Vec<QuestionVerdict>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionVerdict {
    pub index: usize,
    pub question_id: String,
    pub verdict: Verdict,
}

impl ScoreBreakdown {
    pub fn count(&self, verdict: Verdict) -> u32 {
        self.verdicts.iter().filter(|v| v.verdict == verdict).count() as u32
    }
}

/// Grade a single question against what was submitted for it.
pub fn grade_question(
    question: &Question,
    answer: Option<&SubmittedAnswer>,
    config: &ScoringConfig,
) -> Verdict {
    let Some(answer) = answer else {
        return Verdict::Unanswered;
    };

    let correct = match (&question.kind, answer) {
        (QuestionKind::SingleChoice { answer: key, .. }, SubmittedAnswer::Choice(given)) => {
            given == key
        }
        // A one-element selection is the same thing as a single choice.
        (QuestionKind::SingleChoice { answer: key, .. }, SubmittedAnswer::Choices(given)) => {
            given.as_slice() == [*key]
        }
        (QuestionKind::MultiChoice { answers: key, .. }, SubmittedAnswer::Choices(given)) => {
            let key: HashSet<usize> = key.iter().copied().collect();
            let given: HashSet<usize> = given.iter().copied().collect();
            key == given
        }
        (QuestionKind::MultiChoice { answers: key, .. }, SubmittedAnswer::Choice(given)) => {
            key.len() == 1 && key[0] == *given
        }
        (QuestionKind::FillBlank { answer: key }, SubmittedAnswer::Text(given)) => {
            normalize(given) == normalize(key)
        }
        (QuestionKind::FreeText, SubmittedAnswer::Text(given)) => {
            return if given.trim().chars().count() >= config.free_text_min_chars {
                Verdict::HalfCredit
            } else {
                Verdict::Incorrect
            };
        }
        (QuestionKind::Matching { pairs: key }, SubmittedAnswer::Pairs(given)) => {
            match config.matching {
                MatchingPolicy::Exact => pair_set(key) == pair_set(given),
                MatchingPolicy::Ungraded => false,
            }
        }
        // The answer's shape does not fit the question kind.
        _ => false,
    };

    if correct {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn pair_set(pairs: &[MatchPair]) -> HashSet<(String, String)> {
    pairs
        .iter()
        .map(|p| (normalize(&p.left), normalize(&p.right)))
        .collect()
}

/// Score an attempt with the default configuration.
pub fn score(
    quiz: &Quiz,
    learner: &Learner,
    answers: &AnswerMap,
    elapsed_secs: u64,
) -> Result<AttemptResult, QuizError> {
    score_with(&ScoringConfig::default(), quiz, learner, answers, elapsed_secs)
}

/// Score an attempt.
///
/// Unanswered questions count as incorrect. Fails only when the quiz has no
/// questions. The returned record is not persisted.
pub fn score_with(
    config: &ScoringConfig,
    quiz: &Quiz,
    learner: &Learner,
    answers: &AnswerMap,
    elapsed_secs: u64,
) -> Result<AttemptResult, QuizError> {
    let breakdown = breakdown(config, quiz, answers)?;
    Ok(score_from_breakdown(quiz, learner, answers, elapsed_secs, &breakdown))
}

/// Build the result record from an already computed breakdown.
///
/// `breakdown` must come from [`breakdown`] over the same quiz and answers.
pub fn score_from_breakdown(
    quiz: &Quiz,
    learner: &Learner,
    answers: &AnswerMap,
    elapsed_secs: u64,
    breakdown: &ScoreBreakdown,
) -> AttemptResult {
    let total = breakdown.verdicts.len() as u64;
    let half_points: u64 = breakdown.verdicts.iter().map(|v| v.verdict.half_points()).sum();

    tracing::debug!(
        quiz = %quiz.code,
        learner = %learner.id,
        half_points,
        total,
        "scored attempt"
    );

    AttemptResult {
        id: Uuid::new_v4(),
        learner: learner.clone(),
        quiz_code: quiz.code.clone(),
        quiz_title: quiz.title.clone(),
        subject: quiz.subject.clone(),
        answers: answers.clone(),
        correct_answers: breakdown.count(Verdict::Correct),
        half_credit_answers: breakdown.count(Verdict::HalfCredit),
        total_questions: total as u32,
        // half_points / (2 * total) as a percentage
        score: percent(half_points, 2 * total),
        elapsed_secs,
        submitted_at: Utc::now(),
    }
}

/// Per-question verdicts for an attempt.
pub fn breakdown(
    config: &ScoringConfig,
    quiz: &Quiz,
    answers: &AnswerMap,
) -> Result<ScoreBreakdown, QuizError> {
    if quiz.questions.is_empty() {
        return Err(QuizError::InvalidQuiz {
            code: quiz.code.clone(),
        });
    }

    let verdicts = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| QuestionVerdict {
            index,
            question_id: question.id.clone(),
            verdict: grade_question(question, answers.get(&index), config),
        })
        .collect();

    Ok(ScoreBreakdown { verdicts })
}

/// `round(num / den)` with halves rounded up, in exact integer arithmetic.
///
/// Returns 0 when `den` is 0.
pub fn round_div(num: u64, den: u64) -> u64 {
    if den == 0 {
        return 0;
    }
    (2 * num + den) / (2 * den)
}

/// `round(100 * num / den)` with halves rounded up.
pub fn percent(num: u64, den: u64) -> u32 {
    round_div(100 * num, den) as u32
}

/// Seconds spent on a quiz given the countdown's remaining seconds.
pub fn elapsed_from_remaining(time_limit_secs: u64, remaining_secs: u64) -> u64 {
    time_limit_secs.saturating_sub(remaining_secs)
}

/// Coarse performance band shown alongside a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    Excellent,
    Great,
    Good,
    Fair,
    NeedsPractice,
}

impl PerformanceBand {
    pub fn message(self) -> &'static str {
        match self {
            PerformanceBand::Excellent => "Excellent work! Outstanding performance!",
            PerformanceBand::Great => "Great job! You did very well!",
            PerformanceBand::Good => "Good work! Keep it up!",
            PerformanceBand::Fair => "Not bad! There's room for improvement.",
            PerformanceBand::NeedsPractice => "Keep practicing! You'll do better next time.",
        }
    }
}

pub fn performance_band(score: u32) -> PerformanceBand {
    if score >= 90 {
        PerformanceBand::Excellent
    } else if score >= 80 {
        PerformanceBand::Great
    } else if score >= 70 {
        PerformanceBand::Good
    } else if score >= 60 {
        PerformanceBand::Fair
    } else {
        PerformanceBand::NeedsPractice
    }
}
