//! Per-learner long-run statistics.
//!
//! A learner's dashboard shows totals, an average, points and a class rank.
//! Before any real attempts exist those fields can be filled from a
//! deterministic generator seeded by the learner id. Every field records
//! where its value came from, and a [`BlendPolicy`] decides which source
//! wins.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::AttemptResult;
use crate::scoring::round_div;
use crate::statistics::LeaderboardEntry;

/// Where a statistic's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Computed from real attempt history.
    Observed,
    /// Placeholder from the seeded generator.
    Synthetic,
    /// No source was allowed to supply a value; the value is zero.
    Unavailable,
}

/// A value tagged with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Sourced<T> {
    pub fn observed(value: T) -> Self {
        Self {
            value,
            origin: Origin::Observed,
        }
    }

    pub fn synthetic(value: T) -> Self {
        Self {
            value,
            origin: Origin::Synthetic,
        }
    }
}

impl<T: Default> Sourced<T> {
    pub fn unavailable() -> Self {
        Self {
            value: T::default(),
            origin: Origin::Unavailable,
        }
    }
}

/// Which source fills each field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendPolicy {
    /// Observed where available, synthetic otherwise.
    #[default]
    PreferObserved,
    /// Observed only; missing fields are `Unavailable`.
    ObservedOnly,
    /// Synthetic only, ignoring history.
    SyntheticOnly,
}

/// A learner's dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerStats {
    pub learner_id: String,
    pub total_quizzes: Sourced<u32>,
    pub completed_quizzes: Sourced<u32>,
    pub average_score: Sourced<u32>,
    pub rank: Sourced<u32>,
    pub total_points: Sourced<u64>,
}

impl LearnerStats {
    /// Names of fields currently holding placeholder values.
    pub fn synthetic_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("total_quizzes", self.total_quizzes.origin),
            ("completed_quizzes", self.completed_quizzes.origin),
            ("average_score", self.average_score.origin),
            ("rank", self.rank.origin),
            ("total_points", self.total_points.origin),
        ];
        fields
            .into_iter()
            .filter(|(_, origin)| *origin == Origin::Synthetic)
            .map(|(name, _)| name)
            .collect()
    }

    /// True if any field holds a placeholder value.
    pub fn is_synthetic(&self) -> bool {
        !self.synthetic_fields().is_empty()
    }
}

/// Placeholder statistics derived deterministically from a learner id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticStats {
    pub total_quizzes: u32,
    pub completed_quizzes: u32,
    pub average_score: u32,
    pub rank: u32,
    pub total_points: u64,
}

/// Seed for the placeholder generator: the sum of the id's character codes.
pub fn seed_for(learner_id: &str) -> u64 {
    learner_id.chars().map(|c| c as u64).sum()
}

/// Generate placeholder statistics for a learner.
///
/// The same id always yields the same values.
pub fn synthetic_stats(learner_id: &str) -> SyntheticStats {
    let mut rng = StdRng::seed_from_u64(seed_for(learner_id));

    let total_quizzes: u32 = rng.gen_range(15..=30);
    let completed_floor = (total_quizzes as f64 * 0.6).floor() as u32;
    let completed_quizzes = rng.gen_range(completed_floor..=total_quizzes - 2);
    let average_score = rng.gen_range(70..=95);
    let rank = rng.gen_range(1..=50);
    let points_per_quiz: u64 = rng.gen_range(80..=120);

    SyntheticStats {
        total_quizzes,
        completed_quizzes,
        average_score,
        rank,
        total_points: completed_quizzes as u64 * points_per_quiz,
    }
}

/// Real activity available for computing a learner's statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedContext<'a> {
    /// Attempt history; may include other learners' results.
    pub history: &'a [AttemptResult],
    /// Current leaderboard, if one has been computed.
    pub leaderboard: &'a [LeaderboardEntry],
    /// Number of quizzes available to the learner, when known.
    pub catalog_size: Option<usize>,
}

/// Values computed from real history; `None` where there is no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Observed {
    total_quizzes: Option<u32>,
    completed_quizzes: Option<u32>,
    average_score: Option<u32>,
    rank: Option<u32>,
    total_points: Option<u64>,
}

fn observe(learner_id: &str, ctx: &ObservedContext<'_>) -> Observed {
    let mine: Vec<&AttemptResult> = ctx
        .history
        .iter()
        .filter(|r| r.learner.id == learner_id)
        .collect();

    let rank = ctx
        .leaderboard
        .iter()
        .find(|e| e.learner_id == learner_id)
        .map(|e| e.rank);

    let total_quizzes = ctx.catalog_size.map(|n| n as u32);

    if mine.is_empty() {
        return Observed {
            total_quizzes,
            rank,
            ..Default::default()
        };
    }

    let distinct: HashSet<&str> = mine.iter().map(|r| r.quiz_code.as_str()).collect();
    let points: u64 = mine.iter().map(|r| r.score as u64).sum();

    Observed {
        total_quizzes,
        completed_quizzes: Some(distinct.len() as u32),
        average_score: Some(round_div(points, mine.len() as u64) as u32),
        rank,
        total_points: Some(points),
    }
}

fn pick<T: Default>(observed: Option<T>, synthetic: T, policy: BlendPolicy) -> Sourced<T> {
    match (policy, observed) {
        (BlendPolicy::SyntheticOnly, _) => Sourced::synthetic(synthetic),
        (_, Some(value)) => Sourced::observed(value),
        (BlendPolicy::PreferObserved, None) => Sourced::synthetic(synthetic),
        (BlendPolicy::ObservedOnly, None) => Sourced::unavailable(),
    }
}

/// Compute a learner's statistics under the given policy.
pub fn learner_stats(
    learner_id: &str,
    ctx: &ObservedContext<'_>,
    policy: BlendPolicy,
) -> LearnerStats {
    let synthetic = synthetic_stats(learner_id);
    let observed = observe(learner_id, ctx);

    let stats = LearnerStats {
        learner_id: learner_id.to_string(),
        total_quizzes: pick(observed.total_quizzes, synthetic.total_quizzes, policy),
        completed_quizzes: pick(
            observed.completed_quizzes,
            synthetic.completed_quizzes,
            policy,
        ),
        average_score: pick(observed.average_score, synthetic.average_score, policy),
        rank: pick(observed.rank, synthetic.rank, policy),
        total_points: pick(observed.total_points, synthetic.total_points, policy),
    };

    if stats.is_synthetic() {
        tracing::debug!(
            learner = learner_id,
            fields = ?stats.synthetic_fields(),
            "learner stats include synthetic values"
        );
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerMap, Learner};
    use crate::statistics::leaderboard;
    use chrono::Utc;
    use uuid::Uuid;

    fn result(learner_id: &str, quiz: &str, score: u32) -> AttemptResult {
        AttemptResult {
            id: Uuid::new_v4(),
            learner: Learner {
                id: learner_id.into(),
                name: learner_id.into(),
                email: format!("{learner_id}@example.com"),
                section: None,
                department: None,
            },
            quiz_code: quiz.into(),
            quiz_title: quiz.into(),
            subject: None,
            answers: AnswerMap::new(),
            correct_answers: 0,
            half_credit_answers: 0,
            total_questions: 4,
            score,
            elapsed_secs: 0,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn seed_is_char_code_sum() {
        assert_eq!(seed_for("ab"), 97 + 98);
        assert_eq!(seed_for(""), 0);
    }

    #[test]
    fn synthetic_is_deterministic_and_in_range() {
        for id in ["manual_abc123", "google_xyz", "s", "student_42"] {
            let a = synthetic_stats(id);
            assert_eq!(a, synthetic_stats(id));
            assert!((15..=30).contains(&a.total_quizzes));
            assert!(a.completed_quizzes >= (a.total_quizzes as f64 * 0.6).floor() as u32);
            assert!(a.completed_quizzes <= a.total_quizzes - 2);
            assert!((70..=95).contains(&a.average_score));
            assert!((1..=50).contains(&a.rank));
            let per_quiz = a.total_points / a.completed_quizzes as u64;
            assert!((80..=120).contains(&per_quiz));
        }
    }

    #[test]
    fn no_history_prefer_observed_is_all_synthetic() {
        let stats = learner_stats("s1", &ObservedContext::default(), BlendPolicy::PreferObserved);
        assert_eq!(stats.synthetic_fields().len(), 5);
        assert!(stats.is_synthetic());
        assert_eq!(
            stats.average_score.value,
            synthetic_stats("s1").average_score
        );
    }

    #[test]
    fn history_overrides_only_what_it_can() {
        let history = vec![result("s1", "Q1", 80), result("s1", "Q1", 91), result("s2", "Q2", 10)];
        let ctx = ObservedContext {
            history: &history,
            leaderboard: &[],
            catalog_size: None,
        };
        let stats = learner_stats("s1", &ctx, BlendPolicy::PreferObserved);

        assert_eq!(stats.completed_quizzes, Sourced::observed(1));
        assert_eq!(stats.average_score, Sourced::observed(86));
        assert_eq!(stats.total_points, Sourced::observed(171));
        assert_eq!(stats.rank.origin, Origin::Synthetic);
        assert_eq!(stats.total_quizzes.origin, Origin::Synthetic);
        assert_eq!(stats.synthetic_fields(), vec!["total_quizzes", "rank"]);
    }

    #[test]
    fn leaderboard_and_catalog_fill_the_rest() {
        let history = vec![result("s1", "Q1", 80), result("s2", "Q1", 90)];
        let board = leaderboard(&history);
        let ctx = ObservedContext {
            history: &history,
            leaderboard: &board,
            catalog_size: Some(4),
        };
        let stats = learner_stats("s1", &ctx, BlendPolicy::PreferObserved);
        assert_eq!(stats.rank, Sourced::observed(2));
        assert_eq!(stats.total_quizzes, Sourced::observed(4));
        assert!(!stats.is_synthetic());
    }

    #[test]
    fn observed_only_marks_gaps_unavailable() {
        let stats = learner_stats("s9", &ObservedContext::default(), BlendPolicy::ObservedOnly);
        assert_eq!(stats.average_score, Sourced::unavailable());
        assert_eq!(stats.rank.origin, Origin::Unavailable);
        assert!(!stats.is_synthetic());
    }

    #[test]
    fn synthetic_only_ignores_history() {
        let history = vec![result("s1", "Q1", 10)];
        let ctx = ObservedContext {
            history: &history,
            ..Default::default()
        };
        let stats = learner_stats("s1", &ctx, BlendPolicy::SyntheticOnly);
        assert_eq!(stats.average_score.origin, Origin::Synthetic);
        assert_ne!(stats.average_score.value, 10);
    }
}
