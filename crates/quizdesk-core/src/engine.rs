//! Grading engine.
//!
//! Ties the pure scoring and aggregation functions to the injected quiz
//! source and results store: resolve quiz → score → append, and the
//! read-side dashboards over the stored results.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use crate::error::QuizError;
use crate::filter::{FilterCriteria, FilterOptions};
use crate::learner::{learner_stats, BlendPolicy, LearnerStats, ObservedContext};
use crate::model::{AttemptResult, Submission};
use crate::scoring::{
    breakdown, elapsed_from_remaining, score_from_breakdown, ScoreBreakdown, ScoringConfig,
};
use crate::statistics::{
    aggregate_by_quiz, aggregate_by_subject, aggregate_with_threshold, leaderboard,
    LeaderboardEntry, Stats, PASS_THRESHOLD,
};
use crate::traits::{QuizSource, ResultsStore};

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    /// Score at or above which an attempt passes.
    pub pass_threshold: u32,
    /// How learner dashboards mix synthetic and observed values.
    pub blend_policy: BlendPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            pass_threshold: PASS_THRESHOLD,
            blend_policy: BlendPolicy::default(),
        }
    }
}

/// Observer for submission events.
pub trait SubmissionObserver: Send + Sync {
    fn on_graded(&self, sequence: u64, result: &AttemptResult);
    fn on_rejected(&self, quiz_code: &str, learner_id: &str, error: &QuizError);
}

/// No-op observer.
pub struct NoopObserver;

impl SubmissionObserver for NoopObserver {
    fn on_graded(&self, _: u64, _: &AttemptResult) {}
    fn on_rejected(&self, _: &str, _: &str, _: &QuizError) {}
}

/// A graded and stored submission.
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    /// Sequence number assigned by the results store.
    pub sequence: u64,
    pub result: AttemptResult,
    pub breakdown: ScoreBreakdown,
}

/// The grading engine.
pub struct GradingEngine {
    quizzes: Arc<dyn QuizSource>,
    results: Arc<dyn ResultsStore>,
    config: EngineConfig,
}

impl GradingEngine {
    pub fn new(
        quizzes: Arc<dyn QuizSource>,
        results: Arc<dyn ResultsStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            quizzes,
            results,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Grade a completed quiz session and append the result.
    ///
    /// `NotFound` and `InvalidQuiz` are returned as `QuizError` inside the
    /// `anyhow::Error` so callers can downcast them.
    pub fn submit(
        &self,
        submission: &Submission,
        observer: &dyn SubmissionObserver,
    ) -> Result<GradedSubmission> {
        let graded = self
            .quizzes
            .get_quiz_by_code(&submission.quiz_code)
            .and_then(|quiz| {
                let elapsed = match submission.remaining_secs {
                    Some(remaining) => elapsed_from_remaining(quiz.time_limit_secs, remaining),
                    None => submission.elapsed_secs,
                };
                if elapsed > quiz.time_limit_secs {
                    tracing::warn!(
                        quiz = %quiz.code,
                        learner = %submission.learner.id,
                        elapsed,
                        limit = quiz.time_limit_secs,
                        "submission exceeded the time limit"
                    );
                }
                let breakdown = breakdown(&self.config.scoring, &quiz, &submission.answers)?;
                let result = score_from_breakdown(
                    &quiz,
                    &submission.learner,
                    &submission.answers,
                    elapsed,
                    &breakdown,
                );
                Ok((result, breakdown))
            });

        let (result, breakdown) = match graded {
            Ok(graded) => graded,
            Err(e) => {
                observer.on_rejected(&submission.quiz_code, &submission.learner.id, &e);
                return Err(e.into());
            }
        };

        let sequence = self.results.append(&result)?;
        tracing::info!(
            sequence,
            quiz = %result.quiz_code,
            learner = %result.learner.id,
            score = result.score,
            "stored result"
        );
        observer.on_graded(sequence, &result);

        Ok(GradedSubmission {
            sequence,
            result,
            breakdown,
        })
    }

    /// Stored results matching `criteria`.
    pub fn results(&self, criteria: &FilterCriteria) -> Result<Vec<AttemptResult>> {
        self.results.query(criteria)
    }

    /// Summary statistics over the matching results.
    pub fn stats(&self, criteria: &FilterCriteria) -> Result<Stats> {
        let results = self.results.query(criteria)?;
        Ok(aggregate_with_threshold(&results, self.config.pass_threshold))
    }

    /// Statistics per quiz code over the matching results.
    pub fn stats_by_quiz(&self, criteria: &FilterCriteria) -> Result<BTreeMap<String, Stats>> {
        let results = self.results.query(criteria)?;
        Ok(aggregate_by_quiz(&results, self.config.pass_threshold))
    }

    /// Statistics per quiz subject over the matching results.
    pub fn stats_by_subject(&self, criteria: &FilterCriteria) -> Result<BTreeMap<String, Stats>> {
        let results = self.results.query(criteria)?;
        Ok(aggregate_by_subject(&results, self.config.pass_threshold))
    }

    /// Per-subject performance for one learner.
    pub fn learner_subjects(&self, learner_id: &str) -> Result<BTreeMap<String, Stats>> {
        let own: Vec<AttemptResult> = self
            .results
            .query_all()?
            .into_iter()
            .filter(|r| r.learner.id == learner_id)
            .collect();
        Ok(aggregate_by_subject(&own, self.config.pass_threshold))
    }

    /// Leaderboard over the matching results.
    pub fn leaderboard(&self, criteria: &FilterCriteria) -> Result<Vec<LeaderboardEntry>> {
        Ok(leaderboard(&self.results.query(criteria)?))
    }

    /// Distinct filter values over all stored results.
    pub fn filter_options(&self) -> Result<FilterOptions> {
        Ok(FilterOptions::from_results(&self.results.query_all()?))
    }

    /// Dashboard statistics for one learner.
    ///
    /// Rank is taken from the learner's position on the leaderboard of all
    /// stored results; total quizzes from the size of the quiz catalog.
    pub fn learner_stats(
        &self,
        learner_id: &str,
        policy: Option<BlendPolicy>,
    ) -> Result<LearnerStats> {
        let history = self.results.query_all()?;
        let board = leaderboard(&history);
        let catalog_size = self.quizzes.list_codes().len();
        let ctx = ObservedContext {
            history: &history,
            leaderboard: &board,
            catalog_size: (catalog_size > 0).then_some(catalog_size),
        };
        Ok(learner_stats(
            learner_id,
            &ctx,
            policy.unwrap_or(self.config.blend_policy),
        ))
    }
}
