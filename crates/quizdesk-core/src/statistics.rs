//! Summary statistics and leaderboard ranking over attempt results.
//!
//! All aggregation here is order-independent: sums, maxima, minima and
//! counts, with rounding applied once at the end.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::AttemptResult;
use crate::scoring::{percent, round_div};

/// Score at or above which an attempt counts as passed.
pub const PASS_THRESHOLD: u32 = 60;

/// Summary statistics over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of results.
    pub count: usize,
    /// Mean score, rounded half-up.
    pub average_score: u32,
    pub max_score: u32,
    pub min_score: u32,
    /// Rounded percentage of results scoring at or above the threshold.
    pub pass_rate: u32,
}

/// Aggregate with the standard pass threshold.
///
/// An empty input yields an all-zero `Stats` so dashboards still render.
pub fn aggregate(results: &[AttemptResult]) -> Stats {
    aggregate_with_threshold(results, PASS_THRESHOLD)
}

/// Aggregate with a custom pass threshold.
pub fn aggregate_with_threshold(results: &[AttemptResult], pass_threshold: u32) -> Stats {
    aggregate_scores(results.iter().map(|r| r.score), pass_threshold)
}

fn aggregate_scores(scores: impl Iterator<Item = u32>, pass_threshold: u32) -> Stats {
    let mut count = 0usize;
    let mut sum = 0u64;
    let mut max = 0u32;
    let mut min = u32::MAX;
    let mut passed = 0u64;

    for score in scores {
        count += 1;
        sum += score as u64;
        max = max.max(score);
        min = min.min(score);
        if score >= pass_threshold {
            passed += 1;
        }
    }

    if count == 0 {
        return Stats::default();
    }

    Stats {
        count,
        average_score: round_div(sum, count as u64) as u32,
        max_score: max,
        min_score: min,
        pass_rate: percent(passed, count as u64),
    }
}

/// Per-quiz statistics keyed by quiz code.
pub fn aggregate_by_quiz(
    results: &[AttemptResult],
    pass_threshold: u32,
) -> BTreeMap<String, Stats> {
    aggregate_grouped(results, pass_threshold, |r| Some(r.quiz_code.as_str()))
}

/// Per-subject statistics keyed by subject.
///
/// Results graded against a quiz without a subject are left out.
pub fn aggregate_by_subject(
    results: &[AttemptResult],
    pass_threshold: u32,
) -> BTreeMap<String, Stats> {
    aggregate_grouped(results, pass_threshold, |r| {
        r.subject.as_deref().filter(|s| !s.is_empty())
    })
}

fn aggregate_grouped<'a>(
    results: &'a [AttemptResult],
    pass_threshold: u32,
    key: impl Fn(&'a AttemptResult) -> Option<&'a str>,
) -> BTreeMap<String, Stats> {
    let mut grouped: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for r in results {
        if let Some(k) = key(r) {
            grouped.entry(k).or_default().push(r.score);
        }
    }

    grouped
        .into_iter()
        .map(|(k, scores)| (k.to_string(), aggregate_scores(scores.into_iter(), pass_threshold)))
        .collect()
}

/// One learner's row on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based rank; tied averages share a rank.
    pub rank: u32,
    pub learner_id: String,
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    pub average_score: u32,
    pub attempts: u32,
    /// Sum of all scores.
    pub total_points: u64,
}

/// Rank learners by their average score.
///
/// Ties on the average share a rank and the next rank is skipped
/// (1, 2, 2, 4). Within a tie, learners with more attempts come first, then
/// by name.
pub fn leaderboard(results: &[AttemptResult]) -> Vec<LeaderboardEntry> {
    let mut grouped: HashMap<&str, Vec<&AttemptResult>> = HashMap::new();
    for r in results {
        grouped.entry(r.learner.id.as_str()).or_default().push(r);
    }

    let mut entries: Vec<LeaderboardEntry> = grouped
        .into_iter()
        .map(|(learner_id, attempts)| {
            let total_points: u64 = attempts.iter().map(|r| r.score as u64).sum();
            // Most recent submission carries the current name/section.
            let latest = attempts
                .iter()
                .max_by_key(|r| r.submitted_at)
                .copied()
                .unwrap_or(attempts[0]);
            LeaderboardEntry {
                rank: 0,
                learner_id: learner_id.to_string(),
                name: latest.learner.name.clone(),
                section: latest.learner.section.clone(),
                average_score: round_div(total_points, attempts.len() as u64) as u32,
                attempts: attempts.len() as u32,
                total_points,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.average_score
            .cmp(&a.average_score)
            .then(b.attempts.cmp(&a.attempts))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.learner_id.cmp(&b.learner_id))
    });

    let mut previous: Option<u32> = None;
    for i in 0..entries.len() {
        let avg = entries[i].average_score;
        entries[i].rank = match previous {
            Some(prev_avg) if prev_avg == avg => entries[i - 1].rank,
            _ => i as u32 + 1,
        };
        previous = Some(avg);
    }

    entries
}
