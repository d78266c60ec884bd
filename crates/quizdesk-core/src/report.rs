//! Results report with JSON persistence and per-quiz trend comparison.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::filter::{filter, FilterCriteria};
use crate::model::AttemptResult;
use crate::statistics::{
    aggregate_by_quiz, aggregate_with_threshold, leaderboard, LeaderboardEntry, Stats,
};

/// A snapshot of a (filtered) result set with its statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Filter the results were selected with.
    pub criteria: FilterCriteria,
    /// Pass threshold used for `pass_rate`.
    pub pass_threshold: u32,
    /// Statistics over all selected results.
    pub stats: Stats,
    /// Statistics per quiz code.
    pub per_quiz: BTreeMap<String, Stats>,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// The selected results, in store order.
    pub results: Vec<AttemptResult>,
}

impl ResultsReport {
    /// Build a report from the results matching `criteria`.
    pub fn build(
        results: &[AttemptResult],
        criteria: &FilterCriteria,
        pass_threshold: u32,
    ) -> Self {
        let selected = filter(results, criteria);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            criteria: criteria.clone(),
            pass_threshold,
            stats: aggregate_with_threshold(&selected, pass_threshold),
            per_quiz: aggregate_by_quiz(&selected, pass_threshold),
            leaderboard: leaderboard(&selected),
            results: selected,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ResultsReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare per-quiz average scores against a baseline report.
    ///
    /// A change of more than `threshold` points counts as a decline or an
    /// improvement.
    pub fn compare(&self, baseline: &ResultsReport, threshold: u32) -> TrendReport {
        let mut declines = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_quizzes = 0usize;

        for (code, current) in &self.per_quiz {
            let Some(previous) = baseline.per_quiz.get(code) else {
                new_quizzes += 1;
                continue;
            };
            let trend = QuizTrend {
                quiz_code: code.clone(),
                baseline_average: previous.average_score,
                current_average: current.average_score,
                delta: current.average_score as i64 - previous.average_score as i64,
            };
            if trend.delta < -(threshold as i64) {
                declines.push(trend);
            } else if trend.delta > threshold as i64 {
                improvements.push(trend);
            } else {
                unchanged += 1;
            }
        }

        let removed_quizzes = baseline
            .per_quiz
            .keys()
            .filter(|k| !self.per_quiz.contains_key(*k))
            .count();

        TrendReport {
            declines,
            improvements,
            unchanged,
            new_quizzes,
            removed_quizzes,
        }
    }
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReport {
    /// Quizzes whose average went down.
    pub declines: Vec<QuizTrend>,
    /// Quizzes whose average went up.
    pub improvements: Vec<QuizTrend>,
    /// Quizzes with no significant change.
    pub unchanged: usize,
    /// Quizzes in current but not baseline.
    pub new_quizzes: usize,
    /// Quizzes in baseline but not current.
    pub removed_quizzes: usize,
}

/// Average-score change for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizTrend {
    pub quiz_code: String,
    pub baseline_average: u32,
    pub current_average: u32,
    pub delta: i64,
}

impl TrendReport {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} declines, {} improvements, {} unchanged\n\n",
            self.declines.len(),
            self.improvements.len(),
            self.unchanged
        ));

        let sections = [
            ("Declines", &self.declines),
            ("Improvements", &self.improvements),
        ];
        for (title, trends) in sections {
            if trends.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Quiz | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for t in trends {
                md.push_str(&format!(
                    "| {} | {}% | {}% | {:+} |\n",
                    t.quiz_code, t.baseline_average, t.current_average, t.delta
                ));
            }
            md.push('\n');
        }

        md
    }

    pub fn has_declines(&self) -> bool {
        !self.declines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerMap, Learner};
    use crate::statistics::PASS_THRESHOLD;

    fn result(learner: &str, section: &str, quiz: &str, score: u32) -> AttemptResult {
        AttemptResult {
            id: Uuid::new_v4(),
            learner: Learner {
                id: learner.into(),
                name: learner.into(),
                email: format!("{learner}@example.com"),
                section: Some(section.into()),
                department: None,
            },
            quiz_code: quiz.into(),
            quiz_title: quiz.into(),
            subject: None,
            answers: AnswerMap::new(),
            correct_answers: 0,
            half_credit_answers: 0,
            total_questions: 10,
            score,
            elapsed_secs: 60,
            submitted_at: Utc::now(),
        }
    }

    fn report(results: &[AttemptResult]) -> ResultsReport {
        ResultsReport::build(results, &FilterCriteria::default(), PASS_THRESHOLD)
    }

    #[test]
    fn build_applies_criteria() {
        let results = vec![
            result("s1", "A", "Q1", 90),
            result("s2", "B", "Q1", 55),
            result("s3", "A", "Q2", 70),
        ];
        let report = ResultsReport::build(
            &results,
            &FilterCriteria::default().section("A"),
            PASS_THRESHOLD,
        );
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.stats.count, 2);
        assert_eq!(report.stats.average_score, 80);
        assert_eq!(report.per_quiz.len(), 2);
        assert_eq!(report.leaderboard[0].learner_id, "s1");
    }

    #[test]
    fn compare_identical_reports() {
        let results = vec![result("s1", "A", "Q1", 80)];
        let trend = report(&results).compare(&report(&results), 5);
        assert!(trend.declines.is_empty());
        assert!(trend.improvements.is_empty());
        assert_eq!(trend.unchanged, 1);
    }

    #[test]
    fn compare_with_decline() {
        let baseline = report(&[result("s1", "A", "Q1", 90)]);
        let current = report(&[result("s1", "A", "Q1", 60)]);
        let trend = current.compare(&baseline, 5);
        assert!(trend.has_declines());
        assert_eq!(trend.declines[0].delta, -30);
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = report(&[result("s1", "A", "OLD", 80)]);
        let current = report(&[result("s1", "A", "NEW", 80)]);
        let trend = current.compare(&baseline, 5);
        assert_eq!(trend.new_quizzes, 1);
        assert_eq!(trend.removed_quizzes, 1);
    }

    #[test]
    fn json_roundtrip() {
        let original = report(&[result("s1", "A", "Q1", 80)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.json");

        original.save_json(&path).unwrap();
        let loaded = ResultsReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.results, original.results);
        assert_eq!(loaded.stats, original.stats);
    }

    #[test]
    fn markdown_output() {
        let baseline = report(&[result("s1", "A", "Q1", 50)]);
        let current = report(&[result("s1", "A", "Q1", 95)]);
        let md = current.compare(&baseline, 5).to_markdown();
        assert!(md.contains("Improvements"));
        assert!(md.contains("| Q1 | 50% | 95% | +45 |"));
    }
}
