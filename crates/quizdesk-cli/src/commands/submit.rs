//! The `quizdesk submit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use quizdesk_core::engine::{GradedSubmission, SubmissionObserver};
use quizdesk_core::error::QuizError;
use quizdesk_core::model::{AttemptResult, Submission};
use quizdesk_core::scoring::{performance_band, PerformanceBand, QuestionVerdict, Verdict};

use super::open_engine;

/// Reports grading progress on stderr.
struct ConsoleObserver;

impl SubmissionObserver for ConsoleObserver {
    fn on_graded(&self, sequence: u64, result: &AttemptResult) {
        eprintln!(
            "  #{sequence} {} on {}: {}%",
            result.learner.name, result.quiz_code, result.score
        );
    }

    fn on_rejected(&self, _quiz_code: &str, _learner_id: &str, error: &QuizError) {
        eprintln!("  {}", error.user_message());
    }
}

#[derive(Serialize)]
struct SubmitOutput<'a> {
    sequence: u64,
    band: PerformanceBand,
    result: &'a AttemptResult,
    verdicts: &'a [QuestionVerdict],
}

pub fn execute(
    submission_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let content = std::fs::read_to_string(&submission_path)
        .with_context(|| format!("failed to read submission: {}", submission_path.display()))?;
    let submission: Submission = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse submission: {}", submission_path.display()))?;

    let (_, engine) = open_engine(config_path)?;
    let graded = engine.submit(&submission, &ConsoleObserver)?;

    match format.as_str() {
        "json" => {
            let output = SubmitOutput {
                sequence: graded.sequence,
                band: performance_band(graded.result.score),
                result: &graded.result,
                verdicts: &graded.breakdown.verdicts,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => print_text(&graded),
    }

    Ok(())
}

fn print_text(graded: &GradedSubmission) {
    use comfy_table::{Cell, Table};

    let r = &graded.result;
    println!("{} [{}]", r.quiz_title, r.quiz_code);
    println!("Learner: {} <{}>", r.learner.name, r.learner.email);
    println!(
        "Score: {}% ({} correct, {} half credit, of {})",
        r.score, r.correct_answers, r.half_credit_answers, r.total_questions
    );
    println!("Time spent: {}", r.time_spent_display());
    println!("{}", performance_band(r.score).message());

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Verdict"]);
    for v in &graded.breakdown.verdicts {
        let verdict = match v.verdict {
            Verdict::Correct => "correct",
            Verdict::HalfCredit => "half credit",
            Verdict::Incorrect => "incorrect",
            Verdict::Unanswered => "unanswered",
        };
        table.add_row(vec![
            Cell::new(v.index + 1),
            Cell::new(&v.question_id),
            Cell::new(verdict),
        ]);
    }
    println!("\n{table}");
    println!("Stored as result #{}", graded.sequence);
}
