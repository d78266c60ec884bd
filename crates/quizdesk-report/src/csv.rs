//! CSV export of a result set.
//!
//! Fields are quoted per RFC 4180 when they contain a comma, quote or line
//! break. Rows end with CRLF.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use quizdesk_core::model::AttemptResult;

/// Column headers, in output order.
pub const HEADERS: [&str; 11] = [
    "Student Name",
    "Email",
    "Section",
    "Department",
    "Quiz Code",
    "Quiz Title",
    "Score",
    "Correct Answers",
    "Total Questions",
    "Time Spent",
    "Submitted At",
];

fn record(r: &AttemptResult) -> [String; 11] {
    [
        r.learner.name.clone(),
        r.learner.email.clone(),
        r.learner.section.clone().unwrap_or_default(),
        r.learner.department.clone().unwrap_or_default(),
        r.quiz_code.clone(),
        r.quiz_title.clone(),
        r.score.to_string(),
        r.correct_answers.to_string(),
        r.total_questions.to_string(),
        r.time_spent_display(),
        r.submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    ]
}

/// Render results as CSV, one row per result in input order.
pub fn generate_csv(results: &[AttemptResult]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;
    for r in results {
        writer.write_record(record(r))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write results as CSV to a file.
pub fn write_csv(results: &[AttemptResult], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, generate_csv(results)?)
        .with_context(|| format!("failed to write CSV to {}", path.display()))?;
    Ok(())
}
