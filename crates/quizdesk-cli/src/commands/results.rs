//! The `quizdesk results` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{open_engine, FilterArgs};

pub fn execute(filter: FilterArgs, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, engine) = open_engine(config_path)?;
    let results = engine.results(&filter.criteria())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Student", "Email", "Section", "Quiz", "Score", "Correct", "Time", "Submitted",
    ]);
    for r in &results {
        table.add_row(vec![
            Cell::new(&r.learner.name),
            Cell::new(&r.learner.email),
            Cell::new(r.learner.section.as_deref().unwrap_or("-")),
            Cell::new(&r.quiz_code),
            Cell::new(format!("{}%", r.score)),
            Cell::new(format!("{}/{}", r.correct_answers, r.total_questions)),
            Cell::new(r.time_spent_display()),
            Cell::new(r.submitted_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
    println!("{} result(s)", results.len());
    Ok(())
}
