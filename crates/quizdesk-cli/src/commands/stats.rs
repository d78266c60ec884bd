//! The `quizdesk stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdesk_core::statistics::Stats;

use super::{open_engine, FilterArgs};

fn stats_row(label: &str, s: &Stats) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(s.count),
        Cell::new(format!("{}%", s.average_score)),
        Cell::new(format!("{}%", s.max_score)),
        Cell::new(format!("{}%", s.min_score)),
        Cell::new(format!("{}%", s.pass_rate)),
    ]
}

pub fn execute(
    filter: FilterArgs,
    by_quiz: bool,
    by_subject: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, engine) = open_engine(config_path)?;
    let criteria = filter.criteria();

    let overall = engine.stats(&criteria)?;
    let per_quiz = if by_quiz {
        Some(engine.stats_by_quiz(&criteria)?)
    } else {
        None
    };
    let per_subject = if by_subject {
        Some(engine.stats_by_subject(&criteria)?)
    } else {
        None
    };

    if format == "json" {
        let value = serde_json::json!({
            "overall": overall,
            "per_quiz": per_quiz,
            "per_subject": per_subject,
            "pass_threshold": config.pass_threshold,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["", "Attempts", "Average", "Highest", "Lowest", "Pass Rate"]);
    table.add_row(stats_row("All", &overall));
    for (code, stats) in per_quiz.iter().flatten() {
        table.add_row(stats_row(code, stats));
    }
    for (subject, stats) in per_subject.iter().flatten() {
        table.add_row(stats_row(subject, stats));
    }

    println!("{table}");
    println!("Pass threshold: {}%", config.pass_threshold);
    Ok(())
}
