//! The `quizdesk profile` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdesk_core::learner::{BlendPolicy, Origin, Sourced};

use super::open_engine;

fn parse_policy(s: &str) -> Result<BlendPolicy> {
    match s {
        "prefer-observed" => Ok(BlendPolicy::PreferObserved),
        "observed-only" => Ok(BlendPolicy::ObservedOnly),
        "synthetic-only" => Ok(BlendPolicy::SyntheticOnly),
        other => anyhow::bail!(
            "unknown blend policy: {other} (expected prefer-observed, observed-only or synthetic-only)"
        ),
    }
}

fn origin_label(origin: Origin) -> &'static str {
    match origin {
        Origin::Observed => "observed",
        Origin::Synthetic => "placeholder",
        Origin::Unavailable => "no data",
    }
}

fn row<T: std::fmt::Display>(label: &str, field: &Sourced<T>, suffix: &str) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(format!("{}{suffix}", field.value)),
        Cell::new(origin_label(field.origin)),
    ]
}

pub fn execute(
    learner_id: String,
    policy: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let policy = policy.as_deref().map(parse_policy).transpose()?;
    let (_, engine) = open_engine(config_path)?;
    let stats = engine.learner_stats(&learner_id, policy)?;
    let subjects = engine.learner_subjects(&learner_id)?;

    if format == "json" {
        let value = serde_json::json!({
            "stats": stats,
            "subjects": subjects,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["", "Value", "Source"]);
    table.add_row(row("Total quizzes", &stats.total_quizzes, ""));
    table.add_row(row("Completed", &stats.completed_quizzes, ""));
    table.add_row(row("Average score", &stats.average_score, "%"));
    table.add_row(row("Rank", &stats.rank, ""));
    table.add_row(row("Total points", &stats.total_points, ""));

    println!("Learner: {}", stats.learner_id);
    println!("{table}");

    if !subjects.is_empty() {
        let mut by_subject = Table::new();
        by_subject.set_header(vec!["Subject", "Attempts", "Average", "Best"]);
        for (subject, s) in &subjects {
            by_subject.add_row(vec![
                Cell::new(subject),
                Cell::new(s.count),
                Cell::new(format!("{}%", s.average_score)),
                Cell::new(format!("{}%", s.max_score)),
            ]);
        }
        println!("{by_subject}");
    }
    if stats.is_synthetic() {
        println!(
            "Placeholder values shown for: {}",
            stats.synthetic_fields().join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_policies() {
        assert_eq!(parse_policy("observed-only").unwrap(), BlendPolicy::ObservedOnly);
        assert_eq!(parse_policy("synthetic-only").unwrap(), BlendPolicy::SyntheticOnly);
        assert!(parse_policy("random").is_err());
    }
}
