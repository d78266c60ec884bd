//! The `quizdesk leaderboard` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{open_engine, FilterArgs};

pub fn execute(
    filter: FilterArgs,
    limit: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, engine) = open_engine(config_path)?;
    let mut board = engine.leaderboard(&filter.criteria())?;
    if let Some(n) = limit {
        board.truncate(n);
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&board)?);
        return Ok(());
    }

    if board.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Rank", "Student", "Section", "Average", "Attempts", "Points"]);
    for e in &board {
        table.add_row(vec![
            Cell::new(e.rank),
            Cell::new(&e.name),
            Cell::new(e.section.as_deref().unwrap_or("-")),
            Cell::new(format!("{}%", e.average_score)),
            Cell::new(e.attempts),
            Cell::new(e.total_points),
        ]);
    }

    println!("{table}");
    Ok(())
}
