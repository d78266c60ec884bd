//! The `quizdesk export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdesk_core::report::ResultsReport;
use quizdesk_report::{write_csv, write_html_report};

use super::{open_engine, FilterArgs};

pub fn execute(
    filter: FilterArgs,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, engine) = open_engine(config_path)?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let criteria = filter.criteria();
    let all = engine.results(&Default::default())?;
    let report = ResultsReport::build(&all, &criteria, config.pass_threshold);

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["csv", "html", "json"]
    } else {
        format.split(',').collect()
    };

    for fmt in &formats {
        match *fmt {
            "csv" => {
                let path = output.join(format!("results-{timestamp}.csv"));
                write_csv(&report.results, &path)?;
                eprintln!("CSV export: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("results-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "json" => {
                let path = output.join(format!("results-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("JSON report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    println!("Exported {} result(s)", report.results.len());
    Ok(())
}
