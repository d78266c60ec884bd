//! The `quizdesk compare` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdesk_core::report::ResultsReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: u32,
    fail_on_decline: bool,
    format: String,
) -> Result<()> {
    let baseline = ResultsReport::load_json(&baseline_path)?;
    let current = ResultsReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison: {} declines, {} improvements, {} unchanged",
                report.declines.len(),
                report.improvements.len(),
                report.unchanged
            );

            let sections = [
                ("Declines", &report.declines),
                ("Improvements", &report.improvements),
            ];
            for (title, trends) in sections {
                if trends.is_empty() {
                    continue;
                }
                println!("\n{title}:");
                for t in trends {
                    println!(
                        "  {} {}% -> {}% ({:+})",
                        t.quiz_code, t.baseline_average, t.current_average, t.delta
                    );
                }
            }

            if report.new_quizzes > 0 {
                println!("\n{} new quiz(zes)", report.new_quizzes);
            }
            if report.removed_quizzes > 0 {
                println!("{} removed quiz(zes)", report.removed_quizzes);
            }
        }
    }

    if fail_on_decline && report.has_declines() {
        std::process::exit(1);
    }

    Ok(())
}
