//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use quizdesk_core::report::ResultsReport;
use quizdesk_core::scoring::{performance_band, PerformanceBand};
use quizdesk_core::statistics::Stats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn band_class(score: u32) -> &'static str {
    match performance_band(score) {
        PerformanceBand::Excellent | PerformanceBand::Great => "high",
        PerformanceBand::Good | PerformanceBand::Fair => "mid",
        PerformanceBand::NeedsPractice => "low",
    }
}

fn describe_criteria(report: &ResultsReport) -> String {
    let c = &report.criteria;
    let parts: Vec<String> = [
        ("section", &c.section),
        ("department", &c.department),
        ("quiz", &c.quiz_code),
        ("search", &c.search_term),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}={}", html_escape(v))))
    .collect();

    if parts.is_empty() {
        "all results".to_string()
    } else {
        parts.join(", ")
    }
}

/// Generate an HTML report from a results report.
pub fn generate_html(report: &ResultsReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>quizdesk results</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>quizdesk results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Filter: <strong>{}</strong> | {} results | {}</p>\n",
        describe_criteria(report),
        report.results.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&stats_cards(&report.stats, report.pass_threshold));

    if !report.per_quiz.is_empty() {
        html.push_str("<h2>By quiz</h2>\n");
        html.push_str("<table class=\"summary\">\n");
        html.push_str("<thead><tr><th>Quiz</th><th>Attempts</th><th>Average</th><th>Highest</th><th>Lowest</th><th>Pass Rate</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (code, stats) in &report.per_quiz {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}%</td><td>{}%</td><td>{}%</td><td>{}%</td></tr>\n",
                html_escape(code),
                stats.count,
                band_class(stats.average_score),
                stats.average_score,
                stats.max_score,
                stats.min_score,
                stats.pass_rate,
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str(&generate_bar_chart(&report.per_quiz));
    }
    html.push_str("</section>\n");

    // Leaderboard
    if !report.leaderboard.is_empty() {
        html.push_str("<section class=\"leaderboard\">\n");
        html.push_str("<h2>Leaderboard</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Rank</th><th>Student</th><th>Section</th><th>Average</th><th>Attempts</th><th>Points</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for e in &report.leaderboard {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td></tr>\n",
                e.rank,
                html_escape(&e.name),
                html_escape(e.section.as_deref().unwrap_or("-")),
                e.average_score,
                e.attempts,
                e.total_points,
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    // Individual results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Results</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Student</th><th onclick=\"sortTable(1)\">Email</th><th onclick=\"sortTable(2)\">Section</th><th onclick=\"sortTable(3)\">Quiz</th><th onclick=\"sortTable(4)\">Score</th><th onclick=\"sortTable(5)\">Correct</th><th onclick=\"sortTable(6)\">Time</th><th onclick=\"sortTable(7)\">Submitted</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for r in &report.results {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\" data-sort=\"{:03}\">{}%</td><td>{}/{}</td><td data-sort=\"{:08}\">{}</td><td>{}</td></tr>\n",
            html_escape(&r.learner.name),
            html_escape(&r.learner.email),
            html_escape(r.learner.section.as_deref().unwrap_or("-")),
            html_escape(&r.quiz_code),
            band_class(r.score),
            r.score,
            r.score,
            r.correct_answers,
            r.total_questions,
            r.elapsed_secs,
            r.time_spent_display(),
            r.submitted_at.format("%Y-%m-%d %H:%M"),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ResultsReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn stats_cards(stats: &Stats, pass_threshold: u32) -> String {
    let cards = [
        ("Attempts", stats.count.to_string()),
        ("Average", format!("{}%", stats.average_score)),
        ("Highest", format!("{}%", stats.max_score)),
        ("Lowest", format!("{}%", stats.min_score)),
        (
            "Pass Rate",
            format!("{}% <small>(&ge; {pass_threshold})</small>", stats.pass_rate),
        ),
    ];

    let mut out = String::from("<div class=\"cards\">\n");
    for (label, value) in cards {
        out.push_str(&format!(
            "<div class=\"card\"><span class=\"label\">{label}</span><span class=\"value\">{value}</span></div>\n"
        ));
    }
    out.push_str("</div>\n");
    out
}

fn generate_bar_chart(per_quiz: &BTreeMap<String, Stats>) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = per_quiz.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (code, stats)) in per_quiz.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = stats.average_score.min(100) as usize * max_width / 100;

        let color = match band_class(stats.average_score) {
            "high" => "#22c55e",
            "mid" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(code)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            stats.average_score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --high: #dcfce7; --mid: #fef9c3; --low: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --high: #064e3b; --mid: #713f12; --low: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; }
.card { border: 1px solid var(--border); border-radius: 8px; padding: 1rem 1.5rem; min-width: 8rem; }
.card .label { display: block; color: #6b7280; font-size: 0.85rem; }
.card .value { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.high { background: var(--high); }
.mid { background: var(--mid); }
.low { background: var(--low); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  const key = cell => cell.dataset.sort || cell.textContent;
  rows.sort((a, b) => {
    const va = key(a.cells[col]);
    const vb = key(b.cells[col]);
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
