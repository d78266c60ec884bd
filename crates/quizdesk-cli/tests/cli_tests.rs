//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use quizdesk_core::filter::FilterCriteria;
use quizdesk_core::model::{AnswerMap, AttemptResult, Learner};
use quizdesk_core::report::ResultsReport;
use quizdesk_core::statistics::PASS_THRESHOLD;

fn quizdesk() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizdesk").unwrap();
    cmd.env_remove("QUIZDESK_QUIZ_DIR")
        .env_remove("QUIZDESK_RESULTS");
    cmd
}

/// A temp directory after `quizdesk init`.
fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    quizdesk()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();
    dir
}

fn submit(dir: &Path, submission: &str) -> assert_cmd::assert::Assert {
    quizdesk()
        .current_dir(dir)
        .arg("submit")
        .arg("--submission")
        .arg(submission)
        .assert()
}

fn write_submission(
    dir: &Path,
    file: &str,
    learner: &str,
    name: &str,
    section: &str,
    answer: usize,
) {
    let json = format!(
        r#"{{
  "learner": {{"id": "{learner}", "name": "{name}", "email": "{learner}@uni.edu", "section": "{section}"}},
  "quiz_code": "MATH101",
  "answers": {{"0": {answer}}},
  "elapsed_secs": 60
}}"#
    );
    std::fs::write(dir.join(file), json).unwrap();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizdesk()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizdesk.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.toml"));

    assert!(dir.path().join("quizdesk.toml").exists());
    assert!(dir.path().join("quizzes/example.toml").exists());
    assert!(dir.path().join("submission.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = initialized();

    quizdesk()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_example_quiz() {
    let dir = initialized();

    quizdesk()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--quizzes")
        .arg("quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("MATH101"))
        .stdout(predicate::str::contains("6 questions"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.toml"),
        r#"[quiz]
code = "BAD"
title = "Bad"

[[questions]]
id = "q1"
type = "single-choice"
prompt = ""
options = ["only"]
answer = 3
"#,
    )
    .unwrap();

    quizdesk()
        .arg("validate")
        .arg("--quizzes")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[q1] WARNING"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    quizdesk()
        .arg("validate")
        .arg("--quizzes")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn submit_example_scores_and_stores() {
    let dir = initialized();

    submit(dir.path(), "submission.json")
        .success()
        .stdout(predicate::str::contains("Score: 92%"))
        .stdout(predicate::str::contains("Excellent work!"))
        .stdout(predicate::str::contains("half credit"))
        .stdout(predicate::str::contains("Stored as result #1"));

    assert!(dir.path().join("quizdesk-data/results.jsonl").exists());

    quizdesk()
        .current_dir(dir.path())
        .arg("results")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice Johnson"))
        .stdout(predicate::str::contains("4m 5s"))
        .stdout(predicate::str::contains("1 result(s)"));
}

#[test]
fn submit_json_output() {
    let dir = initialized();

    let output = quizdesk()
        .current_dir(dir.path())
        .arg("submit")
        .arg("--submission")
        .arg("submission.json")
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sequence"], 1);
    assert_eq!(value["band"], "excellent");
    assert_eq!(value["result"]["score"], 92);
    assert_eq!(value["verdicts"].as_array().unwrap().len(), 6);
}

#[test]
fn submit_unknown_quiz_fails() {
    let dir = initialized();
    let json = std::fs::read_to_string(dir.path().join("submission.json"))
        .unwrap()
        .replace("MATH101", "NOPE999");
    std::fs::write(dir.path().join("bad.json"), json).unwrap();

    submit(dir.path(), "bad.json")
        .failure()
        .stderr(predicate::str::contains("quiz not found: NOPE999"));
}

#[test]
fn filters_stats_and_leaderboard() {
    let dir = initialized();
    write_submission(dir.path(), "a.json", "s1", "Ann Lee", "A", 1);
    write_submission(dir.path(), "b.json", "s2", "Ben Ray", "B", 0);
    submit(dir.path(), "a.json").success();
    submit(dir.path(), "b.json").success();

    quizdesk()
        .current_dir(dir.path())
        .args(["results", "--section", "B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ben Ray"))
        .stdout(predicate::str::contains("Ann Lee").not());

    quizdesk()
        .current_dir(dir.path())
        .args(["results", "--search", "ANN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann Lee"))
        .stdout(predicate::str::contains("1 result(s)"));

    quizdesk()
        .current_dir(dir.path())
        .args(["results", "--section", "Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found."));

    // One of six questions correct: 17%; none correct: 0%.
    quizdesk()
        .current_dir(dir.path())
        .args(["stats", "--by-quiz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MATH101"))
        .stdout(predicate::str::contains("17%"));

    quizdesk()
        .current_dir(dir.path())
        .args(["leaderboard", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"learner_id\": \"s1\""));
}

#[test]
fn subject_breakdowns() {
    let dir = initialized();
    submit(dir.path(), "submission.json").success();

    quizdesk()
        .current_dir(dir.path())
        .args(["stats", "--by-subject"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mathematics"))
        .stdout(predicate::str::contains("92%"));

    let output = quizdesk()
        .current_dir(dir.path())
        .args(["profile", "--learner", "student_1", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["subjects"]["Mathematics"]["count"], 1);
    assert_eq!(value["subjects"]["Mathematics"]["average_score"], 92);
    assert_eq!(value["stats"]["learner_id"], "student_1");
}

#[test]
fn profile_marks_placeholder_values() {
    let dir = initialized();

    quizdesk()
        .current_dir(dir.path())
        .args(["profile", "--learner", "newcomer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("placeholder"))
        .stdout(predicate::str::contains("Placeholder values shown for"));

    quizdesk()
        .current_dir(dir.path())
        .args(["profile", "--learner", "newcomer", "--policy", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown blend policy"));
}

#[test]
fn export_writes_all_formats() {
    let dir = initialized();
    submit(dir.path(), "submission.json").success();

    quizdesk()
        .current_dir(dir.path())
        .args(["export", "--format", "all", "--output", "out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 result(s)"));

    let mut extensions: Vec<String> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| {
            e.unwrap()
                .path()
                .extension()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    extensions.sort();
    assert_eq!(extensions, vec!["csv", "html", "json"]);
}

#[test]
fn compare_reports() {
    let dir = TempDir::new().unwrap();

    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    make_test_report("MATH101", 90).save_json(&baseline_path).unwrap();
    make_test_report("MATH101", 60).save_json(&current_path).unwrap();

    quizdesk()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 declines"))
        .stdout(predicate::str::contains("MATH101 90% -> 60% (-30)"));

    quizdesk()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--fail-on-decline")
        .assert()
        .failure();
}

#[test]
fn compare_nonexistent_report() {
    quizdesk()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    quizdesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz grading and results dashboard"));
}

#[test]
fn version_output() {
    quizdesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizdesk"));
}

/// A report over a single result for `quiz` with the given score.
fn make_test_report(quiz: &str, score: u32) -> ResultsReport {
    let result = AttemptResult {
        id: Default::default(),
        learner: Learner {
            id: "s1".into(),
            name: "Ann".into(),
            email: "ann@uni.edu".into(),
            section: None,
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
        submitted_at: "2025-01-01T00:00:00Z".parse().unwrap(),
    };
    ResultsReport::build(&[result], &FilterCriteria::default(), PASS_THRESHOLD)
}
