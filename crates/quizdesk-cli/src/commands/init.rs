//! The `quizdesk init` command.

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizdesk.toml").exists() {
        println!("quizdesk.toml already exists, skipping.");
    } else {
        std::fs::write("quizdesk.toml", SAMPLE_CONFIG)?;
        println!("Created quizdesk.toml");
    }

    std::fs::create_dir_all("quizzes").context("failed to create quizzes/")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    let submission_path = std::path::Path::new("submission.json");
    if submission_path.exists() {
        println!("submission.json already exists, skipping.");
    } else {
        std::fs::write(submission_path, EXAMPLE_SUBMISSION)?;
        println!("Created submission.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizdesk validate --quizzes quizzes");
    println!("  2. Run: quizdesk submit --submission submission.json");
    println!("  3. Run: quizdesk stats");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizdesk configuration

quiz_dir = "./quizzes"
results_path = "./quizdesk-data/results.jsonl"
output_dir = "./quizdesk-reports"

# Score at or above which an attempt passes.
pass_threshold = 60

# Free-text answers of at least this many characters earn half credit.
free_text_min_chars = 10

# exact | ungraded
matching_policy = "exact"

# prefer-observed | observed-only | synthetic-only
blend_policy = "prefer-observed"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
code = "MATH101"
title = "Basic Algebra Quiz"
description = "Linear equations and arithmetic"
subject = "Mathematics"
time_limit_secs = 1800
owner = "faculty_1"

[[questions]]
id = "q1"
type = "single-choice"
prompt = "What is 2 + 2?"
options = ["3", "4", "5", "6"]
answer = 1

[[questions]]
id = "q2"
type = "true-false"
prompt = "x = 3 solves 2x + 1 = 7."
answer = true

[[questions]]
id = "q3"
type = "fill-blank"
prompt = "The square root of 81 is ____."
answer = "9"

[[questions]]
id = "q4"
type = "multi-choice"
prompt = "Which of these are prime?"
options = ["2", "4", "5", "9"]
answers = [0, 2]

[[questions]]
id = "q5"
type = "matching"
prompt = "Match each expression to its value."
pairs = [["3 * 3", "9"], ["10 / 2", "5"]]

[[questions]]
id = "q6"
type = "free-text"
prompt = "Explain in one sentence what a variable is."
"#;

const EXAMPLE_SUBMISSION: &str = r#"{
  "learner": {
    "id": "student_1",
    "name": "Alice Johnson",
    "email": "alice@university.edu",
    "section": "A",
    "department": "Computer Science"
  },
  "quiz_code": "MATH101",
  "answers": {
    "0": 1,
    "1": 0,
    "2": " 9 ",
    "3": [2, 0],
    "4": [{"left": "10 / 2", "right": "5"}, {"left": "3 * 3", "right": "9"}],
    "5": "A named value that can change."
  },
  "elapsed_secs": 245
}
"#;
