//! The `quizdesk validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdesk_core::parser::{load_quizzes, validate_catalog, validate_quiz, ValidationWarning};

fn print_warning(w: &ValidationWarning) {
    let prefix = w
        .question_id
        .as_ref()
        .map(|id| format!("  [{id}]"))
        .unwrap_or_else(|| "  ".to_string());
    println!("{prefix} WARNING: {}", w.message);
}

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quizzes = load_quizzes(&quiz_path)?;

    let mut total_warnings = 0;

    for quiz in &quizzes {
        println!(
            "Quiz: {} [{}] ({} questions)",
            quiz.title,
            quiz.code,
            quiz.questions.len()
        );

        let warnings = validate_quiz(quiz);
        warnings.iter().for_each(print_warning);
        total_warnings += warnings.len();
    }

    let catalog_warnings = validate_catalog(&quizzes);
    if !catalog_warnings.is_empty() {
        println!("Catalog:");
        catalog_warnings.iter().for_each(print_warning);
        total_warnings += catalog_warnings.len();
    }

    if quizzes.is_empty() {
        println!("No quizzes found.");
    } else if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
