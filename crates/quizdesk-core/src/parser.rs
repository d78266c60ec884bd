//! TOML quiz parser.
//!
//! Loads quizzes from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{MatchPair, Question, QuestionKind, QuestionType, Quiz};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    code: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default = "default_time_limit")]
    time_limit_secs: u64,
    #[serde(default)]
    owner: Option<String>,
}

fn default_time_limit() -> u64 {
    1800
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    answer: Option<TomlAnswer>,
    #[serde(default)]
    answers: Vec<usize>,
    #[serde(default)]
    pairs: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlAnswer {
    Index(usize),
    Flag(bool),
    Text(String),
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(convert_question)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid question in {}", source_path.display()))?;

    Ok(Quiz {
        code: parsed.quiz.code,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        subject: parsed.quiz.subject,
        time_limit_secs: parsed.quiz.time_limit_secs,
        owner: parsed.quiz.owner,
        questions,
    })
}

fn convert_question(q: TomlQuestion) -> Result<Question> {
    let is_true_false = q.kind.eq_ignore_ascii_case("true-false");
    let question_type: QuestionType = q.kind.parse().map_err(|e: String| anyhow::anyhow!("{e}"))?;

    let kind = match question_type {
        QuestionType::SingleChoice => {
            let options = if q.options.is_empty() && is_true_false {
                vec!["True".to_string(), "False".to_string()]
            } else {
                q.options
            };
            let answer = match q.answer {
                Some(TomlAnswer::Index(i)) => i,
                // true/false questions list "True" first
                Some(TomlAnswer::Flag(b)) => usize::from(!b),
                Some(TomlAnswer::Text(text)) => options
                    .iter()
                    .position(|o| o.trim().eq_ignore_ascii_case(text.trim()))
                    .ok_or_else(|| {
                        anyhow::anyhow!("question {}: answer {text:?} is not an option", q.id)
                    })?,
                None => anyhow::bail!("question {}: missing `answer`", q.id),
            };
            QuestionKind::SingleChoice { options, answer }
        }
        QuestionType::MultiChoice => QuestionKind::MultiChoice {
            options: q.options,
            answers: q.answers,
        },
        QuestionType::FillBlank => match q.answer {
            Some(TomlAnswer::Text(answer)) => QuestionKind::FillBlank { answer },
            Some(TomlAnswer::Index(i)) => QuestionKind::FillBlank {
                answer: i.to_string(),
            },
            _ => anyhow::bail!("question {}: fill-blank needs a text `answer`", q.id),
        },
        QuestionType::FreeText => QuestionKind::FreeText,
        QuestionType::Matching => QuestionKind::Matching {
            pairs: q
                .pairs
                .into_iter()
                .map(|(left, right)| MatchPair { left, right })
                .collect(),
        },
    };

    Ok(Question {
        id: q.id,
        prompt: q.prompt,
        kind,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    // Stable load order, so "first file wins" is reproducible.
    paths.sort();

    for path in paths {
        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Load a single file or a directory of quizzes.
pub fn load_quizzes(path: &Path) -> Result<Vec<Quiz>> {
    if path.is_dir() {
        load_quiz_directory(path)
    } else {
        Ok(vec![parse_quiz(path)?])
    }
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The quiz code.
    pub quiz_code: String,
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for common authoring mistakes.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let warn = |question_id: Option<&str>, message: String| ValidationWarning {
        quiz_code: quiz.code.clone(),
        question_id: question_id.map(str::to_string),
        message,
    };

    if quiz.questions.is_empty() {
        warnings.push(warn(None, "quiz has no questions and cannot be scored".into()));
    }

    if quiz.time_limit_secs == 0 {
        warnings.push(warn(None, "time limit is zero".into()));
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for q in &quiz.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(warn(Some(q.id.as_str()), format!("duplicate question ID: {}", q.id)));
        }
    }

    for q in &quiz.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(warn(Some(q.id.as_str()), "prompt is empty".into()));
        }

        match &q.kind {
            QuestionKind::SingleChoice { options, answer } => {
                check_options(options, &q.id, &mut warnings, &warn);
                if *answer >= options.len() {
                    warnings.push(warn(
                        Some(q.id.as_str()),
                        format!("answer index {answer} is out of range"),
                    ));
                }
            }
            QuestionKind::MultiChoice { options, answers } => {
                check_options(options, &q.id, &mut warnings, &warn);
                if answers.is_empty() {
                    warnings.push(warn(
                        Some(q.id.as_str()),
                        "multi-choice has no correct answers".into(),
                    ));
                }
                for a in answers.iter().filter(|a| **a >= options.len()) {
                    warnings.push(warn(
                        Some(q.id.as_str()),
                        format!("answer index {a} is out of range"),
                    ));
                }
            }
            QuestionKind::FillBlank { answer } => {
                if answer.trim().is_empty() {
                    warnings.push(warn(Some(q.id.as_str()), "fill-blank answer is empty".into()));
                }
            }
            QuestionKind::FreeText => {}
            QuestionKind::Matching { pairs } => {
                if pairs.is_empty() {
                    warnings.push(warn(
                        Some(q.id.as_str()),
                        "matching question has no pairs".into(),
                    ));
                }
            }
        }
    }

    warnings
}

fn check_options(
    options: &[String],
    question_id: &str,
    warnings: &mut Vec<ValidationWarning>,
    warn: &impl Fn(Option<&str>, String) -> ValidationWarning,
) {
    let filled = options.iter().filter(|o| !o.trim().is_empty()).count();
    if filled < 2 {
        warnings.push(warn(
            Some(question_id),
            "choice questions must have at least 2 options".into(),
        ));
    }
}

/// Checks that span several quizzes (e.g. a catalog directory).
///
/// Per-quiz checks are left to [`validate_quiz`].
pub fn validate_catalog(quizzes: &[Quiz]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_codes = HashSet::new();
    for quiz in quizzes {
        if !seen_codes.insert(&quiz.code) {
            warnings.push(ValidationWarning {
                quiz_code: quiz.code.clone(),
                question_id: None,
                message: format!("duplicate quiz code: {}", quiz.code),
            });
        }
    }

    warnings
}
