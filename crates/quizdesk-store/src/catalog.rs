//! Quiz catalog loaded from a directory of TOML quiz files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use quizdesk_core::error::QuizError;
use quizdesk_core::model::Quiz;
use quizdesk_core::parser::load_quizzes;
use quizdesk_core::traits::QuizSource;

/// Quizzes loaded once from a file or directory.
///
/// When two files publish the same code the first one loaded wins.
pub struct DirectoryQuizSource {
    quizzes: BTreeMap<String, Quiz>,
}

impl DirectoryQuizSource {
    /// Load every quiz under `path` (a `.toml` file or a directory).
    pub fn open(path: &Path) -> Result<Self> {
        let mut quizzes = BTreeMap::new();
        for quiz in load_quizzes(path)? {
            if quizzes.contains_key(&quiz.code) {
                tracing::warn!(code = %quiz.code, "duplicate quiz code, keeping the first");
                continue;
            }
            quizzes.insert(quiz.code.clone(), quiz);
        }
        tracing::debug!(count = quizzes.len(), root = %path.display(), "loaded quiz catalog");
        Ok(Self { quizzes })
    }

    pub fn quizzes(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.values()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

impl QuizSource for DirectoryQuizSource {
    fn get_quiz_by_code(&self, code: &str) -> Result<Quiz, QuizError> {
        self.quizzes
            .get(code)
            .cloned()
            .ok_or_else(|| QuizError::NotFound(code.to_string()))
    }

    fn list_codes(&self) -> Vec<String> {
        self.quizzes.keys().cloned().collect()
    }
}
