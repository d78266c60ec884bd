pub mod compare;
pub mod export;
pub mod init;
pub mod leaderboard;
pub mod profile;
pub mod results;
pub mod stats;
pub mod submit;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use quizdesk_core::engine::GradingEngine;
use quizdesk_core::filter::FilterCriteria;
use quizdesk_core::traits::QuizSource;
use quizdesk_store::config::{create_quiz_source, create_store, load_config_from, QuizdeskConfig};
use quizdesk_store::MemoryQuizSource;

/// Result filters shared by the reading commands.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only this section ("all" for every section)
    #[arg(long)]
    pub section: Option<String>,

    /// Only this department
    #[arg(long)]
    pub department: Option<String>,

    /// Only this quiz code
    #[arg(long)]
    pub quiz: Option<String>,

    /// Case-insensitive search over learner name and email
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn criteria(self) -> FilterCriteria {
        FilterCriteria {
            section: self.section,
            department: self.department,
            quiz_code: self.quiz,
            search_term: self.search,
        }
    }
}

/// Load configuration and build a grading engine over the configured stores.
///
/// A missing quiz directory yields an empty catalog so that read-only
/// commands work on a results log alone.
pub fn open_engine(config_path: Option<PathBuf>) -> Result<(QuizdeskConfig, GradingEngine)> {
    let config = load_config_from(config_path.as_deref())?;

    let quizzes: Arc<dyn QuizSource> = if config.quiz_dir.exists() {
        create_quiz_source(&config)?
    } else {
        tracing::warn!(
            quiz_dir = %config.quiz_dir.display(),
            "quiz directory not found, using an empty catalog"
        );
        Arc::new(MemoryQuizSource::default())
    };
    let results = create_store(&config)?;

    let engine = GradingEngine::new(quizzes, results, config.engine_config());
    Ok((config, engine))
}
