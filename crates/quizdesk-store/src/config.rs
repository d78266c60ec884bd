//! Configuration and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizdesk_core::engine::EngineConfig;
use quizdesk_core::learner::BlendPolicy;
use quizdesk_core::scoring::{MatchingPolicy, ScoringConfig, DEFAULT_FREE_TEXT_MIN_CHARS};
use quizdesk_core::statistics::PASS_THRESHOLD;
use quizdesk_core::traits::{QuizSource, ResultsStore};

use crate::catalog::DirectoryQuizSource;
use crate::jsonl::JsonlResultsStore;

/// Top-level quizdesk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizdeskConfig {
    /// Directory (or single file) holding TOML quiz definitions.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
    /// JSON-lines results log.
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
    /// Score at or above which an attempt passes.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u32,
    /// Minimum trimmed length for free-text half credit.
    #[serde(default = "default_free_text_min_chars")]
    pub free_text_min_chars: usize,
    #[serde(default)]
    pub matching_policy: MatchingPolicy,
    #[serde(default)]
    pub blend_policy: BlendPolicy,
    /// Output directory for exports and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_results_path() -> PathBuf {
    PathBuf::from("./quizdesk-data/results.jsonl")
}
fn default_pass_threshold() -> u32 {
    PASS_THRESHOLD
}
fn default_free_text_min_chars() -> usize {
    DEFAULT_FREE_TEXT_MIN_CHARS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizdesk-reports")
}

impl Default for QuizdeskConfig {
    fn default() -> Self {
        Self {
            quiz_dir: default_quiz_dir(),
            results_path: default_results_path(),
            pass_threshold: default_pass_threshold(),
            free_text_min_chars: default_free_text_min_chars(),
            matching_policy: MatchingPolicy::default(),
            blend_policy: BlendPolicy::default(),
            output_dir: default_output_dir(),
        }
    }
}

impl QuizdeskConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            scoring: ScoringConfig {
                free_text_min_chars: self.free_text_min_chars,
                matching: self.matching_policy,
            },
            pass_threshold: self.pass_threshold,
            blend_policy: self.blend_policy,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizdesk.toml` in the current directory
/// 2. `~/.config/quizdesk/config.toml`
///
/// Environment variable overrides: `QUIZDESK_QUIZ_DIR`, `QUIZDESK_RESULTS`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdeskConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdesk.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizdeskConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizdeskConfig::default(),
    };

    if let Ok(dir) = std::env::var("QUIZDESK_QUIZ_DIR") {
        config.quiz_dir = PathBuf::from(dir);
    }
    if let Ok(results) = std::env::var("QUIZDESK_RESULTS") {
        config.results_path = PathBuf::from(results);
    }

    config.quiz_dir = resolve_path(&config.quiz_dir);
    config.results_path = resolve_path(&config.results_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdesk"))
}

/// Create the results store named by the configuration.
pub fn create_store(config: &QuizdeskConfig) -> Result<Arc<dyn ResultsStore>> {
    Ok(Arc::new(JsonlResultsStore::open(&config.results_path)))
}

/// Load the quiz catalog named by the configuration.
pub fn create_quiz_source(config: &QuizdeskConfig) -> Result<Arc<dyn QuizSource>> {
    let source = DirectoryQuizSource::open(&config.quiz_dir)
        .with_context(|| format!("failed to load quizzes from {}", config.quiz_dir.display()))?;
    Ok(Arc::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZDESK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZDESK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZDESK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_QUIZDESK_UNSET_VAR}/x"), "/x");
        assert_eq!(resolve_env_vars("no ${close"), "no ${close");
        std::env::remove_var("_QUIZDESK_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizdeskConfig::default();
        assert_eq!(config.pass_threshold, 60);
        assert_eq!(config.free_text_min_chars, 10);
        assert_eq!(config.matching_policy, MatchingPolicy::Exact);
        assert_eq!(config.blend_policy, BlendPolicy::PreferObserved);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
quiz_dir = "/srv/quizzes"
pass_threshold = 50
matching_policy = "ungraded"
blend_policy = "observed-only"
"#;
        let config: QuizdeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.quiz_dir, PathBuf::from("/srv/quizzes"));
        assert_eq!(config.pass_threshold, 50);
        assert_eq!(config.matching_policy, MatchingPolicy::Ungraded);
        assert_eq!(config.blend_policy, BlendPolicy::ObservedOnly);
        assert_eq!(config.results_path, default_results_path());

        let engine = config.engine_config();
        assert_eq!(engine.pass_threshold, 50);
        assert_eq!(engine.scoring.matching, MatchingPolicy::Ungraded);
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizdesk.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_resolves_env_vars() {
        std::env::set_var("_QUIZDESK_TEST_ROOT", "/data/course");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizdesk.toml");
        std::fs::write(&path, "output_dir = \"${_QUIZDESK_TEST_ROOT}/reports\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/data/course/reports"));
        std::env::remove_var("_QUIZDESK_TEST_ROOT");
    }
}
