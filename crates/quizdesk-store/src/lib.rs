//! quizdesk-store: Quiz catalogs and result stores.
//!
//! Implements the `QuizSource` and `ResultsStore` traits over memory and the
//! filesystem, and loads the quizdesk configuration that selects them.

pub mod catalog;
pub mod config;
pub mod error;
pub mod jsonl;
pub mod memory;

pub use catalog::DirectoryQuizSource;
pub use config::{create_quiz_source, create_store, load_config_from, QuizdeskConfig};
pub use error::StoreError;
pub use jsonl::JsonlResultsStore;
pub use memory::{MemoryQuizSource, MemoryResultsStore};
