//! quizdesk-core: Quiz scoring, statistics and result filtering.
//!
//! This crate defines the data model, the scorer, the aggregations over
//! graded attempts and the collaborator traits that the rest of quizdesk
//! builds on.

pub mod engine;
pub mod error;
pub mod filter;
pub mod learner;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod traits;
