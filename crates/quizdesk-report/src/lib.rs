//! quizdesk-report: Exports of graded results.
//!
//! CSV for spreadsheets and a self-contained HTML page for sharing.

pub mod csv;
pub mod html;

pub use self::csv::{generate_csv, write_csv};
pub use html::{generate_html, write_html_report};
