//! Result filtering for dashboards and exports.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::AttemptResult;

/// Value a dropdown filter uses to mean "no restriction".
pub const ALL: &str = "all";

/// Criteria for narrowing a result set. Absent fields impose no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Exact, case-sensitive section match.
    #[serde(default)]
    pub section: Option<String>,
    /// Exact, case-sensitive department match.
    #[serde(default)]
    pub department: Option<String>,
    /// Exact, case-sensitive quiz code match.
    #[serde(default)]
    pub quiz_code: Option<String>,
    /// Case-insensitive substring of the learner's name or email.
    #[serde(default)]
    pub search_term: Option<String>,
}

impl FilterCriteria {
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn quiz_code(mut self, code: impl Into<String>) -> Self {
        self.quiz_code = Some(code.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// True if no criterion restricts anything.
    pub fn is_empty(&self) -> bool {
        active(&self.section).is_none()
            && active(&self.department).is_none()
            && active(&self.quiz_code).is_none()
            && search(&self.search_term).is_none()
    }

    /// Whether a single result satisfies every active criterion.
    pub fn matches(&self, result: &AttemptResult) -> bool {
        if let Some(section) = active(&self.section) {
            if result.learner.section.as_deref() != Some(section) {
                return false;
            }
        }
        if let Some(department) = active(&self.department) {
            if result.learner.department.as_deref() != Some(department) {
                return false;
            }
        }
        if let Some(code) = active(&self.quiz_code) {
            if result.quiz_code != code {
                return false;
            }
        }
        if let Some(term) = search(&self.search_term) {
            let term = term.to_lowercase();
            if !result.learner.name.to_lowercase().contains(&term)
                && !result.learner.email.to_lowercase().contains(&term)
            {
                return false;
            }
        }
        true
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty() && *v != ALL)
}

fn search(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Return the results matching all criteria, preserving input order.
pub fn filter(results: &[AttemptResult], criteria: &FilterCriteria) -> Vec<AttemptResult> {
    results
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Distinct values present in a result set, for building filter menus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub sections: Vec<String>,
    pub departments: Vec<String>,
    pub quiz_codes: Vec<String>,
}

impl FilterOptions {
    /// Collect sorted, de-duplicated, non-empty values.
    pub fn from_results(results: &[AttemptResult]) -> Self {
        let mut sections = BTreeSet::new();
        let mut departments = BTreeSet::new();
        let mut quiz_codes = BTreeSet::new();

        for r in results {
            if let Some(s) = r.learner.section.as_deref().filter(|s| !s.is_empty()) {
                sections.insert(s.to_string());
            }
            if let Some(d) = r.learner.department.as_deref().filter(|d| !d.is_empty()) {
                departments.insert(d.to_string());
            }
            if !r.quiz_code.is_empty() {
                quiz_codes.insert(r.quiz_code.clone());
            }
        }

        Self {
            sections: sections.into_iter().collect(),
            departments: departments.into_iter().collect(),
            quiz_codes: quiz_codes.into_iter().collect(),
        }
    }
}
