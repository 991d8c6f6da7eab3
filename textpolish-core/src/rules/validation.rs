use super::engine::compile_pattern;
use crate::config::Configuration;
use crate::error::PatternError;
use crate::types::Category;
use serde::Serialize;
use std::fmt;

/// Edit-time check of every rule pattern, enabled or not.
///
/// Classification never fails on a bad pattern; this report is how a front
/// end learns which rules are being skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleValidationReport {
    pub issues: Vec<RuleIssue>,
    pub rules_checked: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIssue {
    pub category: Category,
    /// Position in the category's rule list
    pub index: usize,
    pub name: String,
    pub enabled: bool,
    pub problem: PatternProblem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternProblem {
    EmptyPattern,
    InvalidPattern { message: String },
}

impl From<PatternError> for PatternProblem {
    fn from(error: PatternError) -> Self {
        match error {
            PatternError::Empty => PatternProblem::EmptyPattern,
            PatternError::Invalid { message, .. } => PatternProblem::InvalidPattern { message },
        }
    }
}

impl RuleValidationReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues_for(&self, category: Category) -> impl Iterator<Item = &RuleIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// Issues on enabled rules, i.e. rules classification is silently skipping.
    pub fn active_issue_count(&self) -> usize {
        self.issues.iter().filter(|i| i.enabled).count()
    }
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.enabled { "" } else { " (disabled)" };
        match &self.problem {
            PatternProblem::EmptyPattern => write!(
                f,
                "{} #{} '{}'{}: pattern is empty",
                self.category, self.index, self.name, state
            ),
            PatternProblem::InvalidPattern { message } => write!(
                f,
                "{} #{} '{}'{}: {}",
                self.category, self.index, self.name, state, message
            ),
        }
    }
}

pub fn validate_configuration(config: &Configuration) -> RuleValidationReport {
    let mut report = RuleValidationReport::default();

    for (category, category_config) in config.iter() {
        for (index, rule) in category_config.patterns.iter().enumerate() {
            report.rules_checked += 1;
            if let Err(e) = compile_pattern(&rule.pattern) {
                report.issues.push(RuleIssue {
                    category,
                    index,
                    name: rule.name.clone(),
                    enabled: rule.enabled,
                    problem: e.into(),
                });
            }
        }
    }

    if !report.is_clean() {
        log::debug!(
            "Rule validation: {} issue(s) in {} rule(s)",
            report.issues.len(),
            report.rules_checked
        );
    }
    report
}
