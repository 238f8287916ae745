//! Commit gate: maps the current findings to an allow/block decision.

use crate::types::{Finding, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitDecision {
    /// No findings; the commit may proceed.
    #[default]
    Allowed,
    /// Only suggestions; proceeding needs an explicit override.
    AllowedWithSuggestions,
    /// At least one critical finding.
    Blocked,
}

impl CommitDecision {
    /// Exit code for a non-interactive run that stops at this decision.
    pub fn exit_code(self) -> i32 {
        match self {
            CommitDecision::Blocked => 1,
            CommitDecision::Allowed | CommitDecision::AllowedWithSuggestions => 0,
        }
    }
}

/// Pure function of the findings.
pub fn decide(findings: &[Finding]) -> CommitDecision {
    if findings.iter().any(|f| f.severity == Severity::Critical) {
        CommitDecision::Blocked
    } else if findings.is_empty() {
        CommitDecision::Allowed
    } else {
        CommitDecision::AllowedWithSuggestions
    }
}
