//! Compatibility evaluation and scoring.
//!
//! Every rule runs to completion on every call; there is no short-circuit,
//! so one evaluation surfaces the complete issue list.
//!
//! Scoring starts at 100 and subtracts a per-severity penalty for each
//! issue, floored at 0. `compatible` is a separate gate: `true` iff no issue
//! has severity `error`, whatever the score.

use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError,
    entities::{CompatibilityContext, CompatibilityIssue, Evaluation, ServiceIdentifier},
    resolver::MissingDependency,
    rules::{RuleCheck, RuleSet},
    value_objects::{Severity, Verdict},
};

pub const MAX_SCORE: u8 = 100;

/// Rule id of the issue raised for each unsatisfied dependency pattern.
pub const UNMET_DEPENDENCY: &str = "unmet-dependency";

/// Rule id of the issue raised for each declared conflict between templates.
pub const DECLARED_CONFLICT: &str = "declared-conflict";

/// Points subtracted per issue, by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTable {
    error: u8,
    warning: u8,
    info: u8,
}

impl PenaltyTable {
    pub const DEFAULT: Self = Self {
        error: 40,
        warning: 15,
        info: 3,
    };

    /// # Errors
    ///
    /// `InvalidPenaltyTable` if any penalty exceeds 100.
    pub fn new(error: u8, warning: u8, info: u8) -> Result<Self, DomainError> {
        for (name, value) in [("error", error), ("warning", warning), ("info", info)] {
            if value > MAX_SCORE {
                return Err(DomainError::InvalidPenaltyTable(format!(
                    "{name} penalty {value} is outside 0..=100"
                )));
            }
        }
        Ok(Self {
            error,
            warning,
            info,
        })
    }

    pub const fn penalty(&self, severity: Severity) -> u8 {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    pub fn score(&self, issues: &[CompatibilityIssue]) -> u8 {
        let total: u32 = issues
            .iter()
            .map(|i| u32::from(self.penalty(i.severity)))
            .sum();
        MAX_SCORE.saturating_sub(total.min(u32::from(MAX_SCORE)) as u8)
    }
}

impl Default for PenaltyTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Runs a [`RuleSet`] against a service set.
///
/// Knows nothing about databases, tenancy or compliance; all of that lives in
/// the rules it is given.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityEvaluator<'r> {
    rules: &'r RuleSet,
    penalties: PenaltyTable,
}

impl<'r> CompatibilityEvaluator<'r> {
    pub fn new(rules: &'r RuleSet, penalties: PenaltyTable) -> Self {
        Self { rules, penalties }
    }

    pub fn penalties(&self) -> PenaltyTable {
        self.penalties
    }

    /// Issues for `services` under `context`, in rule order.
    ///
    /// Pairwise rules see every unordered pair `(i, j)` with `i < j` in the
    /// given order; set rules see the whole slice.
    pub fn issues(
        &self,
        services: &[ServiceIdentifier],
        context: &CompatibilityContext,
    ) -> Vec<CompatibilityIssue> {
        let mut issues = Vec::new();
        for rule in self.rules.iter() {
            match rule.check {
                RuleCheck::Pairwise(violates) => {
                    for (i, a) in services.iter().enumerate() {
                        for b in &services[i + 1..] {
                            if violates(a, b, context) {
                                issues.push(rule.issue(vec![a.clone(), b.clone()], context));
                            }
                        }
                    }
                }
                RuleCheck::Set(check) => {
                    if let Some(affected) = check(services, context) {
                        issues.push(rule.issue(affected, context));
                    }
                }
            }
        }
        issues
    }

    pub fn evaluate(
        &self,
        services: &[ServiceIdentifier],
        context: &CompatibilityContext,
    ) -> Evaluation {
        self.summarize(self.issues(services, context))
    }

    /// Aggregate an issue list into score, gate and verdict.
    pub fn summarize(&self, issues: Vec<CompatibilityIssue>) -> Evaluation {
        let score = self.penalties.score(&issues);
        let worst = issues.iter().map(|i| i.severity).max();
        Evaluation {
            compatible: worst != Some(Severity::Error),
            verdict: Verdict::from_worst(worst),
            score,
            issues,
        }
    }
}

/// Warning for a dependency nothing in the catalog satisfied.
pub fn unmet_dependency_issue(missing: &MissingDependency) -> CompatibilityIssue {
    let by = missing
        .required_by
        .iter()
        .map(ServiceIdentifier::id)
        .collect::<Vec<_>>()
        .join(", ");
    CompatibilityIssue::new(
        UNMET_DEPENDENCY,
        Severity::Warning,
        missing.required_by.clone(),
        format!(
            "{by} requires {} but no catalog service provides it; supply it separately",
            missing.pattern
        ),
    )
}

/// Error for two services whose templates declare a conflict.
pub fn declared_conflict_issue(a: &ServiceIdentifier, b: &ServiceIdentifier) -> CompatibilityIssue {
    CompatibilityIssue::new(
        DECLARED_CONFLICT,
        Severity::Error,
        vec![a.clone(), b.clone()],
        format!("{} and {} declare a conflict and cannot be used together", a.id(), b.id()),
    )
}
