//! Compatibility rules.
//!
//! A rule is a pure predicate over services and a [`CompatibilityContext`].
//! Predicates come in two closed shapes:
//!
//! - [`RuleCheck::Pairwise`] is asked about every unordered pair of services.
//! - [`RuleCheck::Set`] receives the whole set and names the services it
//!   objects to.
//!
//! Domain families (databases, multi-tenancy, compliance) are ordinary
//! entries of the same [`RuleSet`]; the evaluator does not know about them.

pub mod builtin;

use std::borrow::Cow;

use crate::domain::{
    entities::{CompatibilityContext, CompatibilityIssue, ServiceIdentifier},
    value_objects::Severity,
};

pub use builtin::BUILTIN_RULES;

/// `true` when the pair violates the rule.
pub type PairwisePredicate =
    fn(&ServiceIdentifier, &ServiceIdentifier, &CompatibilityContext) -> bool;

/// `Some(affected)` when the set violates the rule.
pub type SetPredicate =
    fn(&[ServiceIdentifier], &CompatibilityContext) -> Option<Vec<ServiceIdentifier>>;

#[derive(Debug, Clone, Copy)]
pub enum RuleCheck {
    Pairwise(PairwisePredicate),
    Set(SetPredicate),
}

/// One entry of the rule set.
///
/// `message` is a template; see [`render_message`] for the placeholders.
#[derive(Debug, Clone)]
pub struct CompatibilityRule {
    pub id: Cow<'static, str>,
    pub severity: Severity,
    pub check: RuleCheck,
    pub message: Cow<'static, str>,
}

impl CompatibilityRule {
    pub fn pairwise(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        predicate: PairwisePredicate,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            check: RuleCheck::Pairwise(predicate),
            message: message.into(),
        }
    }

    pub fn set(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        predicate: SetPredicate,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            check: RuleCheck::Set(predicate),
            message: message.into(),
        }
    }

    /// Build the issue for a violation.
    pub fn issue(
        &self,
        affected: Vec<ServiceIdentifier>,
        context: &CompatibilityContext,
    ) -> CompatibilityIssue {
        let message = render_message(&self.message, &affected, context);
        CompatibilityIssue::new(self.id.as_ref(), self.severity, affected, message)
    }
}

/// Ordered, append-only list of rules, evaluated in full.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CompatibilityRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in rules, in declaration order.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }

    /// Append a rule. Existing rules keep their position.
    pub fn push(&mut self, rule: CompatibilityRule) {
        self.rules.push(rule);
    }

    pub fn with_rule(mut self, rule: CompatibilityRule) -> Self {
        self.push(rule);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompatibilityRule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&CompatibilityRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Replace `{{VARIABLE}}` placeholders in a rule message.
///
/// | Placeholder       | Value                                        |
/// |-------------------|----------------------------------------------|
/// | `{{SERVICES}}`    | affected services, comma separated, or `none` |
/// | `{{ENVIRONMENT}}` | `context.environment`                        |
/// | `{{LOAD}}`        | `context.performance.expected_load`          |
/// | `{{STRATEGY}}`    | tenancy strategy, or `none`                  |
/// | `{{ISOLATION}}`   | tenancy isolation, or `none`                 |
///
/// Unknown placeholders are left as-is.
pub fn render_message(
    template: &str,
    affected: &[ServiceIdentifier],
    context: &CompatibilityContext,
) -> String {
    let services = if affected.is_empty() {
        "none".to_string()
    } else {
        affected
            .iter()
            .map(ServiceIdentifier::id)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let tenancy = context.multi_tenancy;

    let variables = [
        ("SERVICES", services),
        ("ENVIRONMENT", context.environment.to_string()),
        ("LOAD", context.performance.expected_load.to_string()),
        (
            "STRATEGY",
            tenancy.map_or_else(|| "none".to_string(), |t| t.strategy.to_string()),
        ),
        (
            "ISOLATION",
            tenancy.map_or_else(|| "none".to_string(), |t| t.isolation.to_string()),
        ),
    ];

    let mut result = template.to_string();
    for (key, value) in &variables {
        let placeholder = format!("{{{{{key}}}}}");
        result = result.replace(&placeholder, value);
    }
    result
}
