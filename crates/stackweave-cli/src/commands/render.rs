//! Human/plain rendering shared by `resolve`, `check` and `recommend`.

use owo_colors::OwoColorize;

use stackweave_core::domain::{CompatibilityIssue, Severity, Verdict};

use crate::{
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn issues(output: &OutputManager, issues: &[CompatibilityIssue]) -> CliResult<()> {
    if issues.is_empty() {
        output.success("No compatibility issues")?;
        return Ok(());
    }
    output.header(&format!("Issues ({}):", issues.len()))?;
    for issue in issues {
        let services = issue
            .affected_services
            .iter()
            .map(|s| s.id())
            .collect::<Vec<_>>()
            .join(", ");
        let line = format!("[{}] {} ({services})", issue.rule_id, issue.message);
        match issue.severity {
            Severity::Error => output.error(&line)?,
            Severity::Warning => output.warning(&line)?,
            Severity::Info => output.info(&line)?,
        }
    }
    Ok(())
}

pub fn verdict(output: &OutputManager, score: u8, verdict: Verdict) -> CliResult<()> {
    let label = format!("{} ({score}/100)", verdict.as_str().to_uppercase());
    let line = if !output.supports_color() {
        format!("Verdict: {label}")
    } else {
        match verdict {
            Verdict::Pass => format!("Verdict: {}", label.green().bold()),
            Verdict::Warn => format!("Verdict: {}", label.yellow().bold()),
            Verdict::Fail => format!("Verdict: {}", label.red().bold()),
        }
    };
    output.print(&line)?;
    Ok(())
}

/// Under `--strict`, an incompatible stack is an error (exit 5).
pub fn enforce_strict(
    strict: bool,
    compatible: bool,
    score: u8,
    issues: &[CompatibilityIssue],
) -> CliResult<()> {
    if strict && !compatible {
        return Err(CliError::Incompatible {
            score,
            errors: issues.iter().filter(|i| i.is_error()).count(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use stackweave_core::domain::{Evaluation, ServiceIdentifier};

    fn evaluation(compatible: bool) -> Evaluation {
        let issues = if compatible {
            vec![]
        } else {
            vec![CompatibilityIssue::new(
                "sqlite-high-load",
                Severity::Error,
                vec![ServiceIdentifier::new("database", "sqlite")],
                "SQLite cannot sustain high load",
            )]
        };
        Evaluation {
            score: if compatible { 100 } else { 60 },
            verdict: if compatible { Verdict::Pass } else { Verdict::Fail },
            compatible,
            issues,
        }
    }

    fn enforce(strict: bool, eval: &Evaluation) -> CliResult<()> {
        enforce_strict(strict, eval.compatible, eval.score, &eval.issues)
    }

    #[test]
    fn strict_fails_incompatible_stacks() {
        let err = enforce(true, &evaluation(false)).unwrap_err();
        assert!(matches!(err, CliError::Incompatible { score: 60, errors: 1 }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn non_strict_only_reports() {
        assert!(enforce(false, &evaluation(false)).is_ok());
        assert!(enforce(true, &evaluation(true)).is_ok());
    }
}
