//! Node health-check attributes.
//!
//! Both rules read the same `get ManagedElement=1` output: one looks at the
//! last result code, the other at the number of scheduled runs.

use node_health_core::Severity;

use super::{Finding, RuleInput};

pub(super) fn evaluate_result(input: &RuleInput<'_>, ok_code: &str) -> Finding {
    let mut finding = Finding::new();
    match input.records.first().map(|record| record.field(0).trim()) {
        Some(code) if code == ok_code => finding.note("Health Check result is OK"),
        Some(code) => {
            finding.raise(Severity::Minor);
            finding.note(format!("Health Check result code {code}"));
        }
        None => {
            finding.raise(Severity::Minor);
            finding.note("Health Check result is missing");
        }
    }
    finding
}

pub(super) fn evaluate_schedule(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    let scheduled = input.records.first().and_then(|record| record.number(0));
    match scheduled {
        Some(runs) if runs > 0 => finding.note("Health Check Schedule is OK"),
        _ => {
            finding.raise(Severity::Warning);
            finding.note("Health Check Schedule is NOK");
        }
    }
    finding
}
