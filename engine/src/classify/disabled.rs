use node_health_core::Severity;

use super::{Finding, RuleInput};

/// Counts disabled managed objects; more than `limit` is a Warning.
pub(super) fn evaluate(input: &RuleInput<'_>, limit: usize) -> Finding {
    let mut finding = Finding::new();
    let count = input.records.len();
    if count > limit {
        finding.raise(Severity::Warning);
    }
    finding.note(format!("Disabled MOs: {count}"));
    finding
}
