//! Configuration version and upgrade package housekeeping.

use node_health_core::Severity;

use super::{Finding, RuleInput};

/// Records are `(cv count, up count)` from the `>>> Total:` footer; the
/// last footer in the block wins.
pub(super) fn evaluate(input: &RuleInput<'_>, cv_limit: u64, up_limit: u64) -> Finding {
    let mut finding = Finding::new();
    let Some(record) = input.records.last() else {
        return finding;
    };

    let cv = record.number(0).unwrap_or(0);
    let up = record.number(1).unwrap_or(0);
    let cv_over = cv >= cv_limit;
    let up_over = up >= up_limit;
    if cv_over && up_over {
        finding.raise(Severity::Major);
    } else if cv_over || up_over {
        finding.raise(Severity::Minor);
    }
    finding.note(format!("CV: {}, UP: {}", record.field(0), record.field(1)));
    finding
}
