use node_health_core::Severity;

use super::{Finding, RuleInput};

/// Compares each core MP clock `(yy, mm, dd)` with the command date.
///
/// Only the first mismatch is reported, and only when the row is not
/// already at Minor or worse.
pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    let Some(date_of) = input.date_of else {
        return finding;
    };
    if !Severity::Minor.is_more_severe_than(input.prior) {
        return finding;
    }

    let drifted = input.records.iter().any(|record| {
        let clock = format!("{}{}{}", record.field(0), record.field(1), record.field(2));
        clock != date_of
    });
    if drifted {
        finding.raise(Severity::Minor);
        finding.note("Please check NTP");
    }
    finding
}
