//! CC, DC and PDR device pools.
//!
//! Records are the `std` table rows: `(type, up%, total, enabled, disabled,
//! locked, active, idle, busy, unallocated)`.

use node_health_core::Severity;

use super::{Finding, RuleInput};

const UP_PERCENT: usize = 1;
const DISABLED: usize = 4;
const UNALLOCATED: usize = 9;

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    if input.records.is_empty() {
        return finding;
    }

    let (mut pdr, mut cc, mut dc) = (0, 0, 0);
    let (mut disabled, mut unallocated) = (0, 0);
    for record in input.records {
        let up = record.number(UP_PERCENT).unwrap_or(0);
        match record.field(0).to_lowercase().as_str() {
            "pdr" => pdr = up,
            "cc" => cc = up,
            "dc" => dc = up,
            _ => {}
        }
        disabled += record.number(DISABLED).unwrap_or(0);
        unallocated += record.number(UNALLOCATED).unwrap_or(0);
    }

    finding.note(format!("PDR/CC/DC UP status {pdr}%/{cc}%/{dc}%"));
    if disabled > 1 || unallocated > 1 {
        finding.raise(Severity::Critical);
    } else if disabled == 1 || unallocated == 1 {
        finding.raise(Severity::Major);
    }
    finding
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Record;

    fn row(kind: &str, up: &str, disabled: &str, unallocated: &str) -> Record {
        Record::from_fields(&[kind, up, "10", "10", disabled, "0", "5", "5", "0", unallocated])
    }

    fn run(records: &[Record]) -> Finding {
        let context = Record::default();
        evaluate(&RuleInput::new(records, "", &context))
    }

    #[test]
    fn test_healthy_pool() {
        let finding = run(&[
            row("CC", "100", "0", "0"),
            row("DC", "100", "0", "0"),
            row("PDR", "100", "0", "0"),
        ]);
        assert_eq!(finding.severity, Severity::Ok);
        assert_eq!(finding.notes, vec!["PDR/CC/DC UP status 100%/100%/100%"]);
    }

    #[test]
    fn test_one_disabled_is_major() {
        let finding = run(&[row("CC", "90", "1", "0"), row("PDR", "100", "0", "0")]);
        assert_eq!(finding.severity, Severity::Major);
        assert_eq!(finding.notes, vec!["PDR/CC/DC UP status 100%/90%/0%"]);
    }

    #[test]
    fn test_summed_unallocated_is_critical() {
        let finding = run(&[row("CC", "100", "0", "1"), row("DC", "100", "0", "1")]);
        assert_eq!(finding.severity, Severity::Critical);
    }

    #[test]
    fn test_no_records() {
        assert_eq!(run(&[]), Finding::new());
    }
}
