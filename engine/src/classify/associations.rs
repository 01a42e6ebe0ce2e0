//! Disabled M3UA associations.
//!
//! The record is the two-letter association type taken from the MO name
//! (`cs`, `ps`, `rs`, ...).

use node_health_core::Severity;

use super::{Finding, RuleInput};

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    let (mut cs, mut ps, mut rs) = (0, 0, 0);
    for record in input.records {
        match record.field(0).to_lowercase().as_str() {
            "cs" => cs += 1,
            "ps" => ps += 1,
            "rs" => rs += 1,
            _ => {}
        }
    }

    let failed = input.records.len();
    if cs >= 2 || ps >= 2 {
        finding.raise(Severity::Critical);
    } else if cs == 1 || ps == 1 || rs > 0 {
        finding.raise(Severity::Major);
    } else if failed > 0 {
        finding.raise(Severity::Minor);
    }
    if failed > 0 {
        finding.note(format!("Num of failed M3UA: {failed}"));
    }
    finding
}
