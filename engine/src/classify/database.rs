use node_health_core::Severity;

use super::{Finding, RuleInput};

const NOT_OK: &str = "NOT OK";

/// Database consistency report. One record per output line.
///
/// An inconsistency is Critical unless `benign_table` appears in the block,
/// which caps it at Major.
pub(super) fn evaluate(input: &RuleInput<'_>, benign_table: &str) -> Finding {
    let mut finding = Finding::new();
    let first_failure = input
        .records
        .iter()
        .map(|record| record.field(0).trim())
        .find(|line| line.contains(NOT_OK));

    match first_failure {
        Some(line) => {
            if input.body.contains(benign_table) {
                finding.raise(Severity::Major);
            } else {
                finding.raise(Severity::Critical);
            }
            finding.note(format!("Database is NOT OK: {line}"));
        }
        None => finding.note("Database is OK"),
    }
    finding
}
