//! Active-alarm tally against the alarm catalogue.
//!
//! Each record is `(code, specific problem, text)` where the code is the
//! console's one-letter severity (`c`, `M`, `m`, `w`). An alarm counts in a
//! bucket only when the code agrees with the catalogue's perceived severity;
//! any other pairing is a collision.

use node_health_core::{AlarmTally, Severity};
use tracing::debug;

use super::{Finding, RuleInput};

fn code_severity(code: &str) -> Option<Severity> {
    match code {
        "c" => Some(Severity::Critical),
        "M" => Some(Severity::Major),
        "m" => Some(Severity::Minor),
        "w" => Some(Severity::Warning),
        _ => None,
    }
}

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();

    let Some(catalogue) = input.catalogue else {
        if !input.records.is_empty() {
            finding.warn(format!(
                "Alarm catalogue unavailable: {} alarms not classified",
                input.records.len()
            ));
        }
        return finding;
    };

    let mut tally = AlarmTally::default();
    for record in input.records {
        let code = record.field(0);
        let problem = record.field(1).trim();
        let Some(entry) = catalogue.lookup(problem) else {
            debug!(problem, "Alarm not in catalogue");
            continue;
        };

        let reported = code_severity(code);
        let declared = entry.perceived();
        match (reported, declared) {
            (Some(Severity::Critical), Some(Severity::Critical)) => {
                tally.critical += 1;
                tally.details.push(problem.to_string());
            }
            (Some(Severity::Major), Some(Severity::Major)) => {
                tally.major += 1;
                tally.details.push(problem.to_string());
            }
            (Some(Severity::Minor), Some(Severity::Minor)) => tally.minor += 1,
            (Some(Severity::Warning), Some(Severity::Warning)) => tally.warning += 1,
            _ => {
                tally.collision += 1;
                debug!(problem, code, declared = %entry.perceived_severity, "Alarm severity collision");
                finding.warn(format!(
                    "Severity collision: {problem} reported {code}, catalogue {}",
                    entry.perceived_severity
                ));
            }
        }
    }

    // Summary is rendered by the session from the merged row tally.
    finding.raise(tally.severity());
    finding.tally = Some(tally);
    finding
}
