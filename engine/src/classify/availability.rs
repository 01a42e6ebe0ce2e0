//! Site and unlocked cell availability from the `strt` summary lines.
//!
//! Records are `(label, available, total, percent)`.

use node_health_core::Severity;

use super::{Finding, Record, RuleInput};

const SITE_LABEL: &str = "site availability";
const CELL_LABEL: &str = "unlocked cell availability";

#[derive(Debug, Default, Clone, Copy)]
struct Ratio {
    up: u64,
    total: u64,
    percent: f64,
}

impl Ratio {
    fn from_record(record: &Record) -> Self {
        Self {
            up: record.number(1).unwrap_or(0),
            total: record.number(2).unwrap_or(0),
            percent: record.field(3).trim().parse().unwrap_or(0.0),
        }
    }

    fn deficit(&self) -> u64 {
        self.total.saturating_sub(self.up)
    }
}

pub(super) fn evaluate(input: &RuleInput<'_>) -> Finding {
    let mut finding = Finding::new();
    if input.records.is_empty() {
        return finding;
    }

    let mut sites = Ratio::default();
    let mut cells = Ratio::default();
    for record in input.records {
        match record.field(0).trim().to_lowercase().as_str() {
            SITE_LABEL => sites = Ratio::from_record(record),
            CELL_LABEL => cells = Ratio::from_record(record),
            _ => {}
        }
    }

    if sites.deficit() >= 5 && (0.0..=90.0).contains(&cells.percent) {
        let severity = match cells.deficit() {
            d if d >= 40 => Severity::Critical,
            d if d >= 20 => Severity::Major,
            d if d >= 10 => Severity::Minor,
            _ => Severity::Warning,
        };
        finding.raise(severity);
    }

    finding.note(format!(
        "{} of {} sites are fully operational ({:.2} %)\n{} of {} unlocked cells are up ({:.2} %)",
        sites.up, sites.total, sites.percent, cells.up, cells.total, cells.percent
    ));
    finding
}
