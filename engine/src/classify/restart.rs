//! Node restart and downtime.
//!
//! Records are `(year, month, day)` of spontaneous restarts. The block
//! context carries the uptime `(days, hours)` printed under the table.

use chrono::NaiveDate;
use node_health_core::Severity;
use tracing::debug;

use super::{Finding, Record, RuleInput};

pub(super) fn evaluate(input: &RuleInput<'_>, window_days: i64) -> Finding {
    let mut finding = Finding::new();

    let recent = match input.reference_date() {
        Some(reference) => input
            .records
            .iter()
            .filter_map(restart_date)
            .filter(|restart| within_window(reference, *restart, window_days))
            .count(),
        None => {
            debug!("No reference date for restart window");
            0
        }
    };

    if recent > 1 {
        finding.raise(Severity::Critical);
    } else if recent == 1 {
        finding.raise(Severity::Major);
    }

    let days = input.context.get(0).unwrap_or("0");
    let hours = input.context.get(1).unwrap_or("0");
    finding.note(format!(
        "Node uptime since last restart: {days} days, {hours} hours"
    ));
    finding
}

fn restart_date(record: &Record) -> Option<NaiveDate> {
    let year = record.get(0)?.parse().ok()?;
    let month = record.get(1)?.parse().ok()?;
    let day = record.get(2)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `0 <= reference - restart <= window_days`, in calendar days.
fn within_window(reference: NaiveDate, restart: NaiveDate, window_days: i64) -> bool {
    let age = (reference - restart).num_days();
    (0..=window_days).contains(&age)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restart(date: &str) -> Record {
        let parts = date.split('-').collect::<Vec<_>>();
        Record::from_fields(&parts)
    }

    fn run(records: &[Record], date_of: Option<&str>, context: &Record) -> Finding {
        let mut input = RuleInput::new(records, "", context);
        input.date_of = date_of;
        evaluate(&input, 14)
    }

    #[test]
    fn test_one_restart_in_window_is_major() {
        let context = Record::from_fields(&["12", "5"]);
        let finding = run(
            &[restart("2024-03-10"), restart("2024-02-01")],
            Some("240315"),
            &context,
        );
        assert_eq!(finding.severity, Severity::Major);
        assert_eq!(
            finding.notes,
            vec!["Node uptime since last restart: 12 days, 5 hours"]
        );
    }

    #[test]
    fn test_two_restarts_in_window_is_critical() {
        let finding = run(
            &[restart("2024-03-10"), restart("2024-03-01")],
            Some("240315"),
            &Record::default(),
        );
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(
            finding.notes,
            vec!["Node uptime since last restart: 0 days, 0 hours"]
        );
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        assert!(within_window(reference, day(1), 14));
        assert!(within_window(reference, day(15), 14));
        assert!(!within_window(reference, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), 14));
        // Restarts after the reference date do not count.
        assert!(!within_window(reference, day(16), 14));
    }

    #[test]
    fn test_falls_back_to_report_date() {
        let context = Record::default();
        let records = [restart("2024-03-10")];
        let mut input = RuleInput::new(&records, "", &context);
        input.report_date = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(evaluate(&input, 14).severity, Severity::Major);
    }

    #[test]
    fn test_without_any_date_nothing_counts() {
        let finding = run(&[restart("2024-03-10")], None, &Record::default());
        assert_eq!(finding.severity, Severity::Ok);
        assert_eq!(finding.notes.len(), 1);
    }
}
